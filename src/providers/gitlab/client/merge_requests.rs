use super::core::GitLabClient;
use crate::error::Result;
use crate::providers::gitlab::types::MergeRequest;

impl GitLabClient {
    pub async fn merge_request(&self, project_id: u64, mr_iid: u64) -> Result<MergeRequest> {
        self.get_json(&format!("/projects/{project_id}/merge_requests/{mr_iid}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Token;

    #[tokio::test]
    async fn test_merge_request() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/projects/1/merge_requests/7")
            .with_body(
                r#"{
                    "iid": 7,
                    "title": "Add feature",
                    "description": "Body",
                    "source_branch": "feature",
                    "target_branch": "main",
                    "head_pipeline": {"id": 10, "project_id": 1, "status": "failed"},
                    "diff_refs": {"base_sha": "aaa", "head_sha": "bbb", "start_sha": "aaa"}
                }"#,
            )
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), Token::from("t")).unwrap();
        let mr = client.merge_request(1, 7).await.unwrap();

        assert_eq!(mr.iid, 7);
        assert_eq!(mr.head_pipeline.map(|p| p.id), Some(10));
        let diff_refs = mr.diff_refs.unwrap();
        assert_eq!(diff_refs.base_sha.as_deref(), Some("aaa"));
        assert_eq!(diff_refs.head_sha.as_deref(), Some("bbb"));
    }
}
