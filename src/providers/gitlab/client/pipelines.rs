use super::core::GitLabClient;
use crate::error::Result;
use crate::providers::gitlab::types::{BridgeJob, Job, PipelineDetails};

impl GitLabClient {
    pub async fn pipeline(&self, project_id: u64, pipeline_id: u64) -> Result<PipelineDetails> {
        self.get_json(&format!("/projects/{project_id}/pipelines/{pipeline_id}"))
            .await
    }

    /// All jobs of a pipeline, across every page.
    pub async fn pipeline_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>> {
        self.get_paged(&format!("/projects/{project_id}/pipelines/{pipeline_id}/jobs"))
            .await
    }

    /// All trigger (bridge) jobs of a pipeline, across every page.
    pub async fn pipeline_bridges(
        &self,
        project_id: u64,
        pipeline_id: u64,
    ) -> Result<Vec<BridgeJob>> {
        self.get_paged(&format!(
            "/projects/{project_id}/pipelines/{pipeline_id}/bridges"
        ))
        .await
    }
}
