use super::core::GitLabClient;
use crate::error::Result;

impl GitLabClient {
    /// Raw log output of a job.
    pub async fn job_trace(&self, project_id: u64, job_id: u64) -> Result<String> {
        self.get_text(&format!("/projects/{project_id}/jobs/{job_id}/trace"))
            .await
    }
}
