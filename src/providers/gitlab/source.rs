use crate::error::Result;

use super::client::GitLabClient;
use super::types::{BridgeJob, Job, PipelineDetails};

/// Read access to pipelines, as needed by the tree walk and the failed job
/// aggregation.
#[allow(async_fn_in_trait)]
pub trait PipelineSource {
    async fn pipeline(&self, project_id: u64, pipeline_id: u64) -> Result<PipelineDetails>;

    async fn pipeline_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>>;

    async fn pipeline_bridges(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<BridgeJob>>;
}

impl PipelineSource for GitLabClient {
    async fn pipeline(&self, project_id: u64, pipeline_id: u64) -> Result<PipelineDetails> {
        GitLabClient::pipeline(self, project_id, pipeline_id).await
    }

    async fn pipeline_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>> {
        GitLabClient::pipeline_jobs(self, project_id, pipeline_id).await
    }

    async fn pipeline_bridges(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<BridgeJob>> {
        GitLabClient::pipeline_bridges(self, project_id, pipeline_id).await
    }
}
