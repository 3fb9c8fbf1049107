use log::{info, warn};

use crate::auth::Token;
use crate::error::Result;
use crate::output::PhaseProgress;
use crate::providers::gitlab::client::GitLabClient;

use super::failed_jobs::collect_failed_jobs;
use super::pipeline_tree::collect_pipelines;
use super::types::{FailedJobRow, PipelineRef};

/// Failed jobs of a merge request's head pipeline tree, unsorted.
#[derive(Debug, Clone)]
pub struct FailedJobsReport {
    pub mr_iid: u64,
    /// `None` when the merge request has no head pipeline.
    pub head_pipeline: Option<PipelineRef>,
    pub rows: Vec<FailedJobRow>,
}

/// GitLab merge request diagnostics provider.
///
/// Wraps the REST client and drives the pipeline tree walk and the failed job
/// aggregation for a merge request.
pub struct GitLabProvider {
    pub client: GitLabClient,
}

impl GitLabProvider {
    /// Creates a provider talking to the REST API at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(api_url: &str, token: Token) -> Result<Self> {
        let client = GitLabClient::new(api_url, token)?;
        Ok(Self { client })
    }

    /// Collects the failed jobs of every pipeline in the head pipeline's
    /// trigger tree.
    ///
    /// The head pipeline's project defaults to `project_id` when GitLab does
    /// not report one. Requests are issued one at a time.
    ///
    /// # Errors
    ///
    /// Returns the first API error encountered; no partial report is produced.
    pub async fn failed_jobs(&self, project_id: u64, mr_iid: u64) -> Result<FailedJobsReport> {
        info!("Collecting failed jobs for project {project_id}, MR !{mr_iid}");

        let merge_request = self.client.merge_request(project_id, mr_iid).await?;

        let Some(head_pipeline) = merge_request.head_pipeline else {
            warn!("Merge request !{mr_iid} has no head pipeline");
            return Ok(FailedJobsReport {
                mr_iid,
                head_pipeline: None,
                rows: Vec::new(),
            });
        };

        let root = PipelineRef::new(
            head_pipeline.id,
            head_pipeline.project_id.unwrap_or(project_id),
        );

        let progress = PhaseProgress::start_discovery(root);
        let pipelines = collect_pipelines(&self.client, root).await?;

        let progress = progress.finish_discovery_start_collection(pipelines.len());
        let rows = collect_failed_jobs(&self.client, &pipelines).await?;
        progress.finish_collection(rows.len());

        info!(
            "Found {} failed jobs across {} pipelines",
            rows.len(),
            pipelines.len()
        );

        Ok(FailedJobsReport {
            mr_iid,
            head_pipeline: Some(root),
            rows,
        })
    }
}
