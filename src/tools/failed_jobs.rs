use crate::error::Result;
use crate::output::report::{render, ReportFormat};
use crate::providers::gitlab::GitLabProvider;

/// Renders the failed jobs of a merge request's pipeline tree.
pub async fn list_failed_jobs(
    provider: &GitLabProvider,
    project_id: u64,
    mr_iid: u64,
    format: ReportFormat,
) -> Result<String> {
    let report = provider.failed_jobs(project_id, mr_iid).await?;
    render(&report, format)
}
