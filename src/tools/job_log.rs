use std::path::Path;

use log::info;

use crate::error::Result;
use crate::providers::gitlab::GitLabClient;

use super::{absolute_path, write_text_file};

/// Downloads a job's raw log to `log_path`.
pub async fn download_job_log(
    client: &GitLabClient,
    project_id: u64,
    job_id: u64,
    log_path: &Path,
) -> Result<String> {
    info!("Downloading log of job {job_id} in project {project_id}");

    let contents = client.job_trace(project_id, job_id).await?;
    let absolute = absolute_path(log_path)?;
    write_text_file(&absolute, &contents).await?;

    Ok(format!("Saved job {job_id} log to {}", absolute.display()))
}
