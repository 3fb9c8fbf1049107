//! The three entry points: job log download, failed job report and merge
//! request detail export. Each returns the text shown to the user.

mod failed_jobs;
mod job_log;
mod mr_details;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use failed_jobs::list_failed_jobs;
pub use job_log::download_job_log;
pub use mr_details::save_mr_details;

/// Resolves `path` against the current working directory.
fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Writes UTF-8 text, creating parent directories and overwriting any existing file.
async fn write_text_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}
