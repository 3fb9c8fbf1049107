mod client;
mod failed_jobs;
mod pipeline_tree;
mod provider;
mod source;
pub mod types;

pub use client::GitLabClient;
pub use provider::{FailedJobsReport, GitLabProvider};
pub use types::{FailedJobRow, MergeRequest};
