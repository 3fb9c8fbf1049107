use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::config::{FileConfig, Overrides, Settings};
use crate::git::Git;
use crate::output::ReportFormat;
use crate::providers::gitlab::GitLabProvider;
use crate::tools;

#[derive(Parser)]
#[command(name = "mrlens")]
#[command(author, version, about = "GitLab merge request diagnostics", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./mrlens.toml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// GitLab personal access token
    #[arg(short, long, global = true, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Full REST API base URL, e.g. https://gitlab.example.com/api/v4
    #[arg(long, global = true, env = "GITLAB_API_URL")]
    api_url: Option<String>,

    /// GitLab instance URL; /api/v4 is appended
    #[arg(long, global = true, env = "GITLAB_HOST")]
    host: Option<String>,

    /// Git remote used to fetch missing merge request commits
    #[arg(long, global = true, env = "GIT_REMOTE_NAME")]
    remote: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a job's raw log to a local file
    JobLog {
        #[arg(short = 'P', long)]
        project: u64,

        #[arg(short, long)]
        job: u64,

        /// Where the log is written
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List failed jobs across a merge request's pipeline and its downstream pipelines
    FailedJobs {
        #[arg(short = 'P', long)]
        project: u64,

        /// Merge request IID
        #[arg(short, long)]
        mr: u64,

        #[arg(short, long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
    },

    /// Save a merge request's details and diff to local files
    MrDetails {
        #[arg(short = 'P', long)]
        project: u64,

        /// Merge request IID
        #[arg(short, long)]
        mr: u64,

        /// Where the details markdown is written
        #[arg(long)]
        detail_path: PathBuf,

        /// Where the diff is written
        #[arg(long)]
        diff_path: PathBuf,
    },
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let file = FileConfig::load(self.config.as_deref())?;
        let overrides = Overrides {
            api_url: self.api_url.clone(),
            host: self.host.clone(),
            token: self.token.clone(),
            remote_name: self.remote.clone(),
        };
        Ok(Settings::resolve(overrides, file)?)
    }

    pub async fn execute(&self) -> Result<()> {
        let settings = self.settings()?;
        info!("Using GitLab API at {}", settings.api_url);

        let provider = GitLabProvider::new(&settings.api_url, settings.token.clone())?;

        let output = match &self.command {
            Commands::JobLog {
                project,
                job,
                output,
            } => tools::download_job_log(&provider.client, *project, *job, output).await?,
            Commands::FailedJobs {
                project,
                mr,
                format,
            } => tools::list_failed_jobs(&provider, *project, *mr, *format).await?,
            Commands::MrDetails {
                project,
                mr,
                detail_path,
                diff_path,
            } => {
                let git = Git::new(std::env::current_dir()?, settings.remote_name.clone());
                tools::save_mr_details(
                    &provider.client,
                    &git,
                    *project,
                    *mr,
                    detail_path,
                    diff_path,
                )
                .await?
            }
        };

        println!("{output}");

        Ok(())
    }
}
