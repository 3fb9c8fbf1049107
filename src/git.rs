//! Local git operations used when saving merge request diffs.
//!
//! Every operation shells out to the `git` binary inside a fixed working
//! directory. Commits that are missing locally are fetched from the configured
//! remote before diffing.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;
use tokio::process::Command;

/// Which side of the merge request a commit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRole {
    Source,
    Target,
}

impl fmt::Display for BranchRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchRole::Source => f.write_str("source"),
            BranchRole::Target => f.write_str("target"),
        }
    }
}

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git exited with a non-zero status.
    #[error("git {command} exited with code {code}. {stderr}{}", format_hint(.hint))]
    CommandFailed {
        command: String,
        code: String,
        stderr: String,
        hint: Option<String>,
    },

    #[error(
        "Current directory is not inside a Git repository. Verify you are running this tool from the correct project workspace."
    )]
    NotAWorkTree,

    #[error("Missing {0} commit SHA.")]
    MissingSha(BranchRole),

    #[error(
        "Commit {sha} from the {role} branch \"{branch}\" is unavailable even after fetching. Verify this repository matches the GitLab project and has access to the merge request branches."
    )]
    CommitUnavailable {
        sha: String,
        role: BranchRole,
        branch: String,
    },

    /// The git binary could not be started.
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
}

fn format_hint(hint: &Option<String>) -> String {
    hint.as_ref().map(|h| format!(" {h}")).unwrap_or_default()
}

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Git wrapper bound to a working directory and a fetch remote.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    remote: String,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            remote: remote.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    async fn run(&self, args: &[&str], hint: Option<String>) -> GitResult<String> {
        debug!("Running git {} in {}", args.join(" "), self.workdir.display());

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(GitError::CommandFailed {
            command: args.join(" "),
            code: output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string()),
            stderr: if stderr.is_empty() {
                "No stderr.".to_string()
            } else {
                stderr
            },
            hint,
        })
    }

    /// Fails unless the working directory is inside a git work tree.
    pub async fn ensure_work_tree(&self) -> GitResult<()> {
        match self.run(&["rev-parse", "--is-inside-work-tree"], None).await {
            Ok(stdout) if stdout.trim() == "true" => Ok(()),
            _ => Err(GitError::NotAWorkTree),
        }
    }

    /// Whether `sha` names a commit present in the local object database.
    pub async fn has_commit(&self, sha: &str) -> bool {
        let object = format!("{sha}^{{commit}}");
        self.run(&["cat-file", "-e", &object], None).await.is_ok()
    }

    pub async fn fetch_branch(&self, branch: &str, role: BranchRole) -> GitResult<()> {
        let hint = format!(
            "Unable to fetch {role} branch \"{branch}\" from remote \"{}\". Ensure the remote exists or fetch the merge request refs manually.",
            self.remote
        );
        self.run(&["fetch", "--quiet", &self.remote, branch], Some(hint))
            .await?;
        Ok(())
    }

    /// Makes sure `sha` is available locally, fetching `branch` if it is not.
    pub async fn ensure_commit_available(
        &self,
        sha: &str,
        branch: &str,
        role: BranchRole,
    ) -> GitResult<()> {
        if sha.is_empty() {
            return Err(GitError::MissingSha(role));
        }

        if self.has_commit(sha).await {
            return Ok(());
        }

        warn!(
            "Commit {sha} is not available locally, fetching {role} branch {branch} from {}",
            self.remote
        );
        self.fetch_branch(branch, role).await?;

        if self.has_commit(sha).await {
            return Ok(());
        }

        Err(GitError::CommitUnavailable {
            sha: sha.to_string(),
            role,
            branch: branch.to_string(),
        })
    }

    /// Three-dot diff between the merge base of `base` and `head`, and `head`.
    pub async fn diff(&self, base_sha: &str, head_sha: &str) -> GitResult<String> {
        let range = format!("{base_sha}...{head_sha}");
        self.run(
            &["diff", &range],
            Some(
                "Verify you are running this tool inside the repository that matches the investigated merge request."
                    .to_string(),
            ),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .args([
                "-c",
                "user.name=Test",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {args:?} failed");
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn init_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        dir
    }

    fn commit_file(dir: &Path, name: &str, contents: &str) -> String {
        std::fs::write(dir.join(name), contents).unwrap();
        git(dir, &["add", name]);
        git(dir, &["commit", "-q", "-m", name]);
        git(dir, &["rev-parse", "HEAD"])
    }

    #[test]
    fn test_command_failed_message_includes_hint() {
        let err = GitError::CommandFailed {
            command: "diff a...b".to_string(),
            code: "128".to_string(),
            stderr: "fatal: bad revision".to_string(),
            hint: Some("Check the repository.".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "git diff a...b exited with code 128. fatal: bad revision Check the repository."
        );
    }

    #[test]
    fn test_commit_unavailable_message() {
        let err = GitError::CommitUnavailable {
            sha: "abc123".to_string(),
            role: BranchRole::Target,
            branch: "main".to_string(),
        };
        assert!(err
            .to_string()
            .starts_with("Commit abc123 from the target branch \"main\" is unavailable"));
    }

    #[tokio::test]
    async fn test_ensure_work_tree_outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        let git = Git::new(dir.path(), "origin");
        let result = git.ensure_work_tree().await;
        assert!(matches!(result, Err(GitError::NotAWorkTree)));
    }

    #[tokio::test]
    async fn test_ensure_work_tree_inside_repository() {
        let dir = init_repo();
        let git = Git::new(dir.path(), "origin");
        assert!(git.ensure_work_tree().await.is_ok());
    }

    #[tokio::test]
    async fn test_has_commit() {
        let dir = init_repo();
        let sha = commit_file(dir.path(), "README.md", "hello\n");
        let git = Git::new(dir.path(), "origin");

        assert!(git.has_commit(&sha).await);
        assert!(!git.has_commit("0000000000000000000000000000000000000000").await);
    }

    #[tokio::test]
    async fn test_ensure_commit_available_rejects_empty_sha() {
        let dir = init_repo();
        let git = Git::new(dir.path(), "origin");
        let result = git.ensure_commit_available("", "main", BranchRole::Source).await;
        assert!(matches!(result, Err(GitError::MissingSha(BranchRole::Source))));
    }

    #[tokio::test]
    async fn test_ensure_commit_available_fetch_failure_carries_hint() {
        let dir = init_repo();
        commit_file(dir.path(), "README.md", "hello\n");
        let git = Git::new(dir.path(), "missing-remote");

        let err = git
            .ensure_commit_available(
                "1111111111111111111111111111111111111111",
                "feature",
                BranchRole::Source,
            )
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("fetch --quiet missing-remote feature"));
        assert!(message.contains("Unable to fetch source branch \"feature\""));
    }

    #[tokio::test]
    async fn test_ensure_commit_available_fetches_missing_commit() {
        let upstream = init_repo();
        commit_file(upstream.path(), "README.md", "hello\n");

        let workspace = tempfile::tempdir().unwrap();
        let upstream_path = upstream.path().to_str().unwrap();
        git(workspace.path(), &["clone", "-q", upstream_path, "local"]);
        let local = workspace.path().join("local");

        git(upstream.path(), &["checkout", "-q", "-b", "feature"]);
        let head = commit_file(upstream.path(), "feature.txt", "new feature\n");

        let git = Git::new(&local, "origin");
        assert!(!git.has_commit(&head).await);

        git.ensure_commit_available(&head, "feature", BranchRole::Source)
            .await
            .unwrap();
        assert!(git.has_commit(&head).await);

        let bogus = "1111111111111111111111111111111111111111";
        let err = git
            .ensure_commit_available(bogus, "feature", BranchRole::Source)
            .await
            .unwrap_err();
        assert!(matches!(
            &err,
            GitError::CommitUnavailable { sha, role: BranchRole::Source, branch }
                if sha == bogus && branch == "feature"
        ));
        assert!(err
            .to_string()
            .starts_with(&format!("Commit {bogus} from the source branch \"feature\"")));
    }

    #[tokio::test]
    async fn test_diff_between_commits() {
        let dir = init_repo();
        let base = commit_file(dir.path(), "README.md", "hello\n");
        let head = commit_file(dir.path(), "src.txt", "change\n");
        let git = Git::new(dir.path(), "origin");

        let diff = git.diff(&base, &head).await.unwrap();
        assert!(diff.contains("src.txt"));
        assert!(diff.contains("+change"));
        assert!(!diff.contains("README.md"));
    }
}
