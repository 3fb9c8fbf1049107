use std::path::Path;

use log::info;

use crate::error::{MrLensError, Result};
use crate::git::{BranchRole, Git};
use crate::providers::gitlab::{GitLabClient, MergeRequest};

use super::{absolute_path, write_text_file};

/// Saves a merge request's title and description as markdown to
/// `detail_path`, and its `base...head` diff to `diff_path`.
///
/// The diff is computed by the local repository in `git`'s working directory;
/// missing commits are fetched from the configured remote first.
pub async fn save_mr_details(
    client: &GitLabClient,
    git: &Git,
    project_id: u64,
    mr_iid: u64,
    detail_path: &Path,
    diff_path: &Path,
) -> Result<String> {
    info!("Saving details of MR !{mr_iid} in project {project_id}");

    let merge_request = client.merge_request(project_id, mr_iid).await?;

    git.ensure_work_tree().await?;

    let (base_sha, head_sha) = diff_shas(&merge_request)?;
    let (source_branch, target_branch) = branch_names(&merge_request)?;

    git.ensure_commit_available(base_sha, target_branch, BranchRole::Target)
        .await?;
    git.ensure_commit_available(head_sha, source_branch, BranchRole::Source)
        .await?;

    let detail_absolute = absolute_path(detail_path)?;
    let diff_absolute = absolute_path(diff_path)?;

    write_text_file(&detail_absolute, &format_details_markdown(&merge_request)).await?;

    info!(
        "Computing diff {base_sha}...{head_sha} in {}",
        git.workdir().display()
    );
    let diff = git.diff(base_sha, head_sha).await?;
    write_text_file(&diff_absolute, &diff).await?;

    Ok(format!(
        "Saved MR details to {}\nSaved git diff to {}",
        detail_absolute.display(),
        diff_absolute.display()
    ))
}

fn diff_shas(merge_request: &MergeRequest) -> Result<(&str, &str)> {
    let diff_refs = merge_request.diff_refs.as_ref();
    let base = diff_refs.and_then(|refs| non_empty(refs.base_sha.as_deref()));
    let head = diff_refs.and_then(|refs| non_empty(refs.head_sha.as_deref()));

    base.zip(head).ok_or_else(|| {
        MrLensError::MissingData(
            "Merge request response did not include diff_refs.base_sha and diff_refs.head_sha."
                .to_string(),
        )
    })
}

fn branch_names(merge_request: &MergeRequest) -> Result<(&str, &str)> {
    let source = non_empty(merge_request.source_branch.as_deref());
    let target = non_empty(merge_request.target_branch.as_deref());

    source.zip(target).ok_or_else(|| {
        MrLensError::MissingData(
            "Merge request response did not include source or target branch names.".to_string(),
        )
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn format_details_markdown(merge_request: &MergeRequest) -> String {
    let title = if merge_request.title.is_empty() {
        "Untitled merge request"
    } else {
        merge_request.title.as_str()
    };

    let description = merge_request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("_No description provided._");

    let mut lines = vec![
        format!("# {title} (!{})", merge_request.iid),
        String::new(),
        format!("- IID: {}", merge_request.iid),
    ];
    if let Some(source) = non_empty(merge_request.source_branch.as_deref()) {
        lines.push(format!("- Source branch: {source}"));
    }
    if let Some(target) = non_empty(merge_request.target_branch.as_deref()) {
        lines.push(format!("- Target branch: {target}"));
    }
    if let Some(url) = non_empty(merge_request.web_url.as_deref()) {
        lines.push(format!("- URL: {url}"));
    }
    lines.extend([
        String::new(),
        "## Description".to_string(),
        String::new(),
        description.to_string(),
        String::new(),
    ]);

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Token;
    use std::process::Command;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
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

    fn merge_request(json: &str) -> MergeRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_format_details_markdown() {
        let mr = merge_request(
            r#"{
                "iid": 7,
                "title": "Add login",
                "description": "  Adds a login page.\n",
                "source_branch": "feature/login",
                "target_branch": "main",
                "web_url": "https://gitlab.example.com/g/p/-/merge_requests/7"
            }"#,
        );

        assert_eq!(
            format_details_markdown(&mr),
            "# Add login (!7)\n\n- IID: 7\n- Source branch: feature/login\n- Target branch: main\n\
             - URL: https://gitlab.example.com/g/p/-/merge_requests/7\n\n## Description\n\n\
             Adds a login page.\n"
        );
    }

    #[test]
    fn test_format_details_markdown_placeholders() {
        let mr = merge_request(r#"{"iid": 3, "title": "", "description": "   "}"#);
        assert_eq!(
            format_details_markdown(&mr),
            "# Untitled merge request (!3)\n\n- IID: 3\n\n## Description\n\n_No description provided._\n"
        );
    }

    #[test]
    fn test_diff_shas_missing() {
        let mr = merge_request(
            r#"{"iid": 3, "title": "x", "diff_refs": {"base_sha": "abc", "head_sha": null}}"#,
        );
        let err = diff_shas(&mr).unwrap_err();
        assert!(matches!(err, MrLensError::MissingData(_)));

        let mr = merge_request(r#"{"iid": 3, "title": "x"}"#);
        assert!(diff_shas(&mr).is_err());
    }

    #[test]
    fn test_branch_names_missing() {
        let mr = merge_request(r#"{"iid": 3, "title": "x", "source_branch": "feature"}"#);
        let err = branch_names(&mr).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Merge request response did not include source or target branch names."
        );
    }

    #[tokio::test]
    async fn test_save_mr_details_writes_details_and_diff() {
        let repo = tempfile::tempdir().unwrap();
        git(repo.path(), &["init", "-q"]);
        std::fs::write(repo.path().join("README.md"), "hello\n").unwrap();
        git(repo.path(), &["add", "README.md"]);
        git(repo.path(), &["commit", "-q", "-m", "base"]);
        let base = git(repo.path(), &["rev-parse", "HEAD"]);
        std::fs::write(repo.path().join("feature.txt"), "new feature\n").unwrap();
        git(repo.path(), &["add", "feature.txt"]);
        git(repo.path(), &["commit", "-q", "-m", "feature"]);
        let head = git(repo.path(), &["rev-parse", "HEAD"]);

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/projects/1/merge_requests/7")
            .with_body(format!(
                r#"{{
                    "iid": 7,
                    "title": "Add feature",
                    "description": "Feature body",
                    "source_branch": "feature",
                    "target_branch": "main",
                    "diff_refs": {{"base_sha": "{base}", "head_sha": "{head}"}}
                }}"#
            ))
            .create_async()
            .await;

        let out = tempfile::tempdir().unwrap();
        let detail_path = out.path().join("mr").join("details.md");
        let diff_path = out.path().join("mr").join("changes.diff");

        let client = GitLabClient::new(&server.url(), Token::from("t")).unwrap();
        let git_wrapper = Git::new(repo.path(), "origin");
        let message = save_mr_details(&client, &git_wrapper, 1, 7, &detail_path, &diff_path)
            .await
            .unwrap();

        assert_eq!(
            message,
            format!(
                "Saved MR details to {}\nSaved git diff to {}",
                detail_path.display(),
                diff_path.display()
            )
        );
        let details = std::fs::read_to_string(&detail_path).unwrap();
        assert!(details.starts_with("# Add feature (!7)"));
        assert!(details.contains("Feature body"));
        let diff = std::fs::read_to_string(&diff_path).unwrap();
        assert!(diff.contains("feature.txt"));
        assert!(diff.contains("+new feature"));
    }

    #[tokio::test]
    async fn test_save_mr_details_requires_diff_refs() {
        let repo = tempfile::tempdir().unwrap();
        git(repo.path(), &["init", "-q"]);

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/projects/1/merge_requests/7")
            .with_body(r#"{"iid": 7, "title": "x", "source_branch": "a", "target_branch": "b"}"#)
            .create_async()
            .await;

        let out = tempfile::tempdir().unwrap();
        let detail_path = out.path().join("details.md");
        let diff_path = out.path().join("changes.diff");

        let client = GitLabClient::new(&server.url(), Token::from("t")).unwrap();
        let err = save_mr_details(
            &client,
            &Git::new(repo.path(), "origin"),
            1,
            7,
            &detail_path,
            &diff_path,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MrLensError::MissingData(_)));
        assert!(!detail_path.exists());
    }

    #[tokio::test]
    async fn test_save_mr_details_outside_repository() {
        let not_a_repo = tempfile::tempdir().unwrap();

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/projects/1/merge_requests/7")
            .with_body(r#"{"iid": 7, "title": "x"}"#)
            .create_async()
            .await;

        let out = tempfile::tempdir().unwrap();
        let client = GitLabClient::new(&server.url(), Token::from("t")).unwrap();
        let err = save_mr_details(
            &client,
            &Git::new(not_a_repo.path(), "origin"),
            1,
            7,
            &out.path().join("details.md"),
            &out.path().join("changes.diff"),
        )
        .await
        .unwrap_err();

        assert!(err
            .to_string()
            .starts_with("Current directory is not inside a Git repository."));
    }
}
