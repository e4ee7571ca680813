//! Git operation tools.
//!
//! Thin wrappers over the `git` command line. A commit against a clean
//! tree is reported as informational success, not a failure: the model
//! should read "nothing to commit" and move on rather than retry.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;

use super::Tool;

pub(super) fn tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(GitCommand),
        Arc::new(GitAdd),
        Arc::new(GitCommit),
        Arc::new(GitPush),
        Arc::new(GitStatus),
        Arc::new(GitWorkflow),
    ]
}

const NOTHING_TO_COMMIT: &str = "Nothing to commit - working tree clean";

/// Run a git command and return its stdout.
async fn run_git(args: &[&str], workspace: &Path) -> anyhow::Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(workspace)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| anyhow::anyhow!("failed to run git: {}", e))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        if stderr.is_empty() {
            return Err(anyhow::anyhow!("git command failed: {}", stdout.trim()));
        }
        return Err(anyhow::anyhow!("git error: {}", stderr.trim()));
    }

    Ok(stdout.to_string())
}

/// Commit staged changes, treating a clean tree as informational success.
async fn commit_staged(message: &str, workspace: &Path) -> anyhow::Result<Option<String>> {
    match run_git(&["commit", "-m", message], workspace).await {
        Ok(output) => Ok(Some(output.trim().to_string())),
        Err(e) if format!("{:#}", e).contains("nothing to commit") => Ok(None),
        Err(e) => Err(e),
    }
}

/// Execute an arbitrary git subcommand.
pub struct GitCommand;

#[derive(Deserialize)]
struct GitCommandArgs {
    command: String,
}

#[async_trait]
impl Tool for GitCommand {
    fn name(&self) -> &str {
        "git_command"
    }

    fn description(&self) -> &str {
        "Execute any git subcommand (e.g. \"log --oneline -5\", \"branch -a\"). Input: { command } (without the leading `git`)."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: GitCommandArgs =
            serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for git_command: {}", e))?;
        let result = super::terminal::run_shell(&format!("git {}", args.command), workspace, 60).await?;
        Ok(format!("Git command result:\n{}", result))
    }
}

/// Stage all changes.
pub struct GitAdd;

#[async_trait]
impl Tool for GitAdd {
    fn name(&self) -> &str {
        "git_add"
    }

    fn description(&self) -> &str {
        "Stage all changes for commit (git add .). Input: {}."
    }

    async fn execute(&self, _args: Value, workspace: &Path) -> anyhow::Result<String> {
        run_git(&["add", "."], workspace).await?;
        Ok("All changes staged for commit".to_string())
    }
}

/// Commit staged changes with a message.
pub struct GitCommit;

#[derive(Deserialize)]
struct GitCommitArgs {
    message: String,
}

#[async_trait]
impl Tool for GitCommit {
    fn name(&self) -> &str {
        "git_commit"
    }

    fn description(&self) -> &str {
        "Commit staged changes with the given message. Input: { message }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: GitCommitArgs =
            serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for git_commit: {}", e))?;
        match commit_staged(&args.message, workspace).await? {
            Some(_) => Ok(format!("Committed: {}", args.message)),
            None => Ok(NOTHING_TO_COMMIT.to_string()),
        }
    }
}

/// Push commits to the remote.
pub struct GitPush;

#[derive(Deserialize)]
struct GitPushArgs {
    #[serde(default = "default_branch")]
    branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

#[async_trait]
impl Tool for GitPush {
    fn name(&self) -> &str {
        "git_push"
    }

    fn description(&self) -> &str {
        "Push commits to origin. Input: { branch? } (defaults to main)."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: GitPushArgs =
            serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for git_push: {}", e))?;
        run_git(&["push", "origin", &args.branch], workspace).await?;
        Ok(format!("Successfully pushed to origin/{}", args.branch))
    }
}

/// Report repository status.
pub struct GitStatus;

#[async_trait]
impl Tool for GitStatus {
    fn name(&self) -> &str {
        "git_status"
    }

    fn description(&self) -> &str {
        "Show the repository status: modified, staged, and untracked files. Input: {}."
    }

    async fn execute(&self, _args: Value, workspace: &Path) -> anyhow::Result<String> {
        let porcelain = run_git(&["status", "--porcelain"], workspace).await?;
        if porcelain.trim().is_empty() {
            return Ok("Working tree clean - no changes to commit".to_string());
        }
        let full = run_git(&["status"], workspace).await?;
        Ok(format!("Repository status:\n{}", full))
    }
}

/// Stage, commit, and push in one operation.
pub struct GitWorkflow;

#[derive(Deserialize)]
struct GitWorkflowArgs {
    message: String,
    #[serde(default = "default_branch")]
    branch: String,
}

#[async_trait]
impl Tool for GitWorkflow {
    fn name(&self) -> &str {
        "git_workflow"
    }

    fn description(&self) -> &str {
        "Complete workflow: stage all changes, commit, and push to origin. Input: { message, branch? } (branch defaults to main)."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: GitWorkflowArgs =
            serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for git_workflow: {}", e))?;

        run_git(&["add", "."], workspace).await?;

        let Some(_) = commit_staged(&args.message, workspace).await? else {
            return Ok(NOTHING_TO_COMMIT.to_string());
        };

        run_git(&["push", "origin", &args.branch], workspace).await?;

        Ok(format!(
            "Workflow complete:\n  staged all changes\n  committed: {}\n  pushed to origin/{}",
            args.message, args.branch
        ))
    }
}
