//! Shell and system tools: command execution, file search, package
//! management, test running.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;

use super::Tool;

pub(super) fn tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ExecuteCommand),
        Arc::new(SearchInFiles),
        Arc::new(InstallPackage),
        Arc::new(RunTests),
    ]
}

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MAX_OUTPUT_CHARS: usize = 10_000;

/// Run one shell command string in the platform shell and return combined
/// stdout/stderr. On Windows, forward slashes in the command are rewritten
/// to backslashes before execution.
pub(super) async fn run_shell(
    command: &str,
    cwd: &Path,
    timeout_secs: u64,
) -> anyhow::Result<String> {
    let command = if cfg!(target_os = "windows") {
        command.replace('/', "\\")
    } else {
        command.to_string()
    };

    let (shell, shell_arg) = if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };

    tracing::info!(command = %command, "executing shell command");

    let output = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        Command::new(shell)
            .arg(shell_arg)
            .arg(&command)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output(),
    )
    .await
    .map_err(|_| anyhow::anyhow!("command timed out after {} seconds", timeout_secs))?
    .map_err(|e| anyhow::anyhow!("failed to execute command: {}", e))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let exit_code = output.status.code().unwrap_or(-1);

    let mut result = format!("Exit code: {}\n", exit_code);
    if !stdout.is_empty() {
        result.push_str("\n--- stdout ---\n");
        result.push_str(&stdout);
    }
    if !stderr.is_empty() {
        result.push_str("\n--- stderr ---\n");
        result.push_str(&stderr);
    }

    if result.len() > MAX_OUTPUT_CHARS {
        let mut end = MAX_OUTPUT_CHARS;
        while end > 0 && !result.is_char_boundary(end) {
            end -= 1;
        }
        result.truncate(end);
        result.push_str("\n... [output truncated]");
    }

    Ok(result)
}

/// Execute an arbitrary shell command in the workspace.
pub struct ExecuteCommand;

#[derive(Deserialize)]
struct ExecuteCommandArgs {
    command: String,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

#[async_trait]
impl Tool for ExecuteCommand {
    fn name(&self) -> &str {
        "execute_command"
    }

    fn description(&self) -> &str {
        "Execute a shell command in the workspace directory and return its combined stdout/stderr. Use for running builds, installing dependencies, or anything without a dedicated tool. Input: { command, timeout_secs? }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: ExecuteCommandArgs =
            serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for execute_command: {}", e))?;
        run_shell(
            &args.command,
            workspace,
            args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
        .await
    }
}

/// Search file contents for a pattern.
pub struct SearchInFiles;

#[derive(Deserialize)]
struct SearchInFilesArgs {
    pattern: String,
    #[serde(default = "default_directory")]
    directory: String,
    #[serde(default)]
    file_extension: Option<String>,
}

fn default_directory() -> String {
    ".".to_string()
}

#[async_trait]
impl Tool for SearchInFiles {
    fn name(&self) -> &str {
        "search_in_files"
    }

    fn description(&self) -> &str {
        "Search for a pattern in file contents under a directory. Returns matching lines with file paths. Input: { pattern, directory?, file_extension? }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: SearchInFilesArgs =
            serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for search_in_files: {}", e))?;
        let search_path = workspace.join(&args.directory);

        // Prefer ripgrep when available, fall back to grep.
        let mut cmd = if which_exists("rg").await {
            let mut c = Command::new("rg");
            c.arg("--line-number").arg("--no-heading").arg("--color=never").arg("-i");
            if let Some(ext) = &args.file_extension {
                c.arg("-g").arg(format!("*.{}", ext.trim_start_matches("*.")));
            }
            c.arg("--").arg(&args.pattern).arg(&search_path);
            c
        } else {
            let mut c = Command::new("grep");
            c.arg("-rni");
            if let Some(ext) = &args.file_extension {
                c.arg(format!("--include=*.{}", ext.trim_start_matches("*.")));
            }
            c.arg(&args.pattern).arg(&search_path);
            c
        };

        let output = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| anyhow::anyhow!("failed to execute search: {}", e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        // grep exits 1 when nothing matched; that is not a failure.
        if !output.status.success() && output.status.code() != Some(1) && !stderr.is_empty() {
            return Err(anyhow::anyhow!("search error: {}", stderr.trim()));
        }

        if stdout.trim().is_empty() {
            return Ok(format!("No matches found for pattern: {}", args.pattern));
        }

        let matches: Vec<&str> = stdout.lines().take(100).collect();
        let mut result = format!(
            "Search results for \"{}\":\n\n{}",
            args.pattern,
            matches.join("\n")
        );
        if stdout.lines().count() > 100 {
            result.push_str("\n\n... (showing first 100 matches)");
        }
        Ok(result)
    }
}

/// Install an npm package in the workspace.
pub struct InstallPackage;

#[derive(Deserialize)]
struct InstallPackageArgs {
    package_name: String,
    #[serde(default)]
    is_dev: bool,
}

#[async_trait]
impl Tool for InstallPackage {
    fn name(&self) -> &str {
        "install_package"
    }

    fn description(&self) -> &str {
        "Install an npm package in the workspace. Input: { package_name, is_dev? }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: InstallPackageArgs =
            serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for install_package: {}", e))?;
        let command = if args.is_dev {
            format!("npm install --save-dev {}", args.package_name)
        } else {
            format!("npm install {}", args.package_name)
        };
        let result = run_shell(&command, workspace, 300).await?;
        Ok(format!("Package installation result:\n{}", result))
    }
}

/// Run the project's test suite.
pub struct RunTests;

#[derive(Deserialize)]
struct RunTestsArgs {
    #[serde(default = "default_test_command")]
    test_command: String,
}

fn default_test_command() -> String {
    "npm test".to_string()
}

#[async_trait]
impl Tool for RunTests {
    fn name(&self) -> &str {
        "run_tests"
    }

    fn description(&self) -> &str {
        "Run a test suite and return its output. Input: { test_command? } (defaults to `npm test`)."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: RunTestsArgs =
            serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for run_tests: {}", e))?;
        let result = run_shell(&args.test_command, workspace, 600).await?;
        Ok(format!("Test results:\n{}", result))
    }
}

/// Check if a command exists in PATH.
async fn which_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = ExecuteCommand
            .execute(json!({"command": "printf hello"}), dir.path())
            .await
            .expect("command runs");
        assert!(result.contains("Exit code: 0"));
        assert!(result.contains("hello"));
    }

    #[tokio::test]
    async fn nonzero_exit_is_reported_not_raised() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = ExecuteCommand
            .execute(json!({"command": "exit 3"}), dir.path())
            .await
            .expect("command runs");
        assert!(result.contains("Exit code: 3"));
    }

    #[tokio::test]
    async fn commands_run_in_the_workspace() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(dir.path().join("marker.txt"), "x")
            .await
            .expect("write");
        let result = ExecuteCommand
            .execute(json!({"command": "ls"}), dir.path())
            .await
            .expect("command runs");
        assert!(result.contains("marker.txt"));
    }

    #[tokio::test]
    async fn timeouts_become_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ExecuteCommand
            .execute(
                json!({"command": "sleep 5", "timeout_secs": 1}),
                dir.path(),
            )
            .await
            .expect_err("must time out");
        assert!(format!("{:#}", err).contains("timed out"));
    }

    #[tokio::test]
    async fn search_reports_no_matches_cleanly() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(dir.path().join("a.txt"), "nothing here")
            .await
            .expect("write");
        let result = SearchInFiles
            .execute(json!({"pattern": "zzz_absent_zzz"}), dir.path())
            .await
            .expect("search runs");
        assert!(result.contains("No matches found"));
    }

    #[tokio::test]
    async fn search_finds_written_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(dir.path().join("a.txt"), "needle in a haystack")
            .await
            .expect("write");
        let result = SearchInFiles
            .execute(json!({"pattern": "needle"}), dir.path())
            .await
            .expect("search runs");
        assert!(result.contains("a.txt"));
    }
}
