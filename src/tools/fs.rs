//! File operation tools.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::Tool;

pub(super) fn tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(WriteFile),
        Arc::new(ReadFile),
        Arc::new(ListDirectory),
        Arc::new(DeleteFile),
        Arc::new(CreateDirectory),
        Arc::new(FileInfo),
    ]
}

/// Resolve a tool-supplied path against the workspace to an absolute form.
fn resolve(workspace: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        workspace.join(candidate)
    }
}

/// Create or overwrite a file, creating parent directories on demand.
pub struct WriteFile;

#[derive(Deserialize)]
struct WriteFileArgs {
    filepath: String,
    content: String,
}

#[async_trait]
impl Tool for WriteFile {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Create or update a file with the given content. Parent directories are created automatically. Input: { filepath, content }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: WriteFileArgs =
            serde_json::from_value(args).context("invalid arguments for write_file")?;
        let full_path = resolve(workspace, &args.filepath);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&full_path, args.content.as_bytes())
            .await
            .with_context(|| format!("failed to write {}", full_path.display()))?;

        Ok(format!("File written successfully to {}", full_path.display()))
    }
}

/// Read a file as UTF-8 text.
pub struct ReadFile;

#[derive(Deserialize)]
struct ReadFileArgs {
    filepath: String,
}

#[async_trait]
impl Tool for ReadFile {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a text file. Input: { filepath }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: ReadFileArgs =
            serde_json::from_value(args).context("invalid arguments for read_file")?;
        let full_path = resolve(workspace, &args.filepath);

        let content = tokio::fs::read_to_string(&full_path)
            .await
            .with_context(|| format!("could not read {}", full_path.display()))?;

        Ok(format!("Content of {}:\n\n{}", args.filepath, content))
    }
}

/// List a directory's entries.
pub struct ListDirectory;

#[derive(Deserialize)]
struct ListDirectoryArgs {
    #[serde(default = "default_dirpath")]
    dirpath: String,
}

fn default_dirpath() -> String {
    ".".to_string()
}

#[async_trait]
impl Tool for ListDirectory {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List the entries of a directory, marking which are files and which are directories. Input: { dirpath? } (defaults to the workspace root)."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: ListDirectoryArgs =
            serde_json::from_value(args).context("invalid arguments for list_directory")?;
        let full_path = resolve(workspace, &args.dirpath);

        let mut entries = tokio::fs::read_dir(&full_path)
            .await
            .with_context(|| format!("could not list {}", full_path.display()))?;

        let mut lines = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let kind = if entry.file_type().await?.is_dir() {
                "dir "
            } else {
                "file"
            };
            lines.push(format!("[{}] {}", kind, entry.file_name().to_string_lossy()));
        }
        lines.sort();

        if lines.is_empty() {
            Ok(format!("Directory {} is empty", args.dirpath))
        } else {
            Ok(format!(
                "Directory listing for {}:\n\n{}",
                args.dirpath,
                lines.join("\n")
            ))
        }
    }
}

/// Delete a single file.
pub struct DeleteFile;

#[derive(Deserialize)]
struct DeleteFileArgs {
    filepath: String,
}

#[async_trait]
impl Tool for DeleteFile {
    fn name(&self) -> &str {
        "delete_file"
    }

    fn description(&self) -> &str {
        "Delete a file. Input: { filepath }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: DeleteFileArgs =
            serde_json::from_value(args).context("invalid arguments for delete_file")?;
        let full_path = resolve(workspace, &args.filepath);

        tokio::fs::remove_file(&full_path)
            .await
            .with_context(|| format!("failed to delete {}", full_path.display()))?;

        Ok(format!("File deleted: {}", full_path.display()))
    }
}

/// Create a directory tree.
pub struct CreateDirectory;

#[derive(Deserialize)]
struct CreateDirectoryArgs {
    dirpath: String,
}

#[async_trait]
impl Tool for CreateDirectory {
    fn name(&self) -> &str {
        "create_directory"
    }

    fn description(&self) -> &str {
        "Create a directory, including missing parents. Input: { dirpath }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: CreateDirectoryArgs =
            serde_json::from_value(args).context("invalid arguments for create_directory")?;
        let full_path = resolve(workspace, &args.dirpath);

        tokio::fs::create_dir_all(&full_path)
            .await
            .with_context(|| format!("failed to create {}", full_path.display()))?;

        Ok(format!("Directory created: {}", full_path.display()))
    }
}

/// Report a file's metadata.
pub struct FileInfo;

#[derive(Deserialize)]
struct FileInfoArgs {
    filepath: String,
}

#[async_trait]
impl Tool for FileInfo {
    fn name(&self) -> &str {
        "file_info"
    }

    fn description(&self) -> &str {
        "Get size, timestamps, and type of a file or directory. Input: { filepath }."
    }

    async fn execute(&self, args: Value, workspace: &Path) -> anyhow::Result<String> {
        let args: FileInfoArgs =
            serde_json::from_value(args).context("invalid arguments for file_info")?;
        let full_path = resolve(workspace, &args.filepath);

        let metadata = tokio::fs::metadata(&full_path)
            .await
            .with_context(|| format!("could not stat {}", full_path.display()))?;

        let modified = metadata
            .modified()
            .ok()
            .map(|time| DateTime::<Utc>::from(time).to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(format!(
            "Info for {}:\n  size: {:.2} KB\n  modified: {}\n  is_directory: {}\n  is_file: {}",
            args.filepath,
            metadata.len() as f64 / 1024.0,
            modified,
            metadata.is_dir(),
            metadata.is_file(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn write_then_read_round_trips_unicode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let content = "first line\nsecond ligne — ünïcodé ⚙️\n\ttabbed";

        let written = WriteFile
            .execute(
                json!({"filepath": "notes/report.txt", "content": content}),
                dir.path(),
            )
            .await
            .expect("write succeeds");
        assert!(written.contains("report.txt"));

        let read = ReadFile
            .execute(json!({"filepath": "notes/report.txt"}), dir.path())
            .await
            .expect("read succeeds");
        assert!(read.ends_with(content));
    }

    #[tokio::test]
    async fn write_creates_missing_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        WriteFile
            .execute(
                json!({"filepath": "a/b/c/deep.txt", "content": "x"}),
                dir.path(),
            )
            .await
            .expect("write succeeds");
        assert!(dir.path().join("a/b/c/deep.txt").is_file());
    }

    #[tokio::test]
    async fn list_directory_marks_entry_kinds() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::create_dir(dir.path().join("sub"))
            .await
            .expect("mkdir");
        tokio::fs::write(dir.path().join("plain.txt"), "x")
            .await
            .expect("write");

        let listing = ListDirectory
            .execute(json!({}), dir.path())
            .await
            .expect("list succeeds");
        assert!(listing.contains("[dir ] sub"));
        assert!(listing.contains("[file] plain.txt"));
    }

    #[tokio::test]
    async fn delete_removes_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gone.txt");
        tokio::fs::write(&path, "x").await.expect("write");

        DeleteFile
            .execute(json!({"filepath": "gone.txt"}), dir.path())
            .await
            .expect("delete succeeds");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_file_reads_are_errors_not_panics() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ReadFile
            .execute(json!({"filepath": "nope.txt"}), dir.path())
            .await
            .expect_err("missing file");
        assert!(format!("{:#}", err).contains("nope.txt"));
    }

    #[tokio::test]
    async fn invalid_arguments_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = WriteFile
            .execute(json!({"path": "wrong-field.txt"}), dir.path())
            .await
            .expect_err("bad args");
        assert!(format!("{:#}", err).contains("write_file"));
    }

    #[tokio::test]
    async fn file_info_reports_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::create_dir(dir.path().join("sub"))
            .await
            .expect("mkdir");
        let info = FileInfo
            .execute(json!({"filepath": "sub"}), dir.path())
            .await
            .expect("stat succeeds");
        assert!(info.contains("is_directory: true"));
    }
}
