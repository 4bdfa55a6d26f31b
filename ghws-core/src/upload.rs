//! Upload a local file or folder to a remote repository

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::info;

use crate::git::LocalOps;
use crate::{Error, Result};

/// Directory that gets pushed
///
/// A folder is used in place. A single file is copied into a temporary
/// directory that is removed when this value is dropped.
#[derive(Debug)]
pub struct UploadSource {
    repo_path: PathBuf,
    staging: Option<TempDir>,
}

impl UploadSource {
    pub fn prepare(source: &Path) -> Result<Self> {
        let source = source.canonicalize().map_err(|e| {
            Error::Config(format!("Local path not found: {} ({})", source.display(), e))
        })?;

        if source.is_dir() {
            return Ok(Self {
                repo_path: source,
                staging: None,
            });
        }

        let file_name = source
            .file_name()
            .ok_or_else(|| Error::Config(format!("Not a file: {}", source.display())))?;
        let staging = tempfile::Builder::new()
            .prefix("ghws-upload-")
            .tempdir()
            .map_err(Error::Io)?;
        fs::copy(&source, staging.path().join(file_name)).map_err(Error::Io)?;
        info!(file = %source.display(), staging = %staging.path().display(), "Staged file for upload");

        Ok(Self {
            repo_path: staging.path().to_path_buf(),
            staging: Some(staging),
        })
    }

    pub fn path(&self) -> &Path {
        &self.repo_path
    }

    /// Whether the content was copied into a temporary directory
    pub fn is_staged(&self) -> bool {
        self.staging.is_some()
    }
}

/// What an upload did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub source: PathBuf,
    pub branch: String,
    /// False when the content was already committed
    pub committed: bool,
    /// True when a single file was pushed from a temporary copy
    pub staged: bool,
}

/// Push the content at `source` to `clone_url` on `branch`
///
/// Initializes the directory if needed, replaces its origin, commits any
/// pending changes and force-resets `branch` to the current commit before
/// pushing.
pub fn upload<O: LocalOps>(
    ops: &O,
    source: &Path,
    clone_url: &str,
    branch: &str,
    message: &str,
) -> Result<UploadReport> {
    if branch.trim().is_empty() {
        return Err(Error::Config("Branch name is empty".to_string()));
    }

    let prepared = UploadSource::prepare(source)?;
    let path = prepared.path();

    ops.init(path)?;
    ops.set_origin(path, clone_url)?;
    let committed = ops.commit_if_dirty(path, message)?;
    ops.checkout_branch(path, branch)?;
    ops.push(path, branch)?;

    info!(source = %source.display(), branch, committed, "Uploaded");

    Ok(UploadReport {
        source: source.to_path_buf(),
        branch: branch.to_string(),
        committed,
        staged: prepared.is_staged(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubOps;

    #[test]
    fn test_missing_source() {
        let err = UploadSource::prepare(Path::new("/no/such/path")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_file_is_staged_in_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "hello").unwrap();

        let prepared = UploadSource::prepare(&file).unwrap();
        assert!(prepared.is_staged());
        let staged = prepared.path().join("notes.txt");
        assert_eq!(fs::read_to_string(&staged).unwrap(), "hello");

        let staging = prepared.path().to_path_buf();
        drop(prepared);
        assert!(!staging.exists());
        assert!(file.exists());
    }

    #[test]
    fn test_folder_used_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let prepared = UploadSource::prepare(dir.path()).unwrap();
        assert!(!prepared.is_staged());
        assert_eq!(prepared.path(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_upload_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("project");
        fs::create_dir_all(&project).unwrap();
        let ops = StubOps {
            dirty: ["project".to_string()].into_iter().collect(),
            ..Default::default()
        };

        let report = upload(
            &ops,
            &project,
            "https://github.com/me/project.git",
            "main",
            "Upload",
        )
        .unwrap();

        assert!(report.committed);
        assert!(!report.staged);
        assert_eq!(
            ops.calls_for("project"),
            vec!["init", "set_origin", "commit_if_dirty", "commit:Upload", "checkout", "push", "branch:main"]
        );
        assert_eq!(
            ops.origins.borrow()["project"],
            "https://tok@github.com/me/project.git"
        );
    }

    #[test]
    fn test_upload_single_file_reports_staging() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "hello").unwrap();
        let ops = StubOps::default();

        let report = upload(&ops, &file, "https://github.com/me/notes.git", "main", "Upload").unwrap();

        assert!(report.staged);
        assert_eq!(report.source, file);
        assert_eq!(ops.count("init"), 1);
        assert_eq!(ops.count("push"), 1);
    }

    #[test]
    fn test_upload_rejects_blank_branch() {
        let dir = tempfile::tempdir().unwrap();
        let ops = StubOps::default();
        let err = upload(&ops, dir.path(), "https://github.com/me/x.git", " ", "m").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(ops.calls.borrow().is_empty());
    }
}
