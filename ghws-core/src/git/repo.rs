//! Read-only inspection of local repositories with libgit2

use std::path::{Path, PathBuf};

use git2::Repository;

use super::local::ORIGIN;
use super::url::{is_plain_https, redact};
use crate::{Error, Result};

/// A working copy under the workspace root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepository {
    /// Directory name, which matches the remote repository name
    pub name: String,
    /// Path to the repository root
    pub path: PathBuf,
    /// Origin URL as configured (may embed the credential)
    pub remote_origin_url: Option<String>,
    /// Checked-out branch; `None` for a detached HEAD
    pub current_branch: Option<String>,
}

impl LocalRepository {
    /// Whether `path` holds repository metadata of its own
    pub fn is_repository(path: &Path) -> bool {
        path.join(".git").exists()
    }

    /// Open and inspect the repository rooted at `path`
    pub fn inspect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Config(format!("Not a git repository: {}", path.display()))
            } else {
                Error::Other(format!("Git error in {}: {}", path.display(), e))
            }
        })?;

        let remote_origin_url = match repo.find_remote(ORIGIN) {
            Ok(remote) => remote.url().map(str::to_string),
            Err(e) if e.code() == git2::ErrorCode::NotFound => None,
            Err(e) => {
                return Err(Error::Other(format!(
                    "Failed to read origin of {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            name,
            path: path.to_path_buf(),
            remote_origin_url,
            current_branch: current_branch(&repo)?,
        })
    }

    /// Origin URL safe for display
    pub fn display_origin(&self) -> String {
        self.remote_origin_url
            .as_deref()
            .map(redact)
            .unwrap_or_else(|| "(no origin)".to_string())
    }

    /// Whether the origin still needs the credential embedded
    pub fn needs_credential(&self) -> bool {
        self.remote_origin_url.as_deref().is_some_and(is_plain_https)
    }
}

/// Branch HEAD points at, including an unborn branch in an empty repository
fn current_branch(repo: &Repository) -> Result<Option<String>> {
    let head = match repo.head() {
        Ok(h) => h,
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
            // HEAD is a symbolic ref to a branch with no commits yet
            let head_ref = repo
                .find_reference("HEAD")
                .map_err(|e| Error::Other(format!("Failed to read HEAD: {}", e)))?;
            return Ok(head_ref
                .symbolic_target()
                .and_then(|t| t.strip_prefix("refs/heads/"))
                .map(str::to_string));
        }
        Err(e) => return Err(Error::Other(format!("Failed to get HEAD: {}", e))),
    };

    if head.is_branch() {
        Ok(head.shorthand().map(|s| s.to_string()))
    } else {
        // Detached HEAD
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_non_git_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!LocalRepository::is_repository(dir.path()));
        assert!(LocalRepository::inspect(dir.path()).is_err());
    }

    #[test]
    fn test_inspect_fresh_repository() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo");
        let repo = Repository::init(&path).unwrap();
        repo.remote(ORIGIN, "https://github.com/me/demo.git").unwrap();

        let local = LocalRepository::inspect(&path).unwrap();
        assert_eq!(local.name, "demo");
        assert!(local.current_branch.is_some());
        assert!(local.needs_credential());
        assert_eq!(local.display_origin(), "https://github.com/me/demo.git");
    }

    #[test]
    fn test_embedded_origin_is_redacted() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        repo.remote(ORIGIN, "https://tok@github.com/me/demo.git").unwrap();

        let local = LocalRepository::inspect(dir.path()).unwrap();
        assert!(!local.needs_credential());
        assert!(!local.display_origin().contains("tok"));
    }
}
