//! Workspace root: one working copy per remote repository

mod dispatch;
mod reconcile;

pub use dispatch::{plan, Plan, WorkspaceCommand};
pub use reconcile::{Action, Policy, Reconciler, RepoOutcome, WorkItem};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::git::LocalRepository;
use crate::{Error, Result};

/// The directory tree that mirrors the remote account
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a remote repository named `name` is mirrored into
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create the root directory if needed
    pub fn ensure(&self) -> Result<()> {
        if self.root.exists() && !self.root.is_dir() {
            return Err(Error::Config(format!(
                "Workspace root {} exists but is not a directory",
                self.root.display()
            )));
        }
        fs::create_dir_all(&self.root).map_err(Error::Io)
    }

    /// Names of the subdirectories that are repositories, sorted
    pub fn repository_names(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(Error::Config(format!(
                "Workspace missing: {}",
                self.root.display()
            )));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() && LocalRepository::is_repository(&path) {
                names.push(entry.file_name().to_string_lossy().to_string());
            } else {
                debug!(path = %path.display(), "Skipping non-repository entry");
            }
        }
        names.sort();
        Ok(names)
    }

    /// Inspect every repository in the workspace
    ///
    /// Repositories libgit2 cannot open are skipped with a warning.
    pub fn repositories(&self) -> Result<Vec<LocalRepository>> {
        let mut repos = Vec::new();
        for name in self.repository_names()? {
            match LocalRepository::inspect(self.path_for(&name)) {
                Ok(repo) => repos.push(repo),
                Err(e) => warn!(repo = %name, error = %e, "Failed to inspect repository"),
            }
        }
        Ok(repos)
    }

    /// Work items for every repository already in the workspace
    pub fn local_items(&self) -> Result<Vec<WorkItem>> {
        Ok(self
            .repository_names()?
            .into_iter()
            .map(WorkItem::local)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_is_config_error() {
        let ws = Workspace::new("/definitely/not/here");
        assert!(matches!(ws.repository_names(), Err(Error::Config(_))));
    }

    #[test]
    fn test_lists_only_repositories_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta", "alpha"] {
            git2::Repository::init(dir.path().join(name)).unwrap();
        }
        fs::create_dir_all(dir.path().join("notes")).unwrap();
        fs::write(dir.path().join("README"), "x").unwrap();

        let ws = Workspace::new(dir.path());
        assert_eq!(ws.repository_names().unwrap(), vec!["alpha", "zeta"]);

        let repos = ws.repositories().unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "alpha");
        assert_eq!(
            ws.local_items().unwrap(),
            vec![WorkItem::local("alpha"), WorkItem::local("zeta")]
        );
    }

    #[test]
    fn test_ensure_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path().join("nested").join("ws"));
        ws.ensure().unwrap();
        assert!(ws.root().is_dir());
    }

    #[test]
    fn test_ensure_rejects_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "x").unwrap();
        assert!(Workspace::new(&file).ensure().is_err());
    }
}
