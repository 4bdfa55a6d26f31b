//! Test doubles shared by the unit tests of this crate

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::git::url::embed_token;
use crate::git::LocalOps;
use crate::{Error, Result};

/// In-memory `LocalOps` that records calls and fails on demand
#[derive(Default)]
pub struct StubOps {
    pub calls: RefCell<Vec<String>>,
    pub fail_clone: HashSet<String>,
    pub fail_pull: HashSet<String>,
    pub dirty: HashSet<String>,
    /// origin URLs by repository directory name
    pub origins: RefCell<HashMap<String, String>>,
}

fn key(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

impl StubOps {
    pub fn record(&self, op: &str, path: &Path) {
        self.calls.borrow_mut().push(format!("{} {}", op, key(path)));
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .count()
    }

    pub fn calls_for(&self, name: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.ends_with(&format!(" {}", name)))
            .map(|c| c.split(' ').next().unwrap().to_string())
            .collect()
    }
}

impl LocalOps for StubOps {
    fn init(&self, path: &Path) -> Result<()> {
        self.record("init", path);
        fs::create_dir_all(path.join(".git"))?;
        Ok(())
    }

    fn clone_repo(&self, url: &str, destination: &Path) -> Result<()> {
        assert!(
            !destination.exists(),
            "clone called on existing path {}",
            destination.display()
        );
        self.record("clone", destination);
        if self.fail_clone.contains(&key(destination)) {
            return Err(Error::Clone {
                path: destination.to_path_buf(),
                message: "fatal: repository not found".to_string(),
            });
        }
        fs::create_dir_all(destination.join(".git"))?;
        self.origins.borrow_mut().insert(key(destination), url.to_string());
        Ok(())
    }

    fn embed_credential(&self, path: &Path) -> Result<bool> {
        self.record("embed", path);
        let mut origins = self.origins.borrow_mut();
        let origin = origins.entry(key(path)).or_insert_with(|| {
            format!("https://github.com/me/{}.git", key(path))
        });
        let embedded = embed_token(origin, "tok");
        let changed = embedded != *origin;
        *origin = embedded;
        Ok(changed)
    }

    fn pull(&self, path: &Path) -> Result<()> {
        self.record("pull", path);
        if self.fail_pull.contains(&key(path)) {
            return Err(Error::Pull {
                path: path.to_path_buf(),
                message: "CONFLICT (content): Merge conflict in README.md".to_string(),
            });
        }
        Ok(())
    }

    fn commit_if_dirty(&self, path: &Path, message: &str) -> Result<bool> {
        self.record("commit_if_dirty", path);
        if self.dirty.contains(&key(path)) {
            self.calls
                .borrow_mut()
                .push(format!("commit:{} {}", message, key(path)));
            return Ok(true);
        }
        Ok(false)
    }

    fn push(&self, path: &Path, branch: &str) -> Result<()> {
        self.record("push", path);
        self.calls.borrow_mut().push(format!("branch:{} {}", branch, key(path)));
        Ok(())
    }

    fn current_branch(&self, _path: &Path) -> Result<String> {
        Ok("main".to_string())
    }

    fn set_origin(&self, path: &Path, url: &str) -> Result<()> {
        self.record("set_origin", path);
        self.origins
            .borrow_mut()
            .insert(key(path), embed_token(url, "tok"));
        Ok(())
    }

    fn checkout_branch(&self, path: &Path, _branch: &str) -> Result<()> {
        self.record("checkout", path);
        Ok(())
    }
}
