//! Workspace reconciliation: bring each local repository in line with its remote
//!
//! Every repository is handled on its own. A failure is recorded in that
//! repository's [`RepoOutcome`] and the batch moves on, so a run over N
//! repositories always yields N outcomes.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::git::{LocalOps, LocalRepository};
use crate::Error;

/// What to do with each repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Clone when absent; otherwise only repair the origin credential
    Clone,
    /// Repair the origin credential, then pull
    Pull,
    /// Repair the origin credential, commit local changes, push when a commit was made
    Push,
    /// Pull, then push; a failed pull does not stop the push
    Sync,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Policy::Clone => "clone",
            Policy::Pull => "pull",
            Policy::Push => "push",
            Policy::Sync => "sync",
        };
        f.write_str(label)
    }
}

/// A repository to reconcile, addressed by its workspace directory name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Remote repository name, also the directory name under the root
    pub name: String,
    /// Clone URL; only needed by the clone policy
    pub clone_url: Option<String>,
}

impl WorkItem {
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clone_url: None,
        }
    }

    pub fn remote(name: impl Into<String>, clone_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clone_url: Some(clone_url.into()),
        }
    }
}

/// A step that completed for one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Cloned,
    AlreadyPresent,
    CredentialEmbedded,
    Pulled,
    Committed,
    Pushed { branch: String },
    NothingToCommit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Cloned => f.write_str("cloned"),
            Action::AlreadyPresent => f.write_str("already present"),
            Action::CredentialEmbedded => f.write_str("credential embedded"),
            Action::Pulled => f.write_str("pulled"),
            Action::Committed => f.write_str("committed"),
            Action::Pushed { branch } => write!(f, "pushed {}", branch),
            Action::NothingToCommit => f.write_str("nothing to commit"),
        }
    }
}

/// Record of everything that happened to one repository
#[derive(Debug)]
pub struct RepoOutcome {
    pub name: String,
    pub path: PathBuf,
    pub policy: Policy,
    pub actions: Vec<Action>,
    pub failures: Vec<Error>,
}

impl RepoOutcome {
    fn new(name: &str, path: &Path, policy: Policy) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            policy,
            actions: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn has(&self, action: &Action) -> bool {
        self.actions.contains(action)
    }

    /// One-line summary: actions, then failures
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = self.actions.iter().map(ToString::to_string).collect();
        parts.extend(self.failures.iter().map(|e| format!("{} failed: {}", e.kind(), e)));
        if parts.is_empty() {
            return "no changes".to_string();
        }
        parts.join("; ")
    }

    fn fail(&mut self, error: Error) {
        warn!(repo = %self.name, policy = %self.policy, error = %error, "Reconciliation step failed");
        self.failures.push(error);
    }
}

/// Drives [`LocalOps`] over the repositories of a workspace root
pub struct Reconciler<'a, O: LocalOps> {
    ops: &'a O,
    root: PathBuf,
    commit_message: String,
}

impl<'a, O: LocalOps> fmt::Debug for Reconciler<'a, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("root", &self.root)
            .field("commit_message", &self.commit_message)
            .finish_non_exhaustive()
    }
}

/// Directory names that would escape or alias the workspace root
fn invalid_dir_name(name: &str) -> bool {
    name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\\')
}

impl<'a, O: LocalOps> Reconciler<'a, O> {
    pub fn new(ops: &'a O, root: impl Into<PathBuf>, commit_message: impl Into<String>) -> Self {
        Self {
            ops,
            root: root.into(),
            commit_message: commit_message.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Apply `policy` to every item, in order, and return one outcome per item
    ///
    /// `message` overrides the default commit message for push and sync.
    pub fn reconcile(&self, policy: Policy, items: &[WorkItem], message: Option<&str>) -> Vec<RepoOutcome> {
        let outcomes: Vec<RepoOutcome> = items
            .iter()
            .map(|item| self.reconcile_item(policy, item, message))
            .collect();

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(
            policy = %policy,
            total = outcomes.len(),
            failed,
            "Reconciliation finished"
        );
        outcomes
    }

    /// Apply `policy` to one workspace item
    pub fn reconcile_item(&self, policy: Policy, item: &WorkItem, message: Option<&str>) -> RepoOutcome {
        let path = self.root.join(&item.name);
        if invalid_dir_name(&item.name) {
            let mut outcome = RepoOutcome::new(&item.name, &path, policy);
            outcome.fail(Error::Config(format!(
                "Repository name '{}' is not a valid directory name",
                item.name
            )));
            return outcome;
        }
        self.run(policy, &item.name, &path, item.clone_url.as_deref(), message)
    }

    /// Apply a pull/push/sync policy to a repository at an arbitrary path
    pub fn reconcile_path(&self, policy: Policy, path: &Path, message: Option<&str>) -> RepoOutcome {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        self.run(policy, &name, path, None, message)
    }

    /// Clone `item` into an arbitrary `path` instead of its directory under the root
    ///
    /// A path that already holds a repository only gets its credential
    /// repaired. Anything else is handed to the clone, which refuses a
    /// non-empty directory.
    pub fn clone_to_path(&self, item: &WorkItem, path: &Path) -> RepoOutcome {
        let mut outcome = RepoOutcome::new(&item.name, path, Policy::Clone);
        if LocalRepository::is_repository(path) {
            outcome.actions.push(Action::AlreadyPresent);
            self.embed_step(path, &mut outcome);
        } else {
            self.fresh_clone(path, item.clone_url.as_deref(), &mut outcome);
        }
        if outcome.is_success() {
            info!(repo = %outcome.name, path = %path.display(), result = %outcome.summary(), "Reconciled");
        }
        outcome
    }

    fn run(
        &self,
        policy: Policy,
        name: &str,
        path: &Path,
        clone_url: Option<&str>,
        message: Option<&str>,
    ) -> RepoOutcome {
        let mut outcome = RepoOutcome::new(name, path, policy);
        let message = message.unwrap_or(&self.commit_message);

        match policy {
            Policy::Clone => self.clone_step(path, clone_url, &mut outcome),
            Policy::Pull => {
                if self.require_dir(path, &mut outcome) {
                    self.embed_step(path, &mut outcome);
                    self.pull_step(path, &mut outcome);
                }
            }
            Policy::Push => {
                if self.require_dir(path, &mut outcome) {
                    self.embed_step(path, &mut outcome);
                    self.push_step(path, message, &mut outcome);
                }
            }
            Policy::Sync => {
                if self.require_dir(path, &mut outcome) {
                    self.embed_step(path, &mut outcome);
                    self.pull_step(path, &mut outcome);
                    // Pushes even after a failed pull; the push may then be
                    // rejected as non-fast-forward, which is reported as-is.
                    self.push_step(path, message, &mut outcome);
                }
            }
        }

        if outcome.is_success() {
            info!(repo = %outcome.name, policy = %policy, result = %outcome.summary(), "Reconciled");
        }
        outcome
    }

    fn require_dir(&self, path: &Path, outcome: &mut RepoOutcome) -> bool {
        if path.is_dir() {
            return true;
        }
        outcome.fail(Error::Config(format!(
            "{} does not exist in the workspace",
            path.display()
        )));
        false
    }

    fn clone_step(&self, path: &Path, clone_url: Option<&str>, outcome: &mut RepoOutcome) {
        if path.exists() {
            outcome.actions.push(Action::AlreadyPresent);
            self.embed_step(path, outcome);
            return;
        }
        self.fresh_clone(path, clone_url, outcome);
    }

    fn fresh_clone(&self, path: &Path, clone_url: Option<&str>, outcome: &mut RepoOutcome) {
        let Some(url) = clone_url else {
            outcome.fail(Error::Config(format!(
                "No clone URL known for {}",
                outcome.name
            )));
            return;
        };

        match self.ops.clone_repo(url, path) {
            Ok(()) => {
                outcome.actions.push(Action::Cloned);
                self.embed_step(path, outcome);
            }
            Err(e) => outcome.fail(e),
        }
    }

    fn embed_step(&self, path: &Path, outcome: &mut RepoOutcome) {
        match self.ops.embed_credential(path) {
            Ok(true) => outcome.actions.push(Action::CredentialEmbedded),
            Ok(false) => {}
            Err(e) => outcome.fail(e),
        }
    }

    fn pull_step(&self, path: &Path, outcome: &mut RepoOutcome) {
        match self.ops.pull(path) {
            Ok(()) => outcome.actions.push(Action::Pulled),
            Err(e) => outcome.fail(e),
        }
    }

    fn push_step(&self, path: &Path, message: &str, outcome: &mut RepoOutcome) {
        match self.ops.commit_if_dirty(path, message) {
            Ok(true) => outcome.actions.push(Action::Committed),
            Ok(false) => {
                outcome.actions.push(Action::NothingToCommit);
                return;
            }
            Err(e) => {
                outcome.fail(e);
                return;
            }
        }

        let branch = match self.ops.current_branch(path) {
            Ok(branch) => branch,
            Err(e) => {
                outcome.fail(e);
                return;
            }
        };

        match self.ops.push(path, &branch) {
            Ok(()) => outcome.actions.push(Action::Pushed { branch }),
            Err(e) => outcome.fail(e),
        }
    }
}
