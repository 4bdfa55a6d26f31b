//! ghws core - workspace reconciliation for a hosting account's repositories
//!
//! This crate holds everything that does not talk to the hosting API:
//! configuration, the access credential, git operations, the workspace
//! reconciler, uploads and the action log.

pub mod action_log;
pub mod config;
pub mod credential;
pub mod error;
pub mod git;
pub mod upload;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use action_log::ActionLog;
pub use config::{Config, IdentityConfig, DEFAULT_COMMIT_MESSAGE, UPLOAD_COMMIT_MESSAGE};
pub use credential::{Credential, SecretsFile};
pub use error::{Error, Result};
pub use git::{GitCli, LocalOps, LocalRepository};
pub use upload::{upload, UploadReport, UploadSource};
pub use workspace::{
    plan, Action, Plan, Policy, Reconciler, RepoOutcome, WorkItem, Workspace, WorkspaceCommand,
};
