//! Git operations for ghws
//!
//! Mutating operations shell out to the `git` executable through
//! [`LocalOps`]; read-only inspection of workspace repositories uses libgit2.

mod local;
mod repo;
mod runner;
pub mod url;

pub use local::{GitCli, LocalOps, ORIGIN};
pub use repo::LocalRepository;
pub use runner::{failure_detail, CommandRunner, ProcessRunner};
