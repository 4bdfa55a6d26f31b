//! ghws GitHub - repository management on GitHub for ghws
//!
//! This crate is the only caller of the GitHub REST API: listing, creating,
//! renaming, re-configuring and deleting the authenticated user's
//! repositories.

mod client;
mod error;
mod repos;

pub use client::GitHubClient;
pub use error::{Error, Result};
pub use repos::{validate_repo_name, RemoteRepository, RepoPages, Visibility};
