//! Error types for ghws

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for ghws operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ghws operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid configuration (credential, workspace, config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// `git init` or the identity override failed
    #[error("Init failed for {path}: {message}")]
    Init { path: PathBuf, message: String },

    /// `git clone` failed or the destination was unusable
    #[error("Clone failed for {path}: {message}")]
    Clone { path: PathBuf, message: String },

    /// Reading or rewriting the origin remote failed
    #[error("Remote update failed for {path}: {message}")]
    Remote { path: PathBuf, message: String },

    /// `git pull` failed (conflict, network, missing upstream)
    #[error("Pull failed for {path}: {message}")]
    Pull { path: PathBuf, message: String },

    /// Staging or committing failed for a reason other than a clean tree
    #[error("Commit failed for {path}: {message}")]
    Commit { path: PathBuf, message: String },

    /// `git push` was rejected or could not reach the remote
    #[error("Push failed for {path}: {message}")]
    Push { path: PathBuf, message: String },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Short label for the failing step, used in reports and the action log
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Config(_) => "config",
            Error::Init { .. } => "init",
            Error::Clone { .. } => "clone",
            Error::Remote { .. } => "remote",
            Error::Pull { .. } => "pull",
            Error::Commit { .. } => "commit",
            Error::Push { .. } => "push",
            Error::Other(_) => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path() {
        let err = Error::Pull {
            path: PathBuf::from("/ws/demo"),
            message: "CONFLICT (content)".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("/ws/demo"));
        assert!(rendered.contains("CONFLICT"));
        assert_eq!(err.kind(), "pull");
    }
}
