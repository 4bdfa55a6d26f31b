//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error that fits no narrower kind
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Repository does not exist (or is not visible to the token)
    #[error("Repository {0} not found")]
    NotFound(String),

    /// A repository with that name already exists for the owner
    #[error("Repository name {0} already exists")]
    DuplicateName(String),

    /// The request was rejected as invalid, locally or by the API
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// How an API rejection should be reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Rejection {
    NotFound,
    Duplicate,
    Auth,
    Invalid(String),
}

/// Classify a GitHub error response from its message and field errors
pub(crate) fn classify(message: &str, details: &str) -> Option<Rejection> {
    if message.contains("Not Found") {
        return Some(Rejection::NotFound);
    }
    if message.contains("already exists") || details.contains("already exists") {
        return Some(Rejection::Duplicate);
    }
    if message.contains("Bad credentials") {
        return Some(Rejection::Auth);
    }
    if message.contains("Validation Failed") || message.contains("failed") || !details.is_empty() {
        let detail = if details.is_empty() {
            message.to_string()
        } else {
            format!("{} ({})", message, details)
        };
        return Some(Rejection::Invalid(detail));
    }
    None
}

/// Map an octocrab error for an operation on `subject` to a typed error
pub(crate) fn map_api_error(err: octocrab::Error, subject: &str) -> Error {
    let rejection = match &err {
        octocrab::Error::GitHub { source, .. } => {
            let details = source
                .errors
                .as_ref()
                .map(|errors| {
                    errors
                        .iter()
                        .map(|e| e.to_string())
                        .collect::<Vec<_>>()
                        .join("; ")
                })
                .unwrap_or_default();
            classify(&source.message, &details)
        }
        _ => None,
    };

    match rejection {
        Some(Rejection::NotFound) => Error::NotFound(subject.to_string()),
        Some(Rejection::Duplicate) => Error::DuplicateName(subject.to_string()),
        Some(Rejection::Auth) => Error::Auth("Invalid GitHub token".to_string()),
        Some(Rejection::Invalid(detail)) => Error::Validation(detail),
        None => Error::Api(err),
    }
}
