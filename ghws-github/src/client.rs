//! GitHub API client using octocrab

use crate::{Error, Result};
use ghws_core::Credential;
use octocrab::Octocrab;
use tracing::{debug, info};

/// GitHub API client bound to the token's user
pub struct GitHubClient {
    client: Octocrab,
    login: String,
}

impl GitHubClient {
    /// Build a client for `credential` and look up the user it belongs to
    pub async fn connect(credential: &Credential) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(credential.expose().to_string())
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        debug!("Fetching authenticated user");

        let user = client.current().user().await.map_err(|e| match e {
            octocrab::Error::GitHub { ref source, .. } if source.message.contains("Bad credentials") => {
                Error::Auth("Invalid GitHub token".to_string())
            }
            other => Error::Api(other),
        })?;

        info!(login = %user.login, "Authenticated with GitHub");

        Ok(Self {
            client,
            login: user.login,
        })
    }

    /// Login of the authenticated user
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}
