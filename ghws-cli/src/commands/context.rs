//! Shared state for commands that touch the remote or the workspace

use ghws_core::{ActionLog, Config, Credential, GitCli, RepoOutcome, Workspace};
use ghws_github::GitHubClient;

/// Resolved configuration plus the credential every remote-facing command needs
pub struct Context {
    pub config: Config,
    pub credential: Credential,
    log: Option<ActionLog>,
}

impl Context {
    /// Resolve the credential; fails when no token is configured
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let credential = Credential::resolve()?;
        let log = config.action_log_path().map(ActionLog::new);
        Ok(Self {
            config,
            credential,
            log,
        })
    }

    pub fn git(&self) -> GitCli {
        GitCli::new(
            self.config.git.binary.clone(),
            self.credential.clone(),
            self.config.identity.clone(),
        )
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.config.workspace.root.clone())
    }

    pub async fn github(&self) -> anyhow::Result<GitHubClient> {
        Ok(GitHubClient::connect(&self.credential).await?)
    }

    /// Append to the action log; a log write failure is only warned about
    pub fn record(&self, message: &str) {
        if let Some(log) = &self.log {
            if let Err(e) = log.record(message) {
                tracing::warn!(path = %log.path().display(), error = %e, "Failed to write action log");
            }
        }
    }

    /// Print and log reconciliation outcomes; returns how many failed
    pub fn report(&self, outcomes: &[RepoOutcome]) -> usize {
        let mut failed = 0;
        for outcome in outcomes {
            let marker = if outcome.is_success() {
                "ok"
            } else {
                failed += 1;
                "FAILED"
            };
            println!("  {:<30} {:<6} {}", outcome.name, marker, outcome.summary());

            if let Some(log) = &self.log {
                if let Err(e) = log.record_outcome(outcome) {
                    tracing::warn!(error = %e, "Failed to write action log");
                }
            }
        }
        failed
    }
}
