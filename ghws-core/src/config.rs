//! Configuration management for ghws
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (GHWS_*)
//! 3. Config file (~/.config/ghws/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default commit message for batch push/sync
pub const DEFAULT_COMMIT_MESSAGE: &str = "Auto sync via ghws";

/// Commit message used when uploading a local file or folder
pub const UPLOAD_COMMIT_MESSAGE: &str = "Upload via ghws";

/// Workspace-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory holding one clone per remote repository
    pub root: PathBuf,

    /// Commit message used by push and sync when none is given
    pub commit_message: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: dirs::home_dir()
                .map(|home| home.join("ghws"))
                .unwrap_or_else(|| PathBuf::from("ghws")),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}

/// Local commit identity applied when git has none configured
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub name: String,
    pub email: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: "ghws Bot".to_string(),
            email: "ghws@localhost".to_string(),
        }
    }
}

/// Action log configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Path of the append-only action log (None = default data dir location)
    pub actions: Option<PathBuf>,
}

/// Git executable configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitConfig {
    /// Path to the git executable
    pub binary: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub identity: IdentityConfig,
    pub log: LogConfig,
    pub git: GitConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config {}: {}", path.display(), e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/ghws/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ghws").join("config.toml"))
    }

    /// Path of the action log, falling back to `~/.local/share/ghws/actions.log`
    pub fn action_log_path(&self) -> Option<PathBuf> {
        self.log
            .actions
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("ghws").join("actions.log")))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - GHWS_WORKSPACE: workspace root
    /// - GHWS_COMMIT_MESSAGE: default commit message
    /// - GHWS_GIT: git executable
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(root) = std::env::var("GHWS_WORKSPACE") {
            if !root.trim().is_empty() {
                self.workspace.root = PathBuf::from(root);
            }
        }

        if let Ok(message) = std::env::var("GHWS_COMMIT_MESSAGE") {
            if !message.trim().is_empty() {
                self.workspace.commit_message = message;
            }
        }

        if let Ok(binary) = std::env::var("GHWS_GIT") {
            if !binary.trim().is_empty() {
                self.git.binary = binary;
            }
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, workspace: Option<PathBuf>) -> Self {
        if let Some(root) = workspace {
            self.workspace.root = root;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(workspace: Option<PathBuf>) -> Result<Self> {
        let config = Self::load()?
            .with_env_overrides()
            .with_cli_overrides(workspace);
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the workspace operations cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.workspace.root.as_os_str().is_empty() {
            return Err(Error::Config("Workspace root is empty".to_string()));
        }
        if self.workspace.commit_message.trim().is_empty() {
            return Err(Error::Config("Default commit message is empty".to_string()));
        }
        if self.identity.name.trim().is_empty() || self.identity.email.trim().is_empty() {
            return Err(Error::Config(
                "Identity name and email must both be set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.workspace.commit_message, DEFAULT_COMMIT_MESSAGE);
        assert_eq!(config.git.binary, "git");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(Some(PathBuf::from("/srv/mirror")));
        assert_eq!(config.workspace.root, PathBuf::from("/srv/mirror"));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[workspace]
root = "/home/me/repos"
commit_message = "nightly"

[identity]
name = "Mirror Bot"
email = "bot@example.com"

[log]
actions = "/var/log/ghws.log"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.workspace.root, PathBuf::from("/home/me/repos"));
        assert_eq!(config.workspace.commit_message, "nightly");
        assert_eq!(config.identity.name, "Mirror Bot");
        assert_eq!(
            config.action_log_path(),
            Some(PathBuf::from("/var/log/ghws.log"))
        );
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[identity]
email = "me@example.com"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // name should use default
        assert_eq!(config.identity.name, "ghws Bot");
        assert_eq!(config.identity.email, "me@example.com");
        assert_eq!(config.workspace.commit_message, DEFAULT_COMMIT_MESSAGE);
    }

    #[test]
    fn test_validate_rejects_blank_message() {
        let mut config = Config::default();
        config.workspace.commit_message = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
