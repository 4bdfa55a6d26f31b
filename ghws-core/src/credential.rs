//! Access token resolution
//!
//! `GITHUB_TOKEN` wins; otherwise the token is read from
//! `~/.config/ghws/secrets.toml`, which only its owner may read.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::git::url::embed_token;
use crate::{Error, Result};

/// Access token for the hosting service
///
/// Resolved once at startup and passed explicitly to everything that talks to
/// the remote. `Debug` and `Display` never print the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token, trimming surrounding whitespace
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(Error::Config("Access token is empty".to_string()));
        }
        Ok(Self(token))
    }

    /// Resolve the credential from the environment or the secrets file
    pub fn resolve() -> Result<Self> {
        Self::resolve_from(
            std::env::var("GITHUB_TOKEN").ok(),
            SecretsFile::default_location().as_ref(),
        )
    }

    /// Resolve from an explicit env value, falling back to `file`
    ///
    /// The file is only opened when the env value is absent or blank.
    pub fn resolve_from(env_token: Option<String>, file: Option<&SecretsFile>) -> Result<Self> {
        if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
            debug!("Using GitHub token from GITHUB_TOKEN");
            return Self::new(token);
        }

        if let Some(file) = file {
            if let Some(credential) = file.read_token()? {
                debug!(path = %file.path().display(), "Using GitHub token from secrets file");
                return Ok(credential);
            }
        }

        Err(Error::Config(
            "GitHub token not found. Set GITHUB_TOKEN or run `ghws secrets init` \
             and add the token to the secrets file"
                .to_string(),
        ))
    }

    /// The raw token, for handing to the API client
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Embed the token into a plain `https://` URL; other URLs are returned as-is
    pub fn authenticate_url(&self, url: &str) -> String {
        embed_token(url, &self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

const TEMPLATE: &str = r#"# ghws access token. Keep this file private (mode 0600).
# Create a token at https://github.com/settings/tokens with the
# `repo` and `delete_repo` scopes.

[github]
token = ""
"#;

#[derive(Debug, Default, Deserialize)]
struct SecretsToml {
    #[serde(default)]
    github: TokenTable,
}

#[derive(Debug, Default, Deserialize)]
struct TokenTable {
    token: Option<String>,
}

/// The TOML file holding the access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretsFile {
    path: PathBuf,
}

impl SecretsFile {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.config/ghws/secrets.toml`, if a config directory is known
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::at(dir.join("ghws").join("secrets.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the token, `None` when the file is missing or the token is blank
    ///
    /// A file that group or others can access is refused.
    pub fn read_token(&self) -> Result<Option<Credential>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };
        self.check_private(&file)?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(Error::Io)?;
        let parsed: SecretsToml = toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;

        match parsed.github.token.filter(|t| !t.trim().is_empty()) {
            Some(token) => Credential::new(token).map(Some),
            None => Ok(None),
        }
    }

    #[cfg(unix)]
    fn check_private(&self, file: &File) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mode = file.metadata().map_err(Error::Io)?.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            return Err(Error::Config(format!(
                "Secrets file {} has insecure permissions {:o}; run `chmod 600 {}`",
                self.path.display(),
                mode,
                self.path.display()
            )));
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn check_private(&self, _file: &File) -> Result<()> {
        Ok(())
    }

    /// Write an empty template, creating parent directories
    ///
    /// Never overwrites. On Unix the file is created with mode 0600.
    pub fn write_template(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => Error::Config(format!(
                "Secrets file already exists at {}",
                self.path.display()
            )),
            _ => Error::Io(e),
        })?;
        file.write_all(TEMPLATE.as_bytes()).map_err(Error::Io)?;

        warn!(path = %self.path.display(), "Created secrets template; add your token to it");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets_file(dir: &tempfile::TempDir, contents: &str, mode: u32) -> SecretsFile {
        let path = dir.path().join("secrets.toml");
        fs::write(&path, contents).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        }
        #[cfg(not(unix))]
        let _ = mode;
        SecretsFile::at(path)
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let absent = SecretsFile::at(dir.path().join("absent.toml"));
        assert!(matches!(Credential::resolve_from(None, Some(&absent)), Err(Error::Config(_))));
        assert!(matches!(Credential::resolve_from(None, None), Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = secrets_file(&dir, "[github]\ntoken = \"  \"\n", 0o600);
        let result = Credential::resolve_from(Some("   ".to_string()), Some(&file));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_env_token_wins_without_reading_file() {
        let dir = tempfile::tempdir().unwrap();
        // unreadable by policy, but never opened
        let file = secrets_file(&dir, "[github]\ntoken = \"ghp_file\"\n", 0o644);
        let cred = Credential::resolve_from(Some(" ghp_env ".to_string()), Some(&file)).unwrap();
        assert_eq!(cred.expose(), "ghp_env");
    }

    #[test]
    fn test_file_token_used_and_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let file = secrets_file(&dir, "[github]\ntoken = \"  ghp_file  \"\n", 0o600);
        let cred = Credential::resolve_from(None, Some(&file)).unwrap();
        assert_eq!(cred.expose(), "ghp_file");
    }

    #[test]
    fn test_debug_and_display_redact() {
        let cred = Credential::new("ghp_secret").unwrap();
        assert!(!format!("{:?}", cred).contains("ghp_secret"));
        assert!(!cred.to_string().contains("ghp_secret"));
    }

    #[test]
    fn test_authenticate_url() {
        let cred = Credential::new("tok").unwrap();
        assert_eq!(
            cred.authenticate_url("https://github.com/me/demo.git"),
            "https://tok@github.com/me/demo.git"
        );
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = secrets_file(&dir, "[github\ntoken = ", 0o600);
        assert!(matches!(file.read_token(), Err(Error::Config(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_permissions_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = secrets_file(&dir, "[github]\ntoken = \"ghp_file\"\n", 0o640);
        let err = Credential::resolve_from(None, Some(&file)).unwrap_err();
        assert!(err.to_string().contains("insecure permissions 640"), "{err}");
    }

    #[test]
    fn test_template_is_private_and_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let file = SecretsFile::at(dir.path().join("ghws").join("secrets.toml"));

        file.write_template().unwrap();
        assert_eq!(file.read_token().unwrap(), None);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(file.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        fs::write(file.path(), "[github]\ntoken = \"ghp_kept\"\n").unwrap();
        assert!(matches!(file.write_template(), Err(Error::Config(_))));
        assert_eq!(file.read_token().unwrap().unwrap().expose(), "ghp_kept");
    }
}
