//! Local repository operations backed by the git executable

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use tracing::{debug, info, warn};

use super::runner::{failure_detail, CommandRunner, ProcessRunner};
use super::url::{check_remote_url, is_plain_https, redact};
use crate::config::IdentityConfig;
use crate::{Credential, Error, Result};

/// Name of the remote every workspace repository pushes to and pulls from
pub const ORIGIN: &str = "origin";

/// Version-control primitives the workspace reconciler is built on
///
/// Every method reports failure through `Result`; "nothing to commit" is not a
/// failure and is reported by `commit_if_dirty` returning `false`.
pub trait LocalOps {
    /// Create repository metadata at `path` if absent and make sure commits
    /// have an author identity
    fn init(&self, path: &Path) -> Result<()>;

    /// Clone `url` into `destination`, which must be absent or empty
    fn clone_repo(&self, url: &str, destination: &Path) -> Result<()>;

    /// Rewrite a plain `https://` origin to carry the credential
    ///
    /// Returns whether the URL changed.
    fn embed_credential(&self, path: &Path) -> Result<bool>;

    /// Pull the current branch from its upstream
    fn pull(&self, path: &Path) -> Result<()>;

    /// Stage everything and commit it if anything is staged
    ///
    /// Returns `false` without committing when the tree is clean.
    fn commit_if_dirty(&self, path: &Path, message: &str) -> Result<bool>;

    /// Push `branch` to origin, setting it as upstream
    fn push(&self, path: &Path, branch: &str) -> Result<()>;

    /// Name of the checked-out branch (also for an unborn branch)
    fn current_branch(&self, path: &Path) -> Result<String>;

    /// Point origin at `url` (with the credential embedded), replacing any existing origin
    fn set_origin(&self, path: &Path, url: &str) -> Result<()>;

    /// Create or reset `branch` at the current commit and check it out
    fn checkout_branch(&self, path: &Path, branch: &str) -> Result<()>;
}

/// `LocalOps` implemented by shelling out to `git`
pub struct GitCli<R: CommandRunner = ProcessRunner> {
    runner: R,
    binary: String,
    credential: Credential,
    identity: IdentityConfig,
}

impl<R: CommandRunner> std::fmt::Debug for GitCli<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitCli")
            .field("binary", &self.binary)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl GitCli<ProcessRunner> {
    /// Create a git CLI wrapper that spawns real processes
    pub fn new(binary: impl Into<String>, credential: Credential, identity: IdentityConfig) -> Self {
        Self::with_runner(ProcessRunner, binary, credential, identity)
    }
}

type ErrorCtor = fn(PathBuf, String) -> Error;

fn init_error(path: PathBuf, message: String) -> Error {
    Error::Init { path, message }
}

fn clone_error(path: PathBuf, message: String) -> Error {
    Error::Clone { path, message }
}

fn remote_error(path: PathBuf, message: String) -> Error {
    Error::Remote { path, message }
}

fn pull_error(path: PathBuf, message: String) -> Error {
    Error::Pull { path, message }
}

fn commit_error(path: PathBuf, message: String) -> Error {
    Error::Commit { path, message }
}

fn push_error(path: PathBuf, message: String) -> Error {
    Error::Push { path, message }
}

fn os_args(items: &[&str]) -> Vec<OsString> {
    items.iter().map(OsString::from).collect()
}

impl<R: CommandRunner> GitCli<R> {
    /// Create a git CLI wrapper over an arbitrary command runner
    pub fn with_runner(
        runner: R,
        binary: impl Into<String>,
        credential: Credential,
        identity: IdentityConfig,
    ) -> Self {
        Self {
            runner,
            binary: binary.into(),
            credential,
            identity,
        }
    }

    /// Hide the token if git echoes an authenticated URL back
    fn scrub(&self, text: &str) -> String {
        text.replace(self.credential.expose(), "***")
    }

    /// Run git with `args`, optionally inside `dir` via `-C`
    fn git(&self, dir: Option<&Path>, args: Vec<OsString>) -> std::io::Result<Output> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(dir) = dir {
            full.push(OsString::from("-C"));
            full.push(dir.as_os_str().to_os_string());
        }
        full.extend(args);
        debug!(binary = %self.binary, args = ?self.scrub(&format!("{:?}", full)), "Running git");
        self.runner.run(&self.binary, &full)
    }

    /// Run git and turn spawn errors and non-zero exits into `ctor` errors
    fn checked(&self, dir: &Path, args: Vec<OsString>, ctor: ErrorCtor) -> Result<Output> {
        let output = self.git(Some(dir), args).map_err(|e| {
            ctor(
                dir.to_path_buf(),
                format!("Failed to run {}: {}", self.binary, e),
            )
        })?;
        if !output.status.success() {
            return Err(ctor(dir.to_path_buf(), self.scrub(&failure_detail(&output))));
        }
        Ok(output)
    }

    /// Effective value of a git config key, `None` when unset in every scope
    fn config_value(&self, dir: &Path, key: &str, ctor: ErrorCtor) -> Result<Option<String>> {
        let output = self
            .git(Some(dir), os_args(&["config", "--get", key]))
            .map_err(|e| ctor(dir.to_path_buf(), format!("Failed to run {}: {}", self.binary, e)))?;

        match output.status.code() {
            Some(0) => {
                let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok((!value.is_empty()).then_some(value))
            }
            // exit 1: key not set
            Some(1) => Ok(None),
            _ => Err(ctor(dir.to_path_buf(), failure_detail(&output))),
        }
    }

    /// Set a repository-local identity for whichever of name/email git cannot resolve
    ///
    /// Returns whether anything was written. Running it again is a no-op.
    pub fn ensure_identity(&self, dir: &Path) -> Result<bool> {
        self.ensure_identity_with(dir, init_error)
    }

    fn ensure_identity_with(&self, dir: &Path, ctor: ErrorCtor) -> Result<bool> {
        let mut changed = false;
        for (key, value) in [
            ("user.name", self.identity.name.as_str()),
            ("user.email", self.identity.email.as_str()),
        ] {
            if self.config_value(dir, key, ctor)?.is_none() {
                self.checked(dir, os_args(&["config", key, value]), ctor)?;
                info!(path = %dir.display(), key, value, "Set local git identity");
                changed = true;
            }
        }
        Ok(changed)
    }

    fn origin_url(&self, dir: &Path) -> Result<Option<String>> {
        let output = self
            .git(Some(dir), os_args(&["remote", "get-url", ORIGIN]))
            .map_err(|e| remote_error(dir.to_path_buf(), format!("Failed to run {}: {}", self.binary, e)))?;
        if output.status.success() {
            return Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()));
        }
        let detail = failure_detail(&output);
        if detail.contains("No such remote") {
            return Ok(None);
        }
        Err(remote_error(dir.to_path_buf(), self.scrub(&detail)))
    }
}

fn is_non_empty_dir(path: &Path) -> std::io::Result<bool> {
    if !path.is_dir() {
        return Ok(path.exists());
    }
    Ok(fs::read_dir(path)?.next().is_some())
}

impl<R: CommandRunner> LocalOps for GitCli<R> {
    fn init(&self, path: &Path) -> Result<()> {
        let git_dir = path.join(".git");
        let had_metadata = git_dir.exists();

        if !had_metadata {
            fs::create_dir_all(path).map_err(|e| init_error(path.to_path_buf(), e.to_string()))?;
            if let Err(err) = self.checked(path, os_args(&["init"]), init_error) {
                if git_dir.exists() {
                    if let Err(cleanup) = fs::remove_dir_all(&git_dir) {
                        warn!(path = %git_dir.display(), error = %cleanup, "Failed to remove partial .git");
                    }
                }
                return Err(err);
            }
            info!(path = %path.display(), "Initialized repository");
        }

        self.ensure_identity_with(path, init_error)?;
        Ok(())
    }

    fn clone_repo(&self, url: &str, destination: &Path) -> Result<()> {
        let occupied = is_non_empty_dir(destination)
            .map_err(|e| clone_error(destination.to_path_buf(), e.to_string()))?;
        if occupied {
            return Err(clone_error(
                destination.to_path_buf(),
                "destination already exists and is not an empty directory".to_string(),
            ));
        }

        let created = !destination.exists();
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| clone_error(destination.to_path_buf(), e.to_string()))?;
        }

        let authenticated = self.credential.authenticate_url(url);
        let mut args = os_args(&["clone", &authenticated]);
        args.push(destination.as_os_str().to_os_string());

        let failure = match self.git(None, args) {
            Ok(output) if output.status.success() => None,
            Ok(output) => Some(self.scrub(&failure_detail(&output))),
            Err(e) => Some(format!("Failed to run {}: {}", self.binary, e)),
        };

        if let Some(message) = failure {
            if created && destination.exists() {
                if let Err(cleanup) = fs::remove_dir_all(destination) {
                    warn!(path = %destination.display(), error = %cleanup, "Failed to remove partial clone");
                }
            }
            return Err(clone_error(destination.to_path_buf(), message));
        }

        info!(url = %redact(&authenticated), path = %destination.display(), "Cloned repository");
        self.ensure_identity_with(destination, clone_error)?;
        Ok(())
    }

    fn embed_credential(&self, path: &Path) -> Result<bool> {
        let url = self.origin_url(path)?.ok_or_else(|| {
            remote_error(path.to_path_buf(), format!("no '{}' remote configured", ORIGIN))
        })?;

        if !is_plain_https(&url) {
            debug!(path = %path.display(), url = %redact(&url), "Origin already authenticated or not https");
            return Ok(false);
        }

        let authenticated = self.credential.authenticate_url(&url);
        self.checked(
            path,
            os_args(&["remote", "set-url", ORIGIN, &authenticated]),
            remote_error,
        )?;
        info!(path = %path.display(), url = %redact(&authenticated), "Embedded credential in origin");
        Ok(true)
    }

    fn pull(&self, path: &Path) -> Result<()> {
        self.checked(path, os_args(&["pull"]), pull_error)?;
        info!(path = %path.display(), "Pulled");
        Ok(())
    }

    fn commit_if_dirty(&self, path: &Path, message: &str) -> Result<bool> {
        self.ensure_identity_with(path, commit_error)?;
        self.checked(path, os_args(&["add", "-A"]), commit_error)?;

        let staged = self
            .git(Some(path), os_args(&["diff", "--cached", "--quiet"]))
            .map_err(|e| commit_error(path.to_path_buf(), format!("Failed to run {}: {}", self.binary, e)))?;
        match staged.status.code() {
            Some(0) => {
                debug!(path = %path.display(), "Nothing to commit");
                return Ok(false);
            }
            Some(1) => {}
            _ => return Err(commit_error(path.to_path_buf(), failure_detail(&staged))),
        }

        self.checked(path, os_args(&["commit", "-m", message]), commit_error)?;
        info!(path = %path.display(), message, "Committed");
        Ok(true)
    }

    fn push(&self, path: &Path, branch: &str) -> Result<()> {
        self.checked(path, os_args(&["push", "-u", ORIGIN, branch]), push_error)?;
        info!(path = %path.display(), branch, "Pushed");
        Ok(())
    }

    fn current_branch(&self, path: &Path) -> Result<String> {
        let output = self
            .checked(path, os_args(&["symbolic-ref", "--short", "HEAD"]), push_error)
            .map_err(|e| match e {
                Error::Push { path, message } => Error::Push {
                    path,
                    message: format!("cannot determine current branch (detached HEAD?): {}", message),
                },
                other => other,
            })?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn set_origin(&self, path: &Path, url: &str) -> Result<()> {
        check_remote_url(url).map_err(Error::Config)?;

        if self.origin_url(path)?.is_some() {
            self.checked(path, os_args(&["remote", "remove", ORIGIN]), remote_error)?;
        }

        let authenticated = self.credential.authenticate_url(url);
        self.checked(
            path,
            os_args(&["remote", "add", ORIGIN, &authenticated]),
            remote_error,
        )?;
        info!(path = %path.display(), url = %redact(&authenticated), "Set origin");
        Ok(())
    }

    fn checkout_branch(&self, path: &Path, branch: &str) -> Result<()> {
        self.checked(path, os_args(&["checkout", "-B", branch]), commit_error)?;
        Ok(())
    }
}


#[cfg(all(test, unix))]
mod real_git_tests {
    use super::*;
    use std::process::Command;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn cli() -> GitCli {
        GitCli::new("git", Credential::new("tok").unwrap(), IdentityConfig::default())
    }

    fn git_out(args: &[&str]) -> String {
        let output = Command::new("git").args(args).output().unwrap();
        assert!(output.status.success(), "git {:?} failed", args);
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    #[test]
    fn test_init_is_idempotent() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("fresh");
        let git = cli();

        git.init(&repo).unwrap();
        assert!(repo.join(".git").exists());
        git.init(&repo).unwrap();
        assert!(!git.ensure_identity(&repo).unwrap());
    }

    #[test]
    fn test_pull_conflict_is_reported_verbatim() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let remote = dir.path().join("remote.git");
        git_out(&["init", "--bare", remote.to_str().unwrap()]);
        let git = cli();

        let a = dir.path().join("a");
        git.clone_repo(remote.to_str().unwrap(), &a).unwrap();
        fs::write(a.join("README.md"), "base\n").unwrap();
        assert!(git.commit_if_dirty(&a, "base").unwrap());
        let branch = git.current_branch(&a).unwrap();
        git.push(&a, &branch).unwrap();

        let b = dir.path().join("b");
        git.clone_repo(remote.to_str().unwrap(), &b).unwrap();
        // merge rather than refuse on divergence, whatever the global config says
        git_out(&["-C", b.to_str().unwrap(), "config", "pull.rebase", "false"]);

        fs::write(a.join("README.md"), "from a\n").unwrap();
        assert!(git.commit_if_dirty(&a, "from a").unwrap());
        git.push(&a, &branch).unwrap();

        fs::write(b.join("README.md"), "from b\n").unwrap();
        assert!(git.commit_if_dirty(&b, "from b").unwrap());

        let err = git.pull(&b).unwrap_err();
        assert!(matches!(err, Error::Pull { .. }));
        let rendered = err.to_string();
        assert!(rendered.contains("CONFLICT"), "{rendered}");
        assert!(rendered.contains("README.md"), "{rendered}");
    }

    #[test]
    fn test_commit_and_push_to_bare_remote() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let remote = dir.path().join("remote.git");
        git_out(&["init", "--bare", remote.to_str().unwrap()]);

        let work = dir.path().join("ws").join("demo");
        let git = cli();
        git.clone_repo(remote.to_str().unwrap(), &work).unwrap();

        // file remotes are left alone
        assert!(!git.embed_credential(&work).unwrap());

        fs::write(work.join("README.md"), "hello\n").unwrap();
        assert!(git.commit_if_dirty(&work, "X").unwrap());
        let branch = git.current_branch(&work).unwrap();
        git.push(&work, &branch).unwrap();

        let subject = git_out(&[
            "--git-dir",
            remote.to_str().unwrap(),
            "log",
            "-1",
            "--format=%s",
            &branch,
        ]);
        assert_eq!(subject, "X");

        // second run has nothing to do
        assert!(!git.commit_if_dirty(&work, "X").unwrap());
    }
}
