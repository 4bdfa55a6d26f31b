//! Secrets file management

use clap::{Args, Subcommand};
use ghws_core::SecretsFile;

/// Manage the secrets file holding the access token
#[derive(Args, Debug)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SecretsCommand {
    /// Create a template secrets file with 0600 permissions
    Init,

    /// Show where the secrets file lives and whether a token is set
    Show,
}

impl SecretsArgs {
    pub fn execute(&self) -> anyhow::Result<()> {
        let Some(file) = SecretsFile::default_location() else {
            anyhow::bail!("Could not determine the secrets file location");
        };

        match self.command {
            SecretsCommand::Init => {
                file.write_template()?;
                println!("Created {}", file.path().display());
                println!("Add your GitHub token to it, or set GITHUB_TOKEN.");
            }
            SecretsCommand::Show => {
                println!("Secrets file: {}", file.path().display());
                if !file.path().exists() {
                    println!("  (not found - run `ghws secrets init`)");
                    return Ok(());
                }
                let state = if file.read_token()?.is_some() { "set" } else { "not set" };
                println!("  token: {}", state);
            }
        }
        Ok(())
    }
}
