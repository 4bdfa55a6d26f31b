//! Status command - show the repositories in the workspace

use clap::Args;
use ghws_core::{Config, Workspace};

/// Show the repositories in the workspace
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also show the origin URL (credentials redacted)
    #[arg(short, long)]
    origin: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub fn execute(&self, config: &Config, verbose: bool) -> anyhow::Result<()> {
        let workspace = Workspace::new(config.workspace.root.clone());
        if !workspace.root().is_dir() {
            println!("Workspace {} does not exist yet.", workspace.root().display());
            println!("Run `ghws clone --all` to populate it.");
            return Ok(());
        }

        let repos = workspace.repositories()?;

        println!();
        println!("Workspace: {}", workspace.root().display());
        println!();

        if repos.is_empty() {
            println!("No repositories.");
            return Ok(());
        }

        for repo in &repos {
            let branch = repo.current_branch.as_deref().unwrap_or("(detached)");
            let marker = if repo.needs_credential() {
                " [no credential]"
            } else {
                ""
            };
            println!("  {:<30} {}{}", repo.name, branch, marker);

            if self.origin || verbose {
                println!("    origin: {}", repo.display_origin());
            }
        }

        println!();
        println!("{} repositories", repos.len());
        Ok(())
    }
}
