//! Remote repository management commands

use clap::{Args, Subcommand, ValueEnum};
use dialoguer::Confirm;
use ghws_github::{GitHubClient, RemoteRepository, Visibility};

use super::Context;

/// Manage repositories on GitHub
#[derive(Args, Debug)]
pub struct RepoArgs {
    #[command(subcommand)]
    pub command: RepoCommand,
}

#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    /// List repositories
    #[command(visible_alias = "ls")]
    List {
        /// Owner to list (defaults to the authenticated user)
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Create a repository
    Create {
        /// Repository name
        name: String,

        /// Short description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Create as private
        #[arg(long)]
        private: bool,
    },

    /// Rename a repository
    Rename {
        /// Current name
        name: String,

        /// New name
        new_name: String,
    },

    /// Delete a repository
    Delete {
        /// Repository name
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Make a repository public or private
    Visibility {
        /// Repository name
        name: String,

        /// New visibility
        #[arg(value_enum)]
        visibility: VisibilityArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VisibilityArg {
    Public,
    Private,
}

impl From<VisibilityArg> for Visibility {
    fn from(arg: VisibilityArg) -> Self {
        match arg {
            VisibilityArg::Public => Visibility::Public,
            VisibilityArg::Private => Visibility::Private,
        }
    }
}

impl RepoArgs {
    /// Execute the repo command
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let github = ctx.github().await?;

        match &self.command {
            RepoCommand::List { owner } => {
                let owner = owner.as_deref().unwrap_or(github.login());
                list_repos(&github, owner).await?;
            }
            RepoCommand::Create {
                name,
                description,
                private,
            } => {
                let visibility = Visibility::from_private(*private);
                let repo = github.create_repo(name, description, visibility).await?;
                println!("Created {} ({})", repo.full_name, repo.visibility);
                ctx.record(&format!("Created repository {} ({})", repo.full_name, repo.visibility));
            }
            RepoCommand::Rename { name, new_name } => {
                let repo = github.find_repo(name).await?;
                let renamed = github.rename_repo(&repo, new_name).await?;
                println!("Renamed {} to {}", repo.full_name, renamed.full_name);
                ctx.record(&format!(
                    "Renamed repository {} to {}",
                    repo.full_name, renamed.full_name
                ));
            }
            RepoCommand::Delete { name, yes } => {
                let repo = github.find_repo(name).await?;
                if !*yes && !confirm_delete(&repo)? {
                    println!("Aborted.");
                    return Ok(());
                }
                github.delete_repo(&repo).await?;
                println!("Deleted {}", repo.full_name);
                ctx.record(&format!("Deleted repository {}", repo.full_name));
            }
            RepoCommand::Visibility { name, visibility } => {
                let repo = github.find_repo(name).await?;
                let updated = github.set_visibility(&repo, (*visibility).into()).await?;
                println!("{} is now {}", updated.full_name, updated.visibility);
                ctx.record(&format!(
                    "Set repository {} to {}",
                    updated.full_name, updated.visibility
                ));
            }
        }

        Ok(())
    }
}

fn confirm_delete(repo: &RemoteRepository) -> anyhow::Result<bool> {
    let answer = Confirm::new()
        .with_prompt(format!(
            "Permanently delete {}? This cannot be undone",
            repo.full_name
        ))
        .default(false)
        .interact()?;
    Ok(answer)
}

/// Print `owner`'s repositories as each page arrives
async fn list_repos(github: &GitHubClient, owner: &str) -> anyhow::Result<()> {
    let mut pages = github.repo_pages(owner);
    let mut count = 0usize;
    while let Some(repos) = pages.next_page().await? {
        if count == 0 {
            println!("Repositories for {}:", owner);
            println!();
        }
        count += repos.len();
        for repo in &repos {
            print_repo(repo);
        }
    }

    if count == 0 {
        println!("No repositories found for {}.", owner);
    } else {
        println!();
        println!("{} repositories", count);
    }
    Ok(())
}

fn print_repo(repo: &RemoteRepository) {
    let description = repo.description.as_deref().unwrap_or("");
    println!("  {:<40} {:<8} {}", repo.name, repo.visibility, description);
}
