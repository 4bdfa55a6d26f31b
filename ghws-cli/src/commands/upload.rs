//! Upload a local file or folder to a GitHub repository

use std::path::PathBuf;

use clap::Args;
use ghws_core::{upload, UPLOAD_COMMIT_MESSAGE};
use ghws_github::Visibility;

use super::Context;

/// Push a local file or folder to a new or existing repository
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// File or folder to upload
    pub source: PathBuf,

    /// Existing repository to push to
    #[arg(long, conflicts_with = "create", required_unless_present = "create")]
    pub to: Option<String>,

    /// Create a repository with this name and push to it
    #[arg(long)]
    pub create: Option<String>,

    /// Description for a created repository
    #[arg(short, long)]
    pub description: Option<String>,

    /// Create the repository as private
    #[arg(long)]
    pub private: bool,

    /// Branch to push
    #[arg(short, long, default_value = "main")]
    pub branch: String,
}

impl UploadArgs {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        if !self.source.exists() {
            anyhow::bail!("Source not found: {}", self.source.display());
        }

        let github = ctx.github().await?;

        let repo = match (&self.to, &self.create) {
            (Some(name), _) => github.find_repo(name).await?,
            (None, Some(name)) => {
                let repo = github
                    .create_repo(
                        name,
                        self.description.as_deref().unwrap_or(""),
                        Visibility::from_private(self.private),
                    )
                    .await?;
                println!("Created {} ({})", repo.full_name, repo.visibility);
                ctx.record(&format!("Created repository {} ({})", repo.full_name, repo.visibility));
                repo
            }
            (None, None) => anyhow::bail!("Pass --to NAME or --create NAME"),
        };

        let git = ctx.git();
        let report = upload(
            &git,
            &self.source,
            &repo.clone_url,
            &self.branch,
            UPLOAD_COMMIT_MESSAGE,
        )?;

        if report.staged {
            println!("Pushed {} from a temporary copy", report.source.display());
        }
        if report.committed {
            println!(
                "Uploaded {} to {} ({})",
                report.source.display(),
                repo.full_name,
                report.branch
            );
        } else {
            println!(
                "Pushed existing commits of {} to {} ({})",
                report.source.display(),
                repo.full_name,
                report.branch
            );
        }
        ctx.record(&format!(
            "Uploaded {} to {} on {}",
            report.source.display(),
            repo.full_name,
            report.branch
        ));

        Ok(())
    }
}
