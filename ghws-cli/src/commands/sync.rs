//! Workspace commands: clone, pull, push and sync

use std::path::{Path, PathBuf};

use clap::Args;
use ghws_core::{
    plan, Action, GitCli, LocalRepository, Reconciler, RepoOutcome, WorkItem, WorkspaceCommand,
};

use super::Context;

/// Clone remote repositories into the workspace
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Clone every repository of the authenticated user
    #[arg(long, conflicts_with_all = ["names", "path"])]
    pub all: bool,

    /// Repository names to clone
    pub names: Vec<String>,

    /// Clone the single named repository into this directory instead of the workspace
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Pull every workspace repository, or a single one
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Only this local repository
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Commit and push (or pull then push) workspace repositories
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Commit message (defaults to the configured message)
    #[arg(short, long)]
    pub message: Option<String>,

    /// Only this local repository
    #[arg(long)]
    pub path: Option<PathBuf>,
}

impl CloneArgs {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        if let Some(path) = &self.path {
            let [name] = self.names.as_slice() else {
                anyhow::bail!("--path takes exactly one repository name");
            };
            return clone_to_path(ctx, name, path).await;
        }

        let command = if self.all {
            WorkspaceCommand::CloneAll
        } else if self.names.is_empty() {
            anyhow::bail!("Name the repositories to clone, or pass --all");
        } else {
            WorkspaceCommand::CloneSelected(self.names.clone())
        };

        ctx.workspace().ensure()?;
        run(ctx, &command).await
    }
}

impl PullArgs {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        match &self.path {
            Some(path) => run_single(ctx, &WorkspaceCommand::PullAll, path),
            None => run(ctx, &WorkspaceCommand::PullAll).await,
        }
    }
}

impl PushArgs {
    /// Push, or sync when `sync` is set
    pub async fn execute(&self, ctx: &Context, sync: bool) -> anyhow::Result<()> {
        let message = self.message.clone();
        let command = if sync {
            WorkspaceCommand::SyncAll { message }
        } else {
            WorkspaceCommand::PushAll { message }
        };

        match &self.path {
            Some(path) => run_single(ctx, &command, path),
            None => run(ctx, &command).await,
        }
    }
}

fn reconciler<'a>(ctx: &Context, git: &'a GitCli) -> Reconciler<'a, GitCli> {
    Reconciler::new(
        git,
        ctx.config.workspace.root.clone(),
        ctx.config.workspace.commit_message.clone(),
    )
}

/// Resolve `command` against the remote listing or the workspace, then reconcile
async fn run(ctx: &Context, command: &WorkspaceCommand) -> anyhow::Result<()> {
    let (remote, local) = if command.targets_remote() {
        let github = ctx.github().await?;
        let remote: Vec<WorkItem> = github
            .list_own_repos()
            .await?
            .iter()
            .map(WorkItem::from)
            .collect();
        (remote, Vec::new())
    } else {
        (Vec::new(), ctx.workspace().local_items()?)
    };

    let plan = plan(command, &remote, &local);
    for name in &plan.unknown {
        eprintln!("Warning: no remote repository named '{}'", name);
    }
    if plan.items.is_empty() {
        println!("Nothing to {} in {}.", plan.policy, ctx.config.workspace.root.display());
        return Ok(());
    }

    let git = ctx.git();
    let reconciler = reconciler(ctx, &git);

    println!(
        "Running {} on {} repositories in {}",
        plan.policy,
        plan.items.len(),
        reconciler.root().display()
    );
    let outcomes = plan.execute(&reconciler);
    finish(ctx, &outcomes)
}

fn run_single(ctx: &Context, command: &WorkspaceCommand, path: &Path) -> anyhow::Result<()> {
    if !LocalRepository::is_repository(path) {
        anyhow::bail!(
            "{} is not a git repository. Use `ghws clone NAME --path {}` to clone one there",
            path.display(),
            path.display()
        );
    }

    let message = match command {
        WorkspaceCommand::PushAll { message } | WorkspaceCommand::SyncAll { message } => {
            message.as_deref()
        }
        _ => None,
    };

    let git = ctx.git();
    let outcome = reconciler(ctx, &git).reconcile_path(command.policy(), path, message);
    finish(ctx, std::slice::from_ref(&outcome))
}

async fn clone_to_path(ctx: &Context, name: &str, path: &Path) -> anyhow::Result<()> {
    let github = ctx.github().await?;
    let repo = github.find_repo(name).await?;

    let git = ctx.git();
    let outcome = reconciler(ctx, &git).clone_to_path(&WorkItem::from(&repo), path);
    if outcome.has(&Action::AlreadyPresent) {
        println!("{} is already a repository; only its origin was checked.", path.display());
    }
    finish(ctx, std::slice::from_ref(&outcome))
}

fn finish(ctx: &Context, outcomes: &[RepoOutcome]) -> anyhow::Result<()> {
    let failed = ctx.report(outcomes);
    if failed > 0 {
        anyhow::bail!("{} of {} repositories failed", failed, outcomes.len());
    }
    Ok(())
}
