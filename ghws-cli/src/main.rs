//! ghws CLI - manage GitHub repositories and mirror them in a local workspace

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ghws_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    CloneArgs, Context, PullArgs, PushArgs, RepoArgs, SecretsArgs, StatusArgs, UploadArgs,
};

/// ghws: manage your GitHub repositories and keep local clones in sync
#[derive(Parser, Debug)]
#[command(name = "ghws")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workspace root (overrides config and env)
    #[arg(long, global = true, env = "GHWS_WORKSPACE")]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Show the user the token belongs to
    Whoami,

    /// Manage repositories on GitHub
    Repo(RepoArgs),

    /// Clone repositories into the workspace
    Clone(CloneArgs),

    /// Pull every repository in the workspace
    Pull(PullArgs),

    /// Commit and push every repository in the workspace
    Push(PushArgs),

    /// Pull, then commit and push every repository in the workspace
    Sync(PushArgs),

    /// Upload a local file or folder to a repository
    Upload(UploadArgs),

    /// Show the repositories in the workspace
    #[command(visible_alias = "st")]
    Status(StatusArgs),

    /// Manage the secrets file
    Secrets(SecretsArgs),

    /// Show current configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let config = Config::load_with_overrides(cli.workspace.clone())?;

    if cli.verbose {
        tracing::info!(
            workspace = %config.workspace.root.display(),
            git = %config.git.binary,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("ghws {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Whoami) => {
            let ctx = Context::new(config)?;
            let github = ctx.github().await?;
            println!("Authenticated as {}", github.login());
        }
        Some(Commands::Repo(args)) => {
            args.execute(&Context::new(config)?).await?;
        }
        Some(Commands::Clone(args)) => {
            args.execute(&Context::new(config)?).await?;
        }
        Some(Commands::Pull(args)) => {
            args.execute(&Context::new(config)?).await?;
        }
        Some(Commands::Push(args)) => {
            args.execute(&Context::new(config)?, false).await?;
        }
        Some(Commands::Sync(args)) => {
            args.execute(&Context::new(config)?, true).await?;
        }
        Some(Commands::Upload(args)) => {
            args.execute(&Context::new(config)?).await?;
        }
        Some(Commands::Status(args)) => {
            args.execute(&config, cli.verbose)?;
        }
        Some(Commands::Secrets(args)) => {
            args.execute()?;
        }
        Some(Commands::Config) => show_config(&config),
        None => {
            println!("ghws - manage GitHub repositories and mirror them locally");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn show_config(config: &Config) {
    println!("ghws Configuration");
    println!("==================");
    println!();
    println!("Workspace:");
    println!("  root: {}", config.workspace.root.display());
    println!("  commit_message: {}", config.workspace.commit_message);
    println!();
    println!("Identity (used when git has none):");
    println!("  name: {}", config.identity.name);
    println!("  email: {}", config.identity.email);
    println!();
    println!("Git:");
    println!("  binary: {}", config.git.binary);
    println!();
    match config.action_log_path() {
        Some(path) => println!("Action log: {}", path.display()),
        None => println!("Action log: (disabled)"),
    }
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
