//! Twig CLI - Command line interface for Twig
//!
//! Lists a repository's branches by recency, with per-branch properties.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use twig_core::{Config, GitRepo, InventoryEngine, OptionKey, SystemClock};

use commands::{FilterArgs, GetArgs, SetArgs, UnsetArgs};

/// Twig: your branches, sorted by recency, with notes attached
#[derive(Parser, Debug)]
#[command(name = "twig")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository to inspect (defaults to the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    repo: Option<PathBuf>,

    /// Branch to read or write properties on (defaults to the current branch)
    #[arg(short, long, global = true)]
    branch: Option<String>,

    #[command(flatten)]
    filters: FilterArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List branches, most recently active first (the default)
    #[command(visible_alias = "ls")]
    List,

    /// Show a property of the branch
    Get(GetArgs),

    /// Set a property on the branch
    Set(SetArgs),

    /// Remove a property from the branch
    #[command(visible_alias = "rm")]
    Unset(UnsetArgs),

    /// Show current configuration
    Config,

    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so the listing on stdout stays clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_config(config: &Config) {
    let list = &config.list;

    println!("Twig Configuration");
    println!("==================");
    println!();
    println!("List Settings:");
    match list.max_days_old {
        Some(days) => println!("  max_days_old: {}", days),
        None => println!("  max_days_old: (none)"),
    }
    println!("  only_branch: {}", list.only_branch.as_deref().unwrap_or("(none)"));
    println!("  except_branch: {}", list.except_branch.as_deref().unwrap_or("(none)"));
    println!("  timezone: {:?}", list.timezone);
    println!("  header_color: {:?}", list.header_color);
    println!();
    println!("Reserved properties: {}", config.properties.reserved.join(", "));
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.filters.utc)?;

    if cli.verbose {
        tracing::info!(
            max_days_old = ?config.list.max_days_old,
            timezone = ?config.list.timezone,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("twig {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(Commands::Config) => {
            print_config(&config);
            return Ok(());
        }
        _ => {}
    }

    let repo_path = match &cli.repo {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };
    let repo = GitRepo::open(&repo_path)?;
    let mut engine = InventoryEngine::new(repo, config.engine_settings(), SystemClock);

    cli.filters.apply(&mut engine, &config)?;
    if let Some(branch) = &cli.branch {
        engine.set_option(OptionKey::Branch, branch)?;
    }

    match cli.command {
        None | Some(Commands::List) => commands::list(&mut engine)?,
        Some(Commands::Get(args)) => args.execute(&mut engine)?,
        Some(Commands::Set(args)) => args.execute(&mut engine)?,
        Some(Commands::Unset(args)) => args.execute(&mut engine)?,
        Some(Commands::Config) | Some(Commands::Version) => {}
    }

    Ok(())
}
