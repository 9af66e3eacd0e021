use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "stickerpack")]
#[command(about = "Install and keep sticker packs up to date")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed packs
    List,
    /// Show the packs published on the hub
    Hub {
        /// Ignore the cached catalog
        #[arg(long)]
        refresh: bool,
        /// List the GitHub-backed hub index instead of the catalog
        #[arg(long, conflicts_with = "refresh")]
        index: bool,
    },
    /// Install a pack from the hub
    Install {
        /// Pack name as published on the hub
        name: String,
        /// Update the pack instead of failing when it is already installed
        #[arg(short, long)]
        update: bool,
        /// Look the name up in the GitHub-backed hub index
        #[arg(long, conflicts_with = "update")]
        index: bool,
    },
    /// Update one pack, or every enabled pack
    Update {
        /// Pack to update (defaults to all enabled packs)
        name: Option<String>,
        /// Reinstall even when the installed copy matches the hub
        #[arg(short, long)]
        force: bool,
        /// Only report which packs have an update available
        #[arg(long)]
        check: bool,
    },
    /// Remove an installed pack
    Remove {
        /// Pack name
        name: String,
    },
    /// Enable a pack
    Enable {
        /// Pack name
        name: String,
    },
    /// Disable a pack (skipped by bulk and background updates)
    Disable {
        /// Pack name
        name: String,
    },
    /// Reload packs and keep them updated until Ctrl-C
    Watch,
    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the current configuration
    Show,
    /// Print the configuration file location
    Path,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List => cli::list::run().await,
        Commands::Hub { refresh, index } => {
            if index {
                cli::hub::run_index().await
            } else {
                cli::hub::run(refresh).await
            }
        }
        Commands::Install {
            name,
            update,
            index,
        } => {
            if index {
                cli::install::run_from_index(&name).await
            } else {
                cli::install::run(&name, update).await
            }
        }
        Commands::Update { name, force, check } => {
            if check {
                cli::update::check(name.as_deref(), force).await
            } else {
                cli::update::run(name.as_deref(), force).await
            }
        }
        Commands::Remove { name } => cli::remove::run(&name).await,
        Commands::Enable { name } => cli::enable::run(&name, true).await,
        Commands::Disable { name } => cli::enable::run(&name, false).await,
        Commands::Watch => cli::watch::run().await,
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Path => cli::config::path(),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\nError: {}", e);
            ExitCode::FAILURE
        }
    }
}
