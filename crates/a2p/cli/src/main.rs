//! a2p CLI - manage a user's profile from the terminal
//!
//! Operates directly on a file-backed profile store:
//! - Create and inspect profiles
//! - Author consent policies and evaluate agent access
//! - Review proposals submitted by agents
//! - Inspect and revoke consent receipts

use std::path::PathBuf;

use a2p_service::{A2pConfig, ProfileService};
use a2p_storage::FileProfileStore;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{access, policy, profile, proposal, receipt};

type Service = ProfileService<FileProfileStore>;

#[derive(Parser)]
#[command(name = "a2p")]
#[command(about = "a2p - consent policies, receipts and memory proposals", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "A2P_CONFIG")]
    config: Option<PathBuf>,

    /// Profile directory (overrides storage.data_dir)
    #[arg(short, long, env = "A2P_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and inspect profiles
    Profile {
        #[command(subcommand)]
        command: profile::ProfileCommands,
    },

    /// Author consent policies
    Policy {
        #[command(subcommand)]
        command: policy::PolicyCommands,
    },

    /// Evaluate an agent's access request
    Access(access::AccessArgs),

    /// Review agent proposals
    #[command(alias = "proposals")]
    Proposal {
        #[command(subcommand)]
        command: proposal::ProposalCommands,
    },

    /// Inspect and revoke consent receipts
    Receipt {
        #[command(subcommand)]
        command: receipt::ReceiptCommands,
    },

    /// Show effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = A2pConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.telemetry.log_level.clone()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Commands::Config = cli.command {
        return output::print(&config, cli.output);
    }

    let data_dir = config.data_dir();
    let store = FileProfileStore::open(&data_dir)
        .await
        .with_context(|| format!("opening profile store at {}", data_dir.display()))?;
    let service = Service::new(store, config);

    match cli.command {
        Commands::Profile { command } => profile::execute(command, &service, cli.output).await,
        Commands::Policy { command } => policy::execute(command, &service, cli.output).await,
        Commands::Access(args) => access::execute(args, &service, cli.output).await,
        Commands::Proposal { command } => proposal::execute(command, &service, cli.output).await,
        Commands::Receipt { command } => receipt::execute(command, &service, cli.output).await,
        Commands::Config => Ok(()),
    }
}
