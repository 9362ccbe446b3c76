//! # vtlife: virtual-time daily life simulation
//!
//! Usage:
//!   vtlife performer                       # Clock + daily scheduler + presentation bridge
//!   vtlife company                         # Company agent, one batch per virtual day
//!   vtlife batch                           # Run one company batch now and exit
//!   vtlife submit proposal.json            # Drop a project proposal in the company inbox
//!   vtlife submit ad.json --kind advertisement
//!   vtlife init                            # Write a default config file

mod company;
mod performer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use vtlife_core::VtlifeConfig;

#[derive(Parser)]
#[command(name = "vtlife", version, about = "🕰️ vtlife: virtual-time daily life simulation")]
struct Cli {
    /// Config file (default: ~/.vtlife/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the performer agent loop
    Performer,
    /// Run the company agent loop
    Company,
    /// Run a single company batch and exit
    Batch,
    /// Place a JSON payload in the company inbox
    Submit {
        /// JSON file holding the payload
        file: PathBuf,
        /// Message type
        #[arg(short, long, value_enum, default_value = "project")]
        kind: SubmitKind,
    },
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SubmitKind {
    Project,
    Advertisement,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "vtlife=debug" } else { "vtlife=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(VtlifeConfig::default_path);

    if let Command::Init { force } = cli.command {
        return init(&config_path, force);
    }

    let config = if config_path.exists() {
        VtlifeConfig::load_from(&config_path)
            .with_context(|| format!("loading config {}", config_path.display()))?
    } else {
        tracing::info!("No config at {}, using defaults", config_path.display());
        VtlifeConfig::default()
    };

    match cli.command {
        Command::Performer => performer::run(&config).await,
        Command::Company => company::run(&config).await,
        Command::Batch => company::run_once(&config),
        Command::Submit { file, kind } => company::submit(&config, &file, kind.into()),
        Command::Init { .. } => Ok(()),
    }
}

impl From<SubmitKind> for vtlife_mailbox::MailType {
    fn from(kind: SubmitKind) -> Self {
        match kind {
            SubmitKind::Project => vtlife_mailbox::MailType::Project,
            SubmitKind::Advertisement => vtlife_mailbox::MailType::Advertisement,
        }
    }
}

fn init(path: &std::path::Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("⚠️  Config already exists at {} (use --force to overwrite)", path.display());
        return Ok(());
    }
    VtlifeConfig::default()
        .save_to(path)
        .with_context(|| format!("writing config {}", path.display()))?;
    println!("✅ Config written to {}", path.display());
    Ok(())
}
