//! Stemcell smoke suite runner
//!
//! Runs black-box checks against a deployed stemcell instance through the
//! bosh CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use smoke::common::{logging, SuiteConfig};
use smoke::suite::{self, CheckContext};

#[derive(Parser)]
#[command(name = "stemcell-smoke", about = "Black-box smoke tests for BOSH stemcells")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run checks (all of them by default)
    Run {
        /// Names of checks to run
        checks: Vec<String>,

        /// Checks to leave out of the selection (repeatable)
        #[arg(long, value_name = "NAME")]
        skip: Vec<String>,

        /// Path to the bosh CLI binary (default: `bosh` on PATH)
        #[arg(long)]
        bosh: Option<PathBuf>,

        /// Directory holding the deployment manifest and ops files
        #[arg(long)]
        manifests_dir: Option<PathBuf>,
    },

    /// List available checks
    List,
}

#[tokio::main]
async fn main() {
    logging::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            checks,
            skip,
            bosh,
            manifests_dir,
        } => run(checks, skip, bosh, manifests_dir).await,
        Commands::List => {
            for check in suite::all_checks() {
                println!("{:30} {}", check.name.bold(), check.description);
            }
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(
    checks: Vec<String>,
    skip: Vec<String>,
    bosh: Option<PathBuf>,
    manifests_dir: Option<PathBuf>,
) -> smoke::Result<bool> {
    let mut config = SuiteConfig::load()?;
    if let Some(bosh) = bosh {
        config.bosh_binary = bosh.display().to_string();
    }
    if let Some(dir) = manifests_dir {
        config.manifests_dir = dir;
    }

    let ctx = CheckContext::from_config(config)?;
    let report = suite::run_checks(&ctx, &checks, &skip).await?;
    Ok(report.all_passed())
}
