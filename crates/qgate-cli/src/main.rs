//! qgate - CI quality-gate step
//!
//! The `qgate` command runs the configured quality-gate pipeline for
//! a subproject: lint, dependency audit, unit tests with a coverage
//! threshold, and optional integration tests. Configuration arrives
//! as `INPUT_*` environment variables from the hosting CI runner; the
//! rendered markdown report and the `coverage`/`report` outputs are
//! always emitted, even when a stage fails.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use qgate_ci::Pipeline;

#[derive(Parser)]
#[command(name = "qgate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CI quality gate: lint, audit, tests and coverage", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the quality-gate pipeline
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    qgate_ci::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run => cmd_run().await,
    }
}

/// Run the pipeline and map its outcome to the process exit code.
async fn cmd_run() -> Result<()> {
    let outcome = Pipeline::run().await;

    info!(
        "Status: {}",
        if outcome.success { "PASSED" } else { "FAILED" }
    );
    if let Some(pct) = outcome.coverage {
        info!("Coverage: {pct}%");
    }

    if outcome.success {
        Ok(())
    } else {
        // The failure signal and the report were already emitted
        // during finalization; only the exit code remains.
        anyhow::bail!("Quality gate failed")
    }
}
