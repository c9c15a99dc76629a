//! gridforce deploys the GridForce token contract to a local dev node or a public network.

mod cli;
mod settings;

use std::path::Path;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command, DeployArgs};
use gridforce_deploy::{CancelSignal, DeployerBuilder, StdoutReporter};
use settings::Settings;

/// Exit code used when a second interrupt aborts the process.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    // Network keys are commonly kept in a `.env` file next to the project.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize the logger. Stdout is reserved for the deployment report.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Deploy(args) => deploy(cli.config.as_deref(), args).await,
    }
}

async fn deploy(config: Option<&Path>, args: DeployArgs) -> Result<()> {
    let settings = Settings::load(config)?;

    // Command-line flags win over the settings file
    let deployer = DeployerBuilder::new(args.network)
        .inputs(args.secrets.into())
        .compiler_version(settings.solidity)
        .artifacts_dir(args.artifacts.unwrap_or(settings.artifacts))
        .contract(args.contract.unwrap_or(settings.contract))
        .confirmation(settings.confirmation)
        .local(settings.local)
        .build()?;

    let (handle, cancel) = CancelSignal::pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("Interrupt received, cancelling deployment (press Ctrl+C again to abort)...");
        handle.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Second interrupt received, aborting");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });

    let result = match deployer.deploy(&mut StdoutReporter, cancel).await {
        Ok(result) => result,
        Err(err) => {
            if err.is_pre_submission() {
                tracing::info!("No transaction was sent to the network");
            }
            return Err(err.into());
        }
    };

    tracing::info!(
        address = %result.contract_address,
        tx_hash = %result.transaction_hash,
        block_number = result.block_number,
        "Deployment complete"
    );

    Ok(())
}
