//! Binary entry point for the diskcopy CLI.

use std::io::{self, Write};
use std::process;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use diskcopy::logging::{LoggingError, init_logging};
use diskcopy::{
    AzCliError, AzCliGateway, CopyError, CopyOrchestrator, CopyRequest, CopyResult,
    DiskCopyConfig, RequestArgs, RequestError,
};

mod cli;

use cli::{Cli, CopyCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Copy(#[from] CopyError<AzCliError>),
    #[error("failed to write copy result: {0}")]
    Output(String),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    init_logging()?;
    match cli {
        Cli::Copy(command) => copy_command(command).await,
    }
}

async fn copy_command(args: CopyCommand) -> Result<(), CliError> {
    let timeout = args.timeout_secs.map(Duration::from_secs);
    let request = CopyRequest::from_args(request_args(args))?;

    let config =
        DiskCopyConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let gateway = AzCliGateway::with_process_runner(config.clone())
        .map_err(|err| CliError::Config(err.to_string()))?;
    let orchestrator = CopyOrchestrator::new(gateway, &config);

    let token = CancellationToken::new();
    let timer = timeout.map(|limit| cancel_after(token.clone(), limit));
    let outcome = orchestrator.copy_with_cancellation(&request, &token).await;
    if let Some(handle) = timer {
        handle.abort();
    }

    write_result(io::stdout(), &outcome?)
}

fn request_args(args: CopyCommand) -> RequestArgs {
    RequestArgs {
        source_vhd_uri: args.source_vhd_uri,
        source_resource_group: args.source_resource_group,
        source_disk_name: args.source_disk_name,
        target_storage_account_name: args.target_storage_account_name,
        target_storage_container_name: args.target_storage_container_name,
        target_vhd_name: args.target_vhd_name,
        target_resource_group: args.target_resource_group,
        target_disk_name: args.target_disk_name,
        sku: args.sku,
        temp_storage_account_name: args.temp_storage_account_name,
    }
}

fn cancel_after(token: CancellationToken, limit: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(limit).await;
        warn!(timeout_secs = limit.as_secs(), "timeout elapsed; cancelling copy");
        token.cancel();
    })
}

fn write_result(mut target: impl Write, result: &CopyResult) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut target, result)
        .map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(target).map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
