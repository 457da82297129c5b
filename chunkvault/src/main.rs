// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Binary entry point: parses and validates CLI arguments, builds the
//! composition root, dispatches the requested command to its use case,
//! and maps the result to a process exit code (spec §6).

use std::sync::Arc;
use std::time::Duration;

use chunkvault::infrastructure::ChunkVaultConfig;
use chunkvault::infrastructure::logging::init_tracing;
use chunkvault::presentation::CompositionRoot;
use chunkvault_bootstrap::shutdown::ShutdownCoordinator;
use chunkvault_bootstrap::signals::install_shutdown_signal_handler;
use chunkvault_bootstrap::{bootstrap_cli, result_to_exit_code, ValidatedCommand};
use chunkvault_domain::value_objects::CancellationToken;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let validated_cli = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("error: {err}");
            return std::process::ExitCode::FAILURE;
        }
    };

    init_tracing(validated_cli.verbose, false);

    let result = run(validated_cli).await;
    result_to_exit_code(result)
}

async fn run(cli: chunkvault_bootstrap::ValidatedCli) -> anyhow::Result<()> {
    let config_path = chunkvault_bootstrap::config::discover_config_path(cli.config.as_deref());
    let config = ChunkVaultConfig::load(config_path.as_deref())?;

    let root = CompositionRoot::build(&config, cli.max_parallel_tasks).await?;

    // Bridges the bootstrap layer's tokio-aware shutdown signal into the
    // domain's own lightweight, tokio-free cancellation token, so a single
    // `SIGTERM`/`SIGINT`/`SIGHUP` cancels any in-flight chunk engine work.
    let shutdown = Arc::new(ShutdownCoordinator::new(Duration::from_secs(5)));
    let _signal_task = install_shutdown_signal_handler(Arc::clone(&shutdown));
    let cancellation = CancellationToken::new();
    let bridge_token = shutdown.token();
    let bridge_cancellation = cancellation.clone();
    tokio::spawn(async move {
        bridge_token.cancelled().await;
        bridge_cancellation.cancel();
    });

    match cli.command {
        ValidatedCommand::Upload { file_path } => {
            root.upload_use_case().execute(&file_path, &cancellation).await?;
        }
        ValidatedCommand::Download { file_id, output } => {
            root.download_use_case().execute(&file_id, output, &cancellation).await?;
        }
        ValidatedCommand::List { parent_id, content_type, tag } => {
            root.list_use_case().execute(parent_id, content_type, tag).await?;
        }
        ValidatedCommand::Delete { file_id, force, reason } => {
            root.delete_use_case().execute(&file_id, force, reason).await?;
        }
        ValidatedCommand::Verify { file_id, deep, repair } => {
            root.verify_use_case().execute(&file_id, deep, repair, &cancellation).await?;
        }
        ValidatedCommand::Seek { path, recursive } => {
            root.seek_use_case().execute(&path, recursive, &cancellation).await?;
        }
        ValidatedCommand::SeekPlus { path, process_content, parallel, check_duplicates } => {
            root.seek_plus_use_case().execute(&path, process_content, parallel, check_duplicates, &cancellation).await?;
        }
        ValidatedCommand::Metrics { metric_type } => {
            root.metrics_use_case().execute(&metric_type).await?;
        }
    }

    Ok(())
}
