mod bridge;
mod config;
mod dispatcher;
mod error;
mod protocol;
mod runner;

use anyhow::{Context, Result};
use bridge::RequestExecutor;
use clap::Parser;
use config::LightsConfig;
use dispatcher::{Dispatcher, DrainState};
use runner::{ProcessRunner, ScriptRunner};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Serial RF light control bridge
#[derive(Debug, Parser)]
#[command(name = "rf-lights", version, about)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long)]
    config: PathBuf,

    /// Override the script directory
    #[arg(long)]
    script_dir: Option<PathBuf>,

    /// Override the script interpreter
    #[arg(long)]
    interpreter: Option<PathBuf>,

    /// Override the per-script timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries bridge responses, so logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let runner = Arc::new(ProcessRunner::new(config.runner_config()));
    info!("RF lights bridge starting");
    info!("  runner: {}", runner.name());
    info!("  scripts: {}", config.script_dir.display());
    info!("  timeout: {}s", config.script_timeout_secs);

    let dispatcher = Dispatcher::new(runner);

    // Log queue transitions between idle and draining
    let mut queue_rx = dispatcher.subscribe();
    tokio::spawn(async move {
        let mut last = DrainState::Idle;
        while queue_rx.changed().await.is_ok() {
            let status = *queue_rx.borrow_and_update();
            if status.drain_state() != last {
                last = status.drain_state();
                debug!(
                    "Queue {:?}: {} pending, {} completed, {} failed",
                    last, status.pending, status.completed, status.failed
                );
            }
        }
    });

    let devices: Vec<_> = config.valid_devices().into_iter().cloned().collect();
    for device in &devices {
        info!(
            "Device {} ({}): {}",
            device.device_label,
            device.device_name,
            device.light_ids().join(", ")
        );
        dispatcher.init_state(&device.device_name);
    }

    let executor = RequestExecutor::new(dispatcher, devices);
    serve(&executor).await?;

    let dispatcher = executor.dispatcher();

    let status = dispatcher.status();
    if status.pending > 0 {
        info!("Waiting for {} queued command(s)", status.pending);
    }
    dispatcher.wait_idle().await;

    let status = dispatcher.status();
    info!(
        "RF lights bridge stopped: {} completed, {} failed, {} light state(s) cached",
        status.completed,
        status.failed,
        dispatcher.store().len()
    );
    Ok(())
}

fn load_config(cli: &Cli) -> Result<LightsConfig> {
    let mut config = LightsConfig::load(&cli.config)?;

    if let Some(dir) = &cli.script_dir {
        config.script_dir = dir.clone();
    }
    if let Some(interpreter) = &cli.interpreter {
        config.interpreter = Some(interpreter.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        config.script_timeout_secs = secs;
    }

    config.validate()?;
    Ok(config)
}

/// Answer request lines from stdin until EOF or Ctrl-C
async fn serve(executor: &RequestExecutor) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read request")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };

        let Some(line) = line else {
            debug!("Host closed stdin");
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = executor.execute_line(line);
        let mut out = response.to_line();
        out.push('\n');
        stdout
            .write_all(out.as_bytes())
            .await
            .context("Failed to write response")?;
        stdout.flush().await.context("Failed to flush response")?;
    }

    Ok(())
}
