//! sitewatch - periodic reachability monitor
//!
//! Usage:
//!     sitewatch --config <path>
//!
//! See --help for more options.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use sitewatch::config::{load_config, load_targets, Config};
use sitewatch::metrics::{MetricsCollector, MetricsServer};
use sitewatch::target::TargetList;
use sitewatch::util::{init_logging, ShutdownSignal};
use sitewatch::Monitor;

/// Watches domains and IP addresses and alerts when they go down.
#[derive(Parser, Debug)]
#[command(name = "sitewatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    /// Run a single round and exit
    #[arg(long)]
    once: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config).with_context(|| {
        format!(
            "failed to load configuration from '{}'",
            cli.config.display()
        )
    })?;

    // Relative target files resolve against the config file's directory
    let targets = load_targets(&config, cli.config.parent())
        .context("failed to load target list")?;

    // CLI overrides config
    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.global.log_level);

    init_logging(log_level, &config.global.log_format);

    if cli.validate {
        info!("Configuration is valid");
        println!("Configuration is valid.");
        println!("  Targets: {}", targets.len());
        for target in &targets {
            println!("    - {} ({:?}) -> {}", target, target.kind(), target.url());
        }
        println!(
            "  Interval: {}, timeout: {}, max concurrency: {}",
            humantime::format_duration(config.monitor.interval),
            humantime::format_duration(config.monitor.timeout),
            config.monitor.max_concurrency
        );
        if config.notifications.enabled {
            println!("  Alerts to: {}", config.notifications.recipient);
        } else {
            println!("  Alerts: disabled");
        }
        return Ok(());
    }

    info!(
        config_path = %cli.config.display(),
        targets = targets.len(),
        "sitewatch starting"
    );

    for target in &targets {
        info!(target = %target, kind = ?target.kind(), url = %target.url(), "configured target");
    }

    run(config, targets, cli.once)
}

/// Run the monitor with the given configuration.
fn run(config: Config, targets: TargetList, once: bool) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    runtime.block_on(async { run_async(config, targets, once).await })
}

/// Async entry point for the monitor.
async fn run_async(config: Config, targets: TargetList, once: bool) -> Result<()> {
    let shutdown = ShutdownSignal::new();
    let signal_handle = shutdown.listen_for_signals();

    let mut monitor = Monitor::from_config(&config, targets).context("failed to build monitor")?;

    if once {
        monitor = monitor.with_max_rounds(1);
    }

    let mut metrics_handle = None;
    if config.global.metrics.enabled {
        let collector = MetricsCollector::new();
        let server = MetricsServer::bind(
            config.global.metrics.address,
            config.global.metrics.path.clone(),
            collector.clone(),
        )
        .await
        .with_context(|| {
            format!(
                "failed to bind metrics server to {}",
                config.global.metrics.address
            )
        })?;

        metrics_handle = Some(tokio::spawn(server.run(shutdown.subscribe())));
        monitor = monitor.with_metrics(collector);
    }

    let rounds = monitor.run(shutdown.subscribe()).await;

    // Stop the metrics server when the monitor finishes on its own
    shutdown.shutdown();
    signal_handle.abort();

    if let Some(handle) = metrics_handle {
        if let Err(e) = handle.await {
            error!(error = %e, "metrics server task failed");
        }
    }

    info!(rounds, "sitewatch shut down complete");
    Ok(())
}
