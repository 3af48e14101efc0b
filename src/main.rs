use anyhow::Context;
use log::{error, info, warn};
use tokio::sync::mpsc::channel;
use tokio::time::sleep;

use bluewatch::config::AgentConfig;
use bluewatch::device::CLASSIC_INTERFACE;
use bluewatch::reconcile::Reconciler;
use bluewatch::registry::{wait_bootstrap, HttpRegistry, Registry};
use bluewatch::scan::{LeScanner, PolledScanner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mode = args.get(1).map(String::as_str).unwrap_or("poll");

    let config = AgentConfig::from_env().context("loading configuration")?;
    bluewatch::init_logging(config.log_level);

    match mode {
        "poll" => run_poll(config).await,
        "le" => run_le(config).await,
        _ => {
            print_usage();
            Ok(())
        }
    }
}

/// Classic polling daemon: bootstrap, then scan / reconcile / idle forever
async fn run_poll(config: AgentConfig) -> anyhow::Result<()> {
    info!("Bluetooth discovery agent started (polled mode)");

    let registry = HttpRegistry::new(&config).context("building registry client")?;
    wait_bootstrap(&registry, config.bootstrap_retry_interval).await;

    let mut scanner = PolledScanner::new(config.to_scan_config());
    let mut reconciler = Reconciler::new(registry, CLASSIC_INTERFACE);

    loop {
        let outcome = scanner.scan().await;
        reconciler.reconcile(outcome).await;

        // Interruptible idle between cycles
        tokio::select! {
            _ = sleep(config.poll_interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested, stopping polled scan loop");
                return Ok(());
            }
        }
    }
}

/// LE daemon: continuous scan task feeding a channel, one publish per new
/// device. An adapter initialization failure ends the process with an error.
async fn run_le(config: AgentConfig) -> anyhow::Result<()> {
    info!("Bluetooth discovery agent started (LE mode)");

    let registry = HttpRegistry::new(&config).context("building registry client")?;
    wait_bootstrap(&registry, config.bootstrap_retry_interval).await;

    let scanner = LeScanner::new(config.to_scan_config());
    let (tx, mut rx) = channel(scanner.channel_capacity());
    let scan_task = tokio::spawn(scanner.run(tx));

    loop {
        tokio::select! {
            maybe_record = rx.recv() => {
                match maybe_record {
                    Some(record) => {
                        if let Err(e) = registry.publish_one(&record).await {
                            warn!("Failed to publish {}: {}", record.interface, e);
                        }
                    }
                    // Scanner is gone; find out why below
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested, stopping LE scan loop");
                return Ok(());
            }
        }
    }

    match scan_task.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!("LE scan failed: {}", e);
            Err(e.into())
        }
        Err(e) => Err(anyhow::anyhow!("LE scan task panicked: {}", e)),
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  bluewatch poll    - Run the classic polling discovery daemon (default)");
    println!("  bluewatch le      - Run the BLE event-driven discovery daemon");
}
