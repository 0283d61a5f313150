use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use vigil::ingest::{self, IngestDispatcher};
use vigil::registry::InMemoryRegistry;
use vigil::transport::{MessageSource, TransportMessage};
use vigil::{Config, LivenessMonitor, SnapshotReader};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Machine liveness registry and status aggregation", long_about = None)]
#[command(version)]
struct Cli {
    /// Seconds without a report before an agent is marked offline
    #[arg(long, short = 't', value_parser = clap::value_parser!(u64).range(1..))]
    offline_threshold: Option<u64>,

    /// Seconds between liveness sweeps
    #[arg(long, short = 's', value_parser = clap::value_parser!(u64).range(1..))]
    sweep_interval: Option<u64>,

    /// Seconds between fleet summaries (0 disables)
    #[arg(long, short = 'i', default_value_t = 10)]
    summary_interval: u64,

    /// Topic namespace the transport is subscribed to
    #[arg(long, short = 'n')]
    namespace: Option<String>,
}

/// Transport handle over stdin, one `topic payload` line per message (the
/// shape `mosquitto_sub -v` emits). Keeps the broker itself external.
struct StdinSource {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinSource {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait]
impl MessageSource for StdinSource {
    async fn recv(&mut self) -> Option<TransportMessage> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match line.split_once(' ') {
                        Some((topic, payload)) => {
                            return Some(TransportMessage::new(
                                topic,
                                payload.trim().as_bytes().to_vec(),
                            ));
                        }
                        None => log::warn!("ignoring line without a topic/payload separator"),
                    }
                }
                Ok(None) => return None,
                Err(err) => {
                    log::error!("stdin transport failed: {}", err);
                    return None;
                }
            }
        }
    }
}

fn print_summary(reader: &SnapshotReader<InMemoryRegistry>) {
    let records = match reader.read_all() {
        Ok(records) => records,
        Err(err) => {
            log::error!("summary read failed: {}", err);
            return;
        }
    };

    if records.is_empty() {
        println!("No agents reporting yet");
        return;
    }

    let now = Utc::now();
    println!("===== {} agents =====", records.len());
    for record in records {
        println!(
            "{} ({}) [{}] last seen {}s ago | cpu {:.1}% mem {:.1}% disk {:.1}%",
            record.snapshot.hostname,
            record.id,
            record.liveness.as_str(),
            record.seconds_since_seen(now).max(0),
            record.snapshot.cpu.usage_percent,
            record.snapshot.memory.usage_percent,
            record.snapshot.storage.usage_percent,
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(secs) = cli.offline_threshold {
        config.offline_threshold_secs = secs;
    }
    if let Some(secs) = cli.sweep_interval {
        config.sweep_interval_secs = secs;
    }
    if let Some(namespace) = cli.namespace {
        config.topic_namespace = namespace;
    }

    let registry = Arc::new(InMemoryRegistry::new());
    let dispatcher = IngestDispatcher::new(registry.clone(), config.topic_namespace.clone());
    let monitor = LivenessMonitor::new(
        registry.clone(),
        config.offline_threshold_secs,
        Duration::from_secs(config.sweep_interval_secs),
    );

    let (stop_tx, stop_rx) = watch::channel(false);

    let monitor_stop = stop_rx.clone();
    let monitor_task = tokio::spawn(async move {
        monitor.run(monitor_stop).await;
    });

    let summary_task = if cli.summary_interval > 0 {
        let reader = SnapshotReader::new(registry.clone());
        let mut summary_stop = stop_rx.clone();
        let interval = Duration::from_secs(cli.summary_interval);
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => print_summary(&reader),
                    _ = summary_stop.changed() => {
                        if *summary_stop.borrow() {
                            break;
                        }
                    }
                }
            }
        }))
    } else {
        None
    };

    log::info!(
        "monitoring namespace {} (offline threshold {}s, sweep every {}s)",
        config.topic_namespace,
        config.offline_threshold_secs,
        config.sweep_interval_secs
    );

    tokio::select! {
        _ = ingest::run_ingest(&dispatcher, StdinSource::new(), stop_rx.clone()) => {}
        _ = tokio::signal::ctrl_c() => {
            log::info!("shutting down");
        }
    }

    let _ = stop_tx.send(true);
    monitor_task.await?;
    if let Some(task) = summary_task {
        task.await?;
    }

    print_summary(&SnapshotReader::new(registry));
    Ok(())
}
