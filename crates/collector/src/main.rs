//! Loghive collector - log ingestion and rotation service
//!
//! # Usage
//!
//! ```bash
//! loghive
//! loghive --config configs/config.toml
//! loghive --log-level debug
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use loghive_config::{Config, DispatchPolicy, LogFormat};
use loghive_pipeline::{
    ring, BatchAccumulator, Consumer, Dispatch, FlushTimer, RecordSink, Shutdown,
};
use loghive_sinks::{RotatingWriter, RotatingWriterConfig};
use loghive_sources::{BulkImporter, HttpSource, HttpSourceConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Loghive collector - log ingestion and rotation service
#[derive(Parser, Debug)]
#[command(name = "loghive")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "configs/config.toml")]
    config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or_else(|| config.log.level.as_str());
    init_logging(level, config.log.format)?;

    run(config).await
}

/// Wire the pipeline and serve until interrupted
async fn run(config: Config) -> Result<()> {
    let writer_config = RotatingWriterConfig::default()
        .with_directory(&config.writer.directory)
        .with_prefix(&config.writer.file_prefix)
        .with_workers(config.writer.workers)
        .with_shutdown_grace(Duration::from_secs(config.writer.shutdown_grace_secs));
    let writer = Arc::new(RotatingWriter::new(writer_config).context("starting rotating writer")?);

    let (producer, receiver) = ring(config.pipeline.capacity);
    let shutdown = Arc::new(Shutdown::new());

    let sink: Arc<dyn RecordSink> = writer.clone();
    let mut flush_timer = None;
    let dispatch = match config.pipeline.dispatch {
        DispatchPolicy::PerRecord => Dispatch::PerRecord(sink),
        DispatchPolicy::Batched => {
            let accumulator = Arc::new(BatchAccumulator::new(
                sink,
                config.pipeline.batch_threshold,
            ));
            flush_timer = Some(
                FlushTimer::start(
                    Arc::clone(&accumulator),
                    Duration::from_secs(config.pipeline.batch_interval_secs),
                    Arc::clone(&shutdown),
                )
                .context("starting flush timer")?,
            );
            Dispatch::Batched(accumulator)
        }
    };

    let consumer = Consumer::spawn(receiver, dispatch).context("starting consumer")?;

    let importer = Arc::new(BulkImporter::new(producer.clone(), Arc::clone(&shutdown)));

    let http_config = HttpSourceConfig {
        address: config.server.address.clone(),
        port: config.server.port,
        max_upload_size: config.server.max_upload_size,
    };
    let source = HttpSource::new(http_config, producer.clone(), importer);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            signal_cancel.cancel();
        }
    });

    let serve_result = source.run(cancel).await;

    // Drain back-to-front: stop intake, finish consuming, then let the
    // accumulator and writer flush what they still hold.
    producer.close();
    let consumed = consumer.join();
    shutdown.trigger();
    if let Some(timer) = flush_timer {
        timer.stop();
    }
    writer.shutdown();

    tracing::info!(consumed, "collector stopped");

    serve_result.context("HTTP source failed")
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }

    Ok(())
}
