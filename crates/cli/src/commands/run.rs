//! `run` subcommand: simulated collectors through the syncer.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};
use collectors::{SimulatedCollector, SimulatedCollectorConfig};
use contracts::{MeasurementCollector, SyncerConfig};
use config_loader::ConfigLoader;
use observability::{EmissionStats, LogFormat, ObservabilityConfig};
use syncer::MeasurementSyncer;
use tracing::{debug, info, warn};

use crate::cli::RunArgs;

pub fn run(args: RunArgs) -> Result<()> {
    let config = load_config(&args)?;

    observability::init_with_config(ObservabilityConfig {
        log_format: parse_log_format(&args.log_format)?,
        metrics_port: args.metrics_port,
        default_log_level: "info".to_string(),
    })?;

    info!(
        primary = %config.primary.channel,
        secondaries = config.secondaries.len(),
        duration_secs = args.duration_secs,
        "starting simulated syncer run"
    );

    let collectors: Vec<Box<dyn MeasurementCollector>> = config
        .channels()
        .map(|channel_config| {
            let simulated = SimulatedCollector::new(
                channel_config.channel,
                channel_config.variant,
                SimulatedCollectorConfig::default().with_delay(channel_config.delay),
            );
            Box::new(simulated) as Box<dyn MeasurementCollector>
        })
        .collect();

    let syncer = MeasurementSyncer::new(config, collectors)?;

    let stats = Arc::new(Mutex::new(EmissionStats::new()));
    let sink = stats.clone();
    syncer.set_synced_listener(Some(Arc::new(move |synced| {
        observability::record_synced_measurement(synced);
        let mut stats = sink.lock().unwrap_or_else(|p| p.into_inner());
        stats.observe(synced);
        debug!(
            timestamp_ns = synced.timestamp_ns,
            slots = synced.slots.len(),
            "synced measurement"
        );
    })));
    syncer.set_stale_listener(Some(Arc::new(|batch| {
        observability::record_stale_batch(batch.len());
        warn!(discarded = batch.len(), "stale measurements discarded");
    })));
    syncer.set_buffer_filled_listener(Some(Arc::new(|channel| {
        warn!(%channel, "buffer filled, session stopped");
    })));

    syncer.start(None)?;
    thread::sleep(Duration::from_secs_f64(args.duration_secs.max(0.0)));

    let processed = syncer.number_of_processed_measurements();
    for channel_config in syncer.config().channels() {
        let channel = channel_config.channel;
        debug!(
            %channel,
            buffer_usage = ?syncer.buffer_usage(channel),
            collector_usage = ?syncer.collector_usage(channel),
            start_offset_ns = ?syncer.collector_start_offset_ns(channel),
            "channel state before shutdown"
        );
    }
    syncer.stop();

    let summary = stats.lock().unwrap_or_else(|p| p.into_inner()).summary();
    info!(
        processed,
        emitted = summary.count,
        span_ns = summary.span_ns,
        min_interval_ns = ?summary.min_interval_ns,
        max_interval_ns = ?summary.max_interval_ns,
        "run complete"
    );

    Ok(())
}

fn load_config(args: &RunArgs) -> Result<SyncerConfig> {
    match &args.config {
        Some(path) => Ok(ConfigLoader::load_from_path(path)?),
        None => Ok(SyncerConfig::default()),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat> {
    match value {
        "json" => Ok(LogFormat::Json),
        "pretty" => Ok(LogFormat::Pretty),
        "compact" => Ok(LogFormat::Compact),
        other => bail!("unsupported log format: {other}"),
    }
}
