// Periodic sampler: one collector call per tick, published to every client.
// A failed or slow collection still produces a (placeholder) tick on schedule.

use std::sync::Arc;
use tokio::time::{Duration, Instant, interval, timeout};
use tracing::Instrument;

use crate::broadcast::Broadcaster;
use crate::collector::MetricCollector;
use crate::error::CollectionError;
use crate::models::Snapshot;

/// Rate limit for the "no clients" debug line (avoid logging every tick when nobody is watching)
const NO_CLIENTS_LOG_INTERVAL: Duration = Duration::from_secs(60);

pub struct SamplerConfig {
    pub interval_ms: u64,
    pub collect_timeout_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

impl SamplerConfig {
    pub fn from_app_config(config: &crate::config::SamplingConfig) -> Self {
        Self {
            interval_ms: config.interval_ms,
            collect_timeout_ms: config.collect_timeout_ms,
            stats_log_interval_secs: config.stats_log_interval_secs,
        }
    }
}

/// Run one collection bounded by `limit`, degrading to a placeholder on error or timeout.
/// The returned snapshot carries `generation` and a timestamp.
pub async fn sample_once<C: MetricCollector>(
    collector: &C,
    generation: u64,
    limit: Duration,
) -> Snapshot {
    let result = match timeout(limit, collector.collect()).await {
        Ok(r) => r,
        Err(_) => Err(CollectionError::Timeout(limit)),
    };
    let mut snapshot = match result {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(
                error = %e,
                generation,
                operation = "collect_snapshot",
                "collection failed; publishing placeholder snapshot"
            );
            Snapshot::placeholder(generation)
        }
    };
    snapshot.generation = generation;
    if snapshot.current_time.is_empty() {
        let now = chrono::Local::now();
        snapshot.timestamp = now.timestamp_millis().max(0) as u64;
        snapshot.current_time = now.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    snapshot
}

pub fn spawn<C: MetricCollector>(
    collector: Arc<C>,
    broadcaster: Broadcaster,
    config: SamplerConfig,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let SamplerConfig {
        interval_ms,
        collect_timeout_ms,
        stats_log_interval_secs,
    } = config;
    let collect_timeout = Duration::from_millis(collect_timeout_ms);
    let stats_log_interval = Duration::from_secs(stats_log_interval_secs);

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(stats_log_interval);
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut generation: u64 = 0;
        let mut degraded_total: u64 = 0;
        let mut last_no_clients_log: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    generation += 1;
                    let snapshot = sample_once(collector.as_ref(), generation, collect_timeout).await;
                    if snapshot.is_degraded() {
                        degraded_total += 1;
                    }
                    match broadcaster.publish(&snapshot) {
                        Ok(report) => {
                            if report.delivered == 0 {
                                let should_log = last_no_clients_log
                                    .is_none_or(|t| t.elapsed() >= NO_CLIENTS_LOG_INTERVAL);
                                if should_log {
                                    tracing::debug!(
                                        operation = "broadcast_snapshot",
                                        "No connected clients; snapshot kept as latest only"
                                    );
                                    last_no_clients_log = Some(Instant::now());
                                }
                            }
                            if report.removed > 0 {
                                tracing::info!(
                                    removed = report.removed,
                                    generation = report.generation,
                                    "Dropped disconnected clients during broadcast"
                                );
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                generation,
                                operation = "serialize_snapshot",
                                "snapshot serialization failed; tick dropped"
                            );
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Sampler shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ws_clients = broadcaster.client_count(),
                        snapshots_published_total = broadcaster.published_total(),
                        snapshots_degraded_total = degraded_total,
                        clients_removed_total = broadcaster.removed_total(),
                        "app stats"
                    );
                }
            }
        }
    }
    .instrument(tracing::debug_span!("sampler", interval_ms)))
}
