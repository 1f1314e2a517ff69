//! Interval-driven collector loop

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use datakeep_domain::{
    ArtifactPath, ArtifactStore, Collector, PartitionDate, Payload, StoreError, LATEST_ALIAS,
};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{CollectorRegistry, SchedulerError};

/// Operational counters for one registered collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorStatus {
    /// Collector name
    pub name: String,

    /// Configured run interval
    pub interval: Duration,

    /// Completed run attempts, including failed ones
    pub run_count: u64,

    /// Attempts that failed to collect or store
    pub error_count: u64,

    /// Start time of the last successful run
    pub last_run: Option<DateTime<Utc>>,
}

struct CollectorState {
    interval: Duration,
    next_run: Option<Instant>,
    run_count: u64,
    error_count: u64,
    last_run: Option<DateTime<Utc>>,
}

/// Per-collector scheduling state, keyed by name
///
/// Everything the loop needs lives here behind one lock, so status queries
/// can run while the loop holds `&self`.
#[derive(Default)]
struct SchedulerState {
    collectors: BTreeMap<String, CollectorState>,
}

/// Drives registered collectors on their intervals
///
/// Every collector runs once at startup, then again each time its interval
/// elapses. A run fetches one payload and writes it to the local tier as
/// the dated artifact plus the `latest` alias. Runs are sequential; each
/// collector is the only producer for its namespace, and re-running within
/// the same minute replaces the dated key (last write wins).
///
/// Collector and storage failures are logged and counted, never fatal to
/// the loop.
pub struct Scheduler {
    store: Arc<dyn ArtifactStore>,
    registry: CollectorRegistry,
    state: RwLock<SchedulerState>,
}

impl Scheduler {
    /// Create a scheduler writing to the given local tier
    pub fn new(store: Arc<dyn ArtifactStore>, registry: CollectorRegistry) -> Self {
        let collectors = registry
            .collectors()
            .map(|collector| {
                (
                    collector.name().to_string(),
                    CollectorState {
                        interval: collector.interval(),
                        next_run: None,
                        run_count: 0,
                        error_count: 0,
                        last_run: None,
                    },
                )
            })
            .collect();
        Self {
            store,
            registry,
            state: RwLock::new(SchedulerState { collectors }),
        }
    }

    /// Run until cancelled
    ///
    /// With an empty registry the scheduler parks until cancellation so a
    /// service embedding it can treat "nothing to collect" as a valid
    /// configuration.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), SchedulerError> {
        if self.registry.is_empty() {
            info!("no collectors registered, scheduler idle");
            cancel.cancelled().await;
            return Ok(());
        }

        info!(collectors = self.registry.len(), "scheduler started");

        for collector in self.registry.collectors() {
            if cancel.is_cancelled() {
                break;
            }
            self.run_collector(collector.as_ref()).await;
        }

        while !cancel.is_cancelled() {
            let Some(deadline) = self.next_deadline() else {
                break;
            };
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    for name in self.due_collectors(Instant::now()) {
                        if cancel.is_cancelled() {
                            break;
                        }
                        if let Some(collector) = self.registry.get(&name) {
                            self.run_collector(collector.as_ref()).await;
                        }
                    }
                }
                _ = cancel.cancelled() => break,
            }
        }

        info!("scheduler stopped");
        for status in self.status() {
            info!(
                collector = %status.name,
                runs = status.run_count,
                errors = status.error_count,
                "collector totals"
            );
        }
        Ok(())
    }

    /// Counters for every registered collector, in name order
    pub fn status(&self) -> Vec<CollectorStatus> {
        let state = match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state
            .collectors
            .iter()
            .map(|(name, collector)| CollectorStatus {
                name: name.clone(),
                interval: collector.interval,
                run_count: collector.run_count,
                error_count: collector.error_count,
                last_run: collector.last_run,
            })
            .collect()
    }

    /// One collect-and-store attempt, outcome absorbed into the counters
    async fn run_collector(&self, collector: &dyn Collector) {
        let name = collector.name().to_string();
        let started = Local::now();
        debug!(collector = %name, "collecting");

        let outcome = match collector.collect().await {
            Ok(payload) => {
                let bytes = payload.bytes.len();
                self.store_payload(&name, started, payload)
                    .await
                    .map(|key| (key, bytes))
                    .map_err(|e| e.to_string())
            }
            Err(e) => Err(format!("{:#}", e)),
        };

        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let Some(entry) = state.collectors.get_mut(&name) else {
            return;
        };
        entry.run_count += 1;
        entry.next_run = Some(Instant::now() + entry.interval);
        match outcome {
            Ok((key, bytes)) => {
                entry.last_run = Some(started.with_timezone(&Utc));
                info!(collector = %name, key = %key, bytes, "stored artifact");
            }
            Err(error) => {
                entry.error_count += 1;
                error!(collector = %name, error = %error, "collection failed");
            }
        }
    }

    /// Write the dated artifact and refresh the `latest` alias
    async fn store_payload(
        &self,
        name: &str,
        at: DateTime<Local>,
        payload: Payload,
    ) -> Result<String, StoreError> {
        let date = PartitionDate::new(at.date_naive());
        let filename = format!("{}_{}.{}", name, at.format("%H%M"), payload.extension);
        let relative = ArtifactPath::new(date, filename)?.relative();
        self.store
            .put(name, &relative, payload.bytes.clone(), &payload.content_type)
            .await?;
        self.store
            .put(name, LATEST_ALIAS, payload.bytes, &payload.content_type)
            .await?;
        Ok(relative)
    }

    fn next_deadline(&self) -> Option<Instant> {
        let state = match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state
            .collectors
            .values()
            .filter_map(|collector| collector.next_run)
            .min()
    }

    fn due_collectors(&self, now: Instant) -> Vec<String> {
        let state = match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state
            .collectors
            .iter()
            .filter(|(_, collector)| collector.next_run.is_some_and(|at| at <= now))
            .map(|(name, _)| name.clone())
            .collect()
    }
}
