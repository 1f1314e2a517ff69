//! Datakeep Scheduler
//!
//! Interval-driven execution of registered collectors, writing each payload
//! to the local storage tier.
//!
//! # Overview
//!
//! A [`Collector`](datakeep_domain::Collector) fetches one payload from an
//! upstream source; this crate decides when to call it and where the bytes
//! land. Every registered collector runs once at startup, then on its own
//! interval. Each successful run writes the dated artifact under today's
//! partition plus the mutable `latest` alias. A failing collector is logged
//! and counted, and its slot simply comes around again.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use datakeep_scheduler::{CollectorRegistry, Scheduler};
//! use datakeep_store::MemoryStore;
//! use tokio_util::sync::CancellationToken;
//!
//! # use std::time::Duration;
//! # use async_trait::async_trait;
//! # use datakeep_domain::{Collector, Payload};
//! # struct WeatherCollector;
//! # #[async_trait]
//! # impl Collector for WeatherCollector {
//! #     fn name(&self) -> &str { "weather" }
//! #     fn interval(&self) -> Duration { Duration::from_secs(600) }
//! #     async fn collect(&self) -> anyhow::Result<Payload> {
//! #         Ok(Payload::json(b"{}".to_vec()))
//! #     }
//! # }
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = CollectorRegistry::new();
//! registry.register(Arc::new(WeatherCollector))?;
//!
//! let scheduler = Scheduler::new(Arc::new(MemoryStore::new()), registry);
//! scheduler.run(CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod registry;
mod scheduler;

pub use error::SchedulerError;
pub use registry::CollectorRegistry;
pub use scheduler::{CollectorStatus, Scheduler};
