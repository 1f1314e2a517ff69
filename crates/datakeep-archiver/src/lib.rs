//! Datakeep Archiver
//!
//! Scheduled migration of aged artifacts from the local filesystem tier to
//! remote object storage.
//!
//! # Overview
//!
//! The archiver is responsible for:
//! - **Retention**: deciding which partition dates have aged out of the
//!   local tier, in whole calendar days
//! - **Migration**: copying each eligible artifact to the remote tier and
//!   removing the local copy only after the remote key is confirmed
//! - **Compaction**: removing date directories emptied by migration
//! - **Reporting**: publishing per-cycle counters for status endpoints
//!
//! # Durability
//!
//! Every migration follows copy-verify-delete ordering. An artifact is
//! readable from at least one tier at every point in the cycle; a crash,
//! cancellation, or failed upload leaves the local copy in place and the
//! next cycle picks it up again. Artifacts already present remotely are
//! not re-uploaded, so interrupted cycles are safe to re-run.
//!
//! # Usage
//!
//! ## One-off Cycle
//!
//! ```no_run
//! use std::sync::Arc;
//! use datakeep_archiver::{ArchiveConfig, ArchiveJob};
//! use datakeep_store::MemoryStore;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let local = Arc::new(MemoryStore::new());
//! let remote = Arc::new(MemoryStore::new());
//! let job = ArchiveJob::new(local, remote, ArchiveConfig::default());
//!
//! if let Some(report) = job.run_cycle(&CancellationToken::new()).await? {
//!     println!("{}", report.summary());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker
//!
//! ```no_run
//! use std::sync::Arc;
//! use datakeep_archiver::{ArchiveConfig, ArchiveJob, ArchiveWorker};
//! use datakeep_store::MemoryStore;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ArchiveConfig::default();
//! let job = Arc::new(ArchiveJob::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryStore::new()),
//!     config.clone(),
//! ));
//!
//! // Runs one cycle per day at config.archive_time until cancelled
//! let worker = ArchiveWorker::new(job, &config)?;
//! worker.run(CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```
//! use datakeep_archiver::ArchiveConfig;
//!
//! // Default: 7-day retention, nightly at 03:00, 4 collectors in parallel
//! let config = ArchiveConfig::default();
//!
//! // Archival off: everything stays on the local tier
//! let config = ArchiveConfig::disabled();
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod job;
mod report;
mod retry;
mod worker;

pub use config::ArchiveConfig;
pub use error::ArchiveError;
pub use job::ArchiveJob;
pub use report::{CollectorCycleResult, CycleReport, ReportSlot};
pub use retry::RetryPolicy;
pub use worker::ArchiveWorker;
