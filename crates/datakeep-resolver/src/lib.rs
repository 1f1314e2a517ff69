//! Datakeep Resolver
//!
//! Read-through access to artifacts across the local and remote storage
//! tiers, plus status reporting over both.
//!
//! # Overview
//!
//! Once the archiver starts migrating aged artifacts off the local
//! filesystem, a single-tier reader would see archived data vanish. The
//! resolver hides the tier split:
//! - **Reads** go local-first and fall through to the remote tier on a
//!   miss, with the answering tier tagged on every result
//! - **Listings** merge what both tiers know, preferring the local copy
//!   when an artifact exists on both
//! - **Status** reports per-collector usage of each tier alongside the
//!   most recent archive cycle
//!
//! A remote outage never takes reads down: listings degrade to the local
//! tier with a warning, and only a direct fetch of a remote-only artifact
//! surfaces the error.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use datakeep_resolver::Resolver;
//! use datakeep_store::MemoryStore;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let local = Arc::new(MemoryStore::new());
//! let remote = Arc::new(MemoryStore::new());
//! let resolver = Resolver::new(local, Some(remote));
//!
//! let resolved = resolver.latest("prices").await?;
//! println!("{} bytes from {}", resolved.value.len(), resolved.source);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod resolver;
mod status;

pub use resolver::{Resolved, Resolver};
pub use status::{ArchiveStatus, CollectorStat, StatusReporter};
