//! Datakeep Domain Layer
//!
//! This crate contains the core domain model for Datakeep's tiered artifact
//! storage: the key scheme, artifact metadata, the retention policy, and the
//! trait contract every storage tier implements. Infrastructure (filesystem,
//! S3) lives in other crates.
//!
//! ## Key Concepts
//!
//! - **Artifact**: one immutable collected payload, keyed by collector name
//!   and a date-partitioned relative path
//! - **Partition date**: the calendar date encoded in an artifact's path,
//!   the unit the retention policy reasons about
//! - **Tier**: a storage backend implementing [`ArtifactStore`]; reads are
//!   tagged with the [`Source`] tier that served them
//! - **Latest alias**: one well-known mutable key per collector pointing at
//!   the most recent payload; excluded from listings and migration
//!
//! ## Architecture
//!
//! - Value types validate at construction; a parsed [`ArtifactPath`] is
//!   always a well-formed, traversal-free key
//! - The [`ArtifactStore`] contract is identical across tiers, so archival
//!   and read-through logic never branch on the backend
//! - [`RetentionPolicy`] is pure calendar arithmetic; callers supply "today"

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod error;
pub mod path;
pub mod retention;
pub mod source;
pub mod traits;

// Re-exports for convenience
pub use artifact::{ArtifactMeta, TierStat};
pub use error::StoreError;
pub use path::{ArtifactPath, PartitionDate, StoreKey, LATEST_ALIAS};
pub use retention::RetentionPolicy;
pub use source::Source;
pub use traits::{ArtifactStore, Collector, Payload};
