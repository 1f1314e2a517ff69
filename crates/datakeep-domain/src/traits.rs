//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Tier backends and concrete collectors live in other
//! crates.

use std::time::Duration;

use async_trait::async_trait;

use crate::artifact::{ArtifactMeta, TierStat};
use crate::error::StoreError;
use crate::path::PartitionDate;

/// Contract implemented by every storage tier
///
/// Implemented by the infrastructure layer (datakeep-store) for the local
/// filesystem and remote object storage. The contract is identical across
/// tiers so archival and read-through code never branch on the backend.
///
/// Relative paths are validated against [`crate::StoreKey`]: a
/// date-partitioned artifact path or the per-collector `latest` alias.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store a payload under `collector/relative_path`
    ///
    /// Atomic for concurrent readers: a reader sees the old bytes, the new
    /// bytes, or `NotFound`, never a partial write. Re-putting an existing
    /// key replaces it (last write wins).
    async fn put(
        &self,
        collector: &str,
        relative: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Fetch a payload, `StoreError::NotFound` on miss
    async fn get(&self, collector: &str, relative: &str) -> Result<Vec<u8>, StoreError>;

    /// Probe for a key using metadata only, no payload transfer
    async fn exists(&self, collector: &str, relative: &str) -> Result<bool, StoreError>;

    /// List artifact metadata, lexicographic by relative path
    ///
    /// `date` narrows the listing to one partition. The `latest` alias and
    /// anything not date-partitioned are excluded.
    async fn list(
        &self,
        collector: &str,
        date: Option<PartitionDate>,
    ) -> Result<Vec<ArtifactMeta>, StoreError>;

    /// Distinct partition dates present, derived from key structure alone
    async fn list_dates(&self, collector: &str) -> Result<Vec<PartitionDate>, StoreError>;

    /// Remove a key, `StoreError::NotFound` if absent
    async fn delete(&self, collector: &str, relative: &str) -> Result<(), StoreError>;

    /// Aggregate artifact count and bytes for a collector (alias excluded)
    async fn stat(&self, collector: &str) -> Result<TierStat, StoreError>;

    /// Collector namespaces present in this tier
    async fn list_collectors(&self) -> Result<Vec<String>, StoreError>;

    /// Remove empty date directories bottom-up, returning how many went
    ///
    /// Only meaningful for tiers with real directories; object stores have
    /// none and report zero.
    async fn remove_empty_dirs(&self, collector: &str) -> Result<u32, StoreError> {
        let _ = collector;
        Ok(0)
    }
}

/// Payload produced by one collector run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Raw artifact bytes
    pub bytes: Vec<u8>,

    /// MIME type recorded with the artifact
    pub content_type: String,

    /// Filename extension (no leading dot) for the dated key
    pub extension: String,
}

impl Payload {
    /// JSON payload, the common case
    pub fn json(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: "application/json".to_string(),
            extension: "json".to_string(),
        }
    }
}

/// Trait for periodic dataset collectors
///
/// Implemented by the application embedding this subsystem; the scheduler
/// (datakeep-scheduler) drives registered collectors and writes their
/// payloads through the local tier.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Unique collector name; becomes the storage namespace
    fn name(&self) -> &str;

    /// How often this collector should run
    fn interval(&self) -> Duration;

    /// Fetch one payload from the upstream source
    async fn collect(&self) -> anyhow::Result<Payload>;
}
