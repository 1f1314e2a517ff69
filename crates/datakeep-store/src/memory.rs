//! In-memory tier for tests and embedded use

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use datakeep_domain::path::validate_collector_name;
use datakeep_domain::{
    ArtifactMeta, ArtifactPath, ArtifactStore, PartitionDate, StoreError, StoreKey, TierStat,
};

struct StoredObject {
    bytes: Vec<u8>,
    modified: DateTime<Utc>,
}

/// BTreeMap-backed tier holding everything in process memory
///
/// Honors the full store contract, including alias handling and key
/// validation, so archival and resolver logic can be exercised without a
/// filesystem or network. Listing order falls out of the map's key order,
/// which matches lexicographic relative paths.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, BTreeMap<String, StoredObject>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn check(collector: &str, relative: &str) -> Result<(), StoreError> {
        validate_collector_name(collector)?;
        StoreKey::parse(relative)?;
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn put(
        &self,
        collector: &str,
        relative: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StoreError> {
        Self::check(collector, relative)?;
        let mut objects = self.objects.write().await;
        objects.entry(collector.to_string()).or_default().insert(
            relative.to_string(),
            StoredObject {
                bytes,
                modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, collector: &str, relative: &str) -> Result<Vec<u8>, StoreError> {
        Self::check(collector, relative)?;
        let objects = self.objects.read().await;
        objects
            .get(collector)
            .and_then(|c| c.get(relative))
            .map(|o| o.bytes.clone())
            .ok_or_else(|| StoreError::not_found(collector, relative))
    }

    async fn exists(&self, collector: &str, relative: &str) -> Result<bool, StoreError> {
        Self::check(collector, relative)?;
        let objects = self.objects.read().await;
        Ok(objects
            .get(collector)
            .is_some_and(|c| c.contains_key(relative)))
    }

    async fn list(
        &self,
        collector: &str,
        date: Option<PartitionDate>,
    ) -> Result<Vec<ArtifactMeta>, StoreError> {
        validate_collector_name(collector)?;
        let objects = self.objects.read().await;
        let mut metas = Vec::new();
        if let Some(entries) = objects.get(collector) {
            for (relative, object) in entries {
                let Ok(path) = ArtifactPath::parse(relative) else {
                    // the latest alias
                    continue;
                };
                if date.is_some_and(|d| path.date() != d) {
                    continue;
                }
                metas.push(ArtifactMeta {
                    collector: collector.to_string(),
                    path,
                    size_bytes: object.bytes.len() as u64,
                    last_modified: object.modified,
                });
            }
        }
        Ok(metas)
    }

    async fn list_dates(&self, collector: &str) -> Result<Vec<PartitionDate>, StoreError> {
        let mut dates: Vec<PartitionDate> = self
            .list(collector, None)
            .await?
            .into_iter()
            .map(|m| m.partition_date())
            .collect();
        dates.dedup();
        Ok(dates)
    }

    async fn delete(&self, collector: &str, relative: &str) -> Result<(), StoreError> {
        Self::check(collector, relative)?;
        let mut objects = self.objects.write().await;
        let removed = objects
            .get_mut(collector)
            .and_then(|c| c.remove(relative));
        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(collector, relative)),
        }
    }

    async fn stat(&self, collector: &str) -> Result<TierStat, StoreError> {
        let mut stat = TierStat::default();
        for meta in self.list(collector, None).await? {
            stat.record(meta.size_bytes);
        }
        Ok(stat)
    }

    async fn list_collectors(&self) -> Result<Vec<String>, StoreError> {
        let objects = self.objects.read().await;
        Ok(objects
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }
}
