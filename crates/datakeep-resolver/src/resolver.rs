//! Read-through resolution across the local and remote tiers

use std::sync::Arc;

use datakeep_domain::{
    ArtifactMeta, ArtifactStore, PartitionDate, Source, StoreError, LATEST_ALIAS,
};
use tracing::{debug, warn};

/// A value read through the tiers, tagged with the tier that answered
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,

    /// Tier that answered the read
    pub source: Source,
}

impl<T> Resolved<T> {
    fn local(value: T) -> Self {
        Self {
            value,
            source: Source::Local,
        }
    }

    fn remote(value: T) -> Self {
        Self {
            value,
            source: Source::Remote,
        }
    }
}

/// Local-first reader over both storage tiers
///
/// Every read goes to the local tier first and falls through to the remote
/// tier only on `NotFound`, so recent data is served from disk and archived
/// data remains transparently reachable. Reads never mutate either tier.
///
/// Without a remote tier the resolver serves local data only; archived
/// lookups simply miss.
pub struct Resolver {
    local: Arc<dyn ArtifactStore>,
    remote: Option<Arc<dyn ArtifactStore>>,
}

impl Resolver {
    /// Create a resolver over the given tiers
    pub fn new(local: Arc<dyn ArtifactStore>, remote: Option<Arc<dyn ArtifactStore>>) -> Self {
        Self { local, remote }
    }

    /// Whether a remote tier is available for fallback
    pub fn remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    /// Fetch one artifact, local tier first
    ///
    /// `NotFound` only when both tiers miss; a hard failure of the tier
    /// being queried surfaces as-is.
    pub async fn get(
        &self,
        collector: &str,
        relative: &str,
    ) -> Result<Resolved<Vec<u8>>, StoreError> {
        match self.local.get(collector, relative).await {
            Ok(bytes) => return Ok(Resolved::local(bytes)),
            Err(StoreError::NotFound { .. }) => {}
            Err(err) => return Err(err),
        }
        let Some(remote) = &self.remote else {
            return Err(StoreError::not_found(collector, relative));
        };
        debug!(collector, relative, "local miss, reading remote tier");
        remote.get(collector, relative).await.map(Resolved::remote)
    }

    /// List artifacts for a collector
    ///
    /// Without a date this is a recency listing and stays local. With a
    /// date, an empty local partition falls through to the remote tier;
    /// the result is tagged `Remote` only when the remote tier actually
    /// supplied artifacts. A remote listing failure degrades to the local
    /// result instead of erroring.
    pub async fn list_files(
        &self,
        collector: &str,
        date: Option<PartitionDate>,
    ) -> Result<Resolved<Vec<ArtifactMeta>>, StoreError> {
        let local = self.local.list(collector, date).await?;
        let Some(date) = date else {
            return Ok(Resolved::local(local));
        };
        if !local.is_empty() {
            return Ok(Resolved::local(local));
        }
        let Some(remote) = &self.remote else {
            return Ok(Resolved::local(local));
        };
        match remote.list(collector, Some(date)).await {
            Ok(metas) if !metas.is_empty() => Ok(Resolved::remote(metas)),
            Ok(_) => Ok(Resolved::local(local)),
            Err(err) => {
                warn!(collector, %date, error = %err, "remote listing failed, serving local result");
                Ok(Resolved::local(local))
            }
        }
    }

    /// Distinct partition dates across both tiers, newest first
    ///
    /// A remote tier outage degrades the answer to local dates only.
    pub async fn list_dates(&self, collector: &str) -> Result<Vec<PartitionDate>, StoreError> {
        let mut dates = self.local.list_dates(collector).await?;
        if let Some(remote) = &self.remote {
            match remote.list_dates(collector).await {
                Ok(remote_dates) => dates.extend(remote_dates),
                Err(err) => {
                    warn!(collector, error = %err, "remote dates unavailable, serving local only");
                }
            }
        }
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        Ok(dates)
    }

    /// The most recent payload for a collector
    ///
    /// Resolution order: local `latest` alias, remote `latest` alias, then
    /// the newest local artifact by path. `NotFound` when all three miss.
    pub async fn latest(&self, collector: &str) -> Result<Resolved<Vec<u8>>, StoreError> {
        match self.local.get(collector, LATEST_ALIAS).await {
            Ok(bytes) => return Ok(Resolved::local(bytes)),
            Err(StoreError::NotFound { .. }) => {}
            Err(err) => return Err(err),
        }
        if let Some(remote) = &self.remote {
            match remote.get(collector, LATEST_ALIAS).await {
                Ok(bytes) => return Ok(Resolved::remote(bytes)),
                Err(StoreError::NotFound { .. }) => {}
                Err(err) => return Err(err),
            }
        }

        let metas = self.local.list(collector, None).await?;
        let Some(newest) = metas.last() else {
            return Err(StoreError::not_found(collector, LATEST_ALIAS));
        };
        debug!(collector, key = %newest.key(), "no alias present, serving newest artifact");
        let bytes = self.local.get(collector, &newest.path.relative()).await?;
        Ok(Resolved::local(bytes))
    }
}
