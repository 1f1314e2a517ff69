//! Local filesystem tier

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::debug;

use datakeep_domain::path::validate_collector_name;
use datakeep_domain::{
    ArtifactMeta, ArtifactPath, ArtifactStore, PartitionDate, StoreError, StoreKey, TierStat,
};

/// Filesystem-backed hot tier
///
/// Keys map directly onto paths under the data root:
/// `{root}/{collector}/{year}/{month}/{day}/{filename}`, with the `latest`
/// alias at `{root}/{collector}/latest.json`. Writes land in a hidden temp
/// file next to the destination and are renamed into place, so a concurrent
/// reader sees the old payload, the new payload, or `NotFound`, never a
/// partial file.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            StoreError::Configuration(format!("cannot create data dir {}: {}", root.display(), e))
        })?;
        Ok(Self { root })
    }

    /// The data root this store serves
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn checked_path(&self, collector: &str, relative: &str) -> Result<PathBuf, StoreError> {
        validate_collector_name(collector)?;
        StoreKey::parse(relative)?;
        let mut path = self.root.join(collector);
        for segment in relative.split('/') {
            path.push(segment);
        }
        Ok(path)
    }

    /// Directory entries of `path`; a missing directory reads as empty
    async fn dir_entries(path: &Path) -> Result<Vec<fs::DirEntry>, StoreError> {
        let mut reader = match fs::read_dir(path).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Transient(format!("{}: {}", path.display(), e)))
            }
        };
        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| StoreError::Transient(format!("{}: {}", path.display(), e)))?
        {
            entries.push(entry);
        }
        Ok(entries)
    }

    async fn subdir_names(path: &Path, len: usize) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in Self::dir_entries(path).await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.len() != len || !name.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if entry
                .file_type()
                .await
                .map_err(|e| StoreError::Transient(e.to_string()))?
                .is_dir()
            {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Artifact metas in one day directory
    async fn day_metas(
        &self,
        collector: &str,
        date: PartitionDate,
    ) -> Result<Vec<ArtifactMeta>, StoreError> {
        let dir = self.root.join(collector).join(date.prefix());
        let mut metas = Vec::new();
        for entry in Self::dir_entries(&dir).await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Ok(path) = ArtifactPath::new(date, name) else {
                // temp files and other non-keys
                continue;
            };
            let meta = entry
                .metadata()
                .await
                .map_err(|e| StoreError::Transient(e.to_string()))?;
            if !meta.is_file() {
                continue;
            }
            metas.push(ArtifactMeta {
                collector: collector.to_string(),
                path,
                size_bytes: meta.len(),
                last_modified: DateTime::<Utc>::from(
                    meta.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH),
                ),
            });
        }
        Ok(metas)
    }

    /// All partition dates with a directory under `collector`, ascending
    async fn partition_dates(&self, collector: &str) -> Result<Vec<PartitionDate>, StoreError> {
        let collector_dir = self.root.join(collector);
        let mut dates = Vec::new();
        for year in Self::subdir_names(&collector_dir, 4).await? {
            let year_dir = collector_dir.join(&year);
            for month in Self::subdir_names(&year_dir, 2).await? {
                let month_dir = year_dir.join(&month);
                for day in Self::subdir_names(&month_dir, 2).await? {
                    if let Some(date) = PartitionDate::from_segments(&year, &month, &day) {
                        dates.push(date);
                    }
                }
            }
        }
        Ok(dates)
    }
}

#[async_trait]
impl ArtifactStore for LocalStore {
    async fn put(
        &self,
        collector: &str,
        relative: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StoreError> {
        let path = self.checked_path(collector, relative)?;
        let key = format!("{}/{}", collector, relative);
        let dir = path.parent().ok_or_else(|| {
            StoreError::InvalidKey(format!("key '{}' has no parent directory", key))
        })?;
        fs::create_dir_all(dir)
            .await
            .map_err(|e| StoreError::from_io(e, &key))?;

        // unique temp name so concurrent writers of one key cannot clobber
        // each other's in-flight bytes
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = dir.join(format!(
            ".{}.{}.tmp",
            filename,
            uuid::Uuid::now_v7().simple()
        ));
        fs::write(&temp, &bytes)
            .await
            .map_err(|e| StoreError::from_io(e, &key))?;
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StoreError::from_io(e, &key));
        }
        debug!(key = %key, bytes = bytes.len(), "wrote local artifact");
        Ok(())
    }

    async fn get(&self, collector: &str, relative: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.checked_path(collector, relative)?;
        fs::read(&path)
            .await
            .map_err(|e| StoreError::from_io(e, &format!("{}/{}", collector, relative)))
    }

    async fn exists(&self, collector: &str, relative: &str) -> Result<bool, StoreError> {
        let path = self.checked_path(collector, relative)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::from_io(
                e,
                &format!("{}/{}", collector, relative),
            )),
        }
    }

    async fn list(
        &self,
        collector: &str,
        date: Option<PartitionDate>,
    ) -> Result<Vec<ArtifactMeta>, StoreError> {
        validate_collector_name(collector)?;
        let mut metas = Vec::new();
        match date {
            Some(date) => metas.extend(self.day_metas(collector, date).await?),
            None => {
                for date in self.partition_dates(collector).await? {
                    metas.extend(self.day_metas(collector, date).await?);
                }
            }
        }
        metas.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(metas)
    }

    async fn list_dates(&self, collector: &str) -> Result<Vec<PartitionDate>, StoreError> {
        validate_collector_name(collector)?;
        let mut dates = Vec::new();
        for date in self.partition_dates(collector).await? {
            // a date directory counts only while it still holds artifacts
            if !self.day_metas(collector, date).await?.is_empty() {
                dates.push(date);
            }
        }
        Ok(dates)
    }

    async fn delete(&self, collector: &str, relative: &str) -> Result<(), StoreError> {
        let path = self.checked_path(collector, relative)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| StoreError::from_io(e, &format!("{}/{}", collector, relative)))
    }

    async fn stat(&self, collector: &str) -> Result<TierStat, StoreError> {
        let mut stat = TierStat::default();
        for meta in self.list(collector, None).await? {
            stat.record(meta.size_bytes);
        }
        Ok(stat)
    }

    async fn list_collectors(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in Self::dir_entries(&self.root).await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if validate_collector_name(&name).is_err() {
                continue;
            }
            if entry
                .file_type()
                .await
                .map_err(|e| StoreError::Transient(e.to_string()))?
                .is_dir()
            {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn remove_empty_dirs(&self, collector: &str) -> Result<u32, StoreError> {
        validate_collector_name(collector)?;
        let collector_dir = self.root.join(collector);
        let mut removed = 0u32;
        for year in Self::subdir_names(&collector_dir, 4).await? {
            let year_dir = collector_dir.join(&year);
            for month in Self::subdir_names(&year_dir, 2).await? {
                let month_dir = year_dir.join(&month);
                for day in Self::subdir_names(&month_dir, 2).await? {
                    if fs::remove_dir(month_dir.join(&day)).await.is_ok() {
                        removed += 1;
                    }
                }
                if fs::remove_dir(&month_dir).await.is_ok() {
                    removed += 1;
                }
            }
            if fs::remove_dir(&year_dir).await.is_ok() {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(collector, removed, "removed empty date directories");
        }
        Ok(removed)
    }
}
