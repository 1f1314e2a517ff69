//! Remote object-storage tier (S3-compatible)

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use tracing::debug;

use datakeep_domain::path::validate_collector_name;
use datakeep_domain::{
    ArtifactMeta, ArtifactPath, ArtifactStore, PartitionDate, StoreError, StoreKey, TierStat,
};

/// Remote tier settings
///
/// Explicit credentials are optional; when absent the SDK default chain
/// (environment, profile, instance role) applies. A custom endpoint selects
/// path-style addressing for MinIO-style deployments.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Target bucket, required
    pub bucket: String,

    /// Bucket region
    pub region: String,

    /// Static access key id, paired with `secret_key`
    pub access_key: Option<String>,

    /// Static secret key, paired with `access_key`
    pub secret_key: Option<String>,

    /// Custom endpoint URL for S3-compatible stores
    pub endpoint: Option<String>,
}

impl S3Config {
    /// Check the settings are usable before building a client
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.bucket.is_empty() {
            return Err(StoreError::Configuration(
                "remote tier requires a bucket name".to_string(),
            ));
        }
        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(StoreError::Configuration(
                "remote tier credentials are incomplete: set both access key and secret key, \
                 or neither to use the ambient credential chain"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Object-storage cold tier
///
/// Object keys are `{collector}/{year}/{month}/{day}/{filename}` plus the
/// `{collector}/latest.json` alias, identical to the local tier layout, so
/// artifacts move between tiers without key translation.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client for `config`
    ///
    /// SDK-level retries are disabled: the archive job owns the retry
    /// policy, and doubled retry layers would multiply the worst-case
    /// latency per artifact.
    pub async fn new(config: S3Config) -> Result<Self, StoreError> {
        config.validate()?;
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .retry_config(RetryConfig::disabled());
        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key, secret_key, None, None, "datakeep",
            ));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket,
        })
    }

    /// The bucket this store writes to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object_key(collector: &str, relative: &str) -> Result<String, StoreError> {
        validate_collector_name(collector)?;
        StoreKey::parse(relative)?;
        Ok(format!("{}/{}", collector, relative))
    }

    fn to_utc(stamp: Option<&aws_sdk_s3::primitives::DateTime>) -> DateTime<Utc> {
        stamp
            .and_then(|s| DateTime::from_timestamp(s.secs(), s.subsec_nanos()))
            .unwrap_or(DateTime::UNIX_EPOCH)
    }
}

#[async_trait]
impl ArtifactStore for S3Store {
    async fn put(
        &self,
        collector: &str,
        relative: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let key = Self::object_key(collector, relative)?;
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                StoreError::Transient(format!("put {}: {}", key, DisplayErrorContext(&e)))
            })?;
        debug!(key = %key, bytes = size, "uploaded object");
        Ok(())
    }

    async fn get(&self, collector: &str, relative: &str) -> Result<Vec<u8>, StoreError> {
        let key = Self::object_key(collector, relative)?;
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await;
        match resp {
            Ok(output) => {
                let data = output.body.collect().await.map_err(|e| {
                    StoreError::Transient(format!("get {}: body: {}", key, e))
                })?;
                Ok(data.into_bytes().to_vec())
            }
            Err(err) => {
                let service = err.into_service_error();
                if service.is_no_such_key() {
                    Err(StoreError::not_found(collector, relative))
                } else {
                    Err(StoreError::Transient(format!(
                        "get {}: {}",
                        key,
                        DisplayErrorContext(&service)
                    )))
                }
            }
        }
    }

    async fn exists(&self, collector: &str, relative: &str) -> Result<bool, StoreError> {
        let key = Self::object_key(collector, relative)?;
        let resp = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await;
        match resp {
            Ok(_) => Ok(true),
            Err(err) => {
                let service = err.into_service_error();
                if service.is_not_found() {
                    Ok(false)
                } else {
                    Err(StoreError::Transient(format!(
                        "head {}: {}",
                        key,
                        DisplayErrorContext(&service)
                    )))
                }
            }
        }
    }

    async fn list(
        &self,
        collector: &str,
        date: Option<PartitionDate>,
    ) -> Result<Vec<ArtifactMeta>, StoreError> {
        validate_collector_name(collector)?;
        let collector_prefix = format!("{}/", collector);
        let prefix = match date {
            Some(date) => format!("{}{}/", collector_prefix, date.prefix()),
            None => collector_prefix.clone(),
        };

        // S3 returns keys in lexicographic order, so no client-side sort
        let mut metas = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&prefix)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                StoreError::Transient(format!("list {}: {}", prefix, DisplayErrorContext(&e)))
            })?;
            for object in page.contents() {
                let Some(key) = object.key() else {
                    continue;
                };
                let Some(relative) = key.strip_prefix(&collector_prefix) else {
                    continue;
                };
                let Ok(path) = ArtifactPath::parse(relative) else {
                    // the latest alias and any foreign keys under the prefix
                    continue;
                };
                metas.push(ArtifactMeta {
                    collector: collector.to_string(),
                    path,
                    size_bytes: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: Self::to_utc(object.last_modified()),
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
        // S3 reports success for absent keys; probe first so delete honors
        // the NotFound contract
        if !self.exists(collector, relative).await? {
            return Err(StoreError::not_found(collector, relative));
        }
        let key = Self::object_key(collector, relative)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                StoreError::Transient(format!("delete {}: {}", key, DisplayErrorContext(&e)))
            })?;
        Ok(())
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
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .delimiter("/")
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                StoreError::Transient(format!("list collectors: {}", DisplayErrorContext(&e)))
            })?;
            for common in page.common_prefixes() {
                let Some(prefix) = common.prefix() else {
                    continue;
                };
                let name = prefix.trim_end_matches('/');
                if validate_collector_name(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
