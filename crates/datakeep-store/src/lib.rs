//! Datakeep Storage Layer
//!
//! Tier implementations of the `ArtifactStore` contract:
//!
//! - [`LocalStore`] - the hot tier, artifacts on the local filesystem
//! - [`S3Store`] - the cold tier, any S3-compatible object store
//! - [`MemoryStore`] - in-memory tier for tests and embedding
//!
//! The [`StoreConfig`] factory builds the local tier plus an optional remote
//! tier from configuration; a missing bucket means local-only operation, not
//! an error.
//!
//! # Examples
//!
//! ```no_run
//! use datakeep_store::LocalStore;
//!
//! let store = LocalStore::new("./data").unwrap();
//! // Store is now ready for artifact operations
//! ```

#![warn(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

use datakeep_domain::StoreError;

pub mod local;
pub mod memory;
pub mod s3;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use s3::{S3Config, S3Store};

/// Configuration for building the storage tiers
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory of the local tier
    pub data_dir: PathBuf,

    /// Remote tier settings; `None` means local-only operation
    pub s3: Option<S3Config>,
}

/// The storage tiers a deployment runs with
pub struct Tiers {
    /// Hot filesystem tier, always present
    pub local: Arc<LocalStore>,

    /// Cold object-storage tier, present when a bucket is configured
    pub remote: Option<Arc<S3Store>>,
}

impl Tiers {
    /// Whether a remote tier is configured
    pub fn remote_configured(&self) -> bool {
        self.remote.is_some()
    }
}

/// Build the tiers described by `config`
///
/// The local tier directory is created if missing. The remote client is
/// constructed but not probed; connectivity problems surface as `Transient`
/// errors on first use, matching how the object store behaves thereafter.
pub async fn build_tiers(config: &StoreConfig) -> Result<Tiers, StoreError> {
    let local = Arc::new(LocalStore::new(&config.data_dir)?);
    let remote = match &config.s3 {
        Some(s3) => Some(Arc::new(S3Store::new(s3.clone()).await?)),
        None => None,
    };
    Ok(Tiers { local, remote })
}
