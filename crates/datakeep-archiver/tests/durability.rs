//! Randomized durability tests for the archive cycle
//!
//! Transient faults are injected into tier operations at random points and
//! the cycle is run repeatedly. Whatever the failure pattern, every
//! artifact payload must stay readable from at least one tier, and a clean
//! final cycle must finish the migration.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use datakeep_archiver::{ArchiveConfig, ArchiveJob};
use datakeep_domain::{
    ArtifactMeta, ArtifactStore, PartitionDate, StoreError, TierStat, LATEST_ALIAS,
};
use datakeep_store::MemoryStore;
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

/// Deterministic fault source shared by the chaos wrappers
struct Chaos {
    seed: u64,
    modulus: u64,
    counter: AtomicU64,
    enabled: AtomicBool,
}

impl Chaos {
    fn new(seed: u64, modulus: u64) -> Arc<Self> {
        Arc::new(Self {
            seed,
            modulus,
            counter: AtomicU64::new(0),
            enabled: AtomicBool::new(true),
        })
    }

    fn calm(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    fn strikes(&self) -> bool {
        if !self.enabled.load(Ordering::SeqCst) {
            return false;
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        splitmix64(self.seed ^ n) % self.modulus == 0
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Store wrapper injecting transient faults into selected operations
struct ChaosStore {
    inner: Arc<MemoryStore>,
    chaos: Arc<Chaos>,
    fault_puts: bool,
    fault_exists: bool,
    fault_deletes: bool,
}

impl ChaosStore {
    fn fault(&self, hit: bool, op: &str) -> Result<(), StoreError> {
        if hit && self.chaos.strikes() {
            return Err(StoreError::Transient(format!("injected {op} fault")));
        }
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for ChaosStore {
    async fn put(
        &self,
        collector: &str,
        relative: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.fault(self.fault_puts, "put")?;
        self.inner.put(collector, relative, bytes, content_type).await
    }

    async fn get(&self, collector: &str, relative: &str) -> Result<Vec<u8>, StoreError> {
        self.inner.get(collector, relative).await
    }

    async fn exists(&self, collector: &str, relative: &str) -> Result<bool, StoreError> {
        self.fault(self.fault_exists, "exists")?;
        self.inner.exists(collector, relative).await
    }

    async fn list(
        &self,
        collector: &str,
        date: Option<PartitionDate>,
    ) -> Result<Vec<ArtifactMeta>, StoreError> {
        self.inner.list(collector, date).await
    }

    async fn list_dates(&self, collector: &str) -> Result<Vec<PartitionDate>, StoreError> {
        self.inner.list_dates(collector).await
    }

    async fn delete(&self, collector: &str, relative: &str) -> Result<(), StoreError> {
        self.fault(self.fault_deletes, "delete")?;
        self.inner.delete(collector, relative).await
    }

    async fn stat(&self, collector: &str) -> Result<TierStat, StoreError> {
        self.inner.stat(collector).await
    }

    async fn list_collectors(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_collectors().await
    }
}

struct Seeded {
    collector: &'static str,
    relative: String,
    bytes: Vec<u8>,
    eligible: bool,
}

fn fixture_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 27).unwrap()
}

fn seed_plan() -> Vec<Seeded> {
    let mut plan = Vec::new();
    for collector in ["alpha", "beta"] {
        for (day, eligible) in [(19u32, true), (20, true), (26, false)] {
            for hhmm in ["0100", "0900"] {
                let relative = format!("2025/12/{day}/{collector}_{hhmm}.json");
                let bytes = format!("{collector} {day} {hhmm}").into_bytes();
                plan.push(Seeded {
                    collector,
                    relative,
                    bytes,
                    eligible,
                });
            }
        }
    }
    plan
}

async fn assert_nothing_lost(
    plan: &[Seeded],
    local: &Arc<MemoryStore>,
    remote: &Arc<MemoryStore>,
) {
    for seeded in plan {
        let local_copy = match local.get(seeded.collector, &seeded.relative).await {
            Ok(bytes) => Some(bytes),
            Err(StoreError::NotFound { .. }) => None,
            Err(err) => panic!("local read failed: {err}"),
        };
        let remote_copy = match remote.get(seeded.collector, &seeded.relative).await {
            Ok(bytes) => Some(bytes),
            Err(StoreError::NotFound { .. }) => None,
            Err(err) => panic!("remote read failed: {err}"),
        };

        assert!(
            local_copy.is_some() || remote_copy.is_some(),
            "{}/{} vanished from both tiers",
            seeded.collector,
            seeded.relative
        );
        for copy in [&local_copy, &remote_copy].into_iter().flatten() {
            assert_eq!(
                copy, &seeded.bytes,
                "{}/{} corrupted",
                seeded.collector, seeded.relative
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn archive_never_loses_artifacts(seed in any::<u64>(), modulus in 3u64..6) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        rt.block_on(async {
            let plan = seed_plan();
            let local_inner = Arc::new(MemoryStore::new());
            let remote_inner = Arc::new(MemoryStore::new());
            let chaos = Chaos::new(seed, modulus);

            for seeded in &plan {
                local_inner
                    .put(seeded.collector, &seeded.relative, seeded.bytes.clone(), "application/json")
                    .await
                    .unwrap();
            }
            for collector in ["alpha", "beta"] {
                local_inner
                    .put(collector, LATEST_ALIAS, b"alias".to_vec(), "application/json")
                    .await
                    .unwrap();
            }

            let local = Arc::new(ChaosStore {
                inner: local_inner.clone(),
                chaos: chaos.clone(),
                fault_puts: false,
                fault_exists: false,
                fault_deletes: true,
            });
            let remote = Arc::new(ChaosStore {
                inner: remote_inner.clone(),
                chaos: chaos.clone(),
                fault_puts: true,
                fault_exists: true,
                fault_deletes: false,
            });

            let config = ArchiveConfig {
                max_attempts: 2,
                base_delay_ms: 0,
                max_delay_ms: 0,
                ..ArchiveConfig::default()
            };
            let job = ArchiveJob::new(local, remote, config);
            let cancel = CancellationToken::new();

            // chaotic cycles may fail artifacts, but never lose them
            for _ in 0..3 {
                job.run_cycle_at(fixture_today(), &cancel).await.unwrap().unwrap();
                assert_nothing_lost(&plan, &local_inner, &remote_inner).await;
            }

            // once faults stop, one cycle finishes the migration
            chaos.calm();
            let last = job.run_cycle_at(fixture_today(), &cancel).await.unwrap().unwrap();
            assert!(last.is_clean());
            assert_nothing_lost(&plan, &local_inner, &remote_inner).await;

            for seeded in &plan {
                let local_has = local_inner.exists(seeded.collector, &seeded.relative).await.unwrap();
                let remote_has = remote_inner.exists(seeded.collector, &seeded.relative).await.unwrap();
                if seeded.eligible {
                    assert!(!local_has, "{} should have left the local tier", seeded.relative);
                    assert!(remote_has, "{} missing from the remote tier", seeded.relative);
                } else {
                    assert!(local_has, "{} should have stayed local", seeded.relative);
                    assert!(!remote_has, "{} migrated too early", seeded.relative);
                }
            }
            for collector in ["alpha", "beta"] {
                assert!(local_inner.exists(collector, LATEST_ALIAS).await.unwrap());
                assert!(!remote_inner.exists(collector, LATEST_ALIAS).await.unwrap());
            }
        });
    }
}
