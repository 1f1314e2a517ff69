//! Environment-based configuration

use std::env;
use std::path::PathBuf;

use datakeep_archiver::ArchiveConfig;
use datakeep_store::{S3Config, StoreConfig};

use crate::error::{CliError, Result};

/// Everything the binary needs, resolved from environment variables
#[derive(Debug, Clone)]
pub struct Settings {
    /// Storage tier configuration
    pub store: StoreConfig,

    /// Archival configuration
    pub archive: ArchiveConfig,
}

impl Settings {
    /// Resolve settings from the process environment
    ///
    /// - `DATA_DIR` - local tier root (default `./data`)
    /// - `S3_BUCKET` - remote bucket; unset means local-only operation
    /// - `S3_REGION` - bucket region (default `ap-southeast-2`)
    /// - `S3_ACCESS_KEY` / `AWS_ACCESS_KEY_ID` - static access key
    /// - `S3_SECRET_KEY` / `AWS_SECRET_ACCESS_KEY` - static secret key
    /// - `S3_ENDPOINT` - custom endpoint for S3-compatible stores
    /// - `ARCHIVE_ENABLED` - scheduled archival on or off (default `true`)
    /// - `ARCHIVE_RETENTION_DAYS` - local retention window (default `7`)
    /// - `ARCHIVE_TIME` - daily trigger, `HH:MM` local time (default `03:00`)
    ///
    /// An unset `S3_BUCKET` is a valid local-only deployment. A bucket with
    /// half a credential pair is a configuration error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = PathBuf::from(var_or(&get, "DATA_DIR", "./data"));

        let s3 = match var(&get, "S3_BUCKET") {
            Some(bucket) => {
                let config = S3Config {
                    bucket,
                    region: var_or(&get, "S3_REGION", "ap-southeast-2"),
                    access_key: first_of(&get, &["S3_ACCESS_KEY", "AWS_ACCESS_KEY_ID"]),
                    secret_key: first_of(&get, &["S3_SECRET_KEY", "AWS_SECRET_ACCESS_KEY"]),
                    endpoint: var(&get, "S3_ENDPOINT"),
                };
                config.validate()?;
                Some(config)
            }
            None => None,
        };

        let archive = ArchiveConfig {
            enabled: parse_bool(&get, "ARCHIVE_ENABLED", true)?,
            retention_days: parse_u32(&get, "ARCHIVE_RETENTION_DAYS", 7)?,
            archive_time: var_or(&get, "ARCHIVE_TIME", "03:00"),
            ..ArchiveConfig::default()
        };
        archive.validate()?;

        Ok(Self {
            store: StoreConfig { data_dir, s3 },
            archive,
        })
    }

    /// Whether a remote tier is configured
    pub fn remote_configured(&self) -> bool {
        self.store.s3.is_some()
    }

    /// Human-readable startup summary, secrets omitted
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("Datakeep Configuration\n");
        out.push_str("======================\n");
        out.push_str(&format!(
            "Data directory: {}\n",
            self.store.data_dir.display()
        ));
        match &self.store.s3 {
            Some(s3) => {
                out.push_str(&format!("Remote tier:    s3://{} ({})\n", s3.bucket, s3.region));
                if let Some(endpoint) = &s3.endpoint {
                    out.push_str(&format!("Endpoint:       {}\n", endpoint));
                }
            }
            None => out.push_str("Remote tier:    not configured, local-only\n"),
        }
        if self.archive.enabled && self.remote_configured() {
            out.push_str(&format!(
                "Archival:       daily at {}, retain {} days locally\n",
                self.archive.archive_time, self.archive.retention_days
            ));
        } else {
            out.push_str("Archival:       off\n");
        }
        out
    }
}

fn var(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    get(key).filter(|value| !value.is_empty())
}

fn var_or(get: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    var(get, key).unwrap_or_else(|| default.to_string())
}

fn first_of(get: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| var(get, key))
}

fn parse_bool(get: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    match var(get, key) {
        Some(value) => match value.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(CliError::Config(format!(
                "{} must be a boolean, got '{}'",
                key, other
            ))),
        },
        None => Ok(default),
    }
}

fn parse_u32(get: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> Result<u32> {
    match var(get, key) {
        Some(value) => value.trim().parse().map_err(|_| {
            CliError::Config(format!("{} must be a whole number, got '{}'", key, value))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + '_ {
        move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_defaults_are_local_only() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();

        assert_eq!(settings.store.data_dir, PathBuf::from("./data"));
        assert!(settings.store.s3.is_none());
        assert!(!settings.remote_configured());
        assert!(settings.archive.enabled);
        assert_eq!(settings.archive.retention_days, 7);
        assert_eq!(settings.archive.archive_time, "03:00");
    }

    #[test]
    fn test_full_remote_configuration() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATA_DIR", "/srv/datakeep"),
            ("S3_BUCKET", "datakeep-cold"),
            ("S3_REGION", "eu-central-1"),
            ("S3_ACCESS_KEY", "AKIA123"),
            ("S3_SECRET_KEY", "shhh"),
            ("S3_ENDPOINT", "http://minio:9000"),
            ("ARCHIVE_RETENTION_DAYS", "14"),
            ("ARCHIVE_TIME", "02:30"),
        ]))
        .unwrap();

        assert_eq!(settings.store.data_dir, PathBuf::from("/srv/datakeep"));
        let s3 = settings.store.s3.unwrap();
        assert_eq!(s3.bucket, "datakeep-cold");
        assert_eq!(s3.region, "eu-central-1");
        assert_eq!(s3.access_key.as_deref(), Some("AKIA123"));
        assert_eq!(s3.endpoint.as_deref(), Some("http://minio:9000"));
        assert_eq!(settings.archive.retention_days, 14);
        assert_eq!(settings.archive.archive_time, "02:30");
    }

    #[test]
    fn test_aws_credential_names_are_accepted() {
        let settings = Settings::from_lookup(lookup(&[
            ("S3_BUCKET", "datakeep-cold"),
            ("AWS_ACCESS_KEY_ID", "AKIA123"),
            ("AWS_SECRET_ACCESS_KEY", "shhh"),
        ]))
        .unwrap();

        let s3 = settings.store.s3.unwrap();
        assert_eq!(s3.access_key.as_deref(), Some("AKIA123"));
        assert_eq!(s3.secret_key.as_deref(), Some("shhh"));
    }

    #[test]
    fn test_half_a_credential_pair_is_rejected() {
        let err = Settings::from_lookup(lookup(&[
            ("S3_BUCKET", "datakeep-cold"),
            ("S3_ACCESS_KEY", "AKIA123"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("incomplete"));
    }

    #[test]
    fn test_empty_bucket_means_local_only() {
        let settings = Settings::from_lookup(lookup(&[("S3_BUCKET", "")])).unwrap();
        assert!(settings.store.s3.is_none());
    }

    #[test]
    fn test_archive_enabled_parsing() {
        for value in ["false", "0", "no", "FALSE"] {
            let settings =
                Settings::from_lookup(lookup(&[("ARCHIVE_ENABLED", value)])).unwrap();
            assert!(!settings.archive.enabled, "'{}' should disable", value);
        }
        for value in ["true", "1", "yes"] {
            let settings =
                Settings::from_lookup(lookup(&[("ARCHIVE_ENABLED", value)])).unwrap();
            assert!(settings.archive.enabled, "'{}' should enable", value);
        }

        let err = Settings::from_lookup(lookup(&[("ARCHIVE_ENABLED", "banana")])).unwrap_err();
        assert!(err.to_string().contains("must be a boolean"));
    }

    #[test]
    fn test_bad_retention_is_rejected() {
        let err =
            Settings::from_lookup(lookup(&[("ARCHIVE_RETENTION_DAYS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("whole number"));
    }

    #[test]
    fn test_bad_archive_time_is_rejected() {
        let err = Settings::from_lookup(lookup(&[("ARCHIVE_TIME", "3am")])).unwrap_err();
        assert!(err.to_string().contains("HH:MM"));
    }

    #[test]
    fn test_summary_hides_credentials() {
        let settings = Settings::from_lookup(lookup(&[
            ("S3_BUCKET", "datakeep-cold"),
            ("S3_ACCESS_KEY", "AKIA123"),
            ("S3_SECRET_KEY", "supersecret"),
        ]))
        .unwrap();

        let summary = settings.summary();
        assert!(summary.contains("s3://datakeep-cold"));
        assert!(!summary.contains("AKIA123"));
        assert!(!summary.contains("supersecret"));
    }
}
