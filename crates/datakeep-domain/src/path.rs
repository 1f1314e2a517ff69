//! Key model: collector names, partition dates, and artifact paths
//!
//! Every artifact key is `{collector}/{year}/{month}/{day}/{filename}` with
//! zero-padded date segments, plus one well-known mutable alias per
//! collector. Parsing validates shape and rejects traversal, so code past
//! this module never handles a malformed key.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Well-known per-collector alias key holding the most recent payload
///
/// Lives at the collector root (not date-partitioned), is rewritten on every
/// collector run, and is excluded from listings, migration, and stat counts.
pub const LATEST_ALIAS: &str = "latest.json";

/// Validate a collector name
///
/// Names are path components in both tiers, so they must be non-empty and
/// restricted to ASCII alphanumerics, `_`, and `-`.
pub fn validate_collector_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidKey(
            "collector name cannot be empty".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(StoreError::InvalidKey(format!(
            "collector name '{}' contains characters outside [a-zA-Z0-9_-]",
            name
        )));
    }
    Ok(())
}

/// Calendar date encoded in an artifact's path
///
/// Wraps the date behind the `{year}/{month}/{day}` key segments. Ordering
/// is chronological, which matches lexicographic order of the zero-padded
/// segments.
///
/// # Examples
///
/// ```
/// use datakeep_domain::PartitionDate;
///
/// let date: PartitionDate = "2025-12-19".parse().unwrap();
/// assert_eq!(date.prefix(), "2025/12/19");
/// assert_eq!(date.to_string(), "2025-12-19");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PartitionDate(NaiveDate);

impl PartitionDate {
    /// Wrap an existing calendar date
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build from numeric components, if they form a real date
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse the three path segments of a key
    ///
    /// Segments must be zero-padded (`2025`, `01`, `05`): anything else is
    /// not a key this system wrote.
    pub fn from_segments(year: &str, month: &str, day: &str) -> Option<Self> {
        fn digits(s: &str, len: usize) -> bool {
            s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
        }
        if !digits(year, 4) || !digits(month, 2) || !digits(day, 2) {
            return None;
        }
        let y: i32 = year.parse().ok()?;
        let m: u32 = month.parse().ok()?;
        let d: u32 = day.parse().ok()?;
        Self::from_ymd(y, m, d)
    }

    /// The underlying calendar date
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The `{year}/{month}/{day}` key prefix for this date
    pub fn prefix(&self) -> String {
        format!(
            "{:04}/{:02}/{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl fmt::Display for PartitionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for PartitionDate {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| StoreError::InvalidKey(format!("invalid date '{}'", s)))
    }
}

/// Validated date-partitioned artifact key relative to a collector
///
/// Always `{year}/{month}/{day}/{filename}`; construction rejects anything
/// else, including traversal segments and hidden/temp filenames.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactPath {
    date: PartitionDate,
    filename: String,
}

impl ArtifactPath {
    /// Build from a partition date and filename
    pub fn new(date: PartitionDate, filename: impl Into<String>) -> Result<Self, StoreError> {
        let filename = filename.into();
        validate_filename(&filename)?;
        Ok(Self { date, filename })
    }

    /// Parse a relative key of the form `{year}/{month}/{day}/{filename}`
    ///
    /// # Examples
    ///
    /// ```
    /// use datakeep_domain::ArtifactPath;
    ///
    /// let path = ArtifactPath::parse("2025/12/19/prices_0300.json").unwrap();
    /// assert_eq!(path.date().to_string(), "2025-12-19");
    /// assert!(ArtifactPath::parse("2025/12/19/../secret").is_err());
    /// assert!(ArtifactPath::parse("2025/1/05/a.json").is_err());
    /// ```
    pub fn parse(relative: &str) -> Result<Self, StoreError> {
        let parts: Vec<&str> = relative.split('/').collect();
        let [year, month, day, filename] = parts.as_slice() else {
            return Err(StoreError::InvalidKey(format!(
                "expected year/month/day/filename, got '{}'",
                relative
            )));
        };
        let date = PartitionDate::from_segments(year, month, day).ok_or_else(|| {
            StoreError::InvalidKey(format!(
                "'{}' does not start with a zero-padded calendar date",
                relative
            ))
        })?;
        Self::new(date, *filename)
    }

    /// The partition date segment of the key
    pub fn date(&self) -> PartitionDate {
        self.date
    }

    /// The filename segment of the key
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The full relative key, `{year}/{month}/{day}/{filename}`
    pub fn relative(&self) -> String {
        format!("{}/{}", self.date.prefix(), self.filename)
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative())
    }
}

fn validate_filename(filename: &str) -> Result<(), StoreError> {
    if filename.is_empty() {
        return Err(StoreError::InvalidKey("empty filename".to_string()));
    }
    if filename.starts_with('.') {
        return Err(StoreError::InvalidKey(format!(
            "filename '{}' starts with '.'",
            filename
        )));
    }
    if filename.contains('/') || filename.contains('\\') {
        return Err(StoreError::InvalidKey(format!(
            "filename '{}' contains a path separator",
            filename
        )));
    }
    Ok(())
}

/// Classification of a relative key accepted by store operations
///
/// Stores accept exactly two key shapes: a date-partitioned artifact path,
/// or the per-collector `latest` alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKey {
    /// A date-partitioned immutable artifact
    Artifact(ArtifactPath),

    /// The mutable per-collector `latest` alias
    LatestAlias,
}

impl StoreKey {
    /// Classify and validate a relative key
    pub fn parse(relative: &str) -> Result<Self, StoreError> {
        if relative == LATEST_ALIAS {
            return Ok(StoreKey::LatestAlias);
        }
        ArtifactPath::parse(relative).map(StoreKey::Artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_name_validation() {
        assert!(validate_collector_name("weather_sydney").is_ok());
        assert!(validate_collector_name("prices-v2").is_ok());

        assert!(validate_collector_name("").is_err());
        assert!(validate_collector_name("a/b").is_err());
        assert!(validate_collector_name("..").is_err());
        assert!(validate_collector_name("name with spaces").is_err());
    }

    #[test]
    fn test_partition_date_padding() {
        assert!(PartitionDate::from_segments("2025", "01", "05").is_some());
        assert!(PartitionDate::from_segments("2025", "1", "05").is_none());
        assert!(PartitionDate::from_segments("2025", "01", "5").is_none());
        assert!(PartitionDate::from_segments("25", "01", "05").is_none());
        assert!(PartitionDate::from_segments("2025", "13", "05").is_none());
        assert!(PartitionDate::from_segments("2025", "02", "30").is_none());
    }

    #[test]
    fn test_partition_date_display_parse_roundtrip() {
        let date = PartitionDate::from_ymd(2025, 12, 19).unwrap();
        assert_eq!(date.to_string(), "2025-12-19");
        assert_eq!("2025-12-19".parse::<PartitionDate>().unwrap(), date);
        assert!("2025-13-01".parse::<PartitionDate>().is_err());
        assert!("not-a-date".parse::<PartitionDate>().is_err());
    }

    #[test]
    fn test_artifact_path_parse() {
        let path = ArtifactPath::parse("2025/12/19/prices_0300.json").unwrap();
        assert_eq!(path.filename(), "prices_0300.json");
        assert_eq!(path.relative(), "2025/12/19/prices_0300.json");
        assert_eq!(path.date(), PartitionDate::from_ymd(2025, 12, 19).unwrap());
    }

    #[test]
    fn test_artifact_path_rejects_bad_shapes() {
        assert!(ArtifactPath::parse("").is_err());
        assert!(ArtifactPath::parse("prices_0300.json").is_err());
        assert!(ArtifactPath::parse("2025/12/prices_0300.json").is_err());
        assert!(ArtifactPath::parse("2025/12/19/x/prices_0300.json").is_err());
        assert!(ArtifactPath::parse("2025/12/19/").is_err());
        assert!(ArtifactPath::parse("2025/12/19/..").is_err());
        assert!(ArtifactPath::parse("2025/12/19/.hidden").is_err());
        assert!(ArtifactPath::parse("../12/19/a.json").is_err());
    }

    #[test]
    fn test_store_key_classification() {
        assert_eq!(StoreKey::parse("latest.json").unwrap(), StoreKey::LatestAlias);
        assert!(matches!(
            StoreKey::parse("2025/12/19/a.json").unwrap(),
            StoreKey::Artifact(_)
        ));
        assert!(StoreKey::parse("latest").is_err());
        assert!(StoreKey::parse("2025/latest.json").is_err());
    }
}
