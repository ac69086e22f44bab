use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use thiserror::Error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const PARSE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const UTC_OFFSET: &str = "+00:00";
const NODE_SEPARATOR: char = '_';

/// The name of a snapshot managed by this driver: when it was taken and by which node.
///
/// Encoded as `2014-06-17T12:34:56.123456+00:00_<node>`. The node is everything after the
/// first `_`, so it may itself contain `_` but not `@`, `/` or whitespace. It may be empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotName {
    timestamp: DateTime<Utc>,
    node: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotNameError {
    #[error("snapshot name is not valid UTF-8")]
    NotUtf8,
    #[error("snapshot name has no node separator")]
    MissingSeparator,
    #[error("snapshot timestamp is not in UTC")]
    NotUtc,
    #[error("invalid snapshot timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("snapshot name is not in canonical form")]
    NotCanonical,
}

impl SnapshotName {
    /// Timestamps are truncated to microseconds, the precision of the encoding.
    pub fn new(timestamp: DateTime<Utc>, node: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(6),
            node: node.into(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotNameError> {
        std::str::from_utf8(bytes)
            .map_err(|_| SnapshotNameError::NotUtf8)?
            .parse()
    }
}

impl Display for SnapshotName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{UTC_OFFSET}{NODE_SEPARATOR}{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.node
        )
    }
}

impl FromStr for SnapshotName {
    type Err = SnapshotNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (timestamp, node) = s
            .split_once(NODE_SEPARATOR)
            .ok_or(SnapshotNameError::MissingSeparator)?;
        let timestamp = timestamp
            .strip_suffix(UTC_OFFSET)
            .ok_or(SnapshotNameError::NotUtc)?;
        let timestamp = NaiveDateTime::parse_from_str(timestamp, PARSE_TIMESTAMP_FORMAT)?.and_utc();
        let name = Self {
            timestamp,
            node: node.to_owned(),
        };
        // The parser is lenient about fractional digits; only the exact encoding round-trips.
        if name.to_string() != s {
            return Err(SnapshotNameError::NotCanonical);
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 6, 17, 12, 34, 56).unwrap() + chrono::Duration::microseconds(789)
    }

    #[test]
    fn encodes_timestamp_and_node() {
        let name = SnapshotName::new(timestamp(), "node");
        assert_eq!(name.to_string(), "2014-06-17T12:34:56.000789+00:00_node");
        assert_eq!(name.to_bytes(), b"2014-06-17T12:34:56.000789+00:00_node");
    }

    #[test]
    fn round_trips() {
        for node in ["node", "node2", "a_b_c", "5a1c3e2f-0000-4000-8000-000000000000"] {
            let name = SnapshotName::new(Utc::now(), node);
            assert_eq!(SnapshotName::from_bytes(&name.to_bytes()), Ok(name));
        }
    }

    #[test]
    fn empty_node_round_trips() {
        let name = SnapshotName::new(timestamp(), "");
        assert_eq!(name.to_string(), "2014-06-17T12:34:56.000789+00:00_");
        assert_eq!(SnapshotName::from_bytes(&name.to_bytes()), Ok(name));
    }

    #[test]
    fn truncates_to_microseconds() {
        let timestamp = timestamp() + chrono::Duration::nanoseconds(123);
        let name = SnapshotName::new(timestamp, "node");
        assert_eq!(name.timestamp(), self::timestamp());
        assert_eq!(name.to_string().parse(), Ok(name));
    }

    #[test]
    fn decoded_names_re_encode_identically() {
        let token = "2020-01-01T00:00:00.000000+00:00_host_1";
        let name: SnapshotName = token.parse().unwrap();
        assert_eq!(name.node(), "host_1");
        assert_eq!(name.to_string(), token);
    }

    #[test]
    fn rejects_malformed_names() {
        assert_eq!(
            "alalalalal".parse::<SnapshotName>(),
            Err(SnapshotNameError::MissingSeparator)
        );
        assert_eq!(
            "2020-01-01T00:00:00.000000+02:00_node".parse::<SnapshotName>(),
            Err(SnapshotNameError::NotUtc)
        );
        assert!(matches!(
            "2020-13-01T00:00:00.000000+00:00_node".parse::<SnapshotName>(),
            Err(SnapshotNameError::Timestamp(_))
        ));
        assert!(matches!(
            "yesterday+00:00_node".parse::<SnapshotName>(),
            Err(SnapshotNameError::Timestamp(_))
        ));
        assert_eq!(
            "2020-01-01T00:00:00.5+00:00_node".parse::<SnapshotName>(),
            Err(SnapshotNameError::NotCanonical)
        );
        assert_eq!(
            SnapshotName::from_bytes(b"\xff\xfe_node"),
            Err(SnapshotNameError::NotUtf8)
        );
    }

    #[test]
    fn orders_by_timestamp_then_node() {
        let earlier = SnapshotName::new(timestamp(), "b");
        let later = SnapshotName::new(timestamp() + chrono::Duration::seconds(1), "a");
        assert!(earlier < later);
        assert!(SnapshotName::new(timestamp(), "a") < earlier);
    }
}
