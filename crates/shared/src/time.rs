use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, SecondsFormat, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Format used when timestamps are shown in tables.
pub const DISPLAY_FORMAT: &str = "%H:%M | %d.%m.%Y";

/// Wire format for offset-less date-times, matching what the server sends.
const LOCAL_WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp '{0}'")]
pub struct TimestampParseError(pub String);

/// Server-assigned instant.
///
/// Keeps the form it arrived in so records sent back in update bodies carry
/// the same value: offset-less ISO-8601 local date-times stay offset-less,
/// RFC 3339 values keep their offset. Conversion to the local zone happens
/// only for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Timestamp {
    Local(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

impl Timestamp {
    /// The instant in the local zone; `None` for a wall-clock time that does
    /// not exist locally.
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        match self {
            Timestamp::Local(naive) => Local.from_local_datetime(naive).earliest(),
            Timestamp::Offset(at) => Some(at.with_timezone(&Local)),
        }
    }

    /// Renders as `HH:mm | dd.MM.yyyy`.
    pub fn display(&self) -> String {
        match self {
            Timestamp::Local(naive) => naive.format(DISPLAY_FORMAT).to_string(),
            Timestamp::Offset(at) => at.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
        }
    }

    /// The value as it is written on the wire.
    pub fn to_wire(&self) -> String {
        match self {
            Timestamp::Local(naive) => naive.format(LOCAL_WIRE_FORMAT).to_string(),
            Timestamp::Offset(at) => at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Timestamp::Offset(at));
        }
        NaiveDateTime::parse_from_str(raw, LOCAL_WIRE_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
            .map(Timestamp::Local)
            .map_err(|_| TimestampParseError(raw.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
