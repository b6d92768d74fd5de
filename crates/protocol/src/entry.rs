//! Log entry record
//!
//! One `LogEntry` is one log event. Entries are created at the ingress
//! boundary (JSON body or archive line), copied into a buffer slot at enqueue
//! time and never mutated afterwards.

use std::fmt::{self, Write as FmtWrite};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ParseLineError;
use crate::{ARCHIVE_FIELD_COUNT, LINE_FIELD_COUNT, TIME_FORMAT, UNSET_FIELD};

/// A single log event flowing through the pipeline
///
/// `id`, `ip`, `event_time` and `name` are mandatory; the timing fields are
/// optional and render as [`UNSET_FIELD`] when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Client-assigned identifier
    pub id: String,

    /// Source IP of the emitting client
    pub ip: String,

    /// Event timestamp, second precision
    #[serde(with = "event_time_format")]
    pub event_time: NaiveDateTime,

    /// Event name
    pub name: String,

    /// Opaque numeric tag supplied by the client
    #[serde(default)]
    pub random_number: i64,

    /// Server-side processing duration, unset until populated
    #[serde(default)]
    pub process_time: Option<i64>,

    /// Queueing delay, unset until populated
    #[serde(default)]
    pub delay_time: Option<i64>,
}

impl LogEntry {
    /// Check the mandatory-field invariant
    ///
    /// An entry is only valid for ingestion when `id`, `ip` and `name` are
    /// non-empty (the timestamp is guaranteed by the type).
    pub fn validate(&self) -> Result<(), ParseLineError> {
        for (field, value) in [("id", &self.id), ("ip", &self.ip), ("name", &self.name)] {
            if value.is_empty() {
                return Err(ParseLineError::EmptyField(field));
            }
        }
        Ok(())
    }

    /// Format this entry as one pipe-delimited disk line (no trailing newline)
    pub fn to_line(&self) -> String {
        let mut line = String::with_capacity(64);
        let _ = write!(
            line,
            "{}|{}|{}|{}|{}|{}|{}",
            self.id,
            self.ip,
            self.event_time.format(TIME_FORMAT),
            self.name,
            self.random_number,
            OptField(self.process_time),
            OptField(self.delay_time),
        );
        line
    }

    /// Parse a pipe-delimited line into an entry
    ///
    /// Accepts both the 5-field archive form and the 7-field disk form.
    /// Round-trip holds: `parse_line(&e.to_line()) == e` for any valid entry.
    pub fn parse_line(line: &str) -> Result<Self, ParseLineError> {
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != ARCHIVE_FIELD_COUNT && fields.len() != LINE_FIELD_COUNT {
            return Err(ParseLineError::FieldCount {
                found: fields.len(),
            });
        }

        let event_time = NaiveDateTime::parse_from_str(fields[2], TIME_FORMAT)
            .map_err(|_| ParseLineError::Timestamp(fields[2].to_owned()))?;

        let random_number = parse_number("random_number", fields[4])?;

        let (process_time, delay_time) = if fields.len() == LINE_FIELD_COUNT {
            (
                parse_optional("process_time", fields[5])?,
                parse_optional("delay_time", fields[6])?,
            )
        } else {
            (None, None)
        };

        let entry = Self {
            id: fields[0].to_owned(),
            ip: fields[1].to_owned(),
            event_time,
            name: fields[3].to_owned(),
            random_number,
            process_time,
            delay_time,
        };
        entry.validate()?;
        Ok(entry)
    }
}

/// Parse a mandatory numeric field
fn parse_number(field: &'static str, raw: &str) -> Result<i64, ParseLineError> {
    raw.trim().parse().map_err(|_| ParseLineError::Number {
        field,
        value: raw.to_owned(),
    })
}

/// Parse an optional numeric field, mapping the sentinel back to `None`
fn parse_optional(field: &'static str, raw: &str) -> Result<Option<i64>, ParseLineError> {
    if raw == UNSET_FIELD {
        return Ok(None);
    }
    parse_number(field, raw).map(Some)
}

/// Display adapter rendering `None` as the unset sentinel
struct OptField(Option<i64>);

impl fmt::Display for OptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v}"),
            None => f.write_str(UNSET_FIELD),
        }
    }
}

/// Serde adapter for the fixed `yyyy-MM-dd HH:mm:ss` textual timestamp
mod event_time_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::TIME_FORMAT;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "entry_test.rs"]
mod entry_test;
