//! Shared value types used by records and mutation payloads.
//!
//! Unlike the identifiers in [`crate::identifiers`], these types carry values
//! with invariants (votes are in `10..=100`, list statuses are one of five
//! codes) or wire formats that need interpreting (partial release dates, Unix
//! timestamps).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Dates and times
// ---------------------------------------------------------------------------

/// A release date as VNDB encodes it: `"YYYY-MM-DD"`, `"YYYY-MM"`, `"YYYY"`,
/// `"TBA"`, or `"unknown"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseDate(String);

impl ReleaseDate {
    /// Wraps a raw date string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw date string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the "to be announced" marker.
    pub fn is_tba(&self) -> bool {
        self.0.eq_ignore_ascii_case("tba")
    }

    /// Returns the year, if one is present.
    pub fn year(&self) -> Option<i32> {
        self.0.get(..4)?.parse().ok()
    }

    /// Returns the full date, or `None` for partial, TBA, or unknown dates.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").ok()
    }
}

impl std::fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// List records carry Unix timestamps in seconds; this wrapper converts them
/// so callers never deal with raw integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Converts Unix seconds, returning `None` when out of range.
    pub fn from_unix(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Self)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// List values
// ---------------------------------------------------------------------------

/// A user vote in the range `10..=100` (a 1.0–10.0 score times ten).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vote(u8);

impl Vote {
    /// Creates a [`Vote`], returning `None` outside `10..=100`.
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        if (10..=100).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the raw value in `10..=100`.
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Vote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

// ---------------------------------------------------------------------------

/// Status of a release on a user's release list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ReleaseStatus {
    /// 0
    #[default]
    Unknown,
    /// 1
    Pending,
    /// 2
    Obtained,
    /// 3
    OnLoan,
    /// 4
    Deleted,
}

impl From<ReleaseStatus> for u8 {
    fn from(status: ReleaseStatus) -> u8 {
        match status {
            ReleaseStatus::Unknown => 0,
            ReleaseStatus::Pending => 1,
            ReleaseStatus::Obtained => 2,
            ReleaseStatus::OnLoan => 3,
            ReleaseStatus::Deleted => 4,
        }
    }
}

impl TryFrom<u8> for ReleaseStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => ReleaseStatus::Unknown,
            1 => ReleaseStatus::Pending,
            2 => ReleaseStatus::Obtained,
            3 => ReleaseStatus::OnLoan,
            4 => ReleaseStatus::Deleted,
            other => return Err(format!("unknown release list status {other}")),
        })
    }
}
