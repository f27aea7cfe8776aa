use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::timefmt;

/// A raw reading from a positioning source.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported horizontal accuracy in meters.
    pub accuracy: f32,
    pub instant: DateTime<Utc>,
}

/// A persisted location sample. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: String,
}

impl LocationRecord {
    pub fn from_fix(fix: &Fix) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            timestamp: timefmt::format_stored(fix.instant),
        }
    }

    /// 12-hour display form of the stored timestamp. Returns the stored
    /// string unchanged when it does not parse.
    pub fn display_time(&self) -> String {
        timefmt::parse_and_reformat(&self.timestamp)
    }
}

/// Event payload published for each accepted sample.
#[derive(Debug, Clone, Serialize)]
pub struct TrackUpdate {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: String,
}

impl From<&LocationRecord> for TrackUpdate {
    fn from(record: &LocationRecord) -> Self {
        Self {
            latitude: record.latitude,
            longitude: record.longitude,
            timestamp: record.timestamp.clone(),
        }
    }
}
