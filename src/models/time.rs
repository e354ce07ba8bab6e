//! Weekday and time-range value types for the weekly slot grid.
//!
//! The academy week is ordered Sunday-first: Sunday has index 0 and Saturday
//! index 6. This ordering drives the deterministic sort applied to a
//! student's scheduled appointments.

use serde::{Deserialize, Serialize};

/// Day of the week, Sunday-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    /// All seven days in academy order (Sunday first).
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// Index within the academy week (Sunday = 0, Saturday = 6).
    pub fn index(&self) -> u8 {
        match self {
            DayOfWeek::Sunday => 0,
            DayOfWeek::Monday => 1,
            DayOfWeek::Tuesday => 2,
            DayOfWeek::Wednesday => 3,
            DayOfWeek::Thursday => 4,
            DayOfWeek::Friday => 5,
            DayOfWeek::Saturday => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        }
    }

    /// Next calendar date (today inclusive) falling on this weekday.
    ///
    /// Used to stamp the `date` of sessions created at reservation time.
    pub fn next_occurrence(&self, from: chrono::NaiveDate) -> chrono::NaiveDate {
        use chrono::Datelike;
        let from_idx = from.weekday().num_days_from_sunday();
        let target_idx = self.index() as u32;
        let ahead = (target_idx + 7 - from_idx) % 7;
        from + chrono::Duration::days(ahead as i64)
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sunday" => Ok(DayOfWeek::Sunday),
            "monday" => Ok(DayOfWeek::Monday),
            "tuesday" => Ok(DayOfWeek::Tuesday),
            "wednesday" => Ok(DayOfWeek::Wednesday),
            "thursday" => Ok(DayOfWeek::Thursday),
            "friday" => Ok(DayOfWeek::Friday),
            "saturday" => Ok(DayOfWeek::Saturday),
            other => Err(format!("Unknown day of week: {}", other)),
        }
    }
}

/// Half-open time range within a day, stored as minutes since midnight.
///
/// Serialized as `"HH:MM-HH:MM"` (e.g. `"09:00-09:30"`), which is also the
/// form used as part of the slot key in teacher grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    start_minutes: u16,
    end_minutes: u16,
}

impl TimeRange {
    /// Create a time range from start/end minutes since midnight.
    ///
    /// # Errors
    /// Fails when `start >= end` or either bound exceeds 24h.
    pub fn new(start_minutes: u16, end_minutes: u16) -> Result<Self, String> {
        if start_minutes >= end_minutes {
            return Err(format!(
                "Time range start ({}) must be before end ({})",
                start_minutes, end_minutes
            ));
        }
        if end_minutes > 24 * 60 {
            return Err(format!("Time range end ({}) exceeds 24:00", end_minutes));
        }
        Ok(Self {
            start_minutes,
            end_minutes,
        })
    }

    /// Start of the range in minutes since midnight.
    pub fn start_minutes(&self) -> u16 {
        self.start_minutes
    }

    /// End of the range in minutes since midnight.
    pub fn end_minutes(&self) -> u16 {
        self.end_minutes
    }

    /// Duration in minutes.
    pub fn duration_minutes(&self) -> u16 {
        self.end_minutes - self.start_minutes
    }

    fn parse_clock(s: &str) -> Result<u16, String> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid clock time: {}", s))?;
        let hours: u16 = h
            .trim()
            .parse()
            .map_err(|_| format!("Invalid hour in clock time: {}", s))?;
        let minutes: u16 = m
            .trim()
            .parse()
            .map_err(|_| format!("Invalid minute in clock time: {}", s))?;
        if hours > 24 || minutes > 59 {
            return Err(format!("Clock time out of range: {}", s));
        }
        Ok(hours * 60 + minutes)
    }

    fn format_clock(minutes: u16) -> String {
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            Self::format_clock(self.start_minutes),
            Self::format_clock(self.end_minutes)
        )
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid time range (expected HH:MM-HH:MM): {}", s))?;
        Self::new(Self::parse_clock(start)?, Self::parse_clock(end)?)
    }
}

impl Serialize for TimeRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeRange {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identity of one slot within a teacher's weekly grid.
pub type SlotKey = (DayOfWeek, TimeRange);

/// Deterministic grid ordering: `(day index, start minutes)` ascending.
pub fn slot_key_order(a: &SlotKey, b: &SlotKey) -> std::cmp::Ordering {
    (a.0.index(), a.1.start_minutes()).cmp(&(b.0.index(), b.1.start_minutes()))
}
