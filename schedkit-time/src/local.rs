use crate::interval::EpochMs;
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeError {
    #[error("invalid local time '{0}', expected HH:MM")]
    InvalidLocalTime(Box<str>),
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(Box<str>),
}

/// A wall-clock time of day in 24-hour `HH:MM` form. Only meaningful next to
/// an IANA zone and a civil date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocalTime {
    hour: u8,
    minute: u8,
}

impl LocalTime {
    pub fn new(hour: u8, minute: u8) -> Option<LocalTime> {
        if hour < 24 && minute < 60 {
            Some(LocalTime { hour, minute })
        } else {
            None
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn to_naive(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0)
            .expect("LocalTime fields are range-checked at construction")
    }

    pub const MIDNIGHT: LocalTime = LocalTime { hour: 0, minute: 0 };
}

impl FromStr for LocalTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<LocalTime, TimeError> {
        let invalid = || TimeError::InvalidLocalTime(s.into());
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        let hour = h.parse::<u8>().map_err(|_| invalid())?;
        let minute = m.parse::<u8>().map_err(|_| invalid())?;
        LocalTime::new(hour, minute).ok_or_else(invalid)
    }
}

impl fmt::Display for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for LocalTime {
    type Error = TimeError;

    fn try_from(s: String) -> Result<LocalTime, TimeError> {
        s.parse()
    }
}

impl From<LocalTime> for String {
    fn from(t: LocalTime) -> String {
        t.to_string()
    }
}

/// Parses a `YYYY-MM-DD` civil date.
pub fn civil_date(s: &str) -> Result<NaiveDate, TimeError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| TimeError::InvalidDate(s.into()))
}

/// The UTC calendar date containing `at`.
pub fn utc_date(at: EpochMs) -> NaiveDate {
    datetime_utc(at).date_naive()
}

/// The calendar date containing `at` in the given zone.
pub fn zoned_date(at: EpochMs, zone: Tz) -> NaiveDate {
    datetime_utc(at).with_timezone(&zone).date_naive()
}

pub fn datetime_utc(at: EpochMs) -> DateTime<Utc> {
    match DateTime::from_timestamp_millis(at) {
        Some(dt) => dt,
        None => panic!("instant {} is outside the supported range", at),
    }
}

/// Spring-forward gaps are at most a day in the zone database; probing one
/// minute at a time is bounded by this.
const MAX_GAP_PROBE_MINUTES: u32 = 24 * 60;

/// Converts a civil date plus wall-clock time in `zone` to a UTC instant,
/// consulting the zone database at the target instant so DST transitions are
/// honoured.
///
/// At a fall-back hour where two UTC instants share the wall time, the later
/// instant (the post-transition offset) wins. A wall time inside a
/// spring-forward gap resolves to the first representable minute after the
/// gap.
pub fn local_time_to_utc(date: NaiveDate, time: LocalTime, zone: Tz) -> EpochMs {
    resolve_local(date.and_time(time.to_naive()), zone)
}

pub(crate) fn resolve_local(naive: NaiveDateTime, zone: Tz) -> EpochMs {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.timestamp_millis(),
        LocalResult::Ambiguous(_, later) => later.timestamp_millis(),
        LocalResult::None => {
            debug!("local time {} is skipped in {}, resolving after the gap", naive, zone);
            let mut probe = naive;
            for _ in 0..MAX_GAP_PROBE_MINUTES {
                probe = probe + Duration::minutes(1);
                match zone.from_local_datetime(&probe) {
                    LocalResult::Single(dt) => return dt.timestamp_millis(),
                    LocalResult::Ambiguous(first, _) => return first.timestamp_millis(),
                    LocalResult::None => continue,
                }
            }
            panic!("no valid local time within a day of {} in {}", naive, zone)
        }
    }
}
