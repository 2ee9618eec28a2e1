use crate::interval::EpochMs;
use crate::local::{datetime_utc, resolve_local};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Calendar unit for truncation and counting windows. Weeks start Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarUnit {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

fn wall_time(at: EpochMs, zone: Option<Tz>) -> NaiveDateTime {
    match zone {
        Some(tz) => datetime_utc(at).with_timezone(&tz).naive_local(),
        None => datetime_utc(at).naive_utc(),
    }
}

fn to_instant(naive: NaiveDateTime, zone: Option<Tz>) -> EpochMs {
    match zone {
        Some(tz) => resolve_local(naive, tz),
        None => naive.and_utc().timestamp_millis(),
    }
}

fn truncate(at: EpochMs, unit: CalendarUnit, zone: Option<Tz>) -> NaiveDateTime {
    let wall = wall_time(at, zone);
    let date = wall.date();
    let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    match unit {
        CalendarUnit::Hour => date
            .and_hms_opt(wall.hour(), 0, 0)
            .expect("wall-clock hour is always valid"),
        CalendarUnit::Day => midnight(date),
        CalendarUnit::Week => {
            midnight(date - Duration::days(date.weekday().num_days_from_monday() as i64))
        }
        CalendarUnit::Month => midnight(date.with_day(1).expect("day 1 exists in every month")),
        CalendarUnit::Year => midnight(
            NaiveDate::from_ymd_opt(date.year(), 1, 1).expect("Jan 1 exists in every year"),
        ),
    }
}

/// Start of the calendar unit containing `at`, evaluated in `zone`'s wall
/// calendar (UTC when absent).
pub fn start_of_unit(at: EpochMs, unit: CalendarUnit, zone: Option<Tz>) -> EpochMs {
    to_instant(truncate(at, unit, zone), zone)
}

/// Exclusive upper bound of the unit containing `at`: the start of the next
/// unit, computed by civil-calendar stepping (never by a fixed-length
/// approximation, so months and DST days keep their true lengths).
pub fn end_of_unit(at: EpochMs, unit: CalendarUnit, zone: Option<Tz>) -> EpochMs {
    let start = truncate(at, unit, zone);
    let next = match unit {
        CalendarUnit::Hour => start + Duration::hours(1),
        CalendarUnit::Day => start + Duration::days(1),
        CalendarUnit::Week => start + Duration::days(7),
        CalendarUnit::Month => start
            .checked_add_months(Months::new(1))
            .expect("month step stays in range"),
        CalendarUnit::Year => start
            .checked_add_months(Months::new(12))
            .expect("year step stays in range"),
    };
    to_instant(next, zone)
}

/// ISO-8601 week key of the UTC instant: week-year * 100 + week number.
/// Monday-based, nearest-Thursday year attribution, so 2024-12-30 maps to
/// week 1 of 2025 (key 202501).
pub fn iso_week_key(at: EpochMs) -> i32 {
    let week = datetime_utc(at).iso_week();
    week.year() * 100 + week.week() as i32
}

/// UTC calendar day of the instant, used as a per-day counting key.
pub fn utc_day(at: EpochMs) -> NaiveDate {
    datetime_utc(at).date_naive()
}
