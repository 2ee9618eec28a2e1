/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

//! Counting windows: the time region within which usage is measured, and
//! when it resets.

use crate::interval::{EpochMs, Interval};
use crate::local::datetime_utc;
use crate::unit::{end_of_unit, start_of_unit, CalendarUnit};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;

/// Lower bound of a lifetime window: 1970-01-01T00:00:00Z.
pub const EPOCH_MS: EpochMs = 0;
/// Upper bound of a lifetime window: 9999-12-31T23:59:59.999Z.
pub const FAR_FUTURE_MS: EpochMs = 253_402_300_799_999;

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// A span of time, either raw milliseconds or structured parts.
/// `months` is approximated as 30 days; the approximation is only ever used
/// for sliding windows and description text, never for calendar-unit math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationSpec {
    Millis(i64),
    Parts {
        #[serde(default)]
        hours: u32,
        #[serde(default)]
        days: u32,
        #[serde(default)]
        weeks: u32,
        #[serde(default)]
        months: u32,
    },
}

impl DurationSpec {
    pub fn to_ms(&self) -> i64 {
        match *self {
            DurationSpec::Millis(ms) => ms,
            DurationSpec::Parts {
                hours,
                days,
                weeks,
                months,
            } => {
                hours as i64 * HOUR_MS
                    + days as i64 * DAY_MS
                    + weeks as i64 * 7 * DAY_MS
                    + months as i64 * 30 * DAY_MS
            }
        }
    }
}

/// The four window variants usage can be counted in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowSpec {
    Calendar {
        unit: CalendarUnit,
        #[serde(default)]
        zone: Option<Tz>,
    },
    Sliding(DurationSpec),
    Lifetime,
    Fixed(Interval),
}

/// The concrete `[start, end)` interval of `spec` around the instant `at`.
/// A lifetime window is independent of `at`.
pub fn resolve_window(spec: &WindowSpec, at: EpochMs) -> Interval {
    match spec {
        WindowSpec::Calendar { unit, zone } => Interval::new(
            start_of_unit(at, *unit, *zone),
            end_of_unit(at, *unit, *zone),
        ),
        WindowSpec::Sliding(duration) => Interval::new(at - duration.to_ms(), at),
        WindowSpec::Lifetime => Interval::new(EPOCH_MS, FAR_FUTURE_MS),
        WindowSpec::Fixed(interval) => *interval,
    }
}

/// The instant at which the window rolls over, if it ever does.
pub fn next_reset(spec: &WindowSpec, at: EpochMs) -> Option<EpochMs> {
    match spec {
        WindowSpec::Calendar { unit, zone } => Some(end_of_unit(at, *unit, *zone)),
        WindowSpec::Sliding(duration) => Some(at + duration.to_ms()),
        WindowSpec::Lifetime | WindowSpec::Fixed(_) => None,
    }
}

/// A short human description of the window. Display convenience only.
pub fn describe_window(spec: &WindowSpec) -> String {
    match spec {
        WindowSpec::Calendar { unit, zone } => {
            let unit_name = match unit {
                CalendarUnit::Hour => "hour",
                CalendarUnit::Day => "day",
                CalendarUnit::Week => "week",
                CalendarUnit::Month => "month",
                CalendarUnit::Year => "year",
            };
            match zone {
                Some(tz) => format!("per calendar {} in {}", unit_name, tz),
                None => format!("per calendar {} (UTC)", unit_name),
            }
        }
        WindowSpec::Sliding(duration) => {
            let ms = duration.to_ms().max(0) as u64;
            format!(
                "in a sliding {} window",
                humantime::format_duration(StdDuration::from_millis(ms))
            )
        }
        WindowSpec::Lifetime => "over the lifetime".to_string(),
        WindowSpec::Fixed(interval) => format!(
            "between {} and {}",
            datetime_utc(interval.start).to_rfc3339(),
            datetime_utc(interval.end).to_rfc3339()
        ),
    }
}
