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

//! Expansion of a schedule (weekly rules plus per-date overrides) into
//! merged UTC availability intervals.

use crate::model::{Schedule, ScheduleRule};
use chrono::{Datelike, Duration, NaiveDate};
use chrono_tz::Tz;
use log::{debug, warn};
use schedkit_time::{
    local_time_to_utc, merge_intervals, subtract_intervals, utc_date, Interval, LocalTime,
};

/// Upper bound on the civil days walked per expansion. Queries beyond this
/// are clipped rather than scanned.
pub(crate) const MAX_SCAN_DAYS: i64 = 3_700;

impl ScheduleRule {
    /// Whether the rule contributes a window on the given civil day.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.days.contains(&date.weekday())
            && self.effective_from.is_none_or(|from| date >= from)
            && self.effective_until.is_none_or(|until| date < until)
    }
}

/// UTC interval of a local `[start_time, end_time)` window on `date`.
/// An end at or before the start wall time is read as crossing midnight into
/// the next civil day; a window that still comes out empty (a DST-degenerate
/// pair) is dropped.
pub(crate) fn local_window(
    date: NaiveDate,
    start_time: LocalTime,
    end_time: LocalTime,
    zone: Tz,
) -> Option<Interval> {
    let start = local_time_to_utc(date, start_time, zone);
    let end = if end_time < start_time {
        local_time_to_utc(date.succ_opt()?, end_time, zone)
    } else {
        local_time_to_utc(date, end_time, zone)
    };
    let window = Interval::new(start, end);
    if window.is_empty() {
        debug!(
            "dropping empty local window {}-{} on {} in {}",
            start_time, end_time, date, zone
        );
        None
    } else {
        Some(window)
    }
}

/// Whole civil day `[date 00:00, date+1 00:00)` in `zone`.
fn full_day(date: NaiveDate, zone: Tz) -> Option<Interval> {
    let start = local_time_to_utc(date, LocalTime::MIDNIGHT, zone);
    let end = local_time_to_utc(date.succ_opt()?, LocalTime::MIDNIGHT, zone);
    let day = Interval::new(start, end);
    if day.is_empty() { None } else { Some(day) }
}

/// Expands `schedule` into sorted, disjoint UTC availability intervals
/// clipped to `range`.
///
/// Civil days one beyond the range on each side are scanned so rules in
/// zones ahead of or behind UTC still contribute; DST-short and DST-long
/// windows come out right because both edges are resolved against the zone
/// database independently.
pub fn expand_schedule(schedule: &Schedule, range: &Interval) -> Vec<Interval> {
    if range.is_empty() {
        return Vec::new();
    }

    let first_day = utc_date(range.start) - Duration::days(1);
    let mut last_day = utc_date(range.end - 1) + Duration::days(1);
    if (last_day - first_day).num_days() > MAX_SCAN_DAYS {
        warn!(
            "schedule {} expansion clipped to {} days (queried {})",
            schedule.id,
            MAX_SCAN_DAYS,
            (last_day - first_day).num_days()
        );
        last_day = first_day + Duration::days(MAX_SCAN_DAYS);
    }

    let mut base = Vec::new();
    let mut day = first_day;
    while day <= last_day {
        for rule in &schedule.rules {
            if rule.applies_on(day) {
                if let Some(window) = local_window(day, rule.start_time, rule.end_time, rule.zone) {
                    base.push(window);
                }
            }
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    // Overrides are dated in the schedule's primary zone.
    let primary = schedule.primary_zone();
    let mut removals = Vec::new();
    let mut additions = Vec::new();
    for over in &schedule.overrides {
        let window = match (over.start_time, over.end_time) {
            (Some(start), Some(end)) => local_window(over.date, start, end, primary),
            _ if over.available => continue, // available without times: no-op
            _ => full_day(over.date, primary),
        };
        let Some(window) = window else { continue };
        if over.available {
            additions.push(window);
        } else {
            removals.push(window);
        }
    }

    let mut combined = subtract_intervals(&merge_intervals(&base), &removals);
    combined.extend(additions);
    merge_intervals(&combined)
        .iter()
        .filter_map(|window| window.clip(range))
        .collect()
}
