//! Standalone expansion of a recurrence rule into occurrence intervals.

use crate::model::{Frequency, RecurrenceRule};
use crate::schedule::{local_window, MAX_SCAN_DAYS};
use chrono::{Datelike, Duration, NaiveDate};
use log::warn;
use schedkit_time::{utc_date, Interval};

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// ISO-week distance between two civil days, in whole Monday-aligned weeks.
fn week_distance(day: NaiveDate, anchor: NaiveDate) -> i64 {
    (week_start(day) - week_start(anchor)).num_days() / 7
}

fn matches_day(rule: &RecurrenceRule, day: NaiveDate, anchor: NaiveDate) -> bool {
    let in_day_filter = |days: &Vec<chrono::Weekday>| days.contains(&day.weekday());
    match rule.frequency {
        Frequency::Daily => rule.days.as_ref().is_none_or(in_day_filter),
        Frequency::Weekly => rule.days.as_ref().is_some_and(in_day_filter),
        Frequency::Biweekly => {
            rule.days.as_ref().is_some_and(in_day_filter)
                && week_distance(day, anchor).rem_euclid(2) == 0
        }
        Frequency::Monthly => rule.day_of_month == Some(day.day()),
    }
}

/// Expands `rule` to its occurrence intervals whose start lies inside
/// `range` (inclusive lower bound, exclusive upper), ordered by start.
///
/// The scan walks civil days from one day before the range to one day past
/// it so zone offsets cannot lose an occurrence. `until` bounds occurrence
/// starts; `count` caps the number of emitted occurrences; `exclude` dates
/// are matched on the civil day in the rule's zone.
pub fn expand_recurrence(rule: &RecurrenceRule, range: &Interval) -> Vec<Interval> {
    if range.is_empty() {
        return Vec::new();
    }
    if rule.count == Some(0) {
        return Vec::new();
    }

    let first_day = utc_date(range.start) - Duration::days(1);
    let mut last_day = utc_date(range.end - 1) + Duration::days(1);
    if let Some(until) = rule.until {
        last_day = last_day.min(utc_date(until) + Duration::days(1));
    }
    if (last_day - first_day).num_days() > MAX_SCAN_DAYS {
        warn!(
            "recurrence expansion clipped to {} days (queried {})",
            MAX_SCAN_DAYS,
            (last_day - first_day).num_days()
        );
        last_day = first_day + Duration::days(MAX_SCAN_DAYS);
    }

    let anchor = utc_date(rule.anchor.unwrap_or(range.start));
    let mut occurrences = Vec::new();
    let mut day = first_day;
    while day <= last_day {
        let current = day;
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
        if !matches_day(rule, current, anchor) || rule.exclude.contains(&current) {
            continue;
        }
        let Some(occurrence) =
            local_window(current, rule.start_time, rule.end_time, rule.zone)
        else {
            continue;
        };
        if rule.until.is_some_and(|until| occurrence.start > until) {
            break;
        }
        if occurrence.start >= range.end {
            break;
        }
        if occurrence.start >= range.start {
            occurrences.push(occurrence);
            if rule.count.is_some_and(|count| occurrences.len() as u32 >= count) {
                break;
            }
        }
    }
    occurrences.sort_by_key(|occurrence| occurrence.start);
    occurrences
}
