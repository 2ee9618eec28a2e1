use crate::model::ScheduleOverride;
use crate::schedule::expand_schedule;
use crate::tests::fixtures::*;
use chrono::Weekday;
use chrono_tz::America::New_York;
use chrono_tz::Pacific::Auckland;
use chrono_tz::UTC;
use schedkit_time::Interval;

#[test]
fn weekday_rule_expands_one_window_per_matching_day() {
    // 2024-01-01 is a Monday.
    let schedule = schedule_of("s1", vec![weekday_rule(&WEEKDAYS, "09:00", "17:00", UTC)]);
    let range = Interval::new(utc_ms(2024, 1, 1, 0, 0), utc_ms(2024, 1, 2, 0, 0));
    assert_eq!(
        expand_schedule(&schedule, &range),
        vec![Interval::new(utc_ms(2024, 1, 1, 9, 0), utc_ms(2024, 1, 1, 17, 0))]
    );
}

#[test]
fn non_matching_day_contributes_nothing() {
    let schedule = schedule_of("s1", vec![weekday_rule(&WEEKDAYS, "09:00", "17:00", UTC)]);
    // 2024-01-06 is a Saturday.
    let range = Interval::new(utc_ms(2024, 1, 6, 0, 0), utc_ms(2024, 1, 7, 0, 0));
    assert_eq!(expand_schedule(&schedule, &range), vec![]);
}

#[test]
fn empty_rule_set_expands_to_nothing() {
    let schedule = schedule_of("s1", vec![]);
    let range = Interval::new(utc_ms(2024, 1, 1, 0, 0), utc_ms(2024, 1, 8, 0, 0));
    assert_eq!(expand_schedule(&schedule, &range), vec![]);
}

#[test]
fn unavailable_override_removes_the_whole_day() {
    let mut schedule = schedule_of("s1", vec![weekday_rule(&WEEKDAYS, "09:00", "17:00", UTC)]);
    schedule.overrides.push(ScheduleOverride {
        date: date(2024, 1, 1),
        available: false,
        start_time: None,
        end_time: None,
    });
    let range = Interval::new(utc_ms(2024, 1, 1, 0, 0), utc_ms(2024, 1, 3, 0, 0));
    // Monday is gone, Tuesday stays.
    assert_eq!(
        expand_schedule(&schedule, &range),
        vec![Interval::new(utc_ms(2024, 1, 2, 9, 0), utc_ms(2024, 1, 2, 17, 0))]
    );
}

#[test]
fn timed_unavailable_override_carves_a_window() {
    let mut schedule = schedule_of("s1", vec![weekday_rule(&WEEKDAYS, "09:00", "17:00", UTC)]);
    schedule.overrides.push(ScheduleOverride {
        date: date(2024, 1, 1),
        available: false,
        start_time: Some(lt("12:00")),
        end_time: Some(lt("13:00")),
    });
    let range = Interval::new(utc_ms(2024, 1, 1, 0, 0), utc_ms(2024, 1, 2, 0, 0));
    assert_eq!(
        expand_schedule(&schedule, &range),
        vec![
            Interval::new(utc_ms(2024, 1, 1, 9, 0), utc_ms(2024, 1, 1, 12, 0)),
            Interval::new(utc_ms(2024, 1, 1, 13, 0), utc_ms(2024, 1, 1, 17, 0)),
        ]
    );
}

#[test]
fn available_override_with_times_adds_a_window() {
    let mut schedule = schedule_of("s1", vec![weekday_rule(&WEEKDAYS, "09:00", "17:00", UTC)]);
    // 2024-01-06 is a Saturday with no base availability.
    schedule.overrides.push(ScheduleOverride {
        date: date(2024, 1, 6),
        available: true,
        start_time: Some(lt("10:00")),
        end_time: Some(lt("12:00")),
    });
    let range = Interval::new(utc_ms(2024, 1, 6, 0, 0), utc_ms(2024, 1, 7, 0, 0));
    assert_eq!(
        expand_schedule(&schedule, &range),
        vec![Interval::new(utc_ms(2024, 1, 6, 10, 0), utc_ms(2024, 1, 6, 12, 0))]
    );
}

#[test]
fn available_override_without_times_is_a_noop() {
    let mut schedule = schedule_of("s1", vec![weekday_rule(&WEEKDAYS, "09:00", "17:00", UTC)]);
    schedule.overrides.push(ScheduleOverride {
        date: date(2024, 1, 6),
        available: true,
        start_time: None,
        end_time: None,
    });
    let range = Interval::new(utc_ms(2024, 1, 6, 0, 0), utc_ms(2024, 1, 7, 0, 0));
    assert_eq!(expand_schedule(&schedule, &range), vec![]);
}

#[test]
fn unavailable_override_without_base_availability_is_a_noop() {
    let mut schedule = schedule_of("s1", vec![weekday_rule(&WEEKDAYS, "09:00", "17:00", UTC)]);
    schedule.overrides.push(ScheduleOverride {
        date: date(2024, 1, 6), // Saturday
        available: false,
        start_time: None,
        end_time: None,
    });
    let range = Interval::new(utc_ms(2024, 1, 1, 0, 0), utc_ms(2024, 1, 8, 0, 0));
    assert_eq!(expand_schedule(&schedule, &range).len(), 5);
}

#[test]
fn effective_window_bounds_the_rule() {
    let mut rule = weekday_rule(&WEEKDAYS, "09:00", "17:00", UTC);
    rule.effective_from = Some(date(2024, 1, 2));
    rule.effective_until = Some(date(2024, 1, 4));
    let schedule = schedule_of("s1", vec![rule]);
    let range = Interval::new(utc_ms(2024, 1, 1, 0, 0), utc_ms(2024, 1, 8, 0, 0));
    // Only Tue Jan 2 and Wed Jan 3: from is inclusive, until exclusive.
    assert_eq!(
        expand_schedule(&schedule, &range),
        vec![
            Interval::new(utc_ms(2024, 1, 2, 9, 0), utc_ms(2024, 1, 2, 17, 0)),
            Interval::new(utc_ms(2024, 1, 3, 9, 0), utc_ms(2024, 1, 3, 17, 0)),
        ]
    );
}

#[test]
fn cross_midnight_rule_reaches_into_the_next_day() {
    let schedule = schedule_of(
        "s1",
        vec![weekday_rule(&[Weekday::Mon], "22:00", "02:00", UTC)],
    );
    let range = Interval::new(utc_ms(2024, 1, 1, 0, 0), utc_ms(2024, 1, 3, 0, 0));
    assert_eq!(
        expand_schedule(&schedule, &range),
        vec![Interval::new(utc_ms(2024, 1, 1, 22, 0), utc_ms(2024, 1, 2, 2, 0))]
    );
}

#[test]
fn spring_forward_shortens_the_local_window() {
    // 2024-03-10 in New York skips 02:00-03:00. A 01:00-04:00 window is two
    // real hours: 06:00Z (01:00 EST) to 08:00Z (04:00 EDT).
    let schedule = schedule_of(
        "s1",
        vec![weekday_rule(&[Weekday::Sun], "01:00", "04:00", New_York)],
    );
    let range = Interval::new(utc_ms(2024, 3, 10, 0, 0), utc_ms(2024, 3, 11, 0, 0));
    assert_eq!(
        expand_schedule(&schedule, &range),
        vec![Interval::new(utc_ms(2024, 3, 10, 6, 0), utc_ms(2024, 3, 10, 8, 0))]
    );
}

#[test]
fn fall_back_lengthens_the_local_window() {
    // 2024-11-03 in New York repeats 01:00-02:00. A 00:30-04:00 window runs
    // 04:30Z (00:30 EDT) to 09:00Z (04:00 EST): four and a half real hours.
    let schedule = schedule_of(
        "s1",
        vec![weekday_rule(&[Weekday::Sun], "00:30", "04:00", New_York)],
    );
    let range = Interval::new(utc_ms(2024, 11, 3, 0, 0), utc_ms(2024, 11, 4, 0, 0));
    let expanded = expand_schedule(&schedule, &range);
    assert_eq!(
        expanded,
        vec![Interval::new(utc_ms(2024, 11, 3, 4, 30), utc_ms(2024, 11, 3, 9, 0))]
    );
    assert_eq!(expanded[0].duration_ms(), 4 * HOUR_MS + 30 * MINUTE_MS);
}

#[test]
fn zone_ahead_of_utc_contributes_from_the_next_civil_day() {
    // Tuesday 2024-01-02 09:00 in Auckland (UTC+13) is Monday 20:00Z, inside
    // a Monday-only UTC range.
    let schedule = schedule_of(
        "s1",
        vec![weekday_rule(&[Weekday::Tue], "09:00", "10:00", Auckland)],
    );
    let range = Interval::new(utc_ms(2024, 1, 1, 0, 0), utc_ms(2024, 1, 2, 0, 0));
    assert_eq!(
        expand_schedule(&schedule, &range),
        vec![Interval::new(utc_ms(2024, 1, 1, 20, 0), utc_ms(2024, 1, 1, 21, 0))]
    );
}

#[test]
fn results_are_clipped_to_the_range() {
    let schedule = schedule_of("s1", vec![weekday_rule(&WEEKDAYS, "09:00", "17:00", UTC)]);
    let range = Interval::new(utc_ms(2024, 1, 1, 10, 0), utc_ms(2024, 1, 1, 11, 0));
    assert_eq!(expand_schedule(&schedule, &range), vec![range]);
}
