use chrono::{NaiveDate, Weekday};
use chrono_tz::Tz;
use schedkit_time::{EpochMs, Interval, LocalTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Schedule key used when an event type does not name one.
pub const DEFAULT_SCHEDULE_KEY: &str = "default";

/// A weekly availability rule in a host schedule, expressed in local wall
/// time. The rule applies on a civil day iff the day's weekday is in `days`
/// and the day lies in `[effective_from, effective_until)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub days: Vec<Weekday>,
    pub start_time: LocalTime,
    pub end_time: LocalTime,
    pub zone: Tz,
    #[serde(default)]
    pub effective_from: Option<NaiveDate>,
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
}

/// A per-date exception. `available = false` subtracts the stated times (or
/// the whole day when no times are given); `available = true` with both
/// times adds a window; `available = true` without times is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOverride {
    pub date: NaiveDate,
    pub available: bool,
    #[serde(default)]
    pub start_time: Option<LocalTime>,
    #[serde(default)]
    pub end_time: Option<LocalTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Box<str>,
    pub rules: Vec<ScheduleRule>,
    #[serde(default)]
    pub overrides: Vec<ScheduleOverride>,
}

impl Schedule {
    /// Zone in which override dates are interpreted: the first rule's zone,
    /// or UTC for an empty rule set.
    pub fn primary_zone(&self) -> Tz {
        self.rules.first().map(|r| r.zone).unwrap_or(chrono_tz::UTC)
    }
}

/// A bookable host and its named schedules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSchedules {
    pub host_id: Box<str>,
    pub schedules: HashMap<Box<str>, Schedule>,
}

/// The shape of what is being booked. All durations are milliseconds.
/// Optional fields fall back per host through `host_overrides`, then to the
/// derived defaults (`slot_interval_ms` = `length_ms`, buffers and notice 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventType {
    pub id: Box<str>,
    pub length_ms: i64,
    #[serde(default)]
    pub schedule_key: Option<Box<str>>,
    #[serde(default)]
    pub buffer_before_ms: Option<i64>,
    #[serde(default)]
    pub buffer_after_ms: Option<i64>,
    #[serde(default)]
    pub slot_interval_ms: Option<i64>,
    #[serde(default)]
    pub minimum_notice_ms: Option<i64>,
    #[serde(default)]
    pub maximum_lead_time_ms: Option<i64>,
    #[serde(default)]
    pub max_per_day: Option<u32>,
    #[serde(default)]
    pub max_per_week: Option<u32>,
    #[serde(default)]
    pub host_overrides: HashMap<Box<str>, EventTypeOverride>,
}

/// Per-host partial override of an event type. A present field wins over the
/// base value for that host only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventTypeOverride {
    #[serde(default)]
    pub length_ms: Option<i64>,
    #[serde(default)]
    pub schedule_key: Option<Box<str>>,
    #[serde(default)]
    pub buffer_before_ms: Option<i64>,
    #[serde(default)]
    pub buffer_after_ms: Option<i64>,
    #[serde(default)]
    pub slot_interval_ms: Option<i64>,
    #[serde(default)]
    pub minimum_notice_ms: Option<i64>,
    #[serde(default)]
    pub maximum_lead_time_ms: Option<i64>,
    #[serde(default)]
    pub max_per_day: Option<u32>,
    #[serde(default)]
    pub max_per_week: Option<u32>,
}

/// An existing commitment on a host's timeline. `event_type_id` keys into
/// the buffer table and into the per-day/per-week cap counting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub host_id: Box<str>,
    pub start: EpochMs,
    pub end: EpochMs,
    #[serde(default)]
    pub event_type_id: Option<Box<str>>,
    #[serde(default)]
    pub id: Option<Box<str>>,
}

/// Opaque busy time on a host's timeline. Never inflated by buffers and not
/// counted against caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub host_id: Box<str>,
    pub start: EpochMs,
    pub end: EpochMs,
}

/// A bookable window emitted by the generator. The buffer intervals are
/// informational; the slot itself is `[start, end)` with
/// `end - start = length_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub host_id: Box<str>,
    pub start: EpochMs,
    pub end: EpochMs,
    #[serde(default)]
    pub buffer_before: Option<Interval>,
    #[serde(default)]
    pub buffer_after: Option<Interval>,
}

/// Prep/wrap-up padding attached to an event type, in milliseconds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BufferPolicy {
    #[serde(default)]
    pub buffer_before_ms: i64,
    #[serde(default)]
    pub buffer_after_ms: i64,
}

/// Buffers of existing bookings, keyed by their event-type id.
pub type BufferTable = HashMap<Box<str>, BufferPolicy>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

/// A simple recurrence: daily/weekly/biweekly/monthly with optional day
/// filters, an `until`/`count` stop, and excluded civil dates. Biweekly
/// parity is measured in ISO weeks from `anchor` (default: the query range
/// start).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default)]
    pub days: Option<Vec<Weekday>>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    pub start_time: LocalTime,
    pub end_time: LocalTime,
    pub zone: Tz,
    #[serde(default)]
    pub anchor: Option<EpochMs>,
    #[serde(default)]
    pub until: Option<EpochMs>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub exclude: Vec<NaiveDate>,
}

/// Chained builder for event types, mirroring the option-heavy construction
/// sites in tests and adapters.
pub struct EventTypeBuilder {
    event_type: EventType,
}

impl EventTypeBuilder {
    pub fn new(id: impl Into<Box<str>>, length_ms: i64) -> Self {
        EventTypeBuilder {
            event_type: EventType {
                id: id.into(),
                length_ms,
                schedule_key: None,
                buffer_before_ms: None,
                buffer_after_ms: None,
                slot_interval_ms: None,
                minimum_notice_ms: None,
                maximum_lead_time_ms: None,
                max_per_day: None,
                max_per_week: None,
                host_overrides: HashMap::new(),
            },
        }
    }

    pub fn schedule_key(mut self, key: impl Into<Box<str>>) -> Self {
        self.event_type.schedule_key = Some(key.into());
        self
    }

    pub fn buffer_before(mut self, ms: i64) -> Self {
        self.event_type.buffer_before_ms = Some(ms);
        self
    }

    pub fn buffer_after(mut self, ms: i64) -> Self {
        self.event_type.buffer_after_ms = Some(ms);
        self
    }

    pub fn slot_interval(mut self, ms: i64) -> Self {
        self.event_type.slot_interval_ms = Some(ms);
        self
    }

    pub fn minimum_notice(mut self, ms: i64) -> Self {
        self.event_type.minimum_notice_ms = Some(ms);
        self
    }

    pub fn maximum_lead_time(mut self, ms: i64) -> Self {
        self.event_type.maximum_lead_time_ms = Some(ms);
        self
    }

    pub fn max_per_day(mut self, cap: u32) -> Self {
        self.event_type.max_per_day = Some(cap);
        self
    }

    pub fn max_per_week(mut self, cap: u32) -> Self {
        self.event_type.max_per_week = Some(cap);
        self
    }

    pub fn host_override(mut self, host_id: impl Into<Box<str>>, over: EventTypeOverride) -> Self {
        self.event_type.host_overrides.insert(host_id.into(), over);
        self
    }

    pub fn build(self) -> EventType {
        self.event_type
    }
}
