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

//! Slot generation: from expanded schedules, existing bookings and blocks to
//! bookable slots for an event type.

use crate::model::{
    Block, Booking, BufferTable, EventType, HostSchedules, Slot, DEFAULT_SCHEDULE_KEY,
};
use crate::schedule::expand_schedule;
use chrono::NaiveDate;
use log::{debug, warn};
use schedkit_time::{iso_week_key, merge_intervals, subtract_intervals, utc_day, EpochMs, Interval};
use std::collections::HashMap;

/// One slot query: the event type being booked, the candidate hosts with
/// their schedules, the busy context, and the UTC range to fill.
/// `buffers` carries the buffer policy of *existing* bookings' event types;
/// an absent entry means zero buffers.
pub struct SlotQuery {
    pub event_type: EventType,
    pub hosts: Vec<HostSchedules>,
    pub bookings: Vec<Booking>,
    pub blocks: Vec<Block>,
    pub range: Interval,
    pub buffers: BufferTable,
}

/// Event-type configuration resolved for one host: per-field host overrides
/// applied, then the derived defaults.
struct HostConfig {
    length_ms: i64,
    schedule_key: Box<str>,
    buffer_before_ms: i64,
    buffer_after_ms: i64,
    slot_interval_ms: i64,
    minimum_notice_ms: i64,
    maximum_lead_time_ms: Option<i64>,
    max_per_day: Option<u32>,
    max_per_week: Option<u32>,
}

fn resolve_host_config(event_type: &EventType, host_id: &str) -> HostConfig {
    let over = event_type.host_overrides.get(host_id);
    macro_rules! pick {
        ($field:ident) => {
            over.and_then(|o| o.$field).or(event_type.$field)
        };
    }
    let length_ms = over.and_then(|o| o.length_ms).unwrap_or(event_type.length_ms);
    HostConfig {
        length_ms,
        schedule_key: over
            .and_then(|o| o.schedule_key.clone())
            .or_else(|| event_type.schedule_key.clone())
            .unwrap_or_else(|| DEFAULT_SCHEDULE_KEY.into()),
        buffer_before_ms: pick!(buffer_before_ms).unwrap_or(0),
        buffer_after_ms: pick!(buffer_after_ms).unwrap_or(0),
        slot_interval_ms: pick!(slot_interval_ms).unwrap_or(length_ms),
        minimum_notice_ms: pick!(minimum_notice_ms).unwrap_or(0),
        maximum_lead_time_ms: pick!(maximum_lead_time_ms),
        max_per_day: pick!(max_per_day),
        max_per_week: pick!(max_per_week),
    }
}

/// Computes the bookable slots for every host in the query.
///
/// Per host: expand the selected schedule, subtract bookings (each inflated
/// by its *own* event type's buffers) and blocks, clip by minimum notice and
/// maximum lead time, lay candidates on the slot-interval grid so that the
/// candidate inflated by the *queried* event type's buffers still fits the
/// free interval, then enforce per-day and per-ISO-week caps. The combined
/// result is sorted by `(start, host)`.
///
/// There are no error states: an unknown schedule key or a non-positive
/// length simply contributes no slots.
pub fn available_slots(query: &SlotQuery, now: EpochMs) -> Vec<Slot> {
    let mut slots = Vec::new();
    for host in &query.hosts {
        slots.extend(host_slots(query, host, now));
    }
    slots.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.host_id.cmp(&b.host_id)));
    slots
}

fn host_slots(query: &SlotQuery, host: &HostSchedules, now: EpochMs) -> Vec<Slot> {
    let config = resolve_host_config(&query.event_type, &host.host_id);
    if config.length_ms <= 0 || config.slot_interval_ms <= 0 {
        warn!(
            "event type {} resolves to a non-positive length or grid for host {}, skipping",
            query.event_type.id, host.host_id
        );
        return Vec::new();
    }
    let Some(schedule) = host.schedules.get(&config.schedule_key) else {
        warn!(
            "host {} has no schedule '{}', contributing no slots",
            host.host_id, config.schedule_key
        );
        return Vec::new();
    };

    let available = expand_schedule(schedule, &query.range);

    // Existing bookings inflate by their own event type's buffers; blocks
    // are busy exactly as given.
    let mut busy = Vec::new();
    for booking in query.bookings.iter().filter(|b| b.host_id == host.host_id) {
        let policy = booking
            .event_type_id
            .as_ref()
            .and_then(|id| query.buffers.get(id))
            .copied()
            .unwrap_or_default();
        busy.push(Interval::new(
            booking.start - policy.buffer_before_ms,
            booking.end + policy.buffer_after_ms,
        ));
    }
    for block in query.blocks.iter().filter(|b| b.host_id == host.host_id) {
        busy.push(Interval::new(block.start, block.end));
    }
    let mut free = subtract_intervals(&available, &merge_intervals(&busy));

    // Minimum notice clips interval starts forward; maximum lead time clips
    // ends back.
    let earliest = now + config.minimum_notice_ms;
    let latest = config.maximum_lead_time_ms.map(|lead| now + lead);
    free = free
        .into_iter()
        .map(|f| Interval::new(f.start.max(earliest), latest.map_or(f.end, |l| f.end.min(l))))
        .filter(|f| !f.is_empty())
        .collect();

    let mut candidates = Vec::new();
    for window in &free {
        let mut start = window.start + config.buffer_before_ms;
        loop {
            let end = start + config.length_ms;
            if end + config.buffer_after_ms > window.end {
                break;
            }
            candidates.push(Slot {
                host_id: host.host_id.clone(),
                start,
                end,
                buffer_before: (config.buffer_before_ms > 0)
                    .then(|| Interval::new(start - config.buffer_before_ms, start)),
                buffer_after: (config.buffer_after_ms > 0)
                    .then(|| Interval::new(end, end + config.buffer_after_ms)),
            });
            start += config.slot_interval_ms;
        }
    }
    debug!(
        "host {}: {} free intervals, {} candidates before caps",
        host.host_id,
        free.len(),
        candidates.len()
    );

    if config.max_per_day.is_none() && config.max_per_week.is_none() {
        return candidates;
    }
    apply_caps(query, host, &config, candidates)
}

/// Admits candidates in generated order while the existing-booking count
/// plus already-admitted count stays below the caps.
fn apply_caps(
    query: &SlotQuery,
    host: &HostSchedules,
    config: &HostConfig,
    candidates: Vec<Slot>,
) -> Vec<Slot> {
    let mut booked_per_day: HashMap<NaiveDate, u32> = HashMap::new();
    let mut booked_per_week: HashMap<i32, u32> = HashMap::new();
    for booking in query.bookings.iter().filter(|b| {
        b.host_id == host.host_id && b.event_type_id.as_deref() == Some(&*query.event_type.id)
    }) {
        *booked_per_day.entry(utc_day(booking.start)).or_default() += 1;
        *booked_per_week.entry(iso_week_key(booking.start)).or_default() += 1;
    }

    let mut admitted_per_day: HashMap<NaiveDate, u32> = HashMap::new();
    let mut admitted_per_week: HashMap<i32, u32> = HashMap::new();
    let mut admitted = Vec::new();
    for slot in candidates {
        let day = utc_day(slot.start);
        let week = iso_week_key(slot.start);
        let day_count =
            booked_per_day.get(&day).copied().unwrap_or(0) + admitted_per_day.get(&day).copied().unwrap_or(0);
        let week_count = booked_per_week.get(&week).copied().unwrap_or(0)
            + admitted_per_week.get(&week).copied().unwrap_or(0);
        if config.max_per_day.is_some_and(|cap| day_count >= cap) {
            continue;
        }
        if config.max_per_week.is_some_and(|cap| week_count >= cap) {
            continue;
        }
        *admitted_per_day.entry(day).or_default() += 1;
        *admitted_per_week.entry(week).or_default() += 1;
        admitted.push(slot);
    }
    admitted
}
