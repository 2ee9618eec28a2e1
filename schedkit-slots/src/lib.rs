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

//! Slot core: deterministic computation of bookable time windows from
//! recurring schedules, overrides, existing bookings, busy blocks and
//! event-type constraints. Pure over caller-provided values; the only clock
//! is the `now` instant passed in.

pub mod display;
pub mod engine;
pub mod model;
pub mod recurrence;
pub mod schedule;
pub mod slots;


pub use engine::{AdapterError, AvailabilityAdapter, AvailabilityEngine, SlotRequest};
pub use model::{
    Block, Booking, BufferPolicy, BufferTable, EventType, EventTypeBuilder, EventTypeOverride,
    Frequency, HostSchedules, RecurrenceRule, Schedule, ScheduleOverride, ScheduleRule, Slot,
    DEFAULT_SCHEDULE_KEY,
};
pub use recurrence::expand_recurrence;
pub use schedule::expand_schedule;
pub use slots::{available_slots, SlotQuery};
