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

//! Shared time primitives: half-open millisecond intervals and their algebra,
//! IANA-zone local time resolution, calendar units and counting windows.

pub mod interval;
pub mod local;
pub mod unit;
pub mod window;


pub use interval::{intersect_intervals, merge_intervals, subtract_intervals, EpochMs, Interval};
pub use local::{civil_date, datetime_utc, local_time_to_utc, utc_date, zoned_date, LocalTime, TimeError};
pub use unit::{end_of_unit, iso_week_key, start_of_unit, utc_day, CalendarUnit};
pub use window::{
    describe_window, next_reset, resolve_window, DurationSpec, WindowSpec, EPOCH_MS, FAR_FUTURE_MS,
};
