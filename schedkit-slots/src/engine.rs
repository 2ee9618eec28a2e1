//! Adapter-backed facade over the slot generator: callers supply data
//! access, the engine assembles one query per request.

use crate::model::{Block, Booking, BufferPolicy, BufferTable, EventType, HostSchedules, Slot};
use crate::slots::{available_slots, SlotQuery};
use async_trait::async_trait;
use chrono::Utc;
use schedkit_time::{EpochMs, Interval};

pub type AdapterError = Box<dyn std::error::Error + Send + Sync>;

/// Host lookup: either an explicit host list or every host serving the
/// event type.
#[derive(Debug, Clone)]
pub struct HostLookup {
    pub host_ids: Option<Vec<Box<str>>>,
    pub event_type_id: Box<str>,
}

/// Busy-time lookup for a set of hosts over a range.
#[derive(Debug, Clone)]
pub struct BusyLookup {
    pub host_ids: Vec<Box<str>>,
    pub range: Interval,
}

/// Data access the availability engine is wired with. Errors propagate to
/// the caller unchanged; the engine never swallows or wraps them.
#[async_trait]
pub trait AvailabilityAdapter: Send + Sync {
    async fn event_type(&self, event_type_id: &str) -> Result<EventType, AdapterError>;

    async fn hosts(&self, lookup: &HostLookup) -> Result<Vec<HostSchedules>, AdapterError>;

    async fn bookings(&self, lookup: &BusyLookup) -> Result<Vec<Booking>, AdapterError>;

    /// External busy blocks; adapters without a block source keep the
    /// default empty answer.
    async fn blocks(&self, _lookup: &BusyLookup) -> Result<Vec<Block>, AdapterError> {
        Ok(Vec::new())
    }

    /// Buffer policies of the given event types. `None` means the adapter
    /// has no buffer source, which makes the engine fall back to giving
    /// same-typed bookings the queried event type's own buffers.
    async fn event_type_buffers(
        &self,
        _event_type_ids: &[Box<str>],
    ) -> Result<Option<BufferTable>, AdapterError> {
        Ok(None)
    }
}

/// One engine request: which event type, optionally which hosts, and the
/// UTC range to fill.
#[derive(Debug, Clone)]
pub struct SlotRequest {
    pub event_type_id: Box<str>,
    pub host_ids: Option<Vec<Box<str>>>,
    pub range: Interval,
}

pub struct AvailabilityEngine<A> {
    adapter: A,
}

impl<A: AvailabilityAdapter> AvailabilityEngine<A> {
    pub fn new(adapter: A) -> Self {
        AvailabilityEngine { adapter }
    }

    /// Assembles the slot query through the adapter and runs the generator.
    /// `now` is the evaluation instant for notice and lead-time clipping;
    /// the wall clock is only consulted when the caller does not pass one.
    pub async fn available_slots(
        &self,
        request: &SlotRequest,
        now: Option<EpochMs>,
    ) -> Result<Vec<Slot>, AdapterError> {
        let now = now.unwrap_or_else(|| Utc::now().timestamp_millis());
        let event_type = self.adapter.event_type(&request.event_type_id).await?;
        let hosts = self
            .adapter
            .hosts(&HostLookup {
                host_ids: request.host_ids.clone(),
                event_type_id: request.event_type_id.clone(),
            })
            .await?;

        let busy_lookup = BusyLookup {
            host_ids: hosts.iter().map(|h| h.host_id.clone()).collect(),
            range: request.range,
        };
        let bookings = self.adapter.bookings(&busy_lookup).await?;
        let blocks = self.adapter.blocks(&busy_lookup).await?;

        let mut booked_type_ids: Vec<Box<str>> = bookings
            .iter()
            .filter_map(|b| b.event_type_id.clone())
            .collect();
        booked_type_ids.sort();
        booked_type_ids.dedup();

        let buffers = match self.adapter.event_type_buffers(&booked_type_ids).await? {
            Some(table) => table,
            None => {
                // No buffer source: bookings of the queried type get its own
                // buffers, everything else counts as zero.
                let mut table = BufferTable::new();
                table.insert(
                    event_type.id.clone(),
                    BufferPolicy {
                        buffer_before_ms: event_type.buffer_before_ms.unwrap_or(0),
                        buffer_after_ms: event_type.buffer_after_ms.unwrap_or(0),
                    },
                );
                table
            }
        };

        Ok(available_slots(
            &SlotQuery {
                event_type,
                hosts,
                bookings,
                blocks,
                range: request.range,
                buffers,
            },
            now,
        ))
    }
}
