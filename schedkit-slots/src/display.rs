use crate::model::Slot;
use prettytable::{format, row, Table};
use schedkit_time::datetime_utc;

/// Builds a `Table` for displaying generated slots in a human-readable
/// format.
pub fn slot_table(slots: &[Slot]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.add_row(row![
        buFc->"Host",
        buFc->"Start",
        buFc->"End",
        buFc->"Buffer before",
        buFc->"Buffer after"
    ]);
    for slot in slots {
        table.add_row(row![
            slot.host_id,
            datetime_utc(slot.start).to_rfc3339(),
            datetime_utc(slot.end).to_rfc3339(),
            slot.buffer_before
                .map(|b| format!("{}ms", b.duration_ms()))
                .unwrap_or_else(|| "-".to_string()),
            slot.buffer_after
                .map(|b| format!("{}ms", b.duration_ms()))
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table
}
