use crate::entitlements::QuotaState;
use indexmap::IndexMap;
use prettytable::{format, row, Table};
use schedkit_time::{datetime_utc, describe_window};

/// Builds a `Table` for displaying a quota dashboard in a human-readable
/// format.
pub fn dashboard_table(dashboard: &IndexMap<Box<str>, QuotaState>) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.add_row(row![
        buFc->"Action",
        buFc->"Limit",
        buFc->"Used",
        buFc->"Remaining",
        buFc->"Window",
        buFc->"Resets at"
    ]);
    for (action, state) in dashboard {
        table.add_row(row![
            action,
            state.limit,
            state.used,
            state.remaining,
            state
                .window
                .as_ref()
                .map(describe_window)
                .unwrap_or_else(|| "-".to_string()),
            state
                .resets_at
                .map(|at| datetime_utc(at).to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table
}
