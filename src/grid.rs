use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::models::Slot;

/// The fixed hour axis of the grid, ascending.
pub const HOURS: [u8; 14] = [9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22];

/// 12-hour display label for a 24-hour value, e.g. 13 -> "1 PM".
pub fn format_hour(hour: u8) -> String {
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{display} {suffix}")
}

/// The distinct dates referenced by `slots`, ascending, no duplicates.
/// Grid columns for voting/viewing are derived from this, since the
/// event stores only slots, not a date range.
pub fn date_range(slots: &[Slot]) -> Vec<NaiveDate> {
    slots
        .iter()
        .map(|s| s.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Every day from `start` through `end` inclusive. Used for the
/// authoring grid, whose columns come from a picked date range.
pub fn date_span(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// The full column of slots for one date, ascending by hour.
pub fn column_slots(date: NaiveDate) -> Vec<Slot> {
    HOURS.iter().map(|&h| Slot::new(date, h)).collect()
}
