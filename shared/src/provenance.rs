//! Box provenance selection
//!
//! Every box check-in creates its own inventory row, so an (item, store)
//! pair can map to several `box_checkin` transactions once multiple boxes
//! delivered the same item to the same store. The selection rule here is
//! best-effort: match on quantity and pick the check-in recorded closest
//! in time to the inventory row; with no quantity match, fall back to the
//! most recent check-in. Under concurrent check-ins of identical
//! quantities the attribution can be wrong; callers treat the result as
//! display metadata, not a hard link.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A recorded `box_checkin` transaction for an (item, store) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinRecord {
    pub box_id: Uuid,
    pub box_code: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// Select the check-in most likely to have created an inventory row with
/// the given quantity and creation time.
pub fn select_checkin<'a>(
    records: &'a [CheckinRecord],
    row_quantity: i32,
    row_created_at: DateTime<Utc>,
) -> Option<&'a CheckinRecord> {
    let matching: Vec<&CheckinRecord> = records
        .iter()
        .filter(|r| r.quantity == row_quantity)
        .collect();

    match matching.len() {
        1 => Some(matching[0]),
        0 => records.iter().max_by_key(|r| r.created_at),
        _ => matching.into_iter().min_by_key(|r| {
            (r.created_at - row_created_at).num_milliseconds().abs()
        }),
    }
}
