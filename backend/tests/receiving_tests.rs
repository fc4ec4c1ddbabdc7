//! Box receiving and check-in tests
//!
//! Tests for the box lifecycle:
//! - box codes are per-year sequential and never duplicate
//! - status only moves forward (pending_checkin -> checked_in -> stocked_out)
//! - check-in materializes one new inventory row and one ledger entry
//!   per content line

use std::collections::HashMap;

use proptest::prelude::*;

use shared::codes;
use shared::models::BoxStatus;
use shared::validation::{validate_content_mode, validate_quantity, validate_year_code};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_box_code_format() {
        assert_eq!(codes::box_code(2025, 1), "BOX-2025-0001");
        assert_eq!(codes::box_code(2025, 42), "BOX-2025-0042");
        assert_eq!(codes::box_code(2026, 9999), "BOX-2026-9999");
    }

    /// Sequential creation in one year yields sequential codes.
    #[test]
    fn test_box_codes_sequential_within_year() {
        let mut allocator = SequenceAllocator::default();

        assert_eq!(allocator.next_code(2025), "BOX-2025-0001");
        assert_eq!(allocator.next_code(2025), "BOX-2025-0002");
        assert_eq!(allocator.next_code(2025), "BOX-2025-0003");
    }

    /// Sequences restart per calendar year.
    #[test]
    fn test_box_codes_restart_per_year() {
        let mut allocator = SequenceAllocator::default();

        assert_eq!(allocator.next_code(2025), "BOX-2025-0001");
        assert_eq!(allocator.next_code(2026), "BOX-2026-0001");
        assert_eq!(allocator.next_code(2025), "BOX-2025-0002");
    }

    #[test]
    fn test_checkin_requires_pending_status() {
        assert!(BoxStatus::PendingCheckin.can_transition_to(BoxStatus::CheckedIn));
        assert!(!BoxStatus::CheckedIn.can_transition_to(BoxStatus::CheckedIn));
        assert!(!BoxStatus::StockedOut.can_transition_to(BoxStatus::CheckedIn));
    }

    #[test]
    fn test_status_never_moves_backward() {
        for status in [BoxStatus::CheckedIn, BoxStatus::StockedOut] {
            assert!(!status.can_transition_to(BoxStatus::PendingCheckin));
        }
        assert!(!BoxStatus::StockedOut.can_transition_to(BoxStatus::CheckedIn));
    }

    #[test]
    fn test_content_entry_requires_exactly_one_mode() {
        // auto-create path
        assert!(validate_content_mode(true, false).is_ok());
        // direct item path
        assert!(validate_content_mode(false, true).is_ok());
        // both or neither are contradictory
        assert!(validate_content_mode(true, true).is_err());
        assert!(validate_content_mode(false, false).is_err());
    }

    #[test]
    fn test_content_quantity_must_be_positive() {
        assert!(validate_quantity(50).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_year_code_bounds() {
        assert!(validate_year_code("27").is_ok());
        assert!(validate_year_code("2027").is_ok());
        assert!(validate_year_code("2").is_err());
        assert!(validate_year_code("20278").is_err());
    }
}

// ============================================================================
// Check-in materialization
// ============================================================================

/// In-memory allocator mirroring the per-year sequence table.
#[derive(Default)]
struct SequenceAllocator {
    last_values: HashMap<i32, u32>,
}

impl SequenceAllocator {
    fn next_code(&mut self, year: i32) -> String {
        let counter = self.last_values.entry(year).or_insert(0);
        *counter += 1;
        codes::box_code(year, *counter)
    }
}

/// One declared content line: (item, quantity).
#[derive(Debug, Clone, Copy)]
struct ContentLine {
    item: u32,
    quantity: i32,
}

/// A materialized inventory row.
#[derive(Debug, Clone, Copy, PartialEq)]
struct InventoryRow {
    item: u32,
    store: u32,
    quantity: i32,
    reserved: i32,
}

/// A box_checkin ledger entry.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CheckinEntry {
    item: u32,
    store: u32,
    quantity: i32,
}

/// Mirror of the check-in materialization rule: every content line
/// creates a brand-new inventory row and one box_checkin entry; rows are
/// never merged.
fn simulate_check_in(
    contents: &[ContentLine],
    store: u32,
    existing: &mut Vec<InventoryRow>,
) -> Vec<CheckinEntry> {
    let mut entries = Vec::new();
    for line in contents {
        existing.push(InventoryRow {
            item: line.item,
            store,
            quantity: line.quantity,
            reserved: 0,
        });
        entries.push(CheckinEntry {
            item: line.item,
            store,
            quantity: line.quantity,
        });
    }
    entries
}

#[cfg(test)]
mod checkin_tests {
    use super::*;

    /// Scenario: one content line (qty 50) checked into a store creates
    /// one inventory row (quantity 50, reserved 0) and one ledger entry
    /// of quantity 50.
    #[test]
    fn test_single_line_checkin() {
        let mut inventory = Vec::new();
        let entries = simulate_check_in(&[ContentLine { item: 1, quantity: 50 }], 10, &mut inventory);

        assert_eq!(inventory.len(), 1);
        assert_eq!(
            inventory[0],
            InventoryRow { item: 1, store: 10, quantity: 50, reserved: 0 }
        );
        assert_eq!(entries, vec![CheckinEntry { item: 1, store: 10, quantity: 50 }]);
    }

    /// N content lines produce exactly N inventory rows and N entries.
    #[test]
    fn test_multi_line_checkin_counts() {
        let contents = [
            ContentLine { item: 1, quantity: 50 },
            ContentLine { item: 2, quantity: 30 },
            ContentLine { item: 3, quantity: 20 },
        ];
        let mut inventory = Vec::new();
        let entries = simulate_check_in(&contents, 10, &mut inventory);

        assert_eq!(inventory.len(), 3);
        assert_eq!(entries.len(), 3);
        for (line, entry) in contents.iter().zip(&entries) {
            assert_eq!(entry.quantity, line.quantity);
        }
    }

    /// Checking in the same item again never merges into the prior row.
    #[test]
    fn test_checkin_never_merges_rows() {
        let mut inventory = Vec::new();
        simulate_check_in(&[ContentLine { item: 1, quantity: 50 }], 10, &mut inventory);
        simulate_check_in(&[ContentLine { item: 1, quantity: 25 }], 10, &mut inventory);

        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory[0].quantity, 50);
        assert_eq!(inventory[1].quantity, 25);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Repeated allocation within a year never produces a duplicate
        /// code, and codes are dense (no gaps).
        #[test]
        fn prop_box_codes_unique_and_dense(count in 1usize..200) {
            let mut allocator = SequenceAllocator::default();
            let codes: Vec<String> = (0..count).map(|_| allocator.next_code(2025)).collect();

            let mut deduped = codes.clone();
            deduped.dedup();
            prop_assert_eq!(deduped.len(), count);
            prop_assert_eq!(codes.last().unwrap(), &format!("BOX-2025-{:04}", count));
        }

        /// Check-in creates exactly as many rows and entries as content
        /// lines, each carrying the declared quantity.
        #[test]
        fn prop_checkin_row_counts(
            quantities in prop::collection::vec(1i32..=500, 1..12),
            store in 1u32..100
        ) {
            let contents: Vec<ContentLine> = quantities
                .iter()
                .enumerate()
                .map(|(index, quantity)| ContentLine { item: index as u32, quantity: *quantity })
                .collect();

            let mut inventory = Vec::new();
            let entries = simulate_check_in(&contents, store, &mut inventory);

            prop_assert_eq!(inventory.len(), contents.len());
            prop_assert_eq!(entries.len(), contents.len());

            let declared: i64 = quantities.iter().map(|q| *q as i64).sum();
            let materialized: i64 = inventory.iter().map(|r| r.quantity as i64).sum();
            prop_assert_eq!(declared, materialized);
        }

        /// The legal transition relation is exactly the two forward steps.
        #[test]
        fn prop_only_forward_transitions(from_index in 0usize..3, to_index in 0usize..3) {
            let statuses = [
                BoxStatus::PendingCheckin,
                BoxStatus::CheckedIn,
                BoxStatus::StockedOut,
            ];
            let from = statuses[from_index];
            let to = statuses[to_index];

            prop_assert_eq!(from.can_transition_to(to), to_index == from_index + 1);
        }
    }
}
