//! Inventory ledger tests
//!
//! Tests for the stock transaction engine:
//! - available_quantity == quantity - reserved_quantity, both >= 0
//! - stock-out succeeds iff requested <= available and never drives
//!   quantity negative
//! - transfers conserve total quantity across the two stores
//! - box provenance selection follows the quantity/closest-time heuristic

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use shared::models::available_quantity;
use shared::provenance::{select_checkin, CheckinRecord};

// ============================================================================
// Simulation helpers
// ============================================================================

/// One store's inventory position for a single item.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    quantity: i32,
    reserved: i32,
}

impl Position {
    fn available(&self) -> i32 {
        available_quantity(self.quantity, self.reserved)
    }
}

/// Mirror of the stock-out rule: fail unless available covers the
/// request, then subtract floored at zero.
fn simulate_stock_out(position: Position, requested: i32) -> Result<Position, (i32, i32)> {
    if requested > position.available() {
        return Err((position.available(), requested));
    }
    Ok(Position {
        quantity: (position.quantity - requested).max(0),
        reserved: position.reserved,
    })
}

/// Mirror of the transfer rule: subtract at the source, add at the
/// destination (creating it at zero if absent).
fn simulate_transfer(
    source: Position,
    destination: Option<Position>,
    requested: i32,
) -> Result<(Position, Position), (i32, i32)> {
    let new_source = simulate_stock_out(source, requested)?;
    let destination = destination.unwrap_or(Position { quantity: 0, reserved: 0 });
    let new_destination = Position {
        quantity: destination.quantity + requested,
        reserved: destination.reserved,
    };
    Ok((new_source, new_destination))
}

fn record(code: &str, quantity: i32, secs: i64) -> CheckinRecord {
    CheckinRecord {
        box_id: Uuid::new_v4(),
        box_code: code.to_string(),
        quantity,
        created_at: Utc.timestamp_opt(secs, 0).unwrap(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_available_quantity_invariant() {
        assert_eq!(available_quantity(100, 30), 70);
        assert_eq!(available_quantity(100, 0), 100);
        assert_eq!(available_quantity(0, 0), 0);
    }

    #[test]
    fn test_available_quantity_never_negative() {
        assert_eq!(available_quantity(10, 30), 0);
    }

    #[test]
    fn test_stock_out_within_available() {
        let position = Position { quantity: 100, reserved: 20 };
        let after = simulate_stock_out(position, 80).unwrap();

        assert_eq!(after.quantity, 20);
        assert_eq!(after.reserved, 20);
    }

    #[test]
    fn test_stock_out_insufficient_reports_available_and_requested() {
        let position = Position { quantity: 100, reserved: 20 };
        let err = simulate_stock_out(position, 81).unwrap_err();

        assert_eq!(err, (80, 81));
    }

    #[test]
    fn test_stock_out_exact_available_drains_to_reserved_floor() {
        let position = Position { quantity: 50, reserved: 0 };
        let after = simulate_stock_out(position, 50).unwrap();

        assert_eq!(after.quantity, 0);
    }

    #[test]
    fn test_reserved_stock_is_not_issuable() {
        let position = Position { quantity: 50, reserved: 50 };
        assert!(simulate_stock_out(position, 1).is_err());
    }

    #[test]
    fn test_transfer_conserves_total() {
        let source = Position { quantity: 100, reserved: 0 };
        let destination = Position { quantity: 40, reserved: 0 };

        let (new_source, new_destination) =
            simulate_transfer(source, Some(destination), 30).unwrap();

        assert_eq!(new_source.quantity, 70);
        assert_eq!(new_destination.quantity, 70);
        assert_eq!(
            new_source.quantity + new_destination.quantity,
            source.quantity + destination.quantity
        );
    }

    #[test]
    fn test_transfer_creates_destination_when_absent() {
        let source = Position { quantity: 100, reserved: 0 };
        let (new_source, new_destination) = simulate_transfer(source, None, 25).unwrap();

        assert_eq!(new_source.quantity, 75);
        assert_eq!(new_destination.quantity, 25);
    }

    #[test]
    fn test_transfer_rejects_more_than_available() {
        let source = Position { quantity: 100, reserved: 90 };
        assert!(simulate_transfer(source, None, 11).is_err());
    }
}

// ============================================================================
// Provenance selection
// ============================================================================

#[cfg(test)]
mod provenance_tests {
    use super::*;

    #[test]
    fn test_unique_quantity_match_wins() {
        let records = vec![
            record("BOX-2025-0001", 50, 100),
            record("BOX-2025-0002", 30, 900),
        ];
        let row_time = Utc.timestamp_opt(110, 0).unwrap();

        let picked = select_checkin(&records, 50, row_time).unwrap();
        assert_eq!(picked.box_code, "BOX-2025-0001");
    }

    #[test]
    fn test_ambiguous_quantities_resolved_by_time_proximity() {
        let records = vec![
            record("BOX-2025-0001", 50, 100),
            record("BOX-2025-0002", 50, 500),
        ];
        let row_time = Utc.timestamp_opt(480, 0).unwrap();

        let picked = select_checkin(&records, 50, row_time).unwrap();
        assert_eq!(picked.box_code, "BOX-2025-0002");
    }

    #[test]
    fn test_no_quantity_match_falls_back_to_most_recent() {
        let records = vec![
            record("BOX-2025-0001", 50, 100),
            record("BOX-2025-0002", 30, 500),
        ];
        let row_time = Utc.timestamp_opt(0, 0).unwrap();

        let picked = select_checkin(&records, 7, row_time).unwrap();
        assert_eq!(picked.box_code, "BOX-2025-0002");
    }

    #[test]
    fn test_no_records_degrades_to_none() {
        assert!(select_checkin(&[], 50, Utc::now()).is_none());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn position_strategy() -> impl Strategy<Value = Position> {
        (0i32..=10_000, 0i32..=1_000).prop_map(|(quantity, reserved)| Position {
            quantity,
            reserved,
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// available == quantity - reserved, floored at zero, and both
        /// inputs are non-negative by construction.
        #[test]
        fn prop_available_invariant(position in position_strategy()) {
            let available = position.available();
            prop_assert!(available >= 0);
            if position.quantity >= position.reserved {
                prop_assert_eq!(available, position.quantity - position.reserved);
            }
        }

        /// Stock-out succeeds exactly when requested <= available, and
        /// the result never goes negative.
        #[test]
        fn prop_stock_out_boundary(position in position_strategy(), requested in 1i32..=20_000) {
            match simulate_stock_out(position, requested) {
                Ok(after) => {
                    prop_assert!(requested <= position.available());
                    prop_assert!(after.quantity >= 0);
                    prop_assert_eq!(after.quantity, (position.quantity - requested).max(0));
                }
                Err((available, reported)) => {
                    prop_assert!(requested > position.available());
                    prop_assert_eq!(available, position.available());
                    prop_assert_eq!(reported, requested);
                }
            }
        }

        /// A successful transfer moves exactly the requested quantity:
        /// source decreases by Q, destination increases by Q, total is
        /// invariant.
        #[test]
        fn prop_transfer_conservation(
            source in position_strategy(),
            destination in position_strategy(),
            requested in 1i32..=20_000
        ) {
            if let Ok((new_source, new_destination)) =
                simulate_transfer(source, Some(destination), requested)
            {
                prop_assert_eq!(source.quantity - new_source.quantity, requested);
                prop_assert_eq!(new_destination.quantity - destination.quantity, requested);
                prop_assert_eq!(
                    new_source.quantity + new_destination.quantity,
                    source.quantity + destination.quantity
                );
            }
        }

        /// Provenance selection always returns one of the candidates (or
        /// nothing when there are none).
        #[test]
        fn prop_selection_picks_from_candidates(
            quantities in prop::collection::vec(1i32..=100, 0..8),
            row_quantity in 1i32..=100,
            row_secs in 0i64..=10_000
        ) {
            let records: Vec<CheckinRecord> = quantities
                .iter()
                .enumerate()
                .map(|(index, quantity)| record(&format!("BOX-2025-{:04}", index + 1), *quantity, index as i64 * 60))
                .collect();

            let row_time = Utc.timestamp_opt(row_secs, 0).unwrap();
            let picked = select_checkin(&records, row_quantity, row_time);

            if records.is_empty() {
                prop_assert!(picked.is_none());
            } else {
                let picked = picked.unwrap();
                prop_assert!(records.iter().any(|r| r.box_code == picked.box_code));

                // A unique quantity match is always honored
                let matching: Vec<&CheckinRecord> =
                    records.iter().filter(|r| r.quantity == row_quantity).collect();
                if matching.len() == 1 {
                    prop_assert_eq!(&picked.box_code, &matching[0].box_code);
                }
            }
        }
    }
}
