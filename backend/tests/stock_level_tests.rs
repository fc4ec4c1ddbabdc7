//! Stock-level resolver tests
//!
//! Resolution precedence: size-specific override -> type default ->
//! hardcoded fallback (50/1000). Resolution never fails; malformed
//! configuration degrades to the defaults.

use proptest::prelude::*;

use shared::levels::{
    resolve_levels, SizeLevelOverride, SizeStockLevels, DEFAULT_MAX_LEVEL, DEFAULT_MIN_LEVEL,
};

fn overrides(entries: &[(&str, Option<i32>, Option<i32>)]) -> SizeStockLevels {
    SizeStockLevels(
        entries
            .iter()
            .map(|(size, min, max)| {
                (
                    size.to_string(),
                    SizeLevelOverride { min: *min, max: *max },
                )
            })
            .collect(),
    )
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_size_override_takes_precedence() {
        let levels = overrides(&[("M", Some(30), Some(400))]);
        assert_eq!(
            resolve_levels(Some(50), Some(1000), Some(&levels), Some("M")),
            (30, 400)
        );
    }

    #[test]
    fn test_type_default_when_size_missing_from_overrides() {
        let levels = overrides(&[("S", Some(10), Some(100))]);
        assert_eq!(
            resolve_levels(Some(60), Some(800), Some(&levels), Some("XXL")),
            (60, 800)
        );
    }

    #[test]
    fn test_type_default_when_no_overrides_configured() {
        assert_eq!(resolve_levels(Some(40), Some(700), None, Some("M")), (40, 700));
    }

    #[test]
    fn test_hardcoded_fallback() {
        assert_eq!(
            resolve_levels(None, None, None, None),
            (DEFAULT_MIN_LEVEL, DEFAULT_MAX_LEVEL)
        );
        assert_eq!(resolve_levels(None, None, None, Some("M")), (50, 1000));
    }

    #[test]
    fn test_partial_override_fills_each_bound_independently() {
        let levels = overrides(&[("M", Some(30), None)]);
        assert_eq!(
            resolve_levels(Some(50), Some(900), Some(&levels), Some("M")),
            (30, 900)
        );

        let levels = overrides(&[("M", None, Some(250))]);
        assert_eq!(
            resolve_levels(Some(50), Some(900), Some(&levels), Some("M")),
            (50, 250)
        );
    }

    #[test]
    fn test_sizeless_item_ignores_overrides() {
        let levels = overrides(&[("M", Some(30), Some(400))]);
        assert_eq!(
            resolve_levels(Some(50), Some(1000), Some(&levels), None),
            (50, 1000)
        );
    }

    /// Malformed JSON degrades to no overrides at the parse boundary.
    #[test]
    fn test_malformed_overrides_parse_to_none() {
        let malformed = serde_json::json!(["S", "M", "L"]);
        let parsed = serde_json::from_value::<SizeStockLevels>(malformed).ok();
        assert!(parsed.is_none());

        let wrong_shape = serde_json::json!({"M": 30});
        let parsed = serde_json::from_value::<SizeStockLevels>(wrong_shape).ok();
        assert!(parsed.is_none());
    }

    /// Well-formed JSON parses into the typed override map.
    #[test]
    fn test_wellformed_overrides_parse() {
        let value = serde_json::json!({"S": {"min": 50, "max": 1000}, "M": {"min": 30}});
        let parsed: SizeStockLevels = serde_json::from_value(value).unwrap();

        assert_eq!(parsed.get("S"), Some(&SizeLevelOverride { min: Some(50), max: Some(1000) }));
        assert_eq!(parsed.get("M"), Some(&SizeLevelOverride { min: Some(30), max: None }));
        assert_eq!(parsed.get("L"), None);
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

        /// Resolution always yields the override when one exists for the
        /// size and both bounds are set.
        #[test]
        fn prop_full_override_always_wins(
            min in 1i32..=500,
            max in 501i32..=5000,
            type_min in 1i32..=500,
            type_max in 501i32..=5000
        ) {
            let levels = overrides(&[("M", Some(min), Some(max))]);
            prop_assert_eq!(
                resolve_levels(Some(type_min), Some(type_max), Some(&levels), Some("M")),
                (min, max)
            );
        }

        /// With no configuration at all the result is exactly the
        /// fallback, regardless of size.
        #[test]
        fn prop_unconfigured_resolves_to_fallback(size in "[A-Z]{1,4}") {
            prop_assert_eq!(
                resolve_levels(None, None, None, Some(&size)),
                (DEFAULT_MIN_LEVEL, DEFAULT_MAX_LEVEL)
            );
        }

        /// The resolved bounds always come from one of the three layers;
        /// resolution never invents values.
        #[test]
        fn prop_resolved_values_come_from_configuration(
            type_min in prop::option::of(1i32..=500),
            type_max in prop::option::of(501i32..=5000),
            override_min in prop::option::of(1i32..=500),
            override_max in prop::option::of(501i32..=5000)
        ) {
            let levels = overrides(&[("M", override_min, override_max)]);
            let (min, max) = resolve_levels(type_min, type_max, Some(&levels), Some("M"));

            let min_sources = [override_min, type_min, Some(DEFAULT_MIN_LEVEL)];
            let max_sources = [override_max, type_max, Some(DEFAULT_MAX_LEVEL)];

            prop_assert!(min_sources.contains(&Some(min)));
            prop_assert!(max_sources.contains(&Some(max)));
        }
    }
}
