//! Stock-level threshold resolution
//!
//! Effective min/max levels for an item resolve in order: size-specific
//! override on the item type, then the type's defaults, then the
//! hardcoded fallback. Resolution never fails; malformed or missing
//! configuration degrades to the fallback values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fallback minimum stock level when nothing is configured.
pub const DEFAULT_MIN_LEVEL: i32 = 50;

/// Fallback maximum stock level when nothing is configured.
pub const DEFAULT_MAX_LEVEL: i32 = 1000;

/// A per-size threshold override. Either bound may be absent, in which
/// case the type default applies for that bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeLevelOverride {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

/// Per-size stock level overrides for an item type, keyed by size label
/// (`{"S": {"min": 50, "max": 1000}, "M": {"min": 30}}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeStockLevels(pub BTreeMap<String, SizeLevelOverride>);

impl SizeStockLevels {
    pub fn get(&self, size: &str) -> Option<&SizeLevelOverride> {
        self.0.get(size)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolve effective (min, max) thresholds for an item.
///
/// `type_min`/`type_max` are the item type's defaults, `size_levels` its
/// per-size override map, `size` the item's size (if any).
pub fn resolve_levels(
    type_min: Option<i32>,
    type_max: Option<i32>,
    size_levels: Option<&SizeStockLevels>,
    size: Option<&str>,
) -> (i32, i32) {
    let type_min = type_min.unwrap_or(DEFAULT_MIN_LEVEL);
    let type_max = type_max.unwrap_or(DEFAULT_MAX_LEVEL);

    if let (Some(size), Some(levels)) = (size, size_levels) {
        if let Some(entry) = levels.get(size) {
            return (entry.min.unwrap_or(type_min), entry.max.unwrap_or(type_max));
        }
    }

    (type_min, type_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels_for(entries: &[(&str, Option<i32>, Option<i32>)]) -> SizeStockLevels {
        SizeStockLevels(
            entries
                .iter()
                .map(|(size, min, max)| {
                    (size.to_string(), SizeLevelOverride { min: *min, max: *max })
                })
                .collect(),
        )
    }

    #[test]
    fn size_override_wins() {
        let levels = levels_for(&[("M", Some(30), Some(500))]);
        assert_eq!(
            resolve_levels(Some(50), Some(1000), Some(&levels), Some("M")),
            (30, 500)
        );
    }

    #[test]
    fn partial_override_fills_from_type_default() {
        let levels = levels_for(&[("M", Some(30), None)]);
        assert_eq!(
            resolve_levels(Some(50), Some(800), Some(&levels), Some("M")),
            (30, 800)
        );
    }

    #[test]
    fn missing_size_entry_uses_type_default() {
        let levels = levels_for(&[("S", Some(10), Some(100))]);
        assert_eq!(
            resolve_levels(Some(40), Some(900), Some(&levels), Some("XL")),
            (40, 900)
        );
    }

    #[test]
    fn absent_configuration_degrades_to_fallback() {
        assert_eq!(
            resolve_levels(None, None, None, Some("M")),
            (DEFAULT_MIN_LEVEL, DEFAULT_MAX_LEVEL)
        );
        assert_eq!(resolve_levels(None, None, None, None), (50, 1000));
    }
}
