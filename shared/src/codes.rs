//! Code generation for boxes, batches, and items
//!
//! All human-readable identifiers in the system are derived here so the
//! formats stay consistent between the receiving flow and the catalog:
//!
//! - box codes: `BOX-YYYY-NNNN` (per-year sequence, four digits)
//! - item codes: `TYPE-YEAR-SIZE-SEQ` (e.g. `WS-27-M-001`)

/// Derive a short type code from a type name.
///
/// Uses the uppercase initials of the first two words, or the first two
/// characters when the name is a single word ("White Smock" -> "WS",
/// "Coverall" -> "CO").
pub fn type_code(type_name: &str) -> String {
    let words: Vec<&str> = type_name.split_whitespace().collect();
    if words.len() >= 2 {
        words[..2]
            .iter()
            .filter_map(|w| w.chars().next())
            .collect::<String>()
            .to_uppercase()
    } else {
        type_name.trim().chars().take(2).collect::<String>().to_uppercase()
    }
}

/// Normalize a size label for use inside an item code: spaces and slashes
/// stripped, uppercased ("38 / 40" -> "3840").
pub fn normalize_size(size: &str) -> String {
    size.chars()
        .filter(|c| *c != ' ' && *c != '/')
        .collect::<String>()
        .to_uppercase()
}

/// Build an item code: `{TYPE}-{YEAR}-{SIZE}-{SEQ:03}`.
pub fn item_code(type_code: &str, year_code: &str, size: &str, sequence: u32) -> String {
    format!(
        "{}-{}-{}-{:03}",
        type_code,
        year_code,
        normalize_size(size),
        sequence
    )
}

/// Build a box code: `BOX-{YYYY}-{NNNN:04}`.
pub fn box_code(year: i32, sequence: u32) -> String {
    format!("BOX-{}-{:04}", year, sequence)
}

/// Display name for an auto-created batch.
pub fn batch_name(type_name: &str, year_code: &str) -> String {
    format!("{} {}", type_name, year_code)
}

/// Display name for an item, e.g. `"White Smock 2027 - Size M (Blue)"`.
///
/// The year code is a two-digit tag expanded with the `20` century prefix.
pub fn item_name(type_name: &str, year_code: &str, size: &str, color: Option<&str>) -> String {
    let mut name = format!("{} 20{} - Size {}", type_name, year_code, size);
    if let Some(color) = color {
        name.push_str(&format!(" ({})", color));
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_code_from_two_words() {
        assert_eq!(type_code("White Smock"), "WS");
        assert_eq!(type_code("Safety Boots"), "SB");
        assert_eq!(type_code("Lab Coat Deluxe"), "LC");
    }

    #[test]
    fn type_code_from_single_word() {
        assert_eq!(type_code("Coverall"), "CO");
        assert_eq!(type_code("helmet"), "HE");
    }

    #[test]
    fn item_code_format() {
        assert_eq!(item_code("WS", "27", "M", 1), "WS-27-M-001");
        assert_eq!(item_code("SB", "27", "38 / 40", 12), "SB-27-3840-012");
    }

    #[test]
    fn box_code_format() {
        assert_eq!(box_code(2025, 1), "BOX-2025-0001");
        assert_eq!(box_code(2025, 123), "BOX-2025-0123");
    }

    #[test]
    fn item_name_with_and_without_color() {
        assert_eq!(item_name("White Smock", "27", "M", None), "White Smock 2027 - Size M");
        assert_eq!(
            item_name("White Smock", "27", "M", Some("Blue")),
            "White Smock 2027 - Size M (Blue)"
        );
    }
}
