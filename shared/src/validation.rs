//! Validation utilities for the Warehouse Inventory Management System

/// Validate a batch year code: 2 to 4 alphanumeric characters ("27", "2027").
pub fn validate_year_code(year_code: &str) -> Result<(), &'static str> {
    let len = year_code.chars().count();
    if !(2..=4).contains(&len) {
        return Err("Year code must be 2-4 characters");
    }
    if !year_code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Year code must be alphanumeric");
    }
    Ok(())
}

/// Validate a stock movement quantity (always a positive magnitude).
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate that a box content entry uses exactly one of the two input
/// modes: auto-create via type/year/size, or a direct item reference.
pub fn validate_content_mode(has_type: bool, has_item: bool) -> Result<(), &'static str> {
    match (has_type, has_item) {
        (true, true) => Err("Provide either type_id with year_code and size, or item_id, not both"),
        (false, false) => Err("Either type_id with year_code and size, or item_id must be provided"),
        _ => Ok(()),
    }
}

/// Validate a non-empty trimmed name.
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_codes() {
        assert!(validate_year_code("27").is_ok());
        assert!(validate_year_code("2027").is_ok());
        assert!(validate_year_code("7").is_err());
        assert!(validate_year_code("20275").is_err());
        assert!(validate_year_code("2-7").is_err());
    }

    #[test]
    fn quantities() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
    }

    #[test]
    fn content_modes() {
        assert!(validate_content_mode(true, false).is_ok());
        assert!(validate_content_mode(false, true).is_ok());
        assert!(validate_content_mode(true, true).is_err());
        assert!(validate_content_mode(false, false).is_err());
    }
}
