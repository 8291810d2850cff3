//! # Validation Module
//!
//! Input validation utilities for the warung backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (apps/api)                                   │
//! │  └── JSON / query deserialization                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Lengths, ranges, formats                                          │
//! │  └── Dates, years, months, pagination                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0)                                                │
//! │  ├── UNIQUE (username)                                                 │
//! │  └── Foreign key sale_items → sales                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use warung_core::validation::{validate_product_name, validate_quantity};
//!
//! validate_product_name("Indomie Goreng").unwrap();
//! validate_quantity(5).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use chrono::{Datelike, FixedOffset, NaiveDate};

use crate::error::ValidationError;
use crate::types::{NewProduct, ProductPatch};
use crate::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_CATEGORY_LEN: usize = 100;
pub const MAX_BARCODE_LEN: usize = 50;
pub const MAX_NOTES_LEN: usize = 500;
pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 9999;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use warung_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Teh Botol Sosro").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    max_len("name", name, MAX_NAME_LEN)
}

pub fn validate_category(category: &str) -> ValidationResult<()> {
    max_len("category", category.trim(), MAX_CATEGORY_LEN)
}

pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    max_len("barcode", barcode.trim(), MAX_BARCODE_LEN)
}

pub fn validate_notes(notes: &str) -> ValidationResult<()> {
    max_len("notes", notes, MAX_NOTES_LEN)
}

/// Validates login credentials are present. Checking them is the gate's job.
pub fn validate_credentials(username: &str, password: &str) -> ValidationResult<()> {
    if username.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a price in the smallest currency unit.
///
/// ## Example
/// ```rust
/// use warung_core::validation::validate_price;
///
/// assert!(validate_price(3_500).is_ok());
/// assert!(validate_price(0).is_ok());     // Free item
/// assert!(validate_price(-100).is_err());
/// ```
pub fn validate_price(price: i64) -> ValidationResult<()> {
    if price < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Product Validators
// =============================================================================

/// Validates every field of a new product.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_price(product.price)?;
    validate_stock(product.stock)?;
    validate_category(&product.category)?;
    if let Some(barcode) = &product.barcode {
        validate_barcode(barcode)?;
    }
    Ok(())
}

/// Validates only the fields a patch supplies.
pub fn validate_product_patch(patch: &ProductPatch) -> ValidationResult<()> {
    if let Some(name) = &patch.name {
        validate_product_name(name)?;
    }
    if let Some(price) = patch.price {
        validate_price(price)?;
    }
    if let Some(stock) = patch.stock {
        validate_stock(stock)?;
    }
    if let Some(category) = &patch.category {
        validate_category(category)?;
    }
    if let Some(barcode) = &patch.barcode {
        validate_barcode(barcode)?;
    }
    Ok(())
}

// =============================================================================
// Query Parameter Parsers
// =============================================================================
// Raw query values arrive as strings so a bad value produces our own
// message instead of a deserializer error.

/// Treats a missing or blank query value as absent.
pub fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parses a `YYYY-MM-DD` calendar date.
///
/// ## Example
/// ```rust
/// use warung_core::validation::parse_date;
///
/// assert!(parse_date("date", Some("2024-03-05")).is_ok());
/// assert!(parse_date("date", Some("2024-02-30")).is_err());
/// assert!(parse_date("date", None).is_err());
/// ```
pub fn parse_date(field: &str, raw: Option<&str>) -> ValidationResult<NaiveDate> {
    let raw = non_blank(raw).ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })?;
    let date =
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        })?;
    validate_year(field, date.year())?;
    Ok(date)
}

/// Parses a four-digit year in 2000..=9999.
pub fn parse_year(raw: Option<&str>) -> ValidationResult<i32> {
    let year = parse_int::<i32>("year", raw)?;
    validate_year("year", year)?;
    Ok(year)
}

/// Parses a month number in 1..=12.
pub fn parse_month(raw: Option<&str>) -> ValidationResult<u32> {
    let month = parse_int::<i64>("month", raw)?;
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }
    Ok(month as u32)
}

fn validate_year(field: &str, year: i32) -> ValidationResult<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: i64::from(MIN_YEAR),
            max: i64::from(MAX_YEAR),
        });
    }
    Ok(())
}

fn parse_int<T: std::str::FromStr>(field: &str, raw: Option<&str>) -> ValidationResult<T> {
    let raw = non_blank(raw).ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })?;
    raw.parse::<T>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected a whole number".to_string(),
        })
}

/// Parses an optional integer query value; blank means absent.
pub fn parse_optional_id(field: &str, raw: Option<&str>) -> ValidationResult<Option<i64>> {
    match non_blank(raw) {
        None => Ok(None),
        some => parse_int::<i64>(field, some).map(Some),
    }
}

/// Parses `page` (default 1, at least 1) and `limit` (default 10, 1..=100).
pub fn parse_pagination(page: Option<&str>, limit: Option<&str>) -> ValidationResult<(u32, u32)> {
    let page = match non_blank(page) {
        None => 1,
        some => parse_int::<i64>("page", some)?,
    };
    if page < 1 || page > i64::from(u32::MAX) {
        return Err(ValidationError::MustBePositive {
            field: "page".to_string(),
        });
    }

    let limit = match non_blank(limit) {
        None => i64::from(DEFAULT_PAGE_LIMIT),
        some => parse_int::<i64>("limit", some)?,
    };
    if !(1..=i64::from(MAX_PAGE_LIMIT)).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: i64::from(MAX_PAGE_LIMIT),
        });
    }

    Ok((page as u32, limit as u32))
}

/// Parses a fixed UTC offset such as `+07:00`, `-03:30` or `Z`.
///
/// ## Example
/// ```rust
/// use warung_core::validation::parse_utc_offset;
///
/// assert_eq!(parse_utc_offset("+07:00").unwrap().local_minus_utc(), 7 * 3600);
/// assert!(parse_utc_offset("WIB").is_err());
/// ```
pub fn parse_utc_offset(raw: &str) -> ValidationResult<FixedOffset> {
    let invalid = || ValidationError::InvalidFormat {
        field: "report_utc_offset".to_string(),
        reason: "expected ±HH:MM".to_string(),
    };

    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match raw.as_bytes().first() {
        Some(b'+') => (1, &raw[1..]),
        Some(b'-') => (-1, &raw[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Gula Pasir 1kg").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
        assert!(validate_product_name(&"A".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10_000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let mut product = NewProduct {
            name: "Beras 5kg".to_string(),
            price: 75_000,
            stock: 10,
            category: "Sembako".to_string(),
            description: None,
            barcode: Some("8991234567890".to_string()),
        };
        assert!(validate_new_product(&product).is_ok());

        product.stock = -1;
        assert!(matches!(
            validate_new_product(&product),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_validate_product_patch_checks_supplied_fields_only() {
        assert!(validate_product_patch(&ProductPatch::default()).is_ok());
        let patch = ProductPatch {
            price: Some(-5),
            ..Default::default()
        };
        assert!(validate_product_patch(&patch).is_err());
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("date", Some("2024-03-05")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

        assert!(matches!(
            parse_date("date", Some("")),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_date("date", Some("05-03-2024")),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_date("date", Some("1999-12-31")),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_parse_year_and_month() {
        assert_eq!(parse_year(Some("2024")).unwrap(), 2024);
        assert!(parse_year(Some("1999")).is_err());
        assert!(parse_year(Some("abc")).is_err());
        assert!(parse_year(None).is_err());

        assert_eq!(parse_month(Some("3")).unwrap(), 3);
        assert_eq!(parse_month(Some("12")).unwrap(), 12);
        assert!(parse_month(Some("0")).is_err());
        assert!(parse_month(Some("13")).is_err());
    }

    #[test]
    fn test_parse_pagination() {
        assert_eq!(parse_pagination(None, None).unwrap(), (1, 10));
        assert_eq!(parse_pagination(Some("3"), Some("25")).unwrap(), (3, 25));
        assert!(parse_pagination(Some("0"), None).is_err());
        assert!(parse_pagination(None, Some("101")).is_err());
        assert!(parse_pagination(None, Some("ten")).is_err());
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+07:00").unwrap().local_minus_utc(), 25_200);
        assert_eq!(parse_utc_offset("-03:30").unwrap().local_minus_utc(), -12_600);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("07:00").is_err());
        assert!(parse_utc_offset("+7").is_err());
    }
}
