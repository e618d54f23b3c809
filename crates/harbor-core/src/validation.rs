//! # Validation Module
//!
//! Input validation utilities for Harbor POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end                                                    │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback (may warn, never trusted)                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rule validation before any state is touched             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: harbor-state                                                 │
//! │  └── Cross-entity checks (unique SKU, outlet exists, ...)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use harbor_core::validation::{validate_sku, validate_quantity};
//!
//! assert!(validate_sku("BEV-001").is_ok());
//! assert!(validate_quantity("quantity", 5).is_ok());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::TaxRate;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a free-text field is present.
///
/// Returns the trimmed value.
pub fn validate_required<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value)
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use harbor_core::validation::validate_sku;
///
/// assert!(validate_sku("BEV001").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = validate_required("sku", sku)?;

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name: present, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = validate_required("name", name)?;

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit count (cart line, order line, receipt line).
///
/// ## Rules
/// - Must be positive (> 0)
///
/// Upper limits are context specific: the cart caps a line at
/// `MAX_ITEM_QUANTITY`, purchase orders do not.
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive(field));
    }
    Ok(())
}

/// Validates an amount that must be strictly positive (price, cost, cash entry).
///
/// ## Example
/// ```rust
/// use harbor_core::money::Money;
/// use harbor_core::validation::validate_positive_amount;
///
/// assert!(validate_positive_amount("price", Money::from_cents(850)).is_ok());
/// assert!(validate_positive_amount("price", Money::zero()).is_err());
/// ```
pub fn validate_positive_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::must_be_positive(field));
    }
    Ok(())
}

/// Validates a cash count: zero is fine, negative is not.
pub fn validate_cash_count(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a tax rate percentage.
///
/// ## Rules
/// - Must be between 0 and 100
pub fn validate_tax_rate(rate: TaxRate) -> ValidationResult<()> {
    if rate.percent() < Decimal::ZERO || rate.percent() > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a stock adjustment delta: any sign, never zero.
pub fn validate_adjustment_change(change: i64) -> ValidationResult<()> {
    if change == 0 {
        return Err(ValidationError::ZeroAdjustment);
    }
    Ok(())
}

/// Validates a staff email: one `@` with text on both sides, no spaces.
///
/// Returns the trimmed value.
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    let email = validate_required("email", email)?;
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain".to_string(),
        });
    }
    Ok(email)
}

// =============================================================================
// Unit Tests
// =============================================================================
