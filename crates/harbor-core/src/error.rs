//! # Error Types
//!
//! Domain-specific error types for harbor-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  harbor-core errors (this file)                                        │
//! │  ├── CoreError        - NotFound / InvalidState / limits / overflow    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  harbor-state errors (separate crate)                                  │
//! │  └── ApiError         - What the front end sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error is deterministic and synchronous: there is no I/O here, so
//! there is no retryable class.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A referenced entity does not exist at mutation time.
    ///
    /// ## When This Occurs
    /// - Product sold or adjusted was deleted from the catalog
    /// - Stock adjustment names an outlet that was never configured
    /// - Purchase order id is stale
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The entity is in a state that does not allow the operation.
    ///
    /// ## When This Occurs
    /// - Deleting a purchase order that is no longer Draft
    /// - Ending a shift that is already Closed
    /// - Receiving against a Cancelled order
    #[error("{entity} {id} is {status}, cannot perform operation")]
    InvalidState {
        entity: String,
        id: String,
        status: String,
    },

    /// The cashier already has an open shift.
    #[error("Cashier {cashier_id} already has an active shift ({shift_id})")]
    ShiftAlreadyActive { cashier_id: String, shift_id: String },

    /// An operation that needs an open shift ran without one.
    #[error("No active shift; start a shift to make sales")]
    NoActiveShift,

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A purchase-order receipt would take a line past its ordered quantity.
    #[error("Receiving {requested} of {product_id} exceeds remaining quantity {remaining}")]
    ExceedsOrdered {
        product_id: String,
        requested: i64,
        remaining: i64,
    },

    /// A money computation left the representable decimal range.
    #[error("Amount out of range while computing {context}")]
    AmountOverflow { context: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: &str, id: &str) -> Self {
        CoreError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Shorthand for [`CoreError::AmountOverflow`].
    pub fn overflow(context: &str) -> Self {
        CoreError::AmountOverflow {
            context: context.to_string(),
        }
    }

    /// Shorthand for [`CoreError::InvalidState`].
    pub fn invalid_state(entity: &str, id: &str, status: impl std::fmt::Display) -> Self {
        CoreError::InvalidState {
            entity: entity.to_string(),
            id: id.to_string(),
            status: status.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Surfaced directly to the user; never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., SKU with spaces).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate SKU).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A shift cannot start before any outlet exists.
    #[error("Create an outlet in Settings before starting a shift")]
    NoOutlets,

    /// Checkout was attempted with nothing in the cart.
    #[error("Cannot checkout with an empty cart")]
    EmptyCart,

    /// A stock adjustment with a change of zero.
    #[error("Stock adjustment change must not be zero")]
    ZeroAdjustment,
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn must_be_positive(field: &str) -> Self {
        ValidationError::MustBePositive {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
