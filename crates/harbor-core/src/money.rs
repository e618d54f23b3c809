//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Inclusive tax makes it worse:                                          │
//! │    11.20 / 1.12 must be exactly 10.00, and the tax exactly 1.20        │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal, rounded only for display               │
//! │    Per-line tax is accumulated in full precision, then the totals      │
//! │    are rounded once, so rounding error never compounds across lines.   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use harbor_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line = price * 2;                // 21.98
//! assert_eq!(line.cents(), 2198);
//! assert_eq!(line.to_string(), "21.98");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

/// Number of decimal places shown to the cashier.
pub const DISPLAY_DECIMALS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in major units (e.g. `11.20`), held at full precision.
///
/// ## Design Decisions
/// - **Decimal (signed)**: Allows negative values for cash out, variance
/// - **Single field tuple struct**: Zero-cost abstraction over Decimal
/// - **Serialized as a string**: `"11.20"`, never a JSON float
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► CartItem.unit_price ──► line total ──► Tax Engine
///                                                             │
///                ┌────────────────────────────────────────────┘
///                ▼
/// CartTotals.total ──► SalesTransaction.total_amount ──► Cashflow (cash)
///                                                             │
///                                                             ▼
///                               Shift expected cash ◄── manual in/out
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Creates a Money value from cents (the smallest display unit).
    ///
    /// ## Example
    /// ```rust
    /// use harbor_core::money::Money;
    ///
    /// let price = Money::from_cents(1120);
    /// assert_eq!(price.to_string(), "11.20");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, DISPLAY_DECIMALS))
    }

    /// Wraps an exact decimal amount in major units.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the full-precision amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Rounds to display precision (two places, half away from zero).
    ///
    /// Only presentation code and persisted snapshots should call this;
    /// calculations keep the unrounded value.
    pub fn rounded(&self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Returns the value rounded to whole cents.
    ///
    /// ## Example
    /// ```rust
    /// use harbor_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let third = Money::from_decimal(Decimal::new(10, 0) / Decimal::new(3, 0));
    /// assert_eq!(third.cents(), 333);
    /// ```
    pub fn cents(&self) -> i64 {
        let scaled = self.rounded().0.checked_mul(Decimal::ONE_HUNDRED);
        scaled.and_then(|c| c.to_i64()).unwrap_or(if self.is_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
    }

    /// Exclusive tax: the amount to add on top of this (base) value.
    ///
    /// ```text
    /// line 20.00 × 10% ──► tax 2.00 ──► line pays 22.00
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Option<Money> {
        self.0.checked_mul(rate.fraction()).map(Money)
    }

    /// Inclusive tax: splits this tax-inclusive value into `(base, tax)`.
    ///
    /// ```text
    /// line 11.20 @ 12% ──► base = 11.20 / 1.12 = 10.00 ──► tax = 1.20
    /// ```
    ///
    /// A divisor of zero (rate of -100%) leaves the whole value as base.
    pub fn split_inclusive_tax(&self, rate: TaxRate) -> (Money, Money) {
        let divisor = Decimal::ONE + rate.fraction();
        match self.0.checked_div(divisor) {
            Some(base) => (Money(base), Money(self.0 - base)),
            None => (*self, Money::zero()),
        }
    }

    /// Multiplies money by a quantity, or `None` past the decimal range.
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Adds, or `None` past the decimal range.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the value at display precision, without a currency symbol.
///
/// Currency symbols are a config concern (see `PosConfig::format_currency`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shown = self.rounded().0;
        shown.rescale(DISPLAY_DECIMALS);
        write!(f, "{}", shown)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by quantity. Saturates at the decimal range.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(Decimal::from(qty)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
