//! # harbor-core: Pure Business Logic for Harbor POS
//!
//! Every retail rule with numeric or state-machine weight lives here, as
//! plain functions over plain data. No I/O, no clock, no globals.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Harbor POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Front end (any UI)                           │   │
//! │  │   Sales ──► Checkout ──► End Shift ──► Cash Flow ──► Purchases  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Command JSON                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         harbor-state (AppState + command dispatch)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ harbor-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │   tax    │ │  stock   │ │  shift   │ │ cashflow │          │   │
//! │  │   │ totals & │ │  deltas  │ │ expected │ │ running  │          │   │
//! │  │   │breakdown │ │ per outl.│ │ & var.   │ │ balance  │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │   cart   │ │ purchase │ │  money   │ │validation│          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO GLOBALS • TIME IS A PARAMETER          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Tax, Shift, PurchaseOrder, ...)
//! - [`money`] - Decimal money, rounded only for display
//! - [`tax`] - Tax Engine: subtotal, per-rule breakdown, total
//! - [`cart`] - The in-progress sale
//! - [`stock`] - Stock Ledger deltas
//! - [`purchase`] - Purchase-order lifecycle and goods receipt
//! - [`shift`] - Shift open, summary, close
//! - [`cashflow`] - Cashflow Ledger and period views
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level rules
//!
//! ## Example Usage
//!
//! ```rust
//! use harbor_core::cart::CartItem;
//! use harbor_core::money::Money;
//! use harbor_core::tax::compute_cart_totals;
//! use harbor_core::types::{RecordStatus, Tax, TaxApplyTo, TaxRate, TaxType};
//! use rust_decimal_macros::dec;
//!
//! let vat = Tax {
//!     id: "vat".into(),
//!     name: "VAT".into(),
//!     rate: TaxRate::from_percent(dec!(12)),
//!     tax_type: TaxType::Inclusive,
//!     apply_to: TaxApplyTo::All,
//!     category_ids: vec![],
//!     status: RecordStatus::Active,
//! };
//! let cart = vec![CartItem::new("p-1", "4", Money::from_cents(1120), 1)];
//!
//! let totals = compute_cart_totals(&cart, &[vat]).unwrap();
//! assert_eq!(totals.subtotal.to_string(), "10.00");
//! assert_eq!(totals.tax_breakdown["VAT (12%)"].to_string(), "1.20");
//! assert_eq!(totals.total.to_string(), "11.20");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod cashflow;
pub mod error;
pub mod expense;
pub mod money;
pub mod purchase;
pub mod shift;
pub mod stock;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem};
pub use cashflow::{CashflowLedger, CashflowQuery, CashflowSummary, DateRange, NewCashflow};
pub use error::{CoreError, CoreResult, ValidationError};
pub use expense::{ExpenseDue, ExpenseKind, ExpensePaymentMethod, ExpenseStatus};
pub use money::Money;
pub use shift::ShiftSummary;
pub use tax::CartTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum units on one cart line.
///
/// Catches a mistyped `1000` for `10` at the till.
pub const MAX_ITEM_QUANTITY: i64 = 999;
