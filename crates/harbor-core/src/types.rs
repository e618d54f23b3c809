//! # Domain Types
//!
//! Core domain types used throughout Harbor POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog              Selling                 Cash & Stock             │
//! │  ─────────────        ──────────────────      ───────────────────      │
//! │  Outlet               SalesTransaction        CashflowTransaction      │
//! │  Category             SaleLine                Shift                    │
//! │  Product ─┐           PaymentMethod           PurchaseOrder            │
//! │           └ StockLevel Customer               PurchaseOrderLine        │
//! │  Tax                                          StockAdjustment          │
//! │  Supplier             User, Role name                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Mutability
//! - `SalesTransaction` and `CashflowTransaction` are immutable once created.
//! - `Shift` is mutated exactly once, from Active to Closed.
//! - `PurchaseOrderLine::quantity_received` only ever grows.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

/// Payment method id whose sales put physical cash in the drawer.
pub const PAYMENT_CASH: &str = "cash";

/// Payment method id for card sales.
pub const PAYMENT_CARD: &str = "card";

/// Payment method id for digital-wallet sales.
pub const PAYMENT_DIGITAL: &str = "digital";

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate as a percentage (`12` means 12%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(#[ts(type = "string")] Decimal);

impl TaxRate {
    /// Creates a tax rate from a percentage.
    #[inline]
    pub const fn from_percent(pct: Decimal) -> Self {
        TaxRate(pct)
    }

    /// Creates a tax rate from basis points (825 = 8.25%).
    pub fn from_bps(bps: u32) -> Self {
        TaxRate(Decimal::new(i64::from(bps), 2))
    }

    /// Returns the rate as a percentage.
    #[inline]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a fraction (`12%` → `0.12`).
    pub fn fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(Decimal::ZERO)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

/// Prints the percentage without trailing zeros: `12`, `8.25`.
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

// =============================================================================
// Shared Status
// =============================================================================

/// Active/Inactive flag shared by taxes, payment methods and customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

// =============================================================================
// Tax
// =============================================================================

/// Whether a listed price already contains the tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TaxType {
    /// Price includes tax; the base is backed out of the line total.
    Inclusive,
    /// Tax is added on top of the price.
    #[default]
    Exclusive,
}

/// Which cart lines a tax rule can apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TaxApplyTo {
    #[default]
    All,
    Categories,
}

/// A configured tax rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tax {
    pub id: String,
    pub name: String,
    pub rate: TaxRate,
    #[serde(rename = "type")]
    pub tax_type: TaxType,
    pub apply_to: TaxApplyTo,
    /// Only consulted when `apply_to` is `Categories`.
    #[serde(default)]
    pub category_ids: Vec<String>,
    pub status: RecordStatus,
}

impl Tax {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }

    /// True when this rule covers a line of the given category.
    pub fn applies_to(&self, category_id: &str) -> bool {
        match self.apply_to {
            TaxApplyTo::All => true,
            TaxApplyTo::Categories => self.category_ids.iter().any(|c| c == category_id),
        }
    }

    /// True when the rule can never match anything.
    pub fn has_no_effect(&self) -> bool {
        self.apply_to == TaxApplyTo::Categories && self.category_ids.is_empty()
    }

    /// Breakdown key, e.g. `VAT (12%)`.
    ///
    /// Rules sharing a name and rate share a bucket.
    pub fn label(&self) -> String {
        format!("{} ({}%)", self.name, self.rate)
    }
}

// =============================================================================
// Outlets & Categories
// =============================================================================

/// A physical store location. Stock and shifts are scoped per outlet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Outlet {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub contact_phone: Option<String>,
}

/// Product category (also the scope of category taxes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// Stock record for one (product, outlet) pair. `quantity` may be negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub outlet_id: String,
    pub quantity: i64,
}

/// A product available for sale.
///
/// ## Invariants
/// - `sku` is unique across the catalog; `barcode` too when present
/// - at most one `StockLevel` per outlet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub price: Money,
    pub cost: Money,
    pub category_id: String,
    #[serde(default)]
    pub stock_levels: Vec<StockLevel>,
    pub low_stock_threshold: i64,
}

impl Product {
    /// Stock record at the outlet, if one exists.
    pub fn stock_at(&self, outlet_id: &str) -> Option<&StockLevel> {
        self.stock_levels.iter().find(|sl| sl.outlet_id == outlet_id)
    }

    /// Quantity on hand at the outlet (zero when no record exists).
    pub fn quantity_at(&self, outlet_id: &str) -> i64 {
        self.stock_at(outlet_id).map_or(0, |sl| sl.quantity)
    }

    /// At or below the low-stock threshold at this outlet.
    pub fn is_low_stock_at(&self, outlet_id: &str) -> bool {
        self.quantity_at(outlet_id) <= self.low_stock_threshold
    }
}

// =============================================================================
// People
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub loyalty_points: i64,
    #[serde(default)]
    pub total_purchases: Money,
    #[ts(as = "Option<String>")]
    pub last_purchase_date: Option<NaiveDate>,
    pub status: RecordStatus,
    #[serde(default)]
    pub outlet_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
}

/// Roles every new till starts with.
pub const DEFAULT_ROLES: [&str; 4] = ["Administrator", "Manager", "Cashier", "Inventory Staff"];

/// A staff account. Deleting one only marks it Inactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// One of the configured role names.
    pub role: String,
    #[serde(default)]
    pub outlet_ids: Vec<String>,
    #[serde(default)]
    pub status: RecordStatus,
    /// `None` until the user first logs in.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub last_login: Option<DateTime<Utc>>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// A tender type configured in settings (`cash`, `card`, `digital`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    pub status: RecordStatus,
    #[serde(default)]
    pub outlet_ids: Vec<String>,
}

impl PaymentMethod {
    /// Usable for checkout at the outlet.
    pub fn is_available_at(&self, outlet_id: &str) -> bool {
        self.status == RecordStatus::Active && self.outlet_ids.iter().any(|o| o == outlet_id)
    }
}

// =============================================================================
// Sales
// =============================================================================

/// A sold line, with the price captured at sale time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
    pub price: Money,
}

/// A completed sale. Immutable once created.
///
/// Sales carry a date only, so shift matching works at day granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesTransaction {
    pub id: String,
    pub outlet_id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total_amount: Money,
    /// Payment method id (see [`PAYMENT_CASH`]).
    pub payment_method: String,
    pub cashier_id: String,
    pub customer_id: Option<String>,
    pub items: Vec<SaleLine>,
}

// =============================================================================
// Cashflow
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CashflowType {
    #[serde(rename = "Cash In")]
    CashIn,
    #[serde(rename = "Cash Out")]
    CashOut,
}

impl CashflowType {
    /// Signs an amount: positive for cash in, negative for cash out.
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            CashflowType::CashIn => amount,
            CashflowType::CashOut => -amount,
        }
    }
}

impl fmt::Display for CashflowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CashflowType::CashIn => write!(f, "Cash In"),
            CashflowType::CashOut => write!(f, "Cash Out"),
        }
    }
}

/// An append-only cash ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashflowTransaction {
    pub id: String,
    pub outlet_id: String,
    #[ts(as = "String")]
    pub date_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub cashflow_type: CashflowType,
    /// e.g. `Sale #…`, `PO Payment #PO-2024-001`, `Utilities`
    pub source: String,
    pub amount: Money,
    pub notes: Option<String>,
    pub user: String,
}

impl CashflowTransaction {
    /// The amount signed by direction.
    pub fn signed_amount(&self) -> Money {
        self.cashflow_type.signed(self.amount)
    }
}

// =============================================================================
// Shift
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ShiftStatus {
    Active,
    Closed,
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftStatus::Active => write!(f, "Active"),
            ShiftStatus::Closed => write!(f, "Closed"),
        }
    }
}

/// A cashier's work session with an opening and closing cash count.
///
/// ## Lifecycle
/// ```text
/// start ──► Active ──(end with counted cash)──► Closed   (terminal)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,
    pub cashier_id: String,
    pub outlet_id: String,
    #[ts(as = "String")]
    pub start_time: DateTime<Utc>,
    pub opening_balance: Money,
    #[ts(as = "Option<String>")]
    pub end_time: Option<DateTime<Utc>>,
    /// Expected cash at close.
    pub closing_balance: Option<Money>,
    /// Cash counted at close.
    pub actual_cash: Option<Money>,
    pub variance: Option<Money>,
    pub status: ShiftStatus,
}

// =============================================================================
// Purchase Orders
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PurchaseOrderStatus {
    #[default]
    Draft,
    Sent,
    #[serde(rename = "Partially Received")]
    PartiallyReceived,
    Received,
    Cancelled,
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PurchaseOrderStatus::Draft => "Draft",
            PurchaseOrderStatus::Sent => "Sent",
            PurchaseOrderStatus::PartiallyReceived => "Partially Received",
            PurchaseOrderStatus::Received => "Received",
            PurchaseOrderStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderLine {
    pub id: String,
    pub product_id: String,
    pub quantity_ordered: i64,
    /// Never decreases; never exceeds `quantity_ordered`.
    #[serde(default)]
    pub quantity_received: i64,
    pub cost: Money,
}

impl PurchaseOrderLine {
    /// Units still expected from the supplier.
    pub fn remaining(&self) -> i64 {
        (self.quantity_ordered - self.quantity_received).max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: String,
    pub po_number: String,
    pub supplier_id: String,
    pub outlet_id: String,
    #[ts(as = "String")]
    pub date_created: NaiveDate,
    #[ts(as = "Option<String>")]
    pub expected_delivery: Option<NaiveDate>,
    #[serde(default)]
    pub status: PurchaseOrderStatus,
    pub items: Vec<PurchaseOrderLine>,
    pub notes: Option<String>,
}

/// One product's received quantity in a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedLine {
    pub product_id: String,
    pub quantity: i64,
}

// =============================================================================
// Stock Adjustment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum StockAdjustmentType {
    Received,
    #[serde(rename = "Damaged/Loss")]
    DamagedLoss,
    #[serde(rename = "Manual Correction")]
    ManualCorrection,
    #[serde(rename = "Stock Take")]
    StockTake,
    Return,
}

impl fmt::Display for StockAdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StockAdjustmentType::Received => "Received",
            StockAdjustmentType::DamagedLoss => "Damaged/Loss",
            StockAdjustmentType::ManualCorrection => "Manual Correction",
            StockAdjustmentType::StockTake => "Stock Take",
            StockAdjustmentType::Return => "Return",
        };
        write!(f, "{}", s)
    }
}

/// A manual stock change command. Transient: applied, logged, not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub product_id: String,
    pub outlet_id: String,
    /// Signed; must not be zero.
    pub change: i64,
    #[serde(rename = "type")]
    pub adjustment_type: StockAdjustmentType,
    #[serde(default)]
    pub reason: String,
    pub user: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn vat() -> Tax {
        Tax {
            id: "t-1".to_string(),
            name: "VAT".to_string(),
            rate: TaxRate::from_percent(dec!(12)),
            tax_type: TaxType::Inclusive,
            apply_to: TaxApplyTo::All,
            category_ids: vec![],
            status: RecordStatus::Active,
        }
    }

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(rate.percent(), dec!(8.25));
        assert_eq!(rate.fraction(), dec!(0.0825));
    }

    #[test]
    fn test_tax_label_trims_trailing_zeros() {
        assert_eq!(vat().label(), "VAT (12%)");

        let mut tax = vat();
        tax.rate = TaxRate::from_bps(825);
        assert_eq!(tax.label(), "VAT (8.25%)");
    }

    #[test]
    fn test_category_tax_matching() {
        let mut tax = vat();
        tax.apply_to = TaxApplyTo::Categories;
        assert!(tax.has_no_effect());
        assert!(!tax.applies_to("bakery"));

        tax.category_ids = vec!["bakery".to_string()];
        assert!(tax.applies_to("bakery"));
        assert!(!tax.applies_to("drinks"));
    }

    #[test]
    fn test_cashflow_signing() {
        let amount = Money::from_cents(5000);
        assert_eq!(CashflowType::CashIn.signed(amount), amount);
        assert_eq!(CashflowType::CashOut.signed(amount), -amount);
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&PurchaseOrderStatus::PartiallyReceived).unwrap();
        assert_eq!(json, "\"Partially Received\"");
        let json = serde_json::to_string(&CashflowType::CashOut).unwrap();
        assert_eq!(json, "\"Cash Out\"");
        let json = serde_json::to_string(&TaxType::Inclusive).unwrap();
        assert_eq!(json, "\"inclusive\"");
    }

    #[test]
    fn test_product_stock_lookup() {
        let product = Product {
            id: "p-1".to_string(),
            name: "Coca-Cola Can".to_string(),
            sku: "BEV001".to_string(),
            barcode: None,
            price: Money::from_cents(850),
            cost: Money::from_cents(450),
            category_id: "drinks".to_string(),
            stock_levels: vec![StockLevel {
                outlet_id: "o-1".to_string(),
                quantity: 20,
            }],
            low_stock_threshold: 20,
        };
        assert_eq!(product.quantity_at("o-1"), 20);
        assert_eq!(product.quantity_at("o-2"), 0);
        assert!(product.is_low_stock_at("o-1"));
    }
}
