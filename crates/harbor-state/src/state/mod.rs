//! # State Module
//!
//! The single owner of every entity collection.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                         AppState                                │   │
//! │  │                                                                 │   │
//! │  │  catalog.rs    outlets, categories, products, customers,        │   │
//! │  │                suppliers, taxes, payment methods                │   │
//! │  │  users.rs      staff accounts, role names                       │   │
//! │  │  sales.rs      cart, completed sales                            │   │
//! │  │  shifts.rs     shift history (at most one Active per cashier)   │   │
//! │  │  inventory.rs  stock adjustments, purchase orders               │   │
//! │  │  cashflow.rs   cashflow ledger                                  │   │
//! │  │  expenses.rs   expenses and dues (paying a due is a Cash Out)   │   │
//! │  │                                                                 │   │
//! │  │  config: PosConfig    clock: Arc<dyn Clock>                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Every mutation validates first and then applies, so a failed call     │
//! │  leaves the state exactly as it was.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cashflow;
mod catalog;
mod expenses;
mod inventory;
mod sales;
mod shifts;
mod users;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use harbor_core::{
    Cart, CashflowLedger, Category, CoreError, Customer, ExpenseDue, Outlet, PaymentMethod,
    Product, PurchaseOrder, SalesTransaction, Shift, ShiftStatus, Supplier, Tax, User,
    DEFAULT_ROLES,
};
use tracing::warn;

use crate::config::PosConfig;
use crate::error::ApiError;

pub use expenses::DuePayment;
pub use inventory::{PurchaseOrderDraft, PurchaseOrderLineDraft};
pub use shifts::ShiftClosure;

/// Result type for coordinator operations.
pub type StateResult<T> = Result<T, ApiError>;

// =============================================================================
// Clock
// =============================================================================

/// Source of "now" for shifts, sales and cashflow entries.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// =============================================================================
// AppState
// =============================================================================

/// Application state for one till session.
pub struct AppState {
    config: PosConfig,
    clock: Arc<dyn Clock>,

    outlets: Vec<Outlet>,
    categories: Vec<Category>,
    products: Vec<Product>,
    customers: Vec<Customer>,
    suppliers: Vec<Supplier>,
    taxes: Vec<Tax>,
    payment_methods: Vec<PaymentMethod>,
    users: Vec<User>,
    /// Role names in creation order.
    roles: Vec<String>,

    cart: Cart,
    /// Newest first.
    sales: Vec<SalesTransaction>,
    shifts: Vec<Shift>,
    purchase_orders: Vec<PurchaseOrder>,
    cashflow: CashflowLedger,
    expenses_dues: Vec<ExpenseDue>,
}

impl AppState {
    /// Empty state, apart from the default roles, on the system clock.
    pub fn new(config: PosConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: PosConfig, clock: Arc<dyn Clock>) -> Self {
        AppState {
            config,
            clock,
            outlets: Vec::new(),
            categories: Vec::new(),
            products: Vec::new(),
            customers: Vec::new(),
            suppliers: Vec::new(),
            taxes: Vec::new(),
            payment_methods: Vec::new(),
            users: Vec::new(),
            roles: DEFAULT_ROLES.iter().map(|r| r.to_string()).collect(),
            cart: Cart::new(),
            sales: Vec::new(),
            shifts: Vec::new(),
            purchase_orders: Vec::new(),
            cashflow: CashflowLedger::new(),
            expenses_dues: Vec::new(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn config(&self) -> &PosConfig {
        &self.config
    }

    pub fn outlets(&self) -> &[Outlet] {
        &self.outlets
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn taxes(&self) -> &[Tax] {
        &self.taxes
    }

    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn sales(&self) -> &[SalesTransaction] {
        &self.sales
    }

    /// Every shift, open and closed, in start order.
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    /// The configured cashier's open shift.
    pub fn active_shift(&self) -> Option<&Shift> {
        harbor_core::shift::active_shift_for(&self.shifts, self.config.cashier_id())
    }

    pub fn purchase_orders(&self) -> &[PurchaseOrder] {
        &self.purchase_orders
    }

    pub fn purchase_order(&self, id: &str) -> Option<&PurchaseOrder> {
        self.purchase_orders.iter().find(|po| po.id == id)
    }

    pub fn cashflow(&self) -> &CashflowLedger {
        &self.cashflow
    }

    /// Newest first.
    pub fn expenses_dues(&self) -> &[ExpenseDue] {
        &self.expenses_dues
    }

    // =========================================================================
    // Shared Lookups
    // =========================================================================

    fn require_outlet(&self, id: &str) -> StateResult<&Outlet> {
        self.outlets
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| CoreError::not_found("Outlet", id).into())
    }

    fn require_product(&self, id: &str) -> StateResult<&Product> {
        self.product(id)
            .ok_or_else(|| CoreError::not_found("Product", id).into())
    }

    fn has_active_shift_at(&self, outlet_id: &str) -> bool {
        self.shifts
            .iter()
            .any(|s| s.status == ShiftStatus::Active && s.outlet_id == outlet_id)
    }

    /// Logs products left at or below their threshold at the outlet.
    fn warn_if_low_stock<'a>(&self, product_ids: impl IntoIterator<Item = &'a str>, outlet_id: &str) {
        for id in product_ids {
            if let Some(product) = self.product(id) {
                if product.is_low_stock_at(outlet_id) {
                    warn!(
                        product_id = %product.id,
                        sku = %product.sku,
                        outlet_id = %outlet_id,
                        quantity = product.quantity_at(outlet_id),
                        threshold = product.low_stock_threshold,
                        "Product is low on stock"
                    );
                }
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(PosConfig::default())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("outlets", &self.outlets.len())
            .field("products", &self.products.len())
            .field("sales", &self.sales.len())
            .field("shifts", &self.shifts.len())
            .field("purchase_orders", &self.purchase_orders.len())
            .field("cashflow", &self.cashflow.len())
            .field("expenses_dues", &self.expenses_dues.len())
            .finish()
    }
}

/// Removes the element with `id`, or reports it missing.
fn remove_by_id<T>(
    items: &mut Vec<T>,
    entity: &str,
    id: &str,
    id_of: impl Fn(&T) -> &str,
) -> StateResult<T> {
    let index = items
        .iter()
        .position(|item| id_of(item) == id)
        .ok_or_else(|| ApiError::from(CoreError::not_found(entity, id)))?;
    Ok(items.remove(index))
}

/// Replaces the element with the same id, or inserts at the front.
fn upsert_by_id<T>(items: &mut Vec<T>, item: T, id_of: impl Fn(&T) -> &str) {
    match items.iter().position(|existing| id_of(existing) == id_of(&item)) {
        Some(index) => items[index] = item,
        None => items.insert(0, item),
    }
}

/// A fresh id when the caller left it blank.
fn id_or_new(id: &str) -> String {
    if id.trim().is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        id.to_string()
    }
}
