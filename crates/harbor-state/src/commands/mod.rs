//! # Commands Module
//!
//! Every operation the front end can invoke, as one tagged union.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (Command, CommandOutcome, dispatch)
//! └── cart.rs     ◄─── Cart and checkout handlers, CartResponse
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Front end                                                              │
//! │  ─────────                                                              │
//! │  const cart = bridge.dispatch(JSON.stringify({                          │
//! │    type: 'addToCart',                                                   │
//! │    payload: { productId: 'p-1', quantity: 2 }                           │
//! │  }));                                                                   │
//! │         │                                                               │
//! │         │ (JSON string)                                                 │
//! │         ▼                                                               │
//! │  Rust                                                                   │
//! │  ────                                                                   │
//! │  AppState::dispatch_json(&str)                                          │
//! │    serde_json::from_str::<Command>  ── malformed ──► INTERNAL           │
//! │    AppState::dispatch(Command)      ── rule broken ─► ApiError          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  { "type": "cart", "data": { "items": [...], "totals": {...} } }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;

use harbor_core::{
    CartItem, CartTotals, CashflowQuery, CashflowSummary, CashflowTransaction, Category, Customer,
    ExpenseDue, Money, NewCashflow, Outlet, PaymentMethod, Product, PurchaseOrder, ReceivedLine,
    SalesTransaction, Shift, ShiftSummary, StockAdjustmentType, StockLevel, Supplier, Tax, User,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::{AppState, DuePayment, PurchaseOrderDraft, ShiftClosure};
use cart::CartResponse;

/// A front-end request.
///
/// ## Wire Format
/// ```json
/// { "type": "startShift", "payload": { "openingBalance": "500.00" } }
/// { "type": "getCart" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    // Catalog & settings
    SaveOutlet(Outlet),
    DeleteOutlet { id: String },
    SaveCategory(Category),
    DeleteCategory { id: String },
    SaveProduct(Product),
    DeleteProduct { id: String },
    SaveCustomer(Customer),
    DeleteCustomer { id: String },
    SaveSupplier(Supplier),
    DeleteSupplier { id: String },
    SaveTax(Tax),
    DeleteTax { id: String },
    SavePaymentMethod(PaymentMethod),
    DeletePaymentMethod { id: String },
    SaveUser(User),
    /// Soft delete: the user becomes Inactive.
    DeleteUser { id: String },
    SaveRole { name: String },
    DeleteRole { name: String },

    // Cart & checkout
    GetCart,
    AddToCart {
        product_id: String,
        #[serde(default)]
        quantity: Option<i64>,
    },
    UpdateCartQuantity { product_id: String, quantity: i64 },
    RemoveFromCart { product_id: String },
    ClearCart,
    /// Totals for lines that are not the current cart.
    ComputeCartTotals { items: Vec<CartItem> },
    CompleteSale {
        #[serde(default)]
        customer_id: Option<String>,
        payment_method: String,
    },

    // Shifts
    StartShift {
        opening_balance: Money,
        #[serde(default)]
        outlet_id: Option<String>,
    },
    GetShiftSummary,
    EndShift { actual_cash: Money },

    // Stock & purchasing
    AdjustStock {
        product_id: String,
        outlet_id: String,
        change: i64,
        #[serde(rename = "type")]
        adjustment_type: StockAdjustmentType,
        #[serde(default)]
        reason: String,
    },
    SavePurchaseOrder(PurchaseOrderDraft),
    SendPurchaseOrder { id: String },
    CancelPurchaseOrder { id: String },
    ReceivePurchaseOrder { id: String, lines: Vec<ReceivedLine> },
    DeletePurchaseOrder { id: String },

    // Cashflow
    RecordCashflow(NewCashflow),
    SummarizeCashflow(CashflowQuery),

    // Expenses & dues
    SaveExpenseDue(ExpenseDue),
    DeleteExpenseDue { id: String },
    MarkDuePaid { id: String },
}

impl Command {
    /// Wire name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SaveOutlet(_) => "saveOutlet",
            Command::DeleteOutlet { .. } => "deleteOutlet",
            Command::SaveCategory(_) => "saveCategory",
            Command::DeleteCategory { .. } => "deleteCategory",
            Command::SaveProduct(_) => "saveProduct",
            Command::DeleteProduct { .. } => "deleteProduct",
            Command::SaveCustomer(_) => "saveCustomer",
            Command::DeleteCustomer { .. } => "deleteCustomer",
            Command::SaveSupplier(_) => "saveSupplier",
            Command::DeleteSupplier { .. } => "deleteSupplier",
            Command::SaveTax(_) => "saveTax",
            Command::DeleteTax { .. } => "deleteTax",
            Command::SavePaymentMethod(_) => "savePaymentMethod",
            Command::DeletePaymentMethod { .. } => "deletePaymentMethod",
            Command::SaveUser(_) => "saveUser",
            Command::DeleteUser { .. } => "deleteUser",
            Command::SaveRole { .. } => "saveRole",
            Command::DeleteRole { .. } => "deleteRole",
            Command::GetCart => "getCart",
            Command::AddToCart { .. } => "addToCart",
            Command::UpdateCartQuantity { .. } => "updateCartQuantity",
            Command::RemoveFromCart { .. } => "removeFromCart",
            Command::ClearCart => "clearCart",
            Command::ComputeCartTotals { .. } => "computeCartTotals",
            Command::CompleteSale { .. } => "completeSale",
            Command::StartShift { .. } => "startShift",
            Command::GetShiftSummary => "getShiftSummary",
            Command::EndShift { .. } => "endShift",
            Command::AdjustStock { .. } => "adjustStock",
            Command::SavePurchaseOrder(_) => "savePurchaseOrder",
            Command::SendPurchaseOrder { .. } => "sendPurchaseOrder",
            Command::CancelPurchaseOrder { .. } => "cancelPurchaseOrder",
            Command::ReceivePurchaseOrder { .. } => "receivePurchaseOrder",
            Command::DeletePurchaseOrder { .. } => "deletePurchaseOrder",
            Command::RecordCashflow(_) => "recordCashflow",
            Command::SummarizeCashflow(_) => "summarizeCashflow",
            Command::SaveExpenseDue(_) => "saveExpenseDue",
            Command::DeleteExpenseDue { .. } => "deleteExpenseDue",
            Command::MarkDuePaid { .. } => "markDuePaid",
        }
    }
}

/// What a command produced.
///
/// ```json
/// { "type": "shiftClosed", "data": { "shift": {...}, "summary": {...} } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum CommandOutcome {
    Outlet(Outlet),
    Category(Category),
    Product(Product),
    Customer(Customer),
    Supplier(Supplier),
    Tax(Tax),
    PaymentMethod(PaymentMethod),
    User(User),
    Roles(Vec<String>),
    Deleted { id: String },
    Cart(CartResponse),
    CartTotals(CartTotals),
    Sale(SalesTransaction),
    Shift(Shift),
    ShiftClosed(ShiftClosure),
    ShiftSummary(ShiftSummary),
    StockLevel { product_id: String, level: StockLevel },
    PurchaseOrder(PurchaseOrder),
    Cashflow(CashflowTransaction),
    CashflowSummary(CashflowSummary),
    ExpenseDue(ExpenseDue),
    DuePaid(DuePayment),
}

type CommandResult = Result<CommandOutcome, ApiError>;

impl AppState {
    /// Runs one command against the state.
    pub fn dispatch(&mut self, command: Command) -> CommandResult {
        debug!(command = command.name(), "dispatch command");

        match command {
            Command::SaveOutlet(outlet) => self.save_outlet(outlet).map(CommandOutcome::Outlet),
            Command::DeleteOutlet { id } => {
                self.delete_outlet(&id)?;
                Ok(CommandOutcome::Deleted { id })
            }
            Command::SaveCategory(category) => {
                self.save_category(category).map(CommandOutcome::Category)
            }
            Command::DeleteCategory { id } => {
                self.delete_category(&id)?;
                Ok(CommandOutcome::Deleted { id })
            }
            Command::SaveProduct(product) => self.save_product(product).map(CommandOutcome::Product),
            Command::DeleteProduct { id } => {
                self.delete_product(&id)?;
                Ok(CommandOutcome::Deleted { id })
            }
            Command::SaveCustomer(customer) => {
                self.save_customer(customer).map(CommandOutcome::Customer)
            }
            Command::DeleteCustomer { id } => {
                self.delete_customer(&id)?;
                Ok(CommandOutcome::Deleted { id })
            }
            Command::SaveSupplier(supplier) => {
                self.save_supplier(supplier).map(CommandOutcome::Supplier)
            }
            Command::DeleteSupplier { id } => {
                self.delete_supplier(&id)?;
                Ok(CommandOutcome::Deleted { id })
            }
            Command::SaveTax(tax) => self.save_tax(tax).map(CommandOutcome::Tax),
            Command::DeleteTax { id } => {
                self.delete_tax(&id)?;
                Ok(CommandOutcome::Deleted { id })
            }
            Command::SavePaymentMethod(method) => self
                .save_payment_method(method)
                .map(CommandOutcome::PaymentMethod),
            Command::DeletePaymentMethod { id } => {
                self.delete_payment_method(&id)?;
                Ok(CommandOutcome::Deleted { id })
            }
            Command::SaveUser(user) => self.save_user(user).map(CommandOutcome::User),
            Command::DeleteUser { id } => self.delete_user(&id).map(CommandOutcome::User),
            Command::SaveRole { name } => self
                .save_role(&name)
                .map(|roles| CommandOutcome::Roles(roles.to_vec())),
            Command::DeleteRole { name } => self
                .delete_role(&name)
                .map(|roles| CommandOutcome::Roles(roles.to_vec())),

            Command::GetCart => cart::get_cart(self),
            Command::AddToCart {
                product_id,
                quantity,
            } => cart::add_to_cart(self, &product_id, quantity),
            Command::UpdateCartQuantity {
                product_id,
                quantity,
            } => cart::update_cart_quantity(self, &product_id, quantity),
            Command::RemoveFromCart { product_id } => cart::remove_from_cart(self, &product_id),
            Command::ClearCart => cart::clear_cart(self),
            Command::ComputeCartTotals { items } => self
                .compute_cart_totals(&items)
                .map(|totals| CommandOutcome::CartTotals(totals.rounded())),
            Command::CompleteSale {
                customer_id,
                payment_method,
            } => self
                .complete_sale(customer_id.as_deref(), &payment_method)
                .map(CommandOutcome::Sale),

            Command::StartShift {
                opening_balance,
                outlet_id,
            } => self
                .start_shift(opening_balance, outlet_id.as_deref())
                .map(CommandOutcome::Shift),
            Command::GetShiftSummary => self.shift_summary().map(CommandOutcome::ShiftSummary),
            Command::EndShift { actual_cash } => {
                self.end_shift(actual_cash).map(CommandOutcome::ShiftClosed)
            }

            Command::AdjustStock {
                product_id,
                outlet_id,
                change,
                adjustment_type,
                reason,
            } => {
                let level =
                    self.adjust_stock(&product_id, &outlet_id, change, adjustment_type, &reason)?;
                Ok(CommandOutcome::StockLevel { product_id, level })
            }
            Command::SavePurchaseOrder(draft) => self
                .save_purchase_order(draft)
                .map(CommandOutcome::PurchaseOrder),
            Command::SendPurchaseOrder { id } => self
                .send_purchase_order(&id)
                .map(CommandOutcome::PurchaseOrder),
            Command::CancelPurchaseOrder { id } => self
                .cancel_purchase_order(&id)
                .map(CommandOutcome::PurchaseOrder),
            Command::ReceivePurchaseOrder { id, lines } => self
                .receive_purchase_order(&id, &lines)
                .map(CommandOutcome::PurchaseOrder),
            Command::DeletePurchaseOrder { id } => {
                self.delete_purchase_order(&id)?;
                Ok(CommandOutcome::Deleted { id })
            }

            Command::RecordCashflow(entry) => {
                self.record_cashflow(entry).map(CommandOutcome::Cashflow)
            }
            Command::SummarizeCashflow(query) => self
                .summarize_cashflow(&query)
                .map(CommandOutcome::CashflowSummary),

            Command::SaveExpenseDue(item) => {
                self.save_expense_due(item).map(CommandOutcome::ExpenseDue)
            }
            Command::DeleteExpenseDue { id } => {
                self.delete_expense_due(&id)?;
                Ok(CommandOutcome::Deleted { id })
            }
            Command::MarkDuePaid { id } => self.mark_due_paid(&id).map(CommandOutcome::DuePaid),
        }
    }

    /// String in, JSON out: the form a UI bridge calls.
    pub fn dispatch_json(&mut self, command: &str) -> Result<serde_json::Value, ApiError> {
        let command: Command = serde_json::from_str(command)?;
        let outcome = self.dispatch(command)?;
        Ok(serde_json::to_value(outcome)?)
    }
}
