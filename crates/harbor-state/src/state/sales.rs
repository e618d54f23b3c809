//! Cart handling and checkout.
//!
//! ## Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  validate ────────────────────────────────────────────  nothing changed │
//! │    cart not empty                                        on any error   │
//! │    cashier has an Active shift                                          │
//! │    every cart product exists                                            │
//! │    customer exists (when given)                                         │
//! │    payment method exists and is usable at the shift's outlet            │
//! │    total (cart + active taxes) is positive                              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  apply                                                                  │
//! │    1. stock -= qty for every line at the shift's outlet                 │
//! │    2. sale record, newest first                                         │
//! │    3. cash only: Cash In "Sale #<id>" by the system user                │
//! │    4. cart cleared                                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use harbor_core::cart::validate_cart_lines;
use harbor_core::shift::SALE_SOURCE_PREFIX;
use harbor_core::validation::validate_positive_amount;
use harbor_core::{
    stock, Cart, CartItem, CartTotals, CashflowType, CoreError, NewCashflow, SaleLine,
    SalesTransaction, ValidationError, PAYMENT_CASH,
};
use tracing::{debug, info};

use super::{AppState, StateResult};
use crate::error::ApiError;

impl AppState {
    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds a product to the cart, merging with an existing line.
    pub fn add_to_cart(&mut self, product_id: &str, quantity: i64) -> StateResult<&Cart> {
        let product = self
            .products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| ApiError::from(CoreError::not_found("Product", product_id)))?;

        self.cart.add_item(product, quantity)?;
        debug!(product_id = %product_id, quantity, lines = self.cart.item_count(), "Added to cart");
        Ok(&self.cart)
    }

    /// A quantity of zero or less removes the line.
    pub fn update_cart_quantity(&mut self, product_id: &str, quantity: i64) -> StateResult<&Cart> {
        self.cart.update_quantity(product_id, quantity)?;
        Ok(&self.cart)
    }

    pub fn remove_from_cart(&mut self, product_id: &str) -> StateResult<&Cart> {
        self.cart.remove_item(product_id)?;
        Ok(&self.cart)
    }

    pub fn clear_cart(&mut self) -> &Cart {
        self.cart.clear();
        &self.cart
    }

    /// Totals for the current cart under the active tax rules.
    pub fn cart_totals(&self) -> StateResult<CartTotals> {
        Ok(self.cart.totals(&self.active_taxes())?)
    }

    /// Totals for an arbitrary list of lines under the active tax rules.
    ///
    /// The lines get the cart's quantity limits before the engine runs.
    pub fn compute_cart_totals(&self, items: &[CartItem]) -> StateResult<CartTotals> {
        validate_cart_lines(items)?;
        Ok(harbor_core::tax::compute_cart_totals(
            items,
            &self.active_taxes(),
        )?)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Turns the cart into a sale.
    ///
    /// All checks run before the first mutation, so the stock decrement,
    /// the sale record and the cash entry land together or not at all.
    pub fn complete_sale(
        &mut self,
        customer_id: Option<&str>,
        payment_method: &str,
    ) -> StateResult<SalesTransaction> {
        if self.cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }

        let shift = self.active_shift().ok_or(CoreError::NoActiveShift)?;
        let outlet_id = shift.outlet_id.clone();
        let cashier_id = shift.cashier_id.clone();

        for item in &self.cart.items {
            self.require_product(&item.product_id)?;
        }

        let customer_id = customer_id.map(str::trim).filter(|c| !c.is_empty());
        if let Some(id) = customer_id {
            if !self.customers.iter().any(|c| c.id == id) {
                return Err(CoreError::not_found("Customer", id).into());
            }
        }

        let method = self.require_payment_method(payment_method)?;
        if !method.is_available_at(&outlet_id) {
            return Err(ApiError::validation(format!(
                "Payment method {} is not available at outlet {}",
                method.name, outlet_id
            )));
        }

        let total = self.cart_totals()?.total.rounded();
        validate_positive_amount("sale total", total)?;

        let lines: Vec<SaleLine> = self.cart.items.iter().map(CartItem::to_sale_line).collect();
        let now = self.now();
        let sale = SalesTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            outlet_id: outlet_id.clone(),
            date: now.date_naive(),
            total_amount: total,
            payment_method: payment_method.to_string(),
            cashier_id,
            customer_id: customer_id.map(str::to_string),
            items: lines,
        };

        stock::apply_sale(&mut self.products, &outlet_id, &sale.items)?;
        self.sales.insert(0, sale.clone());

        if sale.payment_method == PAYMENT_CASH {
            let entry = NewCashflow {
                outlet_id: outlet_id.clone(),
                cashflow_type: CashflowType::CashIn,
                amount: sale.total_amount,
                source: format!("{} #{}", SALE_SOURCE_PREFIX, sale.id),
                notes: None,
                date_time: Some(now),
            };
            let user = self.config.session.system_user.clone();
            self.cashflow.record(entry, &user, now)?;
        }

        self.cart.clear();
        self.warn_if_low_stock(sale.items.iter().map(|l| l.product_id.as_str()), &outlet_id);

        info!(
            sale_id = %sale.id,
            outlet_id = %sale.outlet_id,
            total = %sale.total_amount,
            payment_method = %sale.payment_method,
            lines = sale.items.len(),
            "Sale completed"
        );
        Ok(sale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use harbor_core::{
        Customer, Money, Outlet, PaymentMethod, Product, RecordStatus, StockLevel, Tax,
        TaxApplyTo, TaxRate, TaxType, PAYMENT_CARD,
    };
    use rust_decimal_macros::dec;

    fn seeded() -> AppState {
        let mut state = AppState::default();
        state
            .save_outlet(Outlet {
                id: "o-1".to_string(),
                name: "Main".to_string(),
                address: None,
                contact_phone: None,
            })
            .unwrap();
        state
            .save_product(Product {
                id: "p-1".to_string(),
                name: "Cola 500ml".to_string(),
                sku: "BEV-001".to_string(),
                barcode: None,
                price: Money::from_cents(1000),
                cost: Money::from_cents(600),
                category_id: "4".to_string(),
                stock_levels: vec![StockLevel {
                    outlet_id: "o-1".to_string(),
                    quantity: 10,
                }],
                low_stock_threshold: 2,
            })
            .unwrap();
        state
            .save_tax(Tax {
                id: "vat".to_string(),
                name: "VAT".to_string(),
                rate: TaxRate::from_percent(dec!(10)),
                tax_type: TaxType::Exclusive,
                apply_to: TaxApplyTo::All,
                category_ids: vec![],
                status: RecordStatus::Active,
            })
            .unwrap();
        for id in [PAYMENT_CASH, PAYMENT_CARD] {
            state
                .save_payment_method(PaymentMethod {
                    id: id.to_string(),
                    name: id.to_uppercase(),
                    status: RecordStatus::Active,
                    outlet_ids: vec!["o-1".to_string()],
                })
                .unwrap();
        }
        state
    }

    #[test]
    fn test_add_to_cart_unknown_product() {
        let mut state = seeded();
        let err = state.add_to_cart("p-9", 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_cart_totals_use_active_taxes() {
        let mut state = seeded();
        state.add_to_cart("p-1", 2).unwrap();

        let totals = state.cart_totals().unwrap();
        assert_eq!(totals.subtotal, Money::from_cents(2000));
        assert_eq!(totals.tax_breakdown["VAT (10%)"], Money::from_cents(200));
        assert_eq!(totals.total, Money::from_cents(2200));
    }

    #[test]
    fn test_cart_quantity_updates() {
        let mut state = seeded();
        state.add_to_cart("p-1", 2).unwrap();
        assert_eq!(state.update_cart_quantity("p-1", 5).unwrap().total_quantity(), 5);
        assert!(state.update_cart_quantity("p-1", 0).unwrap().is_empty());
        assert!(state.remove_from_cart("p-1").is_err());
    }

    #[test]
    fn test_checkout_requires_cart_and_shift() {
        let mut state = seeded();
        let err = state.complete_sale(None, PAYMENT_CASH).unwrap_err();
        assert_eq!(err.message, "Cannot checkout with an empty cart");

        state.add_to_cart("p-1", 1).unwrap();
        let err = state.complete_sale(None, PAYMENT_CASH).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(state.cart().item_count(), 1);
    }

    #[test]
    fn test_cash_sale_applies_every_effect() {
        let mut state = seeded();
        state.start_shift(Money::from_cents(50000), None).unwrap();
        state.add_to_cart("p-1", 3).unwrap();

        let sale = state.complete_sale(None, PAYMENT_CASH).unwrap();

        assert_eq!(sale.total_amount, Money::from_cents(3300));
        assert_eq!(sale.items[0].price, Money::from_cents(1000));
        assert_eq!(state.sales().len(), 1);
        assert_eq!(state.product("p-1").unwrap().quantity_at("o-1"), 7);
        assert!(state.cart().is_empty());

        let entry = &state.cashflow().entries()[0];
        assert_eq!(entry.source, format!("Sale #{}", sale.id));
        assert_eq!(entry.amount, Money::from_cents(3300));
        assert_eq!(entry.user, "System");
    }

    #[test]
    fn test_card_sale_has_no_cash_entry() {
        let mut state = seeded();
        state.start_shift(Money::zero(), None).unwrap();
        state.add_to_cart("p-1", 1).unwrap();

        state.complete_sale(None, PAYMENT_CARD).unwrap();
        assert!(state.cashflow().is_empty());
        assert_eq!(state.product("p-1").unwrap().quantity_at("o-1"), 9);
    }

    #[test]
    fn test_failed_checkout_changes_nothing() {
        let mut state = seeded();
        state.start_shift(Money::zero(), None).unwrap();
        state.add_to_cart("p-1", 2).unwrap();

        let err = state.complete_sale(Some("c-404"), PAYMENT_CASH).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = state.complete_sale(None, "voucher").unwrap_err();
        assert_eq!(err.message, "Payment method not found: voucher");

        state.delete_product("p-1").unwrap();
        assert!(state.complete_sale(None, PAYMENT_CASH).is_err());

        assert!(state.sales().is_empty());
        assert!(state.cashflow().is_empty());
        assert_eq!(state.cart().item_count(), 1);
    }

    #[test]
    fn test_sale_records_customer() {
        let mut state = seeded();
        state
            .save_customer(Customer {
                id: "c-1".to_string(),
                name: "Neo".to_string(),
                email: String::new(),
                phone: String::new(),
                loyalty_points: 0,
                total_purchases: Money::zero(),
                last_purchase_date: None,
                status: RecordStatus::Active,
                outlet_ids: vec![],
            })
            .unwrap();
        state.start_shift(Money::zero(), None).unwrap();
        state.add_to_cart("p-1", 1).unwrap();

        let sale = state.complete_sale(Some("c-1"), PAYMENT_CARD).unwrap();
        assert_eq!(sale.customer_id.as_deref(), Some("c-1"));
    }

    #[test]
    fn test_payment_method_must_be_usable_at_outlet() {
        let mut state = seeded();
        state
            .save_payment_method(PaymentMethod {
                id: "digital".to_string(),
                name: "Mobile Money".to_string(),
                status: RecordStatus::Inactive,
                outlet_ids: vec!["o-1".to_string()],
            })
            .unwrap();
        state.start_shift(Money::zero(), None).unwrap();
        state.add_to_cart("p-1", 1).unwrap();

        let err = state.complete_sale(None, "digital").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(state.sales().is_empty());
    }
}
