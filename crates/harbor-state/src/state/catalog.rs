//! Catalog and settings: outlets, categories, products, customers,
//! suppliers, taxes and payment methods.
//!
//! Saves are upserts keyed by id; a blank id gets a fresh one.

use std::collections::HashSet;

use harbor_core::validation::{
    validate_positive_amount, validate_product_name, validate_required, validate_sku,
    validate_tax_rate,
};
use harbor_core::{
    Category, CoreError, Customer, Outlet, PaymentMethod, Product, Supplier, Tax, ValidationError,
};
use tracing::{debug, info, warn};

use super::{id_or_new, remove_by_id, upsert_by_id, AppState, StateResult};
use crate::error::ApiError;

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppState {
    // =========================================================================
    // Outlets
    // =========================================================================

    pub fn save_outlet(&mut self, mut outlet: Outlet) -> StateResult<Outlet> {
        outlet.name = validate_required("name", &outlet.name)?.to_string();
        outlet.id = id_or_new(&outlet.id);
        outlet.address = blank_to_none(outlet.address);
        outlet.contact_phone = blank_to_none(outlet.contact_phone);

        upsert_by_id(&mut self.outlets, outlet.clone(), |o| &o.id);
        info!(outlet_id = %outlet.id, name = %outlet.name, "Outlet saved");
        Ok(outlet)
    }

    /// Rejected while a shift is open at the outlet.
    pub fn delete_outlet(&mut self, id: &str) -> StateResult<()> {
        self.require_outlet(id)?;
        if self.has_active_shift_at(id) {
            return Err(ApiError::invalid_state(format!(
                "Outlet {} has an active shift, end it before deleting the outlet",
                id
            )));
        }

        remove_by_id(&mut self.outlets, "Outlet", id, |o| &o.id)?;
        info!(outlet_id = %id, "Outlet deleted");
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn save_category(&mut self, mut category: Category) -> StateResult<Category> {
        category.name = validate_required("name", &category.name)?.to_string();
        category.id = id_or_new(&category.id);

        upsert_by_id(&mut self.categories, category.clone(), |c| &c.id);
        info!(category_id = %category.id, name = %category.name, "Category saved");
        Ok(category)
    }

    pub fn delete_category(&mut self, id: &str) -> StateResult<()> {
        remove_by_id(&mut self.categories, "Category", id, |c| &c.id)?;
        info!(category_id = %id, "Category deleted");
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Creates or replaces a product.
    ///
    /// ## Rules
    /// - name and SKU pass the field validators
    /// - SKU is unique; barcode too when present
    /// - price and cost are positive, threshold is not negative
    /// - stock levels name existing outlets, one entry per outlet
    pub fn save_product(&mut self, mut product: Product) -> StateResult<Product> {
        validate_product_name(&product.name)?;
        validate_sku(&product.sku)?;
        product.name = product.name.trim().to_string();
        product.sku = product.sku.trim().to_string();
        product.barcode = blank_to_none(product.barcode);
        product.id = id_or_new(&product.id);

        validate_positive_amount("price", product.price)?;
        validate_positive_amount("cost", product.cost)?;
        if product.low_stock_threshold < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "low stock threshold".to_string(),
            }
            .into());
        }

        let others = self.products.iter().filter(|p| p.id != product.id);
        for other in others {
            if other.sku.eq_ignore_ascii_case(&product.sku) {
                return Err(ValidationError::Duplicate {
                    field: "sku".to_string(),
                    value: product.sku,
                }
                .into());
            }
            if let (Some(ours), Some(theirs)) = (&product.barcode, &other.barcode) {
                if ours == theirs {
                    return Err(ValidationError::Duplicate {
                        field: "barcode".to_string(),
                        value: ours.clone(),
                    }
                    .into());
                }
            }
        }

        // Opening stock is taken once; after that quantities move only
        // through the stock ledger.
        match self.products.iter().find(|p| p.id == product.id) {
            Some(existing) => {
                if existing.stock_levels != product.stock_levels {
                    debug!(product_id = %product.id, "Ignoring stock levels on product update");
                }
                product.stock_levels = existing.stock_levels.clone();
            }
            None => {
                let mut seen = HashSet::new();
                for level in &product.stock_levels {
                    self.require_outlet(&level.outlet_id)?;
                    if !seen.insert(level.outlet_id.as_str()) {
                        return Err(ValidationError::Duplicate {
                            field: "stock level outlet".to_string(),
                            value: level.outlet_id.clone(),
                        }
                        .into());
                    }
                }
            }
        }

        upsert_by_id(&mut self.products, product.clone(), |p| &p.id);
        info!(product_id = %product.id, sku = %product.sku, "Product saved");
        Ok(product)
    }

    pub fn delete_product(&mut self, id: &str) -> StateResult<()> {
        remove_by_id(&mut self.products, "Product", id, |p| &p.id)?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    // =========================================================================
    // Customers & Suppliers
    // =========================================================================

    pub fn save_customer(&mut self, mut customer: Customer) -> StateResult<Customer> {
        customer.name = validate_required("name", &customer.name)?.to_string();
        customer.id = id_or_new(&customer.id);
        for outlet_id in &customer.outlet_ids {
            self.require_outlet(outlet_id)?;
        }

        upsert_by_id(&mut self.customers, customer.clone(), |c| &c.id);
        info!(customer_id = %customer.id, "Customer saved");
        Ok(customer)
    }

    pub fn delete_customer(&mut self, id: &str) -> StateResult<()> {
        remove_by_id(&mut self.customers, "Customer", id, |c| &c.id)?;
        info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    pub fn save_supplier(&mut self, mut supplier: Supplier) -> StateResult<Supplier> {
        supplier.name = validate_required("name", &supplier.name)?.to_string();
        supplier.id = id_or_new(&supplier.id);

        upsert_by_id(&mut self.suppliers, supplier.clone(), |s| &s.id);
        info!(supplier_id = %supplier.id, name = %supplier.name, "Supplier saved");
        Ok(supplier)
    }

    pub fn delete_supplier(&mut self, id: &str) -> StateResult<()> {
        remove_by_id(&mut self.suppliers, "Supplier", id, |s| &s.id)?;
        info!(supplier_id = %id, "Supplier deleted");
        Ok(())
    }

    // =========================================================================
    // Taxes & Payment Methods
    // =========================================================================

    /// A category-scoped rule with no categories is kept but never matches.
    pub fn save_tax(&mut self, mut tax: Tax) -> StateResult<Tax> {
        tax.name = validate_required("name", &tax.name)?.to_string();
        validate_tax_rate(tax.rate)?;
        tax.id = id_or_new(&tax.id);

        if tax.has_no_effect() {
            warn!(tax_id = %tax.id, name = %tax.name, "Tax applies to categories but lists none; it will have no effect");
        }

        upsert_by_id(&mut self.taxes, tax.clone(), |t| &t.id);
        info!(tax_id = %tax.id, label = %tax.label(), "Tax saved");
        Ok(tax)
    }

    pub fn delete_tax(&mut self, id: &str) -> StateResult<()> {
        remove_by_id(&mut self.taxes, "Tax", id, |t| &t.id)?;
        info!(tax_id = %id, "Tax deleted");
        Ok(())
    }

    /// Active rules, the set checkout and cart totals use.
    pub fn active_taxes(&self) -> Vec<Tax> {
        self.taxes.iter().filter(|t| t.is_active()).cloned().collect()
    }

    /// Payment method ids are chosen by the user (`cash`, `card`, ...).
    pub fn save_payment_method(&mut self, mut method: PaymentMethod) -> StateResult<PaymentMethod> {
        method.id = validate_required("id", &method.id)?.to_string();
        method.name = validate_required("name", &method.name)?.to_string();
        for outlet_id in &method.outlet_ids {
            self.require_outlet(outlet_id)?;
        }

        upsert_by_id(&mut self.payment_methods, method.clone(), |m| &m.id);
        info!(payment_method = %method.id, "Payment method saved");
        Ok(method)
    }

    pub fn delete_payment_method(&mut self, id: &str) -> StateResult<()> {
        remove_by_id(&mut self.payment_methods, "Payment method", id, |m| &m.id)?;
        info!(payment_method = %id, "Payment method deleted");
        Ok(())
    }

    pub(super) fn require_payment_method(&self, id: &str) -> StateResult<&PaymentMethod> {
        self.payment_methods
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| CoreError::not_found("Payment method", id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use harbor_core::{
        Money, RecordStatus, StockAdjustmentType, StockLevel, TaxApplyTo, TaxRate, TaxType,
    };
    use rust_decimal_macros::dec;

    fn outlet(id: &str) -> Outlet {
        Outlet {
            id: id.to_string(),
            name: format!("Outlet {}", id),
            address: Some("  ".to_string()),
            contact_phone: None,
        }
    }

    fn product(id: &str, sku: &str) -> Product {
        Product {
            id: id.to_string(),
            name: "Sparkling Water".to_string(),
            sku: sku.to_string(),
            barcode: None,
            price: Money::from_cents(1000),
            cost: Money::from_cents(600),
            category_id: "4".to_string(),
            stock_levels: vec![],
            low_stock_threshold: 5,
        }
    }

    fn state_with_outlet() -> AppState {
        let mut state = AppState::default();
        state.save_outlet(outlet("o-1")).unwrap();
        state
    }

    #[test]
    fn test_save_outlet_generates_id_and_trims() {
        let mut state = AppState::default();
        let saved = state
            .save_outlet(Outlet {
                id: String::new(),
                name: "  Main Street ".to_string(),
                address: Some(" ".to_string()),
                contact_phone: None,
            })
            .unwrap();

        assert!(!saved.id.is_empty());
        assert_eq!(saved.name, "Main Street");
        assert_eq!(saved.address, None);
        assert_eq!(state.outlets().len(), 1);
    }

    #[test]
    fn test_save_product_upserts() {
        let mut state = state_with_outlet();
        state.save_product(product("p-1", "BEV-001")).unwrap();

        let mut renamed = product("p-1", "BEV-001");
        renamed.name = "Still Water".to_string();
        state.save_product(renamed).unwrap();

        assert_eq!(state.products().len(), 1);
        assert_eq!(state.products()[0].name, "Still Water");
    }

    #[test]
    fn test_duplicate_sku_rejected() {
        let mut state = state_with_outlet();
        state.save_product(product("p-1", "BEV-001")).unwrap();

        let err = state.save_product(product("p-2", "bev-001")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "sku 'bev-001' already exists");
    }

    #[test]
    fn test_duplicate_barcode_rejected() {
        let mut state = state_with_outlet();
        let mut first = product("p-1", "BEV-001");
        first.barcode = Some("6001234".to_string());
        state.save_product(first).unwrap();

        let mut second = product("p-2", "BEV-002");
        second.barcode = Some("6001234".to_string());
        assert!(state.save_product(second).is_err());

        let mut blank = product("p-3", "BEV-003");
        blank.barcode = Some(String::new());
        assert_eq!(state.save_product(blank).unwrap().barcode, None);
    }

    #[test]
    fn test_product_price_and_cost_positive() {
        let mut state = state_with_outlet();

        let mut free = product("p-1", "BEV-001");
        free.price = Money::zero();
        assert_eq!(
            state.save_product(free).unwrap_err().message,
            "price must be positive"
        );

        let mut no_cost = product("p-1", "BEV-001");
        no_cost.cost = Money::from_cents(-1);
        assert!(state.save_product(no_cost).is_err());
        assert!(state.products().is_empty());
    }

    #[test]
    fn test_product_stock_levels_checked() {
        let mut state = state_with_outlet();

        let mut unknown = product("p-1", "BEV-001");
        unknown.stock_levels = vec![StockLevel {
            outlet_id: "o-9".to_string(),
            quantity: 3,
        }];
        assert_eq!(state.save_product(unknown).unwrap_err().code, ErrorCode::NotFound);

        let mut twice = product("p-1", "BEV-001");
        let level = StockLevel {
            outlet_id: "o-1".to_string(),
            quantity: 3,
        };
        twice.stock_levels = vec![level.clone(), level];
        assert_eq!(
            state.save_product(twice).unwrap_err().code,
            ErrorCode::ValidationError
        );
    }

    #[test]
    fn test_product_update_keeps_ledger_stock() {
        let mut state = state_with_outlet();
        let mut created = product("p-1", "BEV-001");
        created.stock_levels = vec![StockLevel {
            outlet_id: "o-1".to_string(),
            quantity: 10,
        }];
        state.save_product(created.clone()).unwrap();
        state
            .adjust_stock("p-1", "o-1", 5, StockAdjustmentType::Received, "Delivery")
            .unwrap();

        // A stale edit form still carries the opening quantity.
        let mut renamed = created;
        renamed.name = "Still Water".to_string();
        let saved = state.save_product(renamed).unwrap();

        assert_eq!(saved.stock_levels[0].quantity, 15);
        let stored = state.product("p-1").unwrap();
        assert_eq!(stored.name, "Still Water");
        assert_eq!(stored.quantity_at("o-1"), 15);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let mut state = AppState::default();
        let err = state.delete_product("p-404").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: p-404");

        assert!(state.delete_supplier("s-1").is_err());
        assert!(state.delete_tax("t-1").is_err());
    }

    #[test]
    fn test_delete_outlet_with_active_shift() {
        let mut state = state_with_outlet();
        state.start_shift(Money::from_cents(10000), None).unwrap();

        let err = state.delete_outlet("o-1").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(state.outlets().len(), 1);
    }

    #[test]
    fn test_save_tax_validates_rate() {
        let mut state = AppState::default();
        let mut tax = Tax {
            id: "vat".to_string(),
            name: "VAT".to_string(),
            rate: TaxRate::from_percent(dec!(120)),
            tax_type: TaxType::Exclusive,
            apply_to: TaxApplyTo::All,
            category_ids: vec![],
            status: RecordStatus::Active,
        };
        assert!(state.save_tax(tax.clone()).is_err());

        tax.rate = TaxRate::from_percent(dec!(12));
        tax.apply_to = TaxApplyTo::Categories;
        let saved = state.save_tax(tax.clone()).unwrap();
        assert!(saved.has_no_effect());

        tax.id = "levy".to_string();
        tax.status = RecordStatus::Inactive;
        state.save_tax(tax).unwrap();
        assert_eq!(state.active_taxes().len(), 1);
    }

    #[test]
    fn test_payment_method_outlets_exist() {
        let mut state = state_with_outlet();
        let method = PaymentMethod {
            id: "cash".to_string(),
            name: "Cash".to_string(),
            status: RecordStatus::Active,
            outlet_ids: vec!["o-1".to_string(), "o-2".to_string()],
        };
        assert_eq!(
            state.save_payment_method(method.clone()).unwrap_err().code,
            ErrorCode::NotFound
        );

        let method = PaymentMethod {
            outlet_ids: vec!["o-1".to_string()],
            ..method
        };
        state.save_payment_method(method).unwrap();
        assert!(state.require_payment_method("cash").is_ok());
    }
}
