//! # Cart
//!
//! The in-progress sale: lines keyed by product, with prices frozen when
//! the product is added.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Front end action        Command                 Cart change            │
//! │  ────────────────        ───────                 ───────────            │
//! │                                                                         │
//! │  Tap product ──────────► addToCart ────────────► push or qty += n       │
//! │  Change quantity ──────► updateCartQuantity ───► qty = n (≤ 0 removes)  │
//! │  Remove ───────────────► removeFromCart ───────► drop line              │
//! │  Clear / checkout ─────► clearCart ────────────► empty                  │
//! │  View totals ──────────► (read) ───────────────► Tax Engine             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::tax::{compute_cart_totals, CartTotals};
use crate::types::{Product, SaleLine, Tax};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// One cart line.
///
/// `unit_price` and `category_id` are snapshots: later catalog edits do
/// not change a line already in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    pub category_id: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartItem {
    /// A bare line, without display fields.
    pub fn new(
        product_id: impl Into<String>,
        category_id: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        CartItem {
            product_id: product_id.into(),
            name: String::new(),
            sku: String::new(),
            category_id: category_id.into(),
            unit_price,
            quantity,
        }
    }

    /// Snapshots a catalog product into a line.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            category_id: product.category_id.clone(),
            unit_price: product.price,
            quantity,
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> CoreResult<Money> {
        self.unit_price
            .multiply_quantity(self.quantity)
            .ok_or_else(|| CoreError::overflow("line total"))
    }

    /// The line as recorded on a completed sale.
    pub fn to_sale_line(&self) -> SaleLine {
        SaleLine {
            product_id: self.product_id.clone(),
            quantity: self.quantity,
            price: self.unit_price,
        }
    }
}

/// Checks caller-supplied lines against the same limits the cart enforces.
pub fn validate_cart_lines(items: &[CartItem]) -> CoreResult<()> {
    if items.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }
    for item in items {
        validate_quantity("quantity", item.quantity)?;
        if item.quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: item.quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
    }
    Ok(())
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding again increases quantity)
/// - Every quantity is in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a product, or increases the quantity of its existing line.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity("quantity", quantity)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Sets a line's quantity. Zero or less removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::not_found("Cart item", product_id)),
        }
    }

    /// Removes a line by product id.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CoreError::not_found("Cart item", product_id))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Runs the tax engine over the current lines.
    pub fn totals(&self, taxes: &[Tax]) -> CoreResult<CartTotals> {
        compute_cart_totals(&self.items, taxes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RecordStatus, TaxApplyTo, TaxRate, TaxType};
    use rust_decimal_macros::dec;

    fn test_product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            sku: format!("SKU-{}", id),
            barcode: None,
            price: Money::from_cents(price_cents),
            cost: Money::from_cents(price_cents / 2),
            category_id: "1".to_string(),
            stock_levels: vec![],
            low_stock_threshold: 5,
        }
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("1", 999), 2).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.items[0].line_total().unwrap().cents(), 1998);
        assert_eq!(cart.items[0].sku, "SKU-1");
    }

    #[test]
    fn test_cart_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        let product = test_product("1", 999);

        cart.add_item(&product, 2).unwrap();
        cart.add_item(&product, 3).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_price_is_frozen_when_added() {
        let mut cart = Cart::new();
        let mut product = test_product("1", 1000);
        cart.add_item(&product, 1).unwrap();

        product.price = Money::from_cents(2000);
        cart.add_item(&product, 1).unwrap();

        assert_eq!(cart.items[0].unit_price.cents(), 1000);
    }

    #[test]
    fn test_quantity_limits() {
        let mut cart = Cart::new();
        let product = test_product("1", 100);

        assert!(matches!(
            cart.add_item(&product, 0),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(
            cart.add_item(&product, 1000),
            Err(CoreError::QuantityTooLarge {
                requested: 1000,
                max: MAX_ITEM_QUANTITY
            })
        );

        cart.add_item(&product, 990).unwrap();
        assert!(matches!(
            cart.add_item(&product, 10),
            Err(CoreError::QuantityTooLarge { requested: 1000, .. })
        ));
        assert_eq!(cart.total_quantity(), 990);
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(&test_product(&i.to_string(), 100), 1).unwrap();
        }

        let err = cart.add_item(&test_product("extra", 100), 1).unwrap_err();
        assert_eq!(err, CoreError::CartTooLarge { max: MAX_CART_ITEMS });

        // existing lines can still grow
        cart.add_item(&test_product("0", 100), 1).unwrap();
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("1", 100), 1).unwrap();

        cart.update_quantity("1", 7).unwrap();
        assert_eq!(cart.total_quantity(), 7);

        cart.update_quantity("1", 0).unwrap();
        assert!(cart.is_empty());

        assert_eq!(
            cart.update_quantity("1", 3),
            Err(CoreError::not_found("Cart item", "1"))
        );
    }

    #[test]
    fn test_remove_missing_line() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.remove_item("nope"),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_cart_totals_and_clear() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("1", 1000), 2).unwrap();

        let taxes = vec![Tax {
            id: "t".to_string(),
            name: "Sales Tax".to_string(),
            rate: TaxRate::from_percent(dec!(10)),
            tax_type: TaxType::Exclusive,
            apply_to: TaxApplyTo::All,
            category_ids: vec![],
            status: RecordStatus::Active,
        }];

        assert_eq!(cart.totals(&taxes).unwrap().total.amount(), dec!(22.00));

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.totals(&taxes).unwrap().total.is_zero());
    }

    #[test]
    fn test_validate_cart_lines() {
        let line = |qty| CartItem::new("p-1", "1", Money::from_cents(100), qty);

        assert!(validate_cart_lines(&[line(1), line(MAX_ITEM_QUANTITY)]).is_ok());
        assert!(matches!(
            validate_cart_lines(&[line(i64::MAX)]),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert!(matches!(
            validate_cart_lines(&[line(0)]),
            Err(CoreError::Validation(_))
        ));

        let too_many: Vec<CartItem> = (0..=MAX_CART_ITEMS).map(|_| line(1)).collect();
        assert!(matches!(
            validate_cart_lines(&too_many),
            Err(CoreError::CartTooLarge { .. })
        ));
    }
}
