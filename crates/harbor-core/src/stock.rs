//! # Stock Ledger
//!
//! Applies quantity deltas to per-outlet stock records.
//!
//! ## Call Sites
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Sale completion ─────► change = -qty   at the shift's outlet           │
//! │  PO receipt ──────────► change = +qty   at the order's outlet           │
//! │  Manual adjustment ───► change = ±n     at the chosen outlet            │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │                     apply_delta(product, outlet, change)                │
//! │                                 │                                       │
//! │            level exists? ── no ─┴─► create at 0, then apply             │
//! │                                                                         │
//! │  quantity(product, outlet) = initial + Σ deltas   (no floor)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Outlet existence is the caller's concern: these functions only see the
//! product's own stock list.

use crate::error::{CoreError, CoreResult};
use crate::types::{Product, SaleLine, StockAdjustment, StockLevel};
use crate::validation::validate_adjustment_change;

/// Applies a signed change to the product's stock at an outlet.
///
/// Creates a zero-quantity level first when the outlet has none. Returns
/// the updated level.
///
/// ## Example
/// ```rust
/// # use harbor_core::money::Money;
/// # use harbor_core::types::Product;
/// use harbor_core::stock::apply_delta;
/// # let mut product = Product {
/// #     id: "p-1".into(), name: "Water".into(), sku: "W-1".into(), barcode: None,
/// #     price: Money::from_cents(500), cost: Money::from_cents(200),
/// #     category_id: "1".into(), stock_levels: vec![], low_stock_threshold: 5,
/// # };
///
/// assert_eq!(apply_delta(&mut product, "o-1", 25).quantity, 25);
/// assert_eq!(apply_delta(&mut product, "o-1", -30).quantity, -5);
/// ```
pub fn apply_delta(product: &mut Product, outlet_id: &str, change: i64) -> StockLevel {
    let index = match product
        .stock_levels
        .iter()
        .position(|sl| sl.outlet_id == outlet_id)
    {
        Some(index) => index,
        None => {
            product.stock_levels.push(StockLevel {
                outlet_id: outlet_id.to_string(),
                quantity: 0,
            });
            product.stock_levels.len() - 1
        }
    };

    let level = &mut product.stock_levels[index];
    level.quantity += change;
    level.clone()
}

/// Applies a manual adjustment to its product.
///
/// The adjustment's `product_id` must match `product`.
pub fn apply_adjustment(
    product: &mut Product,
    adjustment: &StockAdjustment,
) -> CoreResult<StockLevel> {
    validate_adjustment_change(adjustment.change)?;

    if product.id != adjustment.product_id {
        return Err(CoreError::not_found("Product", &adjustment.product_id));
    }

    Ok(apply_delta(product, &adjustment.outlet_id, adjustment.change))
}

/// Decrements stock for every sold line at the outlet.
///
/// Every product is looked up before any level changes, so a missing
/// product leaves the catalog untouched.
pub fn apply_sale(products: &mut [Product], outlet_id: &str, lines: &[SaleLine]) -> CoreResult<()> {
    let mut indices = Vec::with_capacity(lines.len());
    for line in lines {
        let index = products
            .iter()
            .position(|p| p.id == line.product_id)
            .ok_or_else(|| CoreError::not_found("Product", &line.product_id))?;
        indices.push(index);
    }

    for (line, index) in lines.iter().zip(indices) {
        apply_delta(&mut products[index], outlet_id, -line.quantity);
    }

    Ok(())
}
