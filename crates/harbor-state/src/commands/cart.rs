//! # Cart Commands
//!
//! Cart manipulation. Every handler answers with the whole cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│ Completed│       │
//! │  │  Cart    │     │          │     │  Method  │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   addToCart         completeSale                       │
//! │                   updateCartQuantity (empties the cart)                │
//! │                   removeFromCart                                        │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clearCart ───────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use harbor_core::{CartItem, CartTotals};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CommandOutcome, CommandResult};
use crate::error::ApiError;
use crate::state::AppState;

/// Cart response including items and totals.
///
/// Totals are rounded for display; the stored sale total is computed
/// from the unrounded figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

impl TryFrom<&AppState> for CartResponse {
    type Error = ApiError;

    fn try_from(state: &AppState) -> Result<Self, Self::Error> {
        Ok(CartResponse {
            items: state.cart().items.clone(),
            totals: state.cart_totals()?.rounded(),
        })
    }
}

fn respond(state: &AppState) -> CommandResult {
    CartResponse::try_from(state).map(CommandOutcome::Cart)
}

pub(super) fn get_cart(state: &AppState) -> CommandResult {
    debug!("get_cart command");
    respond(state)
}

/// Quantity defaults to 1.
pub(super) fn add_to_cart(
    state: &mut AppState,
    product_id: &str,
    quantity: Option<i64>,
) -> CommandResult {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity = %quantity, "add_to_cart command");

    state.add_to_cart(product_id, quantity)?;
    respond(state)
}

/// Quantity 0 removes the item.
pub(super) fn update_cart_quantity(
    state: &mut AppState,
    product_id: &str,
    quantity: i64,
) -> CommandResult {
    debug!(product_id = %product_id, quantity = %quantity, "update_cart_quantity command");

    state.update_cart_quantity(product_id, quantity)?;
    respond(state)
}

pub(super) fn remove_from_cart(state: &mut AppState, product_id: &str) -> CommandResult {
    debug!(product_id = %product_id, "remove_from_cart command");

    state.remove_from_cart(product_id)?;
    respond(state)
}

pub(super) fn clear_cart(state: &mut AppState) -> CommandResult {
    debug!("clear_cart command");

    state.clear_cart();
    respond(state)
}
