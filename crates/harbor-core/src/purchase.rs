//! # Purchase Orders
//!
//! Lifecycle rules and goods receipt for supplier orders.
//!
//! ## Status Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Draft ──send──► Sent ──receive──► Partially Received ──receive──┐     │
//! │     │               │                      │  ▲                   │     │
//! │     │  (edit,       │                      └──┘ receive           ▼     │
//! │     │   delete)     │                                         Received  │
//! │     │               │          Sent ──receive (all)──────────►         │
//! │     └───cancel──────┴──cancel──► Cancelled                             │
//! │                                                                         │
//! │   Received and Cancelled are terminal.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Receipt
//! The whole receipt is checked against the order and the catalog before
//! any quantity moves. After it applies, the order status is decided by
//! comparing total received with total ordered across every line.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::stock::apply_delta;
use crate::types::{
    Product, PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus, ReceivedLine,
};
use crate::validation::{validate_cash_count, validate_quantity};

const ENTITY: &str = "Purchase order";

impl PurchaseOrder {
    pub fn total_ordered(&self) -> i64 {
        self.items.iter().map(|l| l.quantity_ordered).sum()
    }

    pub fn total_received(&self) -> i64 {
        self.items.iter().map(|l| l.quantity_received).sum()
    }

    /// Σ cost × quantity ordered.
    pub fn total_cost(&self) -> Money {
        self.items.iter().map(|l| l.cost * l.quantity_ordered).sum()
    }

    /// Receipt is only possible once the order has gone to the supplier.
    pub fn can_receive(&self) -> bool {
        matches!(
            self.status,
            PurchaseOrderStatus::Sent | PurchaseOrderStatus::PartiallyReceived
        )
    }

    /// Fails unless the order is still a Draft (edit and delete use this).
    pub fn ensure_draft(&self) -> CoreResult<()> {
        if self.status != PurchaseOrderStatus::Draft {
            return Err(CoreError::invalid_state(ENTITY, &self.po_number, self.status));
        }
        Ok(())
    }

    /// Draft → Sent.
    pub fn send(&mut self) -> CoreResult<()> {
        self.ensure_draft()?;
        self.status = PurchaseOrderStatus::Sent;
        Ok(())
    }

    /// Draft | Sent → Cancelled.
    pub fn cancel(&mut self) -> CoreResult<()> {
        match self.status {
            PurchaseOrderStatus::Draft | PurchaseOrderStatus::Sent => {
                self.status = PurchaseOrderStatus::Cancelled;
                Ok(())
            }
            status => Err(CoreError::invalid_state(ENTITY, &self.po_number, status)),
        }
    }

    /// Status implied by the received quantities.
    ///
    /// Nothing received leaves the current status alone.
    pub fn status_from_quantities(&self) -> PurchaseOrderStatus {
        let received = self.total_received();
        if received == 0 {
            self.status
        } else if received >= self.total_ordered() {
            PurchaseOrderStatus::Received
        } else {
            PurchaseOrderStatus::PartiallyReceived
        }
    }
}

/// Checks the lines of a new or edited order.
///
/// ## Rules
/// - at least one line
/// - every line orders a positive quantity
/// - costs are not negative
/// - nothing is received yet
pub fn validate_order_lines(lines: &[PurchaseOrderLine]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        }
        .into());
    }

    for line in lines {
        validate_quantity("quantity ordered", line.quantity_ordered)?;
        validate_cash_count("cost", line.cost)?;
        if line.quantity_received != 0 {
            return Err(ValidationError::OutOfRange {
                field: "quantity received".to_string(),
                min: 0,
                max: 0,
            }
            .into());
        }
    }

    Ok(())
}

/// What a receipt changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptOutcome {
    /// The positive lines that were applied.
    pub applied: Vec<ReceivedLine>,
    pub status: PurchaseOrderStatus,
}

/// Receives goods against an order and books them into stock.
///
/// `products` is the catalog; each received product gets `+quantity` at
/// the order's outlet. On error neither the order nor the catalog change.
pub fn receive_purchase_order(
    order: &mut PurchaseOrder,
    products: &mut [Product],
    received: &[ReceivedLine],
) -> CoreResult<ReceiptOutcome> {
    if !order.can_receive() {
        return Err(CoreError::invalid_state(ENTITY, &order.po_number, order.status));
    }

    // (line index, product index, quantity)
    let mut plan: Vec<(usize, usize, i64)> = Vec::new();

    for entry in received {
        if entry.quantity == 0 {
            continue;
        }
        validate_quantity("quantity received", entry.quantity)?;

        let line_index = order
            .items
            .iter()
            .position(|l| l.product_id == entry.product_id)
            .ok_or_else(|| CoreError::not_found("Purchase order line", &entry.product_id))?;

        let product_index = products
            .iter()
            .position(|p| p.id == entry.product_id)
            .ok_or_else(|| CoreError::not_found("Product", &entry.product_id))?;

        // the same product may appear twice in one receipt
        let already_planned: i64 = plan
            .iter()
            .filter(|(li, _, _)| *li == line_index)
            .map(|(_, _, q)| q)
            .sum();
        let remaining = order.items[line_index].remaining() - already_planned;
        if entry.quantity > remaining {
            return Err(CoreError::ExceedsOrdered {
                product_id: entry.product_id.clone(),
                requested: entry.quantity,
                remaining,
            });
        }

        plan.push((line_index, product_index, entry.quantity));
    }

    if plan.is_empty() {
        return Err(ValidationError::Required {
            field: "received quantity".to_string(),
        }
        .into());
    }

    let mut applied = Vec::with_capacity(plan.len());
    for (line_index, product_index, quantity) in plan {
        let line = &mut order.items[line_index];
        line.quantity_received += quantity;
        apply_delta(&mut products[product_index], &order.outlet_id, quantity);
        applied.push(ReceivedLine {
            product_id: line.product_id.clone(),
            quantity,
        });
    }

    order.status = order.status_from_quantities();

    Ok(ReceiptOutcome {
        applied,
        status: order.status,
    })
}
