//! Stock adjustments and purchase orders.

use chrono::{Datelike, NaiveDate};
use harbor_core::purchase::{receive_purchase_order, validate_order_lines};
use harbor_core::{
    stock, CoreError, Money, PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus, ReceivedLine,
    StockAdjustment, StockAdjustmentType, StockLevel,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{AppState, StateResult};
use crate::error::ApiError;

/// Purchase order as the edit form submits it.
///
/// Numbering, status, dates and line ids are assigned on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderDraft {
    /// Existing order to edit; absent for a new one.
    #[serde(default)]
    pub id: Option<String>,
    pub supplier_id: String,
    pub outlet_id: String,
    #[serde(default)]
    pub expected_delivery: Option<NaiveDate>,
    pub items: Vec<PurchaseOrderLineDraft>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderLineDraft {
    pub product_id: String,
    pub quantity_ordered: i64,
    pub cost: Money,
}

impl AppState {
    // =========================================================================
    // Stock Adjustments
    // =========================================================================

    /// Applies a signed manual change to one product at one outlet.
    ///
    /// The session user is recorded as the author.
    pub fn adjust_stock(
        &mut self,
        product_id: &str,
        outlet_id: &str,
        change: i64,
        adjustment_type: StockAdjustmentType,
        reason: &str,
    ) -> StateResult<StockLevel> {
        self.require_outlet(outlet_id)?;
        let index = self
            .products
            .iter()
            .position(|p| p.id == product_id)
            .ok_or_else(|| ApiError::from(CoreError::not_found("Product", product_id)))?;

        let adjustment = StockAdjustment {
            product_id: product_id.to_string(),
            outlet_id: outlet_id.to_string(),
            change,
            adjustment_type,
            reason: reason.trim().to_string(),
            user: self.config.session.user_name.clone(),
            date: self.now(),
        };
        let level = stock::apply_adjustment(&mut self.products[index], &adjustment)?;

        info!(
            product_id = %adjustment.product_id,
            outlet_id = %adjustment.outlet_id,
            change = adjustment.change,
            kind = %adjustment.adjustment_type,
            user = %adjustment.user,
            quantity = level.quantity,
            "Stock adjusted"
        );
        self.warn_if_low_stock([product_id], outlet_id);
        Ok(level)
    }

    // =========================================================================
    // Purchase Orders
    // =========================================================================

    /// Creates a Draft order, or replaces the contents of an existing Draft.
    pub fn save_purchase_order(&mut self, draft: PurchaseOrderDraft) -> StateResult<PurchaseOrder> {
        if !self.suppliers.iter().any(|s| s.id == draft.supplier_id) {
            return Err(CoreError::not_found("Supplier", &draft.supplier_id).into());
        }
        self.require_outlet(&draft.outlet_id)?;
        for line in &draft.items {
            self.require_product(&line.product_id)?;
        }

        let items: Vec<PurchaseOrderLine> = draft
            .items
            .into_iter()
            .map(|line| PurchaseOrderLine {
                id: Uuid::new_v4().to_string(),
                product_id: line.product_id,
                quantity_ordered: line.quantity_ordered,
                quantity_received: 0,
                cost: line.cost,
            })
            .collect();
        validate_order_lines(&items)?;

        let notes = draft.notes.filter(|n| !n.trim().is_empty());
        let existing = draft
            .id
            .as_deref()
            .and_then(|id| self.purchase_orders.iter().position(|po| po.id == id));

        let order = match existing {
            Some(index) => {
                let order = &mut self.purchase_orders[index];
                order.ensure_draft()?;
                order.supplier_id = draft.supplier_id;
                order.outlet_id = draft.outlet_id;
                order.expected_delivery = draft.expected_delivery;
                order.items = items;
                order.notes = notes;
                order.clone()
            }
            None => {
                let today = self.now().date_naive();
                let order = PurchaseOrder {
                    id: draft
                        .id
                        .filter(|id| !id.trim().is_empty())
                        .unwrap_or_else(|| Uuid::new_v4().to_string()),
                    po_number: self.next_po_number(today.year()),
                    supplier_id: draft.supplier_id,
                    outlet_id: draft.outlet_id,
                    date_created: today,
                    expected_delivery: draft.expected_delivery,
                    status: PurchaseOrderStatus::Draft,
                    items,
                    notes,
                };
                self.purchase_orders.insert(0, order.clone());
                order
            }
        };

        info!(
            po_number = %order.po_number,
            supplier_id = %order.supplier_id,
            lines = order.items.len(),
            total_cost = %order.total_cost(),
            "Purchase order saved"
        );
        Ok(order)
    }

    /// `PO-<year>-<n>`, one past the highest number used that year.
    fn next_po_number(&self, year: i32) -> String {
        let prefix = format!("PO-{}-", year);
        let last = self
            .purchase_orders
            .iter()
            .filter_map(|po| po.po_number.strip_prefix(&prefix))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("{}{:03}", prefix, last + 1)
    }

    fn purchase_order_mut(&mut self, id: &str) -> StateResult<&mut PurchaseOrder> {
        self.purchase_orders
            .iter_mut()
            .find(|po| po.id == id)
            .ok_or_else(|| CoreError::not_found("Purchase order", id).into())
    }

    pub fn send_purchase_order(&mut self, id: &str) -> StateResult<PurchaseOrder> {
        let order = self.purchase_order_mut(id)?;
        order.send()?;
        info!(po_number = %order.po_number, "Purchase order sent");
        Ok(order.clone())
    }

    pub fn cancel_purchase_order(&mut self, id: &str) -> StateResult<PurchaseOrder> {
        let order = self.purchase_order_mut(id)?;
        order.cancel()?;
        info!(po_number = %order.po_number, "Purchase order cancelled");
        Ok(order.clone())
    }

    /// Books received goods into stock at the order's outlet.
    pub fn receive_purchase_order(
        &mut self,
        id: &str,
        received: &[ReceivedLine],
    ) -> StateResult<PurchaseOrder> {
        let index = self
            .purchase_orders
            .iter()
            .position(|po| po.id == id)
            .ok_or_else(|| ApiError::from(CoreError::not_found("Purchase order", id)))?;

        let order = &mut self.purchase_orders[index];
        let outcome = receive_purchase_order(order, &mut self.products, received)?;
        let order = order.clone();

        info!(
            po_number = %order.po_number,
            status = %outcome.status,
            received = outcome.applied.iter().map(|l| l.quantity).sum::<i64>(),
            outstanding = order.total_ordered() - order.total_received(),
            "Purchase order received"
        );
        Ok(order)
    }

    /// Only Draft orders can be deleted.
    pub fn delete_purchase_order(&mut self, id: &str) -> StateResult<()> {
        let index = self
            .purchase_orders
            .iter()
            .position(|po| po.id == id)
            .ok_or_else(|| ApiError::from(CoreError::not_found("Purchase order", id)))?;
        self.purchase_orders[index].ensure_draft()?;

        let order = self.purchase_orders.remove(index);
        info!(po_number = %order.po_number, "Purchase order deleted");
        Ok(())
    }
}
