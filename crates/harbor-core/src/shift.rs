//! # Shift Reconciliation
//!
//! Opening, summarising and closing a cashier's shift.
//!
//! ## Expected Cash
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  sales in shift      = same outlet ∧ same cashier ∧ date == start day   │
//! │  cashflow in shift   = same outlet ∧ start ≤ dateTime (≤ end if closed) │
//! │                                                                         │
//! │  cash/card/digital   = Σ sales by payment method id                     │
//! │  manual cash in      = Σ Cash In whose source does not start "Sale"     │
//! │  manual cash out     = Σ Cash Out                                       │
//! │                                                                         │
//! │  expected = opening + cash sales + manual in - manual out               │
//! │  variance = counted - expected                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale cash-in entries are excluded from manual cash in because the
//! same money is already counted through `cash_sales`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{
    CashflowTransaction, CashflowType, Outlet, SalesTransaction, Shift, ShiftStatus,
    PAYMENT_CARD, PAYMENT_CASH, PAYMENT_DIGITAL,
};
use crate::validation::validate_cash_count;

/// Source prefix of the automatic cash-in entry a cash sale writes.
pub const SALE_SOURCE_PREFIX: &str = "Sale";

/// Everything the end-of-shift screen shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSummary {
    pub sale_count: usize,
    pub total_sales: Money,
    pub cash_sales: Money,
    pub card_sales: Money,
    pub digital_sales: Money,
    pub manual_cash_in: Money,
    pub manual_cash_out: Money,
    pub opening_balance: Money,
    pub expected_cash: Money,
}

/// Opens a shift for a cashier.
///
/// `outlet_id` falls back to the first configured outlet.
///
/// ## Errors
/// - `NoOutlets` when no outlet is configured
/// - `MustNotBeNegative` for a negative opening balance
/// - `NotFound` for an unknown outlet
/// - `ShiftAlreadyActive` when the cashier has an open shift
pub fn start_shift(
    outlets: &[Outlet],
    shifts: &[Shift],
    cashier_id: &str,
    outlet_id: Option<&str>,
    opening_balance: Money,
    now: DateTime<Utc>,
) -> CoreResult<Shift> {
    let first = outlets.first().ok_or(ValidationError::NoOutlets)?;
    validate_cash_count("opening balance", opening_balance)?;

    let outlet = match outlet_id {
        Some(id) => outlets
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| CoreError::not_found("Outlet", id))?,
        None => first,
    };

    if let Some(open) = active_shift_for(shifts, cashier_id) {
        return Err(CoreError::ShiftAlreadyActive {
            cashier_id: cashier_id.to_string(),
            shift_id: open.id.clone(),
        });
    }

    Ok(Shift {
        id: Uuid::new_v4().to_string(),
        cashier_id: cashier_id.to_string(),
        outlet_id: outlet.id.clone(),
        start_time: now,
        opening_balance,
        end_time: None,
        closing_balance: None,
        actual_cash: None,
        variance: None,
        status: ShiftStatus::Active,
    })
}

/// The cashier's open shift, if any.
pub fn active_shift_for<'a>(shifts: &'a [Shift], cashier_id: &str) -> Option<&'a Shift> {
    shifts
        .iter()
        .find(|s| s.status == ShiftStatus::Active && s.cashier_id == cashier_id)
}

/// Sales are matched by day because they carry no time of day.
pub fn sale_in_shift(shift: &Shift, sale: &SalesTransaction) -> bool {
    sale.outlet_id == shift.outlet_id
        && sale.cashier_id == shift.cashier_id
        && sale.date == shift.start_time.date_naive()
}

pub fn cashflow_in_shift(shift: &Shift, entry: &CashflowTransaction) -> bool {
    entry.outlet_id == shift.outlet_id
        && entry.date_time >= shift.start_time
        && shift.end_time.map_or(true, |end| entry.date_time <= end)
}

/// Aggregates the shift's sales and cash movements.
pub fn compute_shift_summary(
    shift: &Shift,
    sales: &[SalesTransaction],
    cashflow: &[CashflowTransaction],
) -> ShiftSummary {
    let mut summary = ShiftSummary {
        opening_balance: shift.opening_balance,
        ..ShiftSummary::default()
    };

    for sale in sales.iter().filter(|s| sale_in_shift(shift, s)) {
        summary.sale_count += 1;
        summary.total_sales += sale.total_amount;
        match sale.payment_method.as_str() {
            PAYMENT_CASH => summary.cash_sales += sale.total_amount,
            PAYMENT_CARD => summary.card_sales += sale.total_amount,
            PAYMENT_DIGITAL => summary.digital_sales += sale.total_amount,
            _ => {}
        }
    }

    for entry in cashflow.iter().filter(|e| cashflow_in_shift(shift, e)) {
        match entry.cashflow_type {
            CashflowType::CashIn if !entry.source.starts_with(SALE_SOURCE_PREFIX) => {
                summary.manual_cash_in += entry.amount;
            }
            CashflowType::CashIn => {}
            CashflowType::CashOut => summary.manual_cash_out += entry.amount,
        }
    }

    summary.expected_cash = summary.opening_balance + summary.cash_sales
        + summary.manual_cash_in
        - summary.manual_cash_out;
    summary
}

/// Closes an Active shift against the counted cash.
///
/// Records `closing_balance = expected`, the count, and
/// `variance = actual - expected`. Returns the variance.
pub fn end_shift(
    shift: &mut Shift,
    summary: &ShiftSummary,
    actual_cash: Money,
    now: DateTime<Utc>,
) -> CoreResult<Money> {
    if shift.status != ShiftStatus::Active {
        return Err(CoreError::invalid_state("Shift", &shift.id, shift.status));
    }
    validate_cash_count("actual cash", actual_cash)?;

    let variance = actual_cash - summary.expected_cash;

    shift.end_time = Some(now);
    shift.closing_balance = Some(summary.expected_cash);
    shift.actual_cash = Some(actual_cash);
    shift.variance = Some(variance);
    shift.status = ShiftStatus::Closed;

    Ok(variance)
}
