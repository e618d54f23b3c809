//! Expenses and dues. Paying a due goes through the cashflow ledger, so
//! the shift that is open at the time sees it as a manual Cash Out.

use harbor_core::{CashflowTransaction, CoreError, ExpenseDue, ExpenseKind, ExpenseStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{id_or_new, remove_by_id, upsert_by_id, AppState, StateResult};

/// A paid due and the Cash Out it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuePayment {
    pub expense_due: ExpenseDue,
    pub cashflow: CashflowTransaction,
}

impl AppState {
    pub fn save_expense_due(&mut self, item: ExpenseDue) -> StateResult<ExpenseDue> {
        let mut item = item.normalized()?;
        self.require_outlet(&item.outlet_id)?;
        item.id = id_or_new(&item.id);

        if let Some(existing) = self.expenses_dues.iter().find(|e| e.id == item.id) {
            let reopening = existing.kind == ExpenseKind::Due
                && existing.status == ExpenseStatus::Paid
                && item.status == ExpenseStatus::Pending;
            if reopening {
                return Err(CoreError::invalid_state("Due", &item.id, existing.status).into());
            }
        }

        upsert_by_id(&mut self.expenses_dues, item.clone(), |e| &e.id);
        info!(
            expense_id = %item.id,
            kind = ?item.kind,
            status = %item.status,
            amount = %item.amount,
            "Expense/due saved"
        );
        Ok(item)
    }

    pub fn delete_expense_due(&mut self, id: &str) -> StateResult<()> {
        remove_by_id(&mut self.expenses_dues, "Expense/due", id, |e| &e.id)?;
        info!(expense_id = %id, "Expense/due deleted");
        Ok(())
    }

    /// Pays a Pending due in cash: Cash Out first, then Pending → Paid.
    pub fn mark_due_paid(&mut self, id: &str) -> StateResult<DuePayment> {
        let index = self
            .expenses_dues
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CoreError::not_found("Expense/due", id))?;

        self.expenses_dues[index].ensure_payable()?;
        let entry = self.expenses_dues[index].payment_entry();
        let cashflow = self.record_cashflow(entry)?;

        let due = &mut self.expenses_dues[index];
        due.mark_paid()?;
        info!(
            expense_id = %due.id,
            cashflow_id = %cashflow.id,
            amount = %due.amount,
            "Due paid"
        );

        Ok(DuePayment {
            expense_due: due.clone(),
            cashflow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::FixedClock;
    use crate::PosConfig;
    use chrono::{NaiveDate, TimeZone, Utc};
    use harbor_core::{CashflowType, ExpensePaymentMethod, Money, Outlet};
    use std::sync::Arc;

    fn seeded() -> AppState {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap();
        let mut state = AppState::with_clock(PosConfig::default(), Arc::new(FixedClock::new(now)));
        state
            .save_outlet(Outlet {
                id: "o-1".to_string(),
                name: "Main".to_string(),
                address: None,
                contact_phone: None,
            })
            .unwrap();
        state
    }

    fn pending_due(id: &str, cents: i64) -> ExpenseDue {
        ExpenseDue {
            id: id.to_string(),
            kind: ExpenseKind::Due,
            name: "Rent".to_string(),
            amount: Money::from_cents(cents),
            outlet_id: "o-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 31),
            status: ExpenseStatus::Pending,
            payment_method: None,
            notes: None,
        }
    }

    #[test]
    fn test_save_requires_outlet_and_upserts() {
        let mut state = seeded();
        let mut elsewhere = pending_due("", 1000);
        elsewhere.outlet_id = "o-9".to_string();
        assert_eq!(
            state.save_expense_due(elsewhere).unwrap_err().code,
            ErrorCode::NotFound
        );

        let saved = state.save_expense_due(pending_due("", 1000)).unwrap();
        assert!(!saved.id.is_empty());

        let mut edited = saved.clone();
        edited.amount = Money::from_cents(1500);
        state.save_expense_due(edited).unwrap();
        assert_eq!(state.expenses_dues().len(), 1);
        assert_eq!(state.expenses_dues()[0].amount, Money::from_cents(1500));

        state.delete_expense_due(&saved.id).unwrap();
        assert!(state.expenses_dues().is_empty());
        assert!(state.delete_expense_due(&saved.id).is_err());
    }

    #[test]
    fn test_mark_paid_records_cash_out_in_shift() {
        let mut state = seeded();
        state.start_shift(Money::from_cents(50000), None).unwrap();
        state.save_expense_due(pending_due("d-1", 20000)).unwrap();

        let payment = state.mark_due_paid("d-1").unwrap();
        assert_eq!(payment.expense_due.status, ExpenseStatus::Paid);
        assert_eq!(
            payment.expense_due.payment_method,
            Some(ExpensePaymentMethod::Cash)
        );
        assert_eq!(payment.cashflow.cashflow_type, CashflowType::CashOut);
        assert_eq!(payment.cashflow.source, "Due Payment: Rent");
        assert_eq!(payment.cashflow.user, "Admin");

        let summary = state.shift_summary().unwrap();
        assert_eq!(summary.manual_cash_out, Money::from_cents(20000));
        assert_eq!(summary.expected_cash, Money::from_cents(30000));
    }

    #[test]
    fn test_paid_due_cannot_be_paid_or_reopened() {
        let mut state = seeded();
        state.save_expense_due(pending_due("d-1", 20000)).unwrap();
        state.mark_due_paid("d-1").unwrap();

        let err = state.mark_due_paid("d-1").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(state.cashflow().len(), 1);

        let err = state.save_expense_due(pending_due("d-1", 20000)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(state.expenses_dues()[0].status, ExpenseStatus::Paid);

        assert_eq!(state.mark_due_paid("d-9").unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_expense_is_not_payable() {
        let mut state = seeded();
        let mut expense = pending_due("e-1", 800);
        expense.kind = ExpenseKind::Expense;
        expense.status = ExpenseStatus::Paid;
        state.save_expense_due(expense).unwrap();

        let err = state.mark_due_paid("e-1").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert!(state.cashflow().is_empty());
    }
}
