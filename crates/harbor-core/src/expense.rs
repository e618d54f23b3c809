//! # Expenses & Dues
//!
//! Money the outlet spends (expenses) or owes (dues). Paying a due takes
//! cash out of the drawer, so it becomes a Cash Out entry in the
//! cashflow ledger.
//!
//! ## Due Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Expense ───────────────────────────────────────────► Paid (always)    │
//! │                                                                         │
//! │   Due ──► Pending ──── markDuePaid ────► Paid                           │
//! │                            │                                            │
//! │                            └──► Cash Out "Due Payment: <name>"          │
//! │                                                                         │
//! │   Paid dues cannot be paid again or reopened.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cashflow::NewCashflow;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::CashflowType;
use crate::validation::{validate_positive_amount, validate_required};

/// Cashflow source prefix of a due payment.
pub const DUE_PAYMENT_SOURCE_PREFIX: &str = "Due Payment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ExpenseKind {
    Expense,
    Due,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ExpenseStatus {
    Paid,
    #[default]
    Pending,
}

impl std::fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpenseStatus::Paid => write!(f, "Paid"),
            ExpenseStatus::Pending => write!(f, "Pending"),
        }
    }
}

/// How an expense or due was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ExpensePaymentMethod {
    Cash,
    Card,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    #[serde(rename = "Mobile Money")]
    MobileMoney,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDue {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ExpenseKind,
    pub name: String,
    pub amount: Money,
    pub outlet_id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Dues only.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ExpenseStatus,
    #[serde(default)]
    pub payment_method: Option<ExpensePaymentMethod>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ExpenseDue {
    /// Checks and tidies a record before it is stored.
    ///
    /// ## Rules
    /// - name is required, amount must be positive
    /// - an expense is already spent, so it must be Paid
    /// - only dues carry a due date
    pub fn normalized(mut self) -> CoreResult<ExpenseDue> {
        self.name = validate_required("name", &self.name)?.to_string();
        validate_positive_amount("amount", self.amount)?;

        if self.kind == ExpenseKind::Expense {
            if self.status != ExpenseStatus::Paid {
                return Err(ValidationError::InvalidFormat {
                    field: "status".to_string(),
                    reason: "expenses are recorded as Paid".to_string(),
                }
                .into());
            }
            self.due_date = None;
        }

        self.notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(self)
    }

    pub fn is_pending_due(&self) -> bool {
        self.kind == ExpenseKind::Due && self.status == ExpenseStatus::Pending
    }

    /// Fails unless this is a Pending due.
    pub fn ensure_payable(&self) -> CoreResult<()> {
        if self.is_pending_due() {
            Ok(())
        } else {
            let entity = match self.kind {
                ExpenseKind::Expense => "Expense",
                ExpenseKind::Due => "Due",
            };
            Err(CoreError::invalid_state(entity, &self.id, self.status))
        }
    }

    /// The drawer movement for paying this due in cash.
    pub fn payment_entry(&self) -> NewCashflow {
        NewCashflow {
            outlet_id: self.outlet_id.clone(),
            cashflow_type: CashflowType::CashOut,
            amount: self.amount,
            source: format!("{}: {}", DUE_PAYMENT_SOURCE_PREFIX, self.name),
            notes: self.notes.clone(),
            date_time: None,
        }
    }

    /// Pending → Paid in cash.
    pub fn mark_paid(&mut self) -> CoreResult<()> {
        self.ensure_payable()?;
        self.status = ExpenseStatus::Paid;
        self.payment_method = Some(ExpensePaymentMethod::Cash);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn due(status: ExpenseStatus) -> ExpenseDue {
        ExpenseDue {
            id: "e-1".to_string(),
            kind: ExpenseKind::Due,
            name: " Electricity ".to_string(),
            amount: Money::from_cents(12000),
            outlet_id: "o-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 15),
            status,
            payment_method: None,
            notes: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_normalized_trims_and_checks() {
        let stored = due(ExpenseStatus::Pending).normalized().unwrap();
        assert_eq!(stored.name, "Electricity");
        assert_eq!(stored.notes, None);
        assert!(stored.due_date.is_some());

        let mut free = due(ExpenseStatus::Pending);
        free.amount = Money::zero();
        assert!(free.normalized().is_err());
    }

    #[test]
    fn test_expense_must_be_paid() {
        let mut expense = due(ExpenseStatus::Pending);
        expense.kind = ExpenseKind::Expense;
        assert!(matches!(
            expense.clone().normalized(),
            Err(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));

        expense.status = ExpenseStatus::Paid;
        assert_eq!(expense.normalized().unwrap().due_date, None);
    }

    #[test]
    fn test_mark_paid_once() {
        let mut item = due(ExpenseStatus::Pending).normalized().unwrap();
        let entry = item.payment_entry();
        assert_eq!(entry.cashflow_type, CashflowType::CashOut);
        assert_eq!(entry.source, "Due Payment: Electricity");
        assert_eq!(entry.amount, Money::from_cents(12000));

        item.mark_paid().unwrap();
        assert_eq!(item.status, ExpenseStatus::Paid);
        assert_eq!(item.payment_method, Some(ExpensePaymentMethod::Cash));

        let err = item.mark_paid().unwrap_err();
        assert_eq!(err.to_string(), "Due e-1 is Paid, cannot perform operation");
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(due(ExpenseStatus::Pending)).unwrap();
        assert_eq!(json["type"], "Due");
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["dueDate"], "2024-05-15");
        assert_eq!(
            serde_json::to_string(&ExpensePaymentMethod::BankTransfer).unwrap(),
            "\"Bank Transfer\""
        );
    }
}
