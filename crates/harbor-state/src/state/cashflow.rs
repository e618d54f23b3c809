//! Manual cash movements and the cash flow screen.

use harbor_core::cashflow::summarize;
use harbor_core::{CashflowQuery, CashflowSummary, CashflowTransaction, NewCashflow};
use tracing::info;

use super::{AppState, StateResult};

impl AppState {
    /// Records a manual Cash In / Cash Out by the session user.
    pub fn record_cashflow(&mut self, entry: NewCashflow) -> StateResult<CashflowTransaction> {
        self.require_outlet(&entry.outlet_id)?;

        let now = self.now();
        let user = self.config.session.user_name.clone();
        let recorded = self.cashflow.record(entry, &user, now)?;

        info!(
            cashflow_id = %recorded.id,
            outlet_id = %recorded.outlet_id,
            kind = ?recorded.cashflow_type,
            amount = %recorded.amount,
            source = %recorded.source,
            "Cashflow recorded"
        );
        Ok(recorded)
    }

    /// Period view with opening balance, totals and running balances.
    pub fn summarize_cashflow(&self, query: &CashflowQuery) -> StateResult<CashflowSummary> {
        if let Some(outlet_id) = &query.outlet_id {
            self.require_outlet(outlet_id)?;
        }
        Ok(summarize(self.cashflow.entries(), query, self.now()))
    }
}
