//! Shift open and close for the configured cashier.

use harbor_core::shift::{self, compute_shift_summary};
use harbor_core::{CoreError, Money, Shift, ShiftStatus, ShiftSummary};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AppState, StateResult};

/// A closed shift together with the figures it was closed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftClosure {
    pub shift: Shift,
    pub summary: ShiftSummary,
}

impl AppState {
    /// Opens a shift. Without an outlet id the first outlet is used.
    pub fn start_shift(
        &mut self,
        opening_balance: Money,
        outlet_id: Option<&str>,
    ) -> StateResult<Shift> {
        let cashier_id = self.config.cashier_id().to_string();
        let shift = shift::start_shift(
            &self.outlets,
            &self.shifts,
            &cashier_id,
            outlet_id,
            opening_balance,
            self.now(),
        )?;

        self.shifts.push(shift.clone());
        info!(
            shift_id = %shift.id,
            cashier_id = %shift.cashier_id,
            outlet_id = %shift.outlet_id,
            opening_balance = %shift.opening_balance,
            "Shift started"
        );
        Ok(shift)
    }

    /// Live figures for the cashier's open shift.
    pub fn shift_summary(&self) -> StateResult<ShiftSummary> {
        let shift = self.active_shift().ok_or(CoreError::NoActiveShift)?;
        Ok(compute_shift_summary(shift, &self.sales, self.cashflow.entries()))
    }

    /// Closes the cashier's open shift against the counted cash.
    pub fn end_shift(&mut self, actual_cash: Money) -> StateResult<ShiftClosure> {
        let index = self
            .shifts
            .iter()
            .position(|s| {
                s.status == ShiftStatus::Active
                    && s.cashier_id == self.config.session.cashier_id
            })
            .ok_or(CoreError::NoActiveShift)?;

        let summary = compute_shift_summary(&self.shifts[index], &self.sales, self.cashflow.entries());
        let now = self.now();
        let variance = shift::end_shift(&mut self.shifts[index], &summary, actual_cash, now)?;

        let shift = self.shifts[index].clone();
        info!(
            shift_id = %shift.id,
            expected_cash = %summary.expected_cash,
            actual_cash = %actual_cash,
            variance = %variance,
            sales = summary.sale_count,
            "Shift closed"
        );
        Ok(ShiftClosure { shift, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::FixedClock;
    use crate::PosConfig;
    use chrono::{Duration, TimeZone, Utc};
    use harbor_core::{CashflowType, NewCashflow, Outlet};
    use std::sync::Arc;

    fn outlet(id: &str) -> Outlet {
        Outlet {
            id: id.to_string(),
            name: format!("Outlet {}", id),
            address: None,
            contact_phone: None,
        }
    }

    fn state(clock: Arc<FixedClock>) -> AppState {
        let mut state = AppState::with_clock(PosConfig::default(), clock);
        state.save_outlet(outlet("o-2")).unwrap();
        state.save_outlet(outlet("o-1")).unwrap();
        state
    }

    #[test]
    fn test_start_needs_an_outlet() {
        let mut state = AppState::default();
        let err = state.start_shift(Money::zero(), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(state.shifts().is_empty());
    }

    #[test]
    fn test_start_defaults_to_first_outlet() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap()));
        let mut state = state(clock);

        // saves insert at the front, so o-1 is first
        let shift = state.start_shift(Money::from_cents(10000), None).unwrap();
        assert_eq!(shift.outlet_id, "o-1");
        assert_eq!(shift.cashier_id, "cashier-1");
        assert_eq!(state.active_shift().map(|s| s.id.as_str()), Some(shift.id.as_str()));
    }

    #[test]
    fn test_one_active_shift_per_cashier() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap()));
        let mut state = state(clock);
        state.start_shift(Money::zero(), Some("o-1")).unwrap();

        let err = state.start_shift(Money::zero(), Some("o-2")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(state.shifts().len(), 1);
    }

    #[test]
    fn test_end_shift_records_variance() {
        let start = Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(start));
        let mut state = state(clock.clone());
        state.start_shift(Money::from_cents(20000), Some("o-1")).unwrap();

        clock.advance(Duration::hours(1));
        state
            .record_cashflow(NewCashflow {
                outlet_id: "o-1".to_string(),
                cashflow_type: CashflowType::CashIn,
                amount: Money::from_cents(5000),
                source: "Float top-up".to_string(),
                notes: None,
                date_time: None,
            })
            .unwrap();
        assert_eq!(state.shift_summary().unwrap().expected_cash, Money::from_cents(25000));

        clock.advance(Duration::hours(7));
        let closure = state.end_shift(Money::from_cents(24000)).unwrap();

        assert_eq!(closure.shift.status, ShiftStatus::Closed);
        assert_eq!(closure.shift.end_time, Some(start + Duration::hours(8)));
        assert_eq!(closure.shift.closing_balance, Some(Money::from_cents(25000)));
        assert_eq!(closure.shift.variance, Some(Money::from_cents(-1000)));
        assert!(state.active_shift().is_none());
    }

    #[test]
    fn test_end_without_shift() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap()));
        let mut state = state(clock);
        assert_eq!(
            state.end_shift(Money::zero()).unwrap_err().code,
            ErrorCode::InvalidState
        );
        assert!(state.shift_summary().is_err());
    }

    #[test]
    fn test_negative_count_leaves_shift_open() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap()));
        let mut state = state(clock);
        state.start_shift(Money::zero(), None).unwrap();

        assert!(state.end_shift(Money::from_cents(-1)).is_err());
        assert!(state.active_shift().is_some());
    }
}
