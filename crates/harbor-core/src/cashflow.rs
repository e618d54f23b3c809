//! # Cashflow Ledger
//!
//! Append-only record of cash entering and leaving the drawer, with
//! running balances for a filtered period.
//!
//! ## Period View
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  all entries ──► outlet filter ──► split by period                      │
//! │                                      │                                  │
//! │          ┌───────────────────────────┼───────────────────────┐          │
//! │          ▼                           ▼                       ▼          │
//! │    before start               start ≤ t ≤ end            after end      │
//! │    Σ signed = opening         type filter ──► rows        (ignored)     │
//! │                                      │                                  │
//! │                  oldest → newest fold: balance += ±amount               │
//! │                                      │                                  │
//! │                  shown newest first, balances unchanged                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The opening balance is always derived, never entered.

use chrono::{DateTime, Days, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{CashflowTransaction, CashflowType};
use crate::validation::{validate_positive_amount, validate_required};

// =============================================================================
// Ledger
// =============================================================================

/// A cash movement before the ledger has given it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewCashflow {
    pub outlet_id: String,
    #[serde(rename = "type")]
    pub cashflow_type: CashflowType,
    pub amount: Money,
    pub source: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Defaults to the time of recording.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub date_time: Option<DateTime<Utc>>,
}

/// The ledger. Entries are kept newest-first by `date_time` and never edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashflowLedger {
    entries: Vec<CashflowTransaction>,
}

impl CashflowLedger {
    pub fn new() -> Self {
        CashflowLedger::default()
    }

    /// Validates and appends an entry, returning the stored copy.
    ///
    /// ## Rules
    /// - amount must be positive (direction comes from the type)
    /// - source must not be blank
    pub fn record(
        &mut self,
        entry: NewCashflow,
        user: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<CashflowTransaction> {
        validate_positive_amount("amount", entry.amount)?;
        let source = validate_required("source", &entry.source)?.to_string();

        let transaction = CashflowTransaction {
            id: Uuid::new_v4().to_string(),
            outlet_id: entry.outlet_id,
            date_time: entry.date_time.unwrap_or(now),
            cashflow_type: entry.cashflow_type,
            source,
            amount: entry.amount,
            notes: entry.notes.filter(|n| !n.trim().is_empty()),
            user: user.to_string(),
        };

        // Newest first by `date_time`; a backdated entry lands among its
        // peers, and ties put the latest recording in front.
        let index = self
            .entries
            .iter()
            .position(|e| e.date_time <= transaction.date_time)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, transaction.clone());
        Ok(transaction)
    }

    /// Newest first by `date_time`.
    pub fn entries(&self) -> &[CashflowTransaction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Signed sum of every entry at an outlet (all time).
    pub fn balance_at(&self, outlet_id: &str) -> Money {
        self.entries
            .iter()
            .filter(|e| e.outlet_id == outlet_id)
            .map(CashflowTransaction::signed_amount)
            .sum()
    }
}

// =============================================================================
// Running Balance
// =============================================================================

/// Display order of a running-balance listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum BalanceOrder {
    OldestFirst,
    #[default]
    NewestFirst,
}

/// A ledger entry annotated with the balance just after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    #[serde(flatten)]
    pub transaction: CashflowTransaction,
    pub running_balance: Money,
}

/// Folds entries oldest to newest from `opening`, then lists them in `order`.
///
/// Input order does not matter; entries are sorted by `date_time` first
/// (ties keep their input order).
pub fn running_balance(
    transactions: &[CashflowTransaction],
    opening: Money,
    order: BalanceOrder,
) -> Vec<LedgerRow> {
    let mut chronological: Vec<&CashflowTransaction> = transactions.iter().collect();
    chronological.sort_by_key(|t| t.date_time);

    let mut balance = opening;
    let mut rows: Vec<LedgerRow> = chronological
        .into_iter()
        .map(|t| {
            balance += t.signed_amount();
            LedgerRow {
                transaction: t.clone(),
                running_balance: balance,
            }
        })
        .collect();

    if order == BalanceOrder::NewestFirst {
        rows.reverse();
    }
    rows
}

/// Signed sum of every entry strictly before `start`.
pub fn opening_balance_before(transactions: &[CashflowTransaction], start: DateTime<Utc>) -> Money {
    transactions
        .iter()
        .filter(|t| t.date_time < start)
        .map(CashflowTransaction::signed_amount)
        .sum()
}

// =============================================================================
// Period Summary
// =============================================================================

/// Reporting period, resolved against a reference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum DateRange {
    Today,
    Yesterday,
    #[default]
    #[serde(rename = "last7days")]
    Last7Days,
    #[serde(rename = "last30days")]
    Last30Days,
    All,
}

/// A resolved reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// `true` when `end` itself falls outside the window.
    pub end_exclusive: bool,
}

impl Period {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if at < self.start {
            return false;
        }
        if self.end_exclusive {
            at < self.end
        } else {
            at <= self.end
        }
    }
}

impl DateRange {
    /// The window in UTC, or `None` for `All`.
    ///
    /// ```text
    /// Today       [00:00 today          .. now]
    /// Yesterday   [00:00 yesterday      .. 00:00 today)
    /// Last7Days   [00:00 six days ago   .. now]
    /// Last30Days  [00:00 29 days ago    .. now]
    /// ```
    pub fn bounds(&self, now: DateTime<Utc>) -> Option<Period> {
        let today = now.date_naive();
        let midnight = |days_back: u64| {
            today
                .checked_sub_days(Days::new(days_back))
                .unwrap_or(today)
                .and_time(NaiveTime::MIN)
                .and_utc()
        };
        let until_now = |start| Period {
            start,
            end: now,
            end_exclusive: false,
        };

        match self {
            DateRange::Today => Some(until_now(midnight(0))),
            DateRange::Yesterday => Some(Period {
                start: midnight(1),
                end: midnight(0),
                end_exclusive: true,
            }),
            DateRange::Last7Days => Some(until_now(midnight(6))),
            DateRange::Last30Days => Some(until_now(midnight(29))),
            DateRange::All => None,
        }
    }
}

/// Which entry types to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum TypeFilter {
    #[default]
    All,
    #[serde(rename = "Cash In")]
    CashIn,
    #[serde(rename = "Cash Out")]
    CashOut,
}

impl TypeFilter {
    fn matches(&self, kind: CashflowType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::CashIn => kind == CashflowType::CashIn,
            TypeFilter::CashOut => kind == CashflowType::CashOut,
        }
    }
}

/// Filters for [`summarize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashflowQuery {
    /// `None` means every outlet.
    #[serde(default)]
    pub outlet_id: Option<String>,
    #[serde(default)]
    pub range: DateRange,
    #[serde(default)]
    pub type_filter: TypeFilter,
}

/// The cash flow screen in one value.
///
/// `closing_balance == opening_balance + net_flow`, and when rows exist
/// the newest row's running balance equals `closing_balance`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashflowSummary {
    pub opening_balance: Money,
    pub total_in: Money,
    pub total_out: Money,
    pub net_flow: Money,
    pub closing_balance: Money,
    /// Newest first.
    pub rows: Vec<LedgerRow>,
}

/// Builds the period view for a query.
///
/// The type filter narrows the rows and totals but not the opening
/// balance, which always counts both directions.
pub fn summarize(
    transactions: &[CashflowTransaction],
    query: &CashflowQuery,
    now: DateTime<Utc>,
) -> CashflowSummary {
    let at_outlet: Vec<CashflowTransaction> = transactions
        .iter()
        .filter(|t| query.outlet_id.as_deref().map_or(true, |o| t.outlet_id == o))
        .cloned()
        .collect();

    let (in_period, opening_balance): (Vec<CashflowTransaction>, Money) =
        match query.range.bounds(now) {
            Some(period) => (
                at_outlet
                    .iter()
                    .filter(|t| period.contains(t.date_time))
                    .cloned()
                    .collect(),
                opening_balance_before(&at_outlet, period.start),
            ),
            None => (at_outlet, Money::zero()),
        };

    let shown: Vec<CashflowTransaction> = in_period
        .into_iter()
        .filter(|t| query.type_filter.matches(t.cashflow_type))
        .collect();

    let mut total_in = Money::zero();
    let mut total_out = Money::zero();
    for t in &shown {
        match t.cashflow_type {
            CashflowType::CashIn => total_in += t.amount,
            CashflowType::CashOut => total_out += t.amount,
        }
    }
    let net_flow = total_in - total_out;

    CashflowSummary {
        opening_balance,
        total_in,
        total_out,
        net_flow,
        closing_balance: opening_balance + net_flow,
        rows: running_balance(&shown, opening_balance, BalanceOrder::NewestFirst),
    }
}
