//! # Tax Engine
//!
//! Computes cart subtotal, per-rule tax breakdown and total.
//!
//! ## Rule Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each cart line:                                                    │
//! │                                                                         │
//! │   active rules (in list order) ──► first rule where                     │
//! │                                      applyTo = all, or                  │
//! │                                      applyTo = categories ∧ line ∈ ids  │
//! │        │                                                                │
//! │        ├── none ───────► subtotal += line, no tax                       │
//! │        │                                                                │
//! │        ├── inclusive ──► base = line / (1 + rate)                       │
//! │        │                 subtotal += base, tax += line - base           │
//! │        │                                                                │
//! │        └── exclusive ──► subtotal += line, tax += line × rate           │
//! │                                                                         │
//! │  First match wins: rules never stack on one line.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are accumulated unrounded; callers round for display.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartItem;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Tax, TaxType};

/// Result of running the tax engine over a cart.
///
/// ## Invariant
/// `total == subtotal + tax_breakdown.values().sum()`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Money,
    /// Keyed by rule label, e.g. `VAT (12%)`. A matched zero-rate rule
    /// still gets an entry (with amount zero).
    pub tax_breakdown: BTreeMap<String, Money>,
    pub total: Money,
}

impl CartTotals {
    /// Sum of every breakdown bucket.
    pub fn tax_total(&self) -> Money {
        self.tax_breakdown.values().sum()
    }

    /// A copy rounded to display precision, field by field.
    pub fn rounded(&self) -> CartTotals {
        CartTotals {
            subtotal: self.subtotal.rounded(),
            tax_breakdown: self
                .tax_breakdown
                .iter()
                .map(|(label, amount)| (label.clone(), amount.rounded()))
                .collect(),
            total: self.total.rounded(),
        }
    }
}

/// Finds the first active rule covering a line of this category.
pub fn applicable_tax<'a>(category_id: &str, taxes: &'a [Tax]) -> Option<&'a Tax> {
    taxes
        .iter()
        .filter(|t| t.is_active())
        .find(|t| t.applies_to(category_id))
}

/// Computes `{subtotal, tax_breakdown, total}` for a cart.
///
/// Inactive rules are ignored, so the full tax list can be passed.
/// Fails with [`CoreError::AmountOverflow`] when a line or sum leaves the
/// decimal range.
///
/// ## Example
/// ```rust
/// use harbor_core::cart::CartItem;
/// use harbor_core::money::Money;
/// use harbor_core::tax::compute_cart_totals;
/// use harbor_core::types::{RecordStatus, Tax, TaxApplyTo, TaxRate, TaxType};
/// use rust_decimal_macros::dec;
///
/// let items = vec![CartItem::new("p-1", "c-1", Money::from_cents(1000), 2)];
/// let taxes = vec![Tax {
///     id: "t-1".into(),
///     name: "Sales Tax".into(),
///     rate: TaxRate::from_percent(dec!(10)),
///     tax_type: TaxType::Exclusive,
///     apply_to: TaxApplyTo::All,
///     category_ids: vec![],
///     status: RecordStatus::Active,
/// }];
///
/// let totals = compute_cart_totals(&items, &taxes).unwrap();
/// assert_eq!(totals.subtotal.to_string(), "20.00");
/// assert_eq!(totals.total.to_string(), "22.00");
/// ```
pub fn compute_cart_totals(items: &[CartItem], taxes: &[Tax]) -> CoreResult<CartTotals> {
    let mut subtotal = Money::zero();
    let mut tax_breakdown: BTreeMap<String, Money> = BTreeMap::new();

    for item in items {
        let line_total = item.line_total()?;

        let Some(tax) = applicable_tax(&item.category_id, taxes) else {
            subtotal = accumulate(subtotal, line_total)?;
            continue;
        };

        let (base, tax_amount) = match tax.tax_type {
            TaxType::Inclusive => line_total.split_inclusive_tax(tax.rate),
            TaxType::Exclusive => {
                let tax_amount = line_total
                    .calculate_tax(tax.rate)
                    .ok_or_else(|| CoreError::overflow("tax"))?;
                (line_total, tax_amount)
            }
        };

        subtotal = accumulate(subtotal, base)?;
        let bucket = tax_breakdown.entry(tax.label()).or_default();
        *bucket = accumulate(*bucket, tax_amount)?;
    }

    let tax_total = tax_breakdown
        .values()
        .try_fold(Money::zero(), |acc, amount| accumulate(acc, *amount))?;
    Ok(CartTotals {
        subtotal,
        total: accumulate(subtotal, tax_total)?,
        tax_breakdown,
    })
}

fn accumulate(acc: Money, amount: Money) -> CoreResult<Money> {
    acc.checked_add(amount)
        .ok_or_else(|| CoreError::overflow("cart totals"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RecordStatus, TaxApplyTo, TaxRate};
    use rust_decimal_macros::dec;

    fn tax(id: &str, name: &str, pct: rust_decimal::Decimal, tax_type: TaxType) -> Tax {
        Tax {
            id: id.to_string(),
            name: name.to_string(),
            rate: TaxRate::from_percent(pct),
            tax_type,
            apply_to: TaxApplyTo::All,
            category_ids: vec![],
            status: RecordStatus::Active,
        }
    }

    fn for_categories(mut t: Tax, ids: &[&str]) -> Tax {
        t.apply_to = TaxApplyTo::Categories;
        t.category_ids = ids.iter().map(|s| s.to_string()).collect();
        t
    }

    #[test]
    fn test_empty_cart() {
        let taxes = [tax("t", "VAT", dec!(12), TaxType::Inclusive)];
        let totals = compute_cart_totals(&[], &taxes).unwrap();
        assert!(totals.subtotal.is_zero());
        assert!(totals.total.is_zero());
        assert!(totals.tax_breakdown.is_empty());
    }

    #[test]
    fn test_exclusive_rule_adds_on_top() {
        let items = vec![CartItem::new("p-1", "1", Money::from_cents(1000), 2)];
        let taxes = vec![tax("t", "Sales Tax", dec!(10), TaxType::Exclusive)];

        let totals = compute_cart_totals(&items, &taxes).unwrap();
        assert_eq!(totals.subtotal.amount(), dec!(20.00));
        assert_eq!(totals.tax_breakdown["Sales Tax (10%)"].amount(), dec!(2.00));
        assert_eq!(totals.total.amount(), dec!(22.00));
    }

    #[test]
    fn test_inclusive_rule_backs_out_base() {
        let items = vec![CartItem::new("p-1", "4", Money::from_cents(1120), 1)];
        let taxes = vec![tax("t", "VAT", dec!(12), TaxType::Inclusive)];

        let totals = compute_cart_totals(&items, &taxes).unwrap();
        assert_eq!(totals.subtotal.amount(), dec!(10.00));
        assert_eq!(totals.tax_breakdown["VAT (12%)"].amount(), dec!(1.20));
        assert_eq!(totals.total.amount(), dec!(11.20));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let items = vec![
            CartItem::new("bread", "bakery", Money::from_cents(1000), 1),
            CartItem::new("water", "drinks", Money::from_cents(500), 1),
        ];
        let taxes = vec![
            for_categories(tax("t-2", "Service Fee", dec!(5), TaxType::Exclusive), &["bakery"]),
            tax("t-1", "VAT", dec!(10), TaxType::Exclusive),
        ];

        let totals = compute_cart_totals(&items, &taxes).unwrap();
        // bread: service fee only; water: VAT only
        assert_eq!(totals.tax_breakdown["Service Fee (5%)"].amount(), dec!(0.50));
        assert_eq!(totals.tax_breakdown["VAT (10%)"].amount(), dec!(0.50));
        assert_eq!(totals.total.amount(), dec!(16.00));
    }

    #[test]
    fn test_inactive_and_empty_category_rules_are_skipped() {
        let mut inactive = tax("t-1", "Old VAT", dec!(15), TaxType::Exclusive);
        inactive.status = RecordStatus::Inactive;
        let no_effect = for_categories(tax("t-2", "Levy", dec!(3), TaxType::Exclusive), &[]);

        let items = vec![CartItem::new("p-1", "1", Money::from_cents(1000), 1)];
        let totals = compute_cart_totals(&items, &[inactive, no_effect]).unwrap();

        assert_eq!(totals.subtotal.amount(), dec!(10.00));
        assert_eq!(totals.total.amount(), dec!(10.00));
        assert!(totals.tax_breakdown.is_empty());
    }

    #[test]
    fn test_same_label_buckets_merge() {
        let items = vec![
            CartItem::new("a", "1", Money::from_cents(1000), 1),
            CartItem::new("b", "2", Money::from_cents(3000), 1),
        ];
        let taxes = vec![
            for_categories(tax("t-1", "VAT", dec!(10), TaxType::Exclusive), &["1"]),
            for_categories(tax("t-2", "VAT", dec!(10), TaxType::Exclusive), &["2"]),
        ];

        let totals = compute_cart_totals(&items, &taxes).unwrap();
        assert_eq!(totals.tax_breakdown.len(), 1);
        assert_eq!(totals.tax_breakdown["VAT (10%)"].amount(), dec!(4.00));
    }

    #[test]
    fn test_zero_rate_rule_keeps_empty_bucket() {
        let items = vec![CartItem::new("p-1", "1", Money::from_cents(1000), 1)];
        let taxes = vec![tax("t", "Zero Rated", dec!(0), TaxType::Exclusive)];

        let totals = compute_cart_totals(&items, &taxes).unwrap();
        assert_eq!(totals.tax_breakdown.len(), 1);
        assert!(totals.tax_breakdown["Zero Rated (0%)"].is_zero());
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn test_rounding_happens_once() {
        // Three lines of 0.10 inclusive at 12%: each tax is 0.0107..., which
        // rounds to 0.01, but the accumulated tax rounds to 0.03.
        let items = vec![
            CartItem::new("a", "1", Money::from_cents(10), 1),
            CartItem::new("b", "1", Money::from_cents(10), 1),
            CartItem::new("c", "1", Money::from_cents(10), 1),
        ];
        let taxes = vec![tax("t", "VAT", dec!(12), TaxType::Inclusive)];

        let totals = compute_cart_totals(&items, &taxes).unwrap().rounded();
        assert_eq!(totals.tax_breakdown["VAT (12%)"].to_string(), "0.03");
        assert_eq!(totals.total.to_string(), "0.30");
    }

    #[test]
    fn test_overflowing_line_is_an_error() {
        let items = vec![CartItem::new(
            "p-1",
            "1",
            Money::from_decimal(dec!(1000000000000)),
            i64::MAX,
        )];
        let taxes = vec![tax("t", "VAT", dec!(10), TaxType::Exclusive)];

        let err = compute_cart_totals(&items, &taxes).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { .. }));
    }

    #[test]
    fn test_overflowing_sum_is_an_error() {
        let max = Money::from_decimal(rust_decimal::Decimal::MAX);
        let items = vec![
            CartItem::new("a", "1", max, 1),
            CartItem::new("b", "1", max, 1),
        ];

        let err = compute_cart_totals(&items, &[]).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { .. }));
    }
}
