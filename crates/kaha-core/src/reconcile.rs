//! # Reconciliation
//!
//! Expected-vs-counted comparison for a closing drawer.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  server case == NO_SALE ─────────────────────────────► NO_SALE          │
//! │                                                                         │
//! │  variance = (counted cash + counted online) − expected total            │
//! │                                                                         │
//! │  variance <  −₱0.01 ─────────────────────────────────► SHORTED          │
//! │  variance ≥  −₱0.01 ─────────────────────────────────► SALE             │
//! │                                                                         │
//! │  expected ₱1000.00, counted ₱999.98 → −0.02 → SHORTED                  │
//! │  expected ₱1000.00, counted ₱999.99 → −0.01 → SALE                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is stored: callers re-derive on every change to the counts
//! or the expected balances.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ClosingCase, ExpectedBalances};

/// Variance tolerated before a closing counts as short.
pub const SHORTAGE_TOLERANCE: Money = Money::from_cents(1);

/// Counted minus expected.
pub fn variance(counted_total: Money, expected_total: Money) -> Money {
    counted_total - expected_total
}

/// Refines the backend's baseline case from the counted amounts.
pub fn classify_closing_case(
    server_case: ClosingCase,
    counted_cash: Money,
    counted_online: Money,
    expected_total: Money,
) -> ClosingCase {
    if server_case == ClosingCase::NoSale {
        return ClosingCase::NoSale;
    }

    if variance(counted_cash + counted_online, expected_total) < -SHORTAGE_TOLERANCE {
        ClosingCase::Shorted
    } else {
        ClosingCase::Sale
    }
}

/// Convenience wrapper taking the backend response directly.
pub fn classify_against(
    expected: &ExpectedBalances,
    counted_cash: Money,
    counted_online: Money,
) -> ClosingCase {
    classify_closing_case(expected.case, counted_cash, counted_online, expected.total())
}

/// Payload of the shortage confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShortageNotice {
    pub expected_cash: Money,
    pub counted_cash: Money,
    /// `max(0, expected_cash − counted_cash)`
    pub shortfall: Money,
}

impl ShortageNotice {
    pub fn new(expected_cash: Money, counted_cash: Money) -> Self {
        ShortageNotice {
            expected_cash,
            counted_cash,
            shortfall: (expected_cash - counted_cash).clamp_non_negative(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pesos(cents: i64) -> Money {
        Money::from_cents(cents)
    }

    #[test]
    fn test_tolerance_boundary() {
        let expected = pesos(100_000);
        assert_eq!(
            classify_closing_case(ClosingCase::Sale, pesos(99_998), Money::zero(), expected),
            ClosingCase::Shorted
        );
        assert_eq!(
            classify_closing_case(ClosingCase::Sale, pesos(99_999), Money::zero(), expected),
            ClosingCase::Sale
        );
        assert_eq!(
            classify_closing_case(ClosingCase::Sale, pesos(100_050), Money::zero(), expected),
            ClosingCase::Sale
        );
    }

    #[test]
    fn test_online_amounts_count_toward_total() {
        let expected = pesos(130_000);
        assert_eq!(
            classify_closing_case(ClosingCase::Sale, pesos(100_000), pesos(30_000), expected),
            ClosingCase::Sale
        );
        assert_eq!(
            classify_closing_case(ClosingCase::Sale, pesos(100_000), pesos(29_000), expected),
            ClosingCase::Shorted
        );
    }

    #[test]
    fn test_no_sale_is_sticky() {
        assert_eq!(
            classify_closing_case(ClosingCase::NoSale, Money::zero(), Money::zero(), pesos(50_000)),
            ClosingCase::NoSale
        );
    }

    #[test]
    fn test_server_shorted_can_be_refined_to_sale() {
        assert_eq!(
            classify_closing_case(ClosingCase::Shorted, pesos(500), Money::zero(), pesos(500)),
            ClosingCase::Sale
        );
    }

    #[test]
    fn test_shortage_notice_clamps_shortfall() {
        let notice = ShortageNotice::new(pesos(130_000), pesos(120_000));
        assert_eq!(notice.shortfall, pesos(10_000));

        // The total can be short on the online side while cash is over.
        let notice = ShortageNotice::new(pesos(1_000), pesos(2_000));
        assert_eq!(notice.shortfall, Money::zero());
    }
}
