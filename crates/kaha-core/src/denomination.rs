//! # Denominations
//!
//! The fixed set of peso bills and coins an operator counts, and the
//! per-dialog tally of how many of each are in the drawer.
//!
//! ## Counting Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator input           DenominationCount          Cash total         │
//! │  ──────────────           ─────────────────          ──────────         │
//! │  ₱500 × 2       ───────►  bill_500: 2       ──┐                         │
//! │  ₱100 × 3       ───────►  bill_100: 3       ──┼──►  Σ count × face      │
//! │  ₱0.25 × -1     ───────►  coin_0_25: 0 (clamped)                        │
//! │                                               └──►  ₱1300.00            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;

/// A bill or coin face value.
///
/// Variant order is the display order (largest first); the serde names are
/// the keys the backend expects in `opening_bills` / `closing_bills`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Denomination {
    #[serde(rename = "bill_1000")]
    Bill1000,
    #[serde(rename = "bill_500")]
    Bill500,
    #[serde(rename = "bill_200")]
    Bill200,
    #[serde(rename = "bill_100")]
    Bill100,
    #[serde(rename = "bill_50")]
    Bill50,
    #[serde(rename = "bill_20")]
    Bill20,
    #[serde(rename = "coin_20")]
    Coin20,
    #[serde(rename = "coin_10")]
    Coin10,
    #[serde(rename = "coin_5")]
    Coin5,
    #[serde(rename = "coin_1")]
    Coin1,
    #[serde(rename = "coin_0_25")]
    Coin0_25,
    #[serde(rename = "coin_0_10")]
    Coin0_10,
    #[serde(rename = "coin_0_05")]
    Coin0_05,
    #[serde(rename = "coin_0_01")]
    Coin0_01,
}

impl Denomination {
    /// Every denomination, largest face value first.
    pub const ALL: [Denomination; 14] = [
        Denomination::Bill1000,
        Denomination::Bill500,
        Denomination::Bill200,
        Denomination::Bill100,
        Denomination::Bill50,
        Denomination::Bill20,
        Denomination::Coin20,
        Denomination::Coin10,
        Denomination::Coin5,
        Denomination::Coin1,
        Denomination::Coin0_25,
        Denomination::Coin0_10,
        Denomination::Coin0_05,
        Denomination::Coin0_01,
    ];

    /// Face value of one piece.
    pub const fn face_value(&self) -> Money {
        let cents = match self {
            Denomination::Bill1000 => 100_000,
            Denomination::Bill500 => 50_000,
            Denomination::Bill200 => 20_000,
            Denomination::Bill100 => 10_000,
            Denomination::Bill50 => 5_000,
            Denomination::Bill20 | Denomination::Coin20 => 2_000,
            Denomination::Coin10 => 1_000,
            Denomination::Coin5 => 500,
            Denomination::Coin1 => 100,
            Denomination::Coin0_25 => 25,
            Denomination::Coin0_10 => 10,
            Denomination::Coin0_05 => 5,
            Denomination::Coin0_01 => 1,
        };
        Money::from_cents(cents)
    }

    /// Wire key, e.g. `bill_500`.
    pub const fn key(&self) -> &'static str {
        match self {
            Denomination::Bill1000 => "bill_1000",
            Denomination::Bill500 => "bill_500",
            Denomination::Bill200 => "bill_200",
            Denomination::Bill100 => "bill_100",
            Denomination::Bill50 => "bill_50",
            Denomination::Bill20 => "bill_20",
            Denomination::Coin20 => "coin_20",
            Denomination::Coin10 => "coin_10",
            Denomination::Coin5 => "coin_5",
            Denomination::Coin1 => "coin_1",
            Denomination::Coin0_25 => "coin_0_25",
            Denomination::Coin0_10 => "coin_0_10",
            Denomination::Coin0_05 => "coin_0_05",
            Denomination::Coin0_01 => "coin_0_01",
        }
    }

    /// Looks a denomination up by its wire key.
    pub fn from_key(key: &str) -> Option<Denomination> {
        Denomination::ALL.into_iter().find(|d| d.key() == key)
    }

    pub const fn is_bill(&self) -> bool {
        matches!(
            self,
            Denomination::Bill1000
                | Denomination::Bill500
                | Denomination::Bill200
                | Denomination::Bill100
                | Denomination::Bill50
                | Denomination::Bill20
        )
    }
}

impl std::fmt::Display for Denomination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-denomination piece counts for one dialog session.
///
/// ## Invariants
/// - Every count is ≥ 0 (negative input clamps to zero)
/// - Direct entry above `u32::MAX` is rejected, never truncated
/// - `total()` is always Σ count × face value and therefore ≥ 0
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DenominationCount {
    counts: BTreeMap<Denomination, u32>,
}

impl DenominationCount {
    /// An all-zero tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count for a denomination (zero when never touched).
    pub fn get(&self, denomination: Denomination) -> u32 {
        self.counts.get(&denomination).copied().unwrap_or(0)
    }

    /// Sets a count from direct entry; negative values clamp to zero.
    ///
    /// Counts that do not fit in a `u32` are rejected and the previous
    /// count is kept.
    pub fn set(&mut self, denomination: Denomination, count: i64) -> ValidationResult<()> {
        let count = u32::try_from(count.max(0)).map_err(|_| ValidationError::InvalidFormat {
            field: denomination.key().to_string(),
            reason: format!("count must not exceed {}", u32::MAX),
        })?;
        self.store(denomination, count);
        Ok(())
    }

    fn store(&mut self, denomination: Denomination, count: u32) {
        if count == 0 {
            self.counts.remove(&denomination);
        } else {
            self.counts.insert(denomination, count);
        }
    }

    pub fn increment(&mut self, denomination: Denomination) {
        let next = self.get(denomination).saturating_add(1);
        self.counts.insert(denomination, next);
    }

    /// Removes one piece; already-zero counts stay at zero.
    pub fn decrement(&mut self, denomination: Denomination) {
        let next = self.get(denomination).saturating_sub(1);
        self.store(denomination, next);
    }

    /// Value of the counted bills and coins.
    pub fn total(&self) -> Money {
        self.counts
            .iter()
            .map(|(d, count)| d.face_value().multiply_quantity(i64::from(*count)))
            .sum()
    }

    /// Non-zero counts only, in the shape sent as `opening_bills` / `closing_bills`.
    pub fn nonzero(&self) -> BTreeMap<Denomination, u32> {
        self.counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(d, count)| (*d, *count))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|c| *c == 0)
    }

    /// Resets every count to zero.
    pub fn reset(&mut self) {
        self.counts.clear();
    }
}
