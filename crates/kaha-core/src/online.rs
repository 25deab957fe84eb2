//! # Online Payment Entries
//!
//! Electronic balances (GCash, card terminal, bank transfer, ...) declared
//! per payment method next to the physical cash count.
//!
//! Amounts are kept as the raw strings the operator typed so the field shows
//! exactly what was entered; they are parsed only when a total is needed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::types::{ExpectedMethodBalance, OnlinePaymentAmount};

/// Largest amount a single method may declare (₱1,000,000,000).
pub const MAX_ONLINE_AMOUNT: Money = Money::from_major(1_000_000_000);

/// Raw amount strings keyed by payment-method id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OnlinePaymentEntries {
    amounts: BTreeMap<i64, String>,
}

impl OnlinePaymentEntries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the raw text for a method.
    ///
    /// Text that parses to a negative amount, or to more than
    /// [`MAX_ONLINE_AMOUNT`], is rejected and the previous value is kept.
    /// Text that does not parse at all is stored as typed and counts as zero.
    pub fn set(&mut self, method_id: i64, raw: impl Into<String>) -> ValidationResult<()> {
        let raw = raw.into();
        if let Ok(amount) = Money::parse_major(&raw) {
            if amount.is_negative() {
                return Err(ValidationError::MustBeNonNegative {
                    field: "online payment amount".to_string(),
                });
            }
            if amount > MAX_ONLINE_AMOUNT {
                return Err(ValidationError::InvalidFormat {
                    field: "online payment amount".to_string(),
                    reason: format!("must not exceed {MAX_ONLINE_AMOUNT}"),
                });
            }
        }
        self.amounts.insert(method_id, raw);
        Ok(())
    }

    /// The raw text for a method, if any was entered.
    pub fn raw(&self, method_id: i64) -> Option<&str> {
        self.amounts.get(&method_id).map(String::as_str)
    }

    /// Parsed amount for a method; blank or non-numeric text is zero.
    pub fn amount(&self, method_id: i64) -> Money {
        self.raw(method_id).map(parse_or_zero).unwrap_or_default()
    }

    /// Sum of every parsed amount.
    pub fn total(&self) -> Money {
        self.amounts.values().map(|raw| parse_or_zero(raw)).sum()
    }

    /// Entries with a positive amount, as sent in `*_online_payments`.
    pub fn nonzero(&self) -> Vec<OnlinePaymentAmount> {
        self.amounts
            .keys()
            .map(|id| (*id, self.amount(*id)))
            .filter(|(_, amount)| amount.is_positive())
            .map(|(payment_method_id, amount)| OnlinePaymentAmount {
                payment_method_id,
                amount,
            })
            .collect()
    }

    /// Fills each method with the server's expected balance.
    ///
    /// Existing entries for other methods are left untouched; the values
    /// stay editable afterwards.
    pub fn prefill(&mut self, expected: &[ExpectedMethodBalance]) {
        for method in expected {
            let amount = method.expected_balance.clamp_non_negative();
            self.amounts
                .insert(method.payment_method_id, amount.to_decimal_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.amounts.clear();
    }
}

fn parse_or_zero(raw: &str) -> Money {
    Money::parse_major(raw)
        .map(|m| m.clamp_non_negative().min(MAX_ONLINE_AMOUNT))
        .unwrap_or_default()
}
