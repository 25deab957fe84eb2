//! # Money Module
//!
//! Provides the `Money` type for handling peso amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Counting a drawer in floating point:                                   │
//! │    14 × 0.05 + 3 × 0.01 = 0.7300000000000001  ❌                        │
//! │                                                                         │
//! │  Variance against the expected balance then drifts across the          │
//! │  0.01 shortage tolerance and the wrong closing case is chosen.         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer centavos                                         │
//! │    14 × 5 + 3 × 1 = 73 centavos, exactly                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The backend speaks decimal major units ("1300.00" or `1300.0`). Those are
//! converted exactly once, at the wire boundary, by [`major_units`].
//!
//! ## Usage
//! ```rust
//! use kaha_core::money::Money;
//!
//! let bill = Money::from_cents(50_000); // ₱500.00
//! let two = bill * 2;
//! assert_eq!(two.to_decimal_string(), "1000.00");
//!
//! let typed = Money::parse_major("1,300.50").unwrap();
//! assert_eq!(typed.cents(), 130_050);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{ValidationError, ValidationResult};

// =============================================================================
// Money Type
// =============================================================================

/// A peso amount in centavos.
///
/// ## Design Decisions
/// - **i64 (signed)**: variance (counted − expected) is routinely negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole pesos.
    ///
    /// ```rust
    /// use kaha_core::money::Money;
    /// assert_eq!(Money::from_major(1300).cents(), 130_000);
    /// ```
    #[inline]
    pub const fn from_major(pesos: i64) -> Self {
        Money(pesos * 100)
    }

    /// Converts a floating point major-unit amount received over the wire.
    ///
    /// Rounds to the nearest centavo. Only used when decoding backend
    /// responses; nothing in this crate computes with floats.
    pub fn from_major_f64(value: f64) -> Self {
        Money((value * 100.0).round() as i64)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the amount as major units for JSON encoding.
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `self` or zero, whichever is larger.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies money by a count (bills in a drawer, items on a line).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Formats the amount as a plain two-decimal string (`"1300.00"`).
    ///
    /// This is the form used to prefill editable amount fields.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }

    /// Parses a decimal major-unit string into Money without floats.
    ///
    /// ## Rules
    /// - Surrounding whitespace and thousands separators (`,`) are ignored
    /// - A leading `-` makes the amount negative
    /// - At most one `.`; digits past the second decimal round half-up
    /// - Empty input is `Required`, anything else non-numeric is `InvalidFormat`
    ///
    /// ```rust
    /// use kaha_core::money::Money;
    ///
    /// assert_eq!(Money::parse_major("12.5").unwrap().cents(), 1250);
    /// assert_eq!(Money::parse_major("0.125").unwrap().cents(), 13);
    /// assert!(Money::parse_major("abc").is_err());
    /// ```
    pub fn parse_major(input: &str) -> ValidationResult<Money> {
        let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
        if cleaned.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, unsigned) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("must contain digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("must be a decimal number"));
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("is too large"))?
        };

        let digits: Vec<i64> = fraction
            .chars()
            .filter_map(|c| c.to_digit(10).map(i64::from))
            .collect();
        let tenths = digits.first().copied().unwrap_or(0);
        let hundredths = digits.get(1).copied().unwrap_or(0);
        let round_up = digits.get(2).is_some_and(|d| *d >= 5);

        let cents = whole_value
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(|| invalid("is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display (`₱1300.00`, `-₱0.02`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}₱{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Wire Encoding
// =============================================================================

/// Serde adapter for backend amounts.
///
/// Encodes as a JSON number in pesos. Decodes either a JSON number or a
/// decimal string, since the backend emits both depending on the column.
///
/// ```rust,ignore
/// #[serde(with = "kaha_core::money::major_units")]
/// pub expected_cash_balance: Money,
/// ```
pub mod major_units {
    use super::Money;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    fn decode<E: de::Error>(raw: RawAmount) -> Result<Money, E> {
        match raw {
            RawAmount::Number(n) => Ok(Money::from_major_f64(n)),
            RawAmount::Text(s) => Money::parse_major(&s).map_err(E::custom),
        }
    }

    pub fn serialize<S: Serializer>(amount: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(amount.to_major_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let raw = RawAmount::deserialize(deserializer)?;
        decode(raw)
    }

    /// Same encoding for optional amounts; `null` and absent both decode to `None`.
    pub mod option {
        use super::{decode, RawAmount};
        use crate::money::Money;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            amount: &Option<Money>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match amount {
                Some(m) => serializer.serialize_some(&m.to_major_f64()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Money>, D::Error> {
            Option::<RawAmount>::deserialize(deserializer)?
                .map(decode)
                .transpose()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(130_000)), "₱1300.00");
        assert_eq!(format!("{}", Money::from_cents(5)), "₱0.05");
        assert_eq!(format!("{}", Money::from_cents(-2)), "-₱0.02");
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_cents(123_456).to_decimal_string(), "1234.56");
        assert_eq!(Money::zero().to_decimal_string(), "0.00");
        assert_eq!(Money::from_cents(-150).to_decimal_string(), "-1.50");
    }

    #[test]
    fn test_parse_major() {
        assert_eq!(Money::parse_major("1300").unwrap().cents(), 130_000);
        assert_eq!(Money::parse_major("1,300.50").unwrap().cents(), 130_050);
        assert_eq!(Money::parse_major(" 7 ").unwrap().cents(), 700);
        assert_eq!(Money::parse_major(".25").unwrap().cents(), 25);
        assert_eq!(Money::parse_major("12.").unwrap().cents(), 1200);
        assert_eq!(Money::parse_major("-0.02").unwrap().cents(), -2);
        assert_eq!(Money::parse_major("0.004").unwrap().cents(), 0);
        assert_eq!(Money::parse_major("0.005").unwrap().cents(), 1);
    }

    #[test]
    fn test_parse_major_rejects_garbage() {
        assert!(matches!(
            Money::parse_major(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            Money::parse_major("12a"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(Money::parse_major("1.2.3").is_err());
        assert!(Money::parse_major(".").is_err());
        assert!(Money::parse_major("-").is_err());
        assert!(Money::parse_major("99999999999999999999").is_err());
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a + b).cents(), 1250);
        assert_eq!((b - a).cents(), -750);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 1500);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_cents(-5).clamp_non_negative(), Money::zero());
        assert_eq!(Money::from_cents(5).clamp_non_negative().cents(), 5);
    }

    #[test]
    fn test_centavo_sums_stay_exact() {
        // 14 five-centavo coins and 3 one-centavo coins
        let total = Money::from_cents(5).multiply_quantity(14) + Money::from_cents(1) * 3;
        assert_eq!(total.cents(), 73);
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Wire {
        #[serde(with = "major_units")]
        amount: Money,
        #[serde(default, with = "major_units::option")]
        maybe: Option<Money>,
    }

    #[test]
    fn test_major_units_accepts_number_and_string() {
        let from_number: Wire = serde_json::from_str(r#"{"amount": 1300.5}"#).unwrap();
        assert_eq!(from_number.amount.cents(), 130_050);
        assert_eq!(from_number.maybe, None);

        let from_text: Wire =
            serde_json::from_str(r#"{"amount": "999.99", "maybe": "0.10"}"#).unwrap();
        assert_eq!(from_text.amount.cents(), 99_999);
        assert_eq!(from_text.maybe, Some(Money::from_cents(10)));

        let explicit_null: Wire =
            serde_json::from_str(r#"{"amount": 1, "maybe": null}"#).unwrap();
        assert_eq!(explicit_null.maybe, None);
    }

    #[test]
    fn test_major_units_encodes_number() {
        let wire = Wire {
            amount: Money::from_cents(130_000),
            maybe: None,
        };
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value["amount"], serde_json::json!(1300.0));
    }
}
