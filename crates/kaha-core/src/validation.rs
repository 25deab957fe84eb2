//! # Validation Module
//!
//! Pre-network checks for register submissions.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: UI                                                            │
//! │  └── Field formatting, disabled buttons                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (no network call made on failure)                │
//! │  ├── a register is selected                                             │
//! │  ├── some bills/coins were counted                                      │
//! │  └── override code present when the access rule demands one            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                       │
//! │  └── session rules, code verification, expected balance                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;

/// A submission needs a selected register.
pub fn validate_register_selected(register_id: Option<i64>) -> ValidationResult<i64> {
    register_id.ok_or_else(|| ValidationError::Required {
        field: "cash register".to_string(),
    })
}

/// Bills and coins must have been counted.
///
/// Only physical cash is checked: an online-only balance does not satisfy
/// this rule.
pub fn validate_cash_counted(cash_total: Money) -> ValidationResult<()> {
    if !cash_total.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "bills/coins count".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_required() {
        assert_eq!(validate_register_selected(Some(3)).unwrap(), 3);
        assert!(matches!(
            validate_register_selected(None),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_cash_must_be_positive() {
        assert!(validate_cash_counted(Money::from_cents(1)).is_ok());
        assert!(validate_cash_counted(Money::zero()).is_err());
    }
}
