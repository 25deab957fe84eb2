//! # Register Access
//!
//! Decides when opening a register needs a secondary override code.
//!
//! ## Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  action == Open                                                         │
//! │    AND register.assigned_user_id is set                                 │
//! │    AND assigned user != operator                                        │
//! │    AND operator.role ∈ policy.gated_tiers (default: Manager)            │
//! │                                                                         │
//! │  ──► override code required (min length policy.min_code_len)           │
//! │                                                                         │
//! │  Owner is never gated. Closing never requires a code locally; a code    │
//! │  typed while closing is still forwarded to the backend.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::types::{CashRegister, Operator, RoleTier};

/// Minimum override code length when no policy overrides it.
pub const DEFAULT_MIN_OVERRIDE_CODE_LEN: usize = 4;

/// What the operator is about to do with the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    Open,
    Close,
}

/// Which role tiers must present an override code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverridePolicy {
    #[serde(default = "default_gated_tiers")]
    pub gated_tiers: Vec<RoleTier>,
    #[serde(default = "default_min_code_len")]
    pub min_code_len: usize,
}

fn default_gated_tiers() -> Vec<RoleTier> {
    vec![RoleTier::Manager]
}

fn default_min_code_len() -> usize {
    DEFAULT_MIN_OVERRIDE_CODE_LEN
}

impl Default for OverridePolicy {
    fn default() -> Self {
        OverridePolicy {
            gated_tiers: default_gated_tiers(),
            min_code_len: default_min_code_len(),
        }
    }
}

/// Returns true when `operator` must enter an override code for `action`.
pub fn requires_override(
    operator: &Operator,
    register: &CashRegister,
    action: SessionAction,
    policy: &OverridePolicy,
) -> bool {
    if action != SessionAction::Open || operator.role == RoleTier::Owner {
        return false;
    }

    let assigned_elsewhere = register
        .assigned_user_id
        .is_some_and(|assigned| assigned != operator.id);

    assigned_elsewhere && policy.gated_tiers.contains(&operator.role)
}

/// Checks an entered override code against the policy's minimum length.
///
/// Returns the trimmed code.
pub fn validate_override_code(code: &str, policy: &OverridePolicy) -> ValidationResult<String> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "override code".to_string(),
        });
    }
    if code.chars().count() < policy.min_code_len {
        return Err(ValidationError::TooShort {
            field: "override code".to_string(),
            min: policy.min_code_len,
        });
    }
    Ok(code.to_string())
}
