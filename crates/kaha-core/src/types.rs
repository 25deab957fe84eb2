//! # Domain Types
//!
//! Register, session and resource types as the backend's REST contract
//! shapes them.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET registers                     GET sessions/{id}/expected-balances  │
//! │  ┌─────────────────┐               ┌──────────────────────────────┐     │
//! │  │  CashRegister   │               │  ExpectedBalances            │     │
//! │  │  id, name       │               │  expected_cash_balance       │     │
//! │  │  assigned_user  │               │  expected_online_balance     │     │
//! │  │  open_session ──┼──► OpenSession│  expected_total_balance?     │     │
//! │  └─────────────────┘               │  case (SALE/NO_SALE/SHORTED) │     │
//! │                                    │  by_method[] ──► Expected-   │     │
//! │                                    │                  MethodBalance│    │
//! │                                    └──────────────────────────────┘     │
//! │  POST sessions/open   ◄── OpenSessionRequest                            │
//! │  POST sessions/{id}/close ◄── CloseSessionRequest                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The client never owns a session; these are read-through snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::denomination::Denomination;
use crate::money::{major_units, Money};

// =============================================================================
// Register & Session
// =============================================================================

/// Open/closed state of a register as the backend reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum RegisterStatus {
    #[serde(alias = "open")]
    Open,
    #[default]
    #[serde(alias = "closed")]
    Closed,
}

/// How a closing is booked.
///
/// The backend sends a baseline case; the dialog refines it from the counted
/// amounts (see [`crate::reconcile::classify_closing_case`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ClosingCase {
    #[default]
    #[serde(alias = "sale")]
    Sale,
    #[serde(alias = "no_sale")]
    NoSale,
    #[serde(alias = "shorted")]
    Shorted,
}

/// An amount declared for one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OnlinePaymentAmount {
    pub payment_method_id: i64,
    #[serde(with = "major_units")]
    #[ts(type = "number")]
    pub amount: Money,
}

/// The session embedded in a register listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OpenSession {
    pub id: i64,
    pub status: RegisterStatus,
    /// User who opened the session.
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub opening_online_payments: Vec<OnlinePaymentAmount>,
}

/// A cash register visible to the current branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashRegister {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub branch_id: Option<i64>,
    /// User the register is assigned to, if any.
    #[serde(default)]
    pub assigned_user_id: Option<i64>,
    #[serde(default)]
    pub open_session: Option<OpenSession>,
}

impl CashRegister {
    /// `Open` only when an embedded session reports itself open.
    pub fn status(&self) -> RegisterStatus {
        match &self.open_session {
            Some(session) if session.status == RegisterStatus::Open => RegisterStatus::Open,
            _ => RegisterStatus::Closed,
        }
    }

    /// Id of the open session, if the register has one.
    pub fn open_session_id(&self) -> Option<i64> {
        self.open_session
            .as_ref()
            .filter(|s| s.status == RegisterStatus::Open)
            .map(|s| s.id)
    }
}

/// Per-method expectation from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpectedMethodBalance {
    pub payment_method_id: i64,
    #[serde(default)]
    pub payment_method_name: Option<String>,
    #[serde(with = "major_units")]
    #[ts(type = "number")]
    pub opening_balance: Money,
    #[serde(with = "major_units")]
    #[ts(type = "number")]
    pub sales_amount: Money,
    #[serde(with = "major_units")]
    #[ts(type = "number")]
    pub expected_balance: Money,
}

/// What the backend says should be in the drawer right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpectedBalances {
    #[serde(with = "major_units")]
    #[ts(type = "number")]
    pub expected_cash_balance: Money,
    #[serde(with = "major_units")]
    #[ts(type = "number")]
    pub expected_online_balance: Money,
    #[serde(default, with = "major_units::option")]
    #[ts(type = "number | null")]
    pub expected_total_balance: Option<Money>,
    #[serde(default)]
    pub case: ClosingCase,
    #[serde(default)]
    pub expected_balances_by_method: Vec<ExpectedMethodBalance>,
}

impl ExpectedBalances {
    /// Total expectation; cash + online when the backend omits the total.
    pub fn total(&self) -> Money {
        self.expected_total_balance
            .unwrap_or(self.expected_cash_balance + self.expected_online_balance)
    }
}

/// Informational sales breakdown for a session. Only logged.
pub type PaymentSummary = serde_json::Value;

/// Body of `POST sessions/open`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenSessionRequest {
    pub cash_register_id: i64,
    /// Cash plus online.
    #[serde(with = "major_units")]
    pub opening_balance: Money,
    #[serde(with = "major_units")]
    pub opening_cash_balance: Money,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub opening_bills: BTreeMap<Denomination, u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opening_online_payments: Vec<OnlinePaymentAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_code: Option<String>,
}

/// Body of `POST sessions/{id}/close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseSessionRequest {
    /// Counted cash only; online amounts travel separately.
    #[serde(with = "major_units")]
    pub counted_closing_balance: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub closing_bills: BTreeMap<Denomination, u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub closing_online_payments: Vec<OnlinePaymentAmount>,
}

/// Session snapshot returned by open/close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionRecord {
    pub id: i64,
    #[serde(default)]
    pub cash_register_id: Option<i64>,
    #[serde(default)]
    pub status: RegisterStatus,
    #[serde(default)]
    pub case: Option<ClosingCase>,
    #[serde(default, with = "major_units::option")]
    #[ts(type = "number | null")]
    pub variance: Option<Money>,
}

// =============================================================================
// Operator
// =============================================================================

/// Role tiers relevant to register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RoleTier {
    Cashier,
    Supervisor,
    Manager,
    Owner,
}

/// The signed-in user acting on the register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Operator {
    pub id: i64,
    pub name: String,
    pub role: RoleTier,
}

// =============================================================================
// Cached Resources
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Branch {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One page of a supplier search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierPage {
    pub data: Vec<Supplier>,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub last_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
}

/// A tax definition. Rates are opaque here; tax math runs server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tax {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    /// Non-cash methods get an entry in the online payment section.
    #[serde(default)]
    pub is_online: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_status_from_embedded_session() {
        let mut register: CashRegister = serde_json::from_value(json!({
            "id": 1,
            "name": "Front Counter",
            "assigned_user_id": 7,
            "open_session": {"id": 55, "status": "open", "user_id": 7}
        }))
        .unwrap();
        assert_eq!(register.status(), RegisterStatus::Open);
        assert_eq!(register.open_session_id(), Some(55));

        register.open_session = None;
        assert_eq!(register.status(), RegisterStatus::Closed);
        assert_eq!(register.open_session_id(), None);
    }

    #[test]
    fn test_expected_balances_decode_mixed_amounts() {
        let balances: ExpectedBalances = serde_json::from_value(json!({
            "expected_cash_balance": "1000.00",
            "expected_online_balance": 300,
            "case": "SALE",
            "expected_balances_by_method": [{
                "payment_method_id": 3,
                "opening_balance": "0.00",
                "sales_amount": "300.00",
                "expected_balance": "300.00"
            }]
        }))
        .unwrap();
        assert_eq!(balances.expected_total_balance, None);
        assert_eq!(balances.total().cents(), 130_000);
        assert_eq!(balances.expected_balances_by_method.len(), 1);
    }

    #[test]
    fn test_explicit_total_wins() {
        let balances: ExpectedBalances = serde_json::from_value(json!({
            "expected_cash_balance": 10,
            "expected_online_balance": 10,
            "expected_total_balance": 25,
            "case": "no_sale"
        }))
        .unwrap();
        assert_eq!(balances.total().cents(), 2_500);
        assert_eq!(balances.case, ClosingCase::NoSale);
    }

    #[test]
    fn test_close_request_omits_empty_collections() {
        let request = CloseSessionRequest {
            counted_closing_balance: Money::from_major(1300),
            code: None,
            closing_bills: BTreeMap::new(),
            closing_online_payments: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"counted_closing_balance": 1300.0})
        );
    }

    #[test]
    fn test_closing_case_wire_names() {
        assert_eq!(serde_json::to_value(ClosingCase::NoSale).unwrap(), json!("NO_SALE"));
        assert_eq!(serde_json::to_value(ClosingCase::Shorted).unwrap(), json!("SHORTED"));
    }
}
