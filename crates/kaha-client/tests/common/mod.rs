//! Recording in-memory backend shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use kaha_client::{Backend, ClientError, ClientResult, SupplierQuery};
use kaha_client::kaha_core::{
    Branch, CashRegister, CloseSessionRequest, ExpectedBalances, OpenSession,
    OpenSessionRequest, PaymentMethod, PaymentSummary, RegisterStatus, SessionRecord, Supplier,
    SupplierPage, Tax, Tenant,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use tokio::sync::Notify;

pub const CASHIER_ID: i64 = 7;

/// A backend call as the fake saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Branches,
    Suppliers(SupplierQuery),
    Taxes(Option<i64>),
    PaymentMethods(Option<i64>),
    Tenants,
    Registers(Option<i64>),
    ExpectedBalances(i64),
    PaymentSummary(i64),
    Open(OpenSessionRequest),
    Close(i64, CloseSessionRequest),
}

#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    registers: Mutex<Vec<CashRegister>>,
    expected: Mutex<HashMap<i64, ExpectedBalances>>,
    failing: Mutex<HashSet<&'static str>>,
    paused: Mutex<HashSet<&'static str>>,
    paused_session: Mutex<Option<i64>>,
    /// Signalled when a paused call has been received.
    pub started: Notify,
    /// Lets a paused call finish.
    pub release: Notify,
}

fn guard<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registers(registers: Vec<CashRegister>) -> Self {
        let backend = Self::new();
        *guard(&backend.registers) = registers;
        backend
    }

    pub fn set_expected(&self, session_id: i64, balances: ExpectedBalances) {
        guard(&self.expected).insert(session_id, balances);
    }

    /// Makes every call to `operation` fail with a 500.
    pub fn fail(&self, operation: &'static str) {
        guard(&self.failing).insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        guard(&self.failing).remove(operation);
    }

    /// Holds `operation` until `release` is notified.
    pub fn pause(&self, operation: &'static str) {
        guard(&self.paused).insert(operation);
    }

    /// Holds the expected-balance fetch for one session only.
    pub fn pause_session(&self, session_id: i64) {
        *guard(&self.paused_session) = Some(session_id);
    }

    pub fn calls(&self) -> Vec<Call> {
        guard(&self.calls).clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        guard(&self.calls).iter().filter(|c| pred(c)).count()
    }

    pub fn mutations(&self) -> usize {
        self.count(|c| matches!(c, Call::Open(_) | Call::Close(..)))
    }

    async fn enter(&self, operation: &'static str, call: Call) -> ClientResult<()> {
        guard(&self.calls).push(call);
        let paused = guard(&self.paused).remove(operation);
        if paused {
            self.started.notify_one();
            self.release.notified().await;
        }
        if guard(&self.failing).contains(operation) {
            return Err(ClientError::Server {
                status: 500,
                message: format!("{operation} failed"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_branches(&self) -> ClientResult<Vec<Branch>> {
        self.enter("branches", Call::Branches).await?;
        Ok(vec![Branch {
            id: 1,
            name: "Main".into(),
            code: Some("MN".into()),
        }])
    }

    async fn list_suppliers(&self, query: &SupplierQuery) -> ClientResult<SupplierPage> {
        self.enter("suppliers", Call::Suppliers(query.clone())).await?;
        Ok(SupplierPage {
            data: vec![Supplier {
                id: i64::from(query.page),
                name: format!("Supplier page {}", query.page),
                contact_person: None,
                email: None,
                phone: None,
            }],
            current_page: query.page,
            last_page: 3,
            per_page: query.per_page,
            total: 40,
        })
    }

    async fn list_taxes(&self, branch_id: Option<i64>) -> ClientResult<Vec<Tax>> {
        self.enter("taxes", Call::Taxes(branch_id)).await?;
        Ok(vec![Tax {
            id: branch_id.unwrap_or_default(),
            name: format!("VAT branch {}", branch_id.unwrap_or_default()),
            rate: 12.0,
            is_active: true,
        }])
    }

    async fn list_payment_methods(&self, branch_id: Option<i64>) -> ClientResult<Vec<PaymentMethod>> {
        self.enter("payment_methods", Call::PaymentMethods(branch_id))
            .await?;
        Ok(vec![PaymentMethod {
            id: 3,
            name: "GCash".into(),
            code: Some("gcash".into()),
            is_online: true,
        }])
    }

    async fn list_tenants(&self) -> ClientResult<Vec<Tenant>> {
        self.enter("tenants", Call::Tenants).await?;
        Ok(vec![Tenant {
            id: 1,
            name: "Kaha Trading".into(),
            slug: Some("kaha".into()),
        }])
    }

    async fn list_registers(&self, branch_id: Option<i64>) -> ClientResult<Vec<CashRegister>> {
        self.enter("registers", Call::Registers(branch_id)).await?;
        Ok(guard(&self.registers).clone())
    }

    async fn expected_balances(&self, session_id: i64) -> ClientResult<ExpectedBalances> {
        guard(&self.calls).push(Call::ExpectedBalances(session_id));
        let hold = *guard(&self.paused_session) == Some(session_id);
        if hold {
            self.started.notify_one();
            self.release.notified().await;
        }
        if guard(&self.failing).contains("expected_balances") {
            return Err(ClientError::Server {
                status: 500,
                message: "expected balances failed".into(),
            });
        }
        guard(&self.expected)
            .get(&session_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("session {session_id}")))
    }

    async fn payment_summary(&self, session_id: i64) -> ClientResult<PaymentSummary> {
        self.enter("payment_summary", Call::PaymentSummary(session_id))
            .await?;
        Ok(serde_json::json!({"session_id": session_id, "cash": 0}))
    }

    async fn open_session(&self, request: &OpenSessionRequest) -> ClientResult<SessionRecord> {
        self.enter("open", Call::Open(request.clone())).await?;
        Ok(SessionRecord {
            id: 500,
            cash_register_id: Some(request.cash_register_id),
            status: RegisterStatus::Open,
            case: None,
            variance: None,
        })
    }

    async fn close_session(
        &self,
        session_id: i64,
        request: &CloseSessionRequest,
    ) -> ClientResult<SessionRecord> {
        self.enter("close", Call::Close(session_id, request.clone()))
            .await?;
        Ok(SessionRecord {
            id: session_id,
            cash_register_id: None,
            status: RegisterStatus::Closed,
            case: None,
            variance: None,
        })
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn closed_register(id: i64, assigned: Option<i64>) -> CashRegister {
    CashRegister {
        id,
        name: format!("Register {id}"),
        branch_id: Some(1),
        assigned_user_id: assigned,
        open_session: None,
    }
}

pub fn open_register(id: i64, session_id: i64) -> CashRegister {
    CashRegister {
        open_session: Some(OpenSession {
            id: session_id,
            status: RegisterStatus::Open,
            user_id: Some(CASHIER_ID),
            opening_online_payments: Vec::new(),
        }),
        ..closed_register(id, Some(CASHIER_ID))
    }
}

/// Expected balances from the backend's JSON, amounts in pesos.
pub fn expected_total(total: f64) -> ExpectedBalances {
    serde_json::from_value(serde_json::json!({
        "expected_cash_balance": total,
        "expected_online_balance": 0,
        "expected_total_balance": total,
        "case": "SALE",
        "expected_balances_by_method": []
    }))
    .unwrap()
}
