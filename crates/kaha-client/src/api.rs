//! # Backend Contract
//!
//! The REST operations this client consumes, as one trait so the loaders and
//! the register controller can run against [`crate::http::HttpBackend`] or a
//! test double.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  branches                          ──► Vec<Branch>                 │
//! │  GET  suppliers?search=&per_page=&page= ──► SupplierPage                │
//! │  GET  taxes?branch_id=                  ──► Vec<Tax>                    │
//! │  GET  payment-methods?branch_id=        ──► Vec<PaymentMethod>          │
//! │  GET  tenants                           ──► Vec<Tenant>                 │
//! │  GET  registers?branch_id=              ──► Vec<CashRegister>           │
//! │  GET  sessions/{id}/expected-balances   ──► ExpectedBalances            │
//! │  GET  sessions/{id}/payment-summary     ──► PaymentSummary              │
//! │  POST sessions/open                     ──► SessionRecord               │
//! │  POST sessions/{id}/close               ──► SessionRecord               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use kaha_core::{
    Branch, CashRegister, CloseSessionRequest, ExpectedBalances, OpenSessionRequest,
    PaymentMethod, PaymentSummary, SessionRecord, SupplierPage, Tax, Tenant,
};
use serde::{Deserialize, Serialize};

use crate::error::ClientResult;

/// Search and paging parameters for the supplier list.
///
/// Each distinct query is cached under its own key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierQuery {
    #[serde(default)]
    pub search: String,
    pub per_page: u32,
    pub page: u32,
}

impl Default for SupplierQuery {
    fn default() -> Self {
        SupplierQuery {
            search: String::new(),
            per_page: 15,
            page: 1,
        }
    }
}

impl SupplierQuery {
    /// `suppliers_{search}_{per_page}_{page}`
    pub fn cache_key(&self) -> String {
        format!(
            "suppliers_{}_{}_{}",
            self.search.trim(),
            self.per_page,
            self.page
        )
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_branches(&self) -> ClientResult<Vec<Branch>>;

    async fn list_suppliers(&self, query: &SupplierQuery) -> ClientResult<SupplierPage>;

    async fn list_taxes(&self, branch_id: Option<i64>) -> ClientResult<Vec<Tax>>;

    async fn list_payment_methods(&self, branch_id: Option<i64>) -> ClientResult<Vec<PaymentMethod>>;

    async fn list_tenants(&self) -> ClientResult<Vec<Tenant>>;

    async fn list_registers(&self, branch_id: Option<i64>) -> ClientResult<Vec<CashRegister>>;

    async fn expected_balances(&self, session_id: i64) -> ClientResult<ExpectedBalances>;

    async fn payment_summary(&self, session_id: i64) -> ClientResult<PaymentSummary>;

    async fn open_session(&self, request: &OpenSessionRequest) -> ClientResult<SessionRecord>;

    async fn close_session(
        &self,
        session_id: i64,
        request: &CloseSessionRequest,
    ) -> ClientResult<SessionRecord>;
}
