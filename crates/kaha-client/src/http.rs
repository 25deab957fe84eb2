//! HTTP implementation of [`Backend`] on reqwest.
//!
//! Responses may come bare or wrapped in `{ "data": ... }`; both decode.
//! Error bodies are searched for `message` / `error` so the operator sees
//! the backend's own wording.

use async_trait::async_trait;
use kaha_core::{
    Branch, CashRegister, CloseSessionRequest, ExpectedBalances, OpenSessionRequest,
    PaymentMethod, PaymentSummary, SessionRecord, SupplierPage, Tax, Tenant,
};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::api::{Backend, SupplierQuery};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

const TENANT_HEADER: &str = "X-Tenant-ID";
const REQUEST_ID_HEADER: &str = "X-Request-ID";

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
    tenant_id: Option<i64>,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(HttpBackend {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            token: config.api.token.clone(),
            tenant_id: config.tenant.id,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(tenant_id) = self.tenant_id {
            request = request.header(TENANT_HEADER, tenant_id.to_string());
        }
        request
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ClientResult<T> {
        debug!(path, "GET");
        let response = self.request(Method::GET, path).query(query).send().await?;
        Self::handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<T> {
        let request_id = Uuid::new_v4();
        info!(path, %request_id, "POST");
        let response = self
            .request(Method::POST, path)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message.or(body.error))
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            if status.is_server_error() {
                error!(status = status.as_u16(), %message, "Backend returned an error");
            }
            return Err(ClientError::from_status(status.as_u16(), message));
        }

        let envelope: Envelope<T> = serde_json::from_str(&text)?;
        Ok(envelope.into_inner())
    }
}

fn branch_query(branch_id: Option<i64>) -> Vec<(&'static str, String)> {
    branch_id
        .map(|id| vec![("branch_id", id.to_string())])
        .unwrap_or_default()
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_branches(&self) -> ClientResult<Vec<Branch>> {
        self.get("branches", &[]).await
    }

    async fn list_suppliers(&self, query: &SupplierQuery) -> ClientResult<SupplierPage> {
        let mut params = vec![
            ("per_page", query.per_page.to_string()),
            ("page", query.page.to_string()),
        ];
        let search = query.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        self.get("suppliers", &params).await
    }

    async fn list_taxes(&self, branch_id: Option<i64>) -> ClientResult<Vec<Tax>> {
        self.get("taxes", &branch_query(branch_id)).await
    }

    async fn list_payment_methods(&self, branch_id: Option<i64>) -> ClientResult<Vec<PaymentMethod>> {
        self.get("payment-methods", &branch_query(branch_id)).await
    }

    async fn list_tenants(&self) -> ClientResult<Vec<Tenant>> {
        self.get("tenants", &[]).await
    }

    async fn list_registers(&self, branch_id: Option<i64>) -> ClientResult<Vec<CashRegister>> {
        self.get("registers", &branch_query(branch_id)).await
    }

    async fn expected_balances(&self, session_id: i64) -> ClientResult<ExpectedBalances> {
        self.get(&format!("sessions/{session_id}/expected-balances"), &[])
            .await
    }

    async fn payment_summary(&self, session_id: i64) -> ClientResult<PaymentSummary> {
        self.get(&format!("sessions/{session_id}/payment-summary"), &[])
            .await
    }

    async fn open_session(&self, request: &OpenSessionRequest) -> ClientResult<SessionRecord> {
        self.post("sessions/open", request).await
    }

    async fn close_session(
        &self,
        session_id: i64,
        request: &CloseSessionRequest,
    ) -> ClientResult<SessionRecord> {
        self.post(&format!("sessions/{session_id}/close"), request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_accepts_wrapped_and_bare() {
        let wrapped: Envelope<Vec<Branch>> =
            serde_json::from_value(json!({"data": [{"id": 1, "name": "Main"}]})).unwrap();
        assert_eq!(wrapped.into_inner().len(), 1);

        let bare: Envelope<Vec<Branch>> =
            serde_json::from_value(json!([{"id": 2, "name": "Annex"}])).unwrap();
        assert_eq!(bare.into_inner()[0].id, 2);
    }

    #[test]
    fn test_paginated_body_is_not_mistaken_for_envelope() {
        let page: Envelope<SupplierPage> = serde_json::from_value(json!({
            "data": [{"id": 1, "name": "Acme"}],
            "current_page": 1,
            "last_page": 4,
            "per_page": 15,
            "total": 52
        }))
        .unwrap();
        let page = page.into_inner();
        assert_eq!(page.total, 52);
        assert_eq!(page.data[0].name, "Acme");
    }

    #[test]
    fn test_backend_trims_base_url() {
        let mut config = ClientConfig::default();
        config.api.base_url = "https://erp.example.ph/api/".to_string();
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.base_url(), "https://erp.example.ph/api");
    }

    #[test]
    fn test_branch_query() {
        assert!(branch_query(None).is_empty());
        assert_eq!(branch_query(Some(4)), vec![("branch_id", "4".to_string())]);
    }
}
