//! # kaha-client: Backend Access for Kaha ERP
//!
//! The I/O side of the register and cache logic in `kaha-core`.
//!
//! ## Components
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ResourceStore ──────────┐        RegisterSessionController            │
//! │   branches()              │        open() / select_register()           │
//! │   suppliers(query)        │        update_denomination() ...            │
//! │   taxes(branch)           │        submit() / confirm_shortage()        │
//! │   payment_methods(branch) │                │                            │
//! │   tenants()               │                │                            │
//! │   switch_branch()         ▼                ▼                            │
//! │                    ┌──────────────────────────────┐                     │
//! │                    │     dyn Backend (api.rs)     │                     │
//! │                    └──────────────┬───────────────┘                     │
//! │                                   ▼                                     │
//! │                    HttpBackend (reqwest, JSON REST)                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use kaha_client::{ClientConfig, HttpBackend, ResourceStore};
//!
//! # async fn run() -> Result<(), kaha_client::ClientError> {
//! kaha_client::init_tracing();
//! let config = ClientConfig::load(None)?;
//! let backend = Arc::new(HttpBackend::new(&config)?);
//! let store = ResourceStore::with_system_clock(backend, &config.cache);
//!
//! store.switch_branch(config.tenant.branch_id);
//! let taxes = store.taxes(None).await?;
//! println!("{} taxes", taxes.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod register;
pub mod resources;

pub use api::{Backend, SupplierQuery};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, NoticeCode, UserNotice};
pub use http::HttpBackend;
pub use register::{RegisterSessionController, SubmitOutcome};
pub use resources::{Resource, ResourceStore};

pub use kaha_core;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info,kaha=debug`. Calling it twice
/// is harmless.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,kaha=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
