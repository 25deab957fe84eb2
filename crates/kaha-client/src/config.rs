//! # Client Configuration
//!
//! Backend endpoint, tenant/branch scope, cache lifetimes and register
//! access policy.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KAHA_API_URL, KAHA_API_TOKEN, KAHA_TENANT_ID,                      │
//! │     KAHA_BRANCH_ID, KAHA_TIMEOUT_SECS                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/erp/client.toml (Linux)                                  │
//! │     ~/Library/Application Support/com.kaha.erp/client.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "https://erp.example.ph/api"
//! token = "..."
//! timeout_secs = 30
//!
//! [tenant]
//! id = 3
//! branch_id = 12
//!
//! [cache]
//! branches_ttl_secs = 300
//! suppliers_ttl_secs = 120
//! taxes_ttl_secs = 120
//! payment_methods_ttl_secs = 300
//! tenants_ttl_secs = 300
//!
//! [register]
//! override_code_min_len = 4
//! gated_tiers = ["manager"]
//! ```

use kaha_core::access::{OverridePolicy, DEFAULT_MIN_OVERRIDE_CODE_LEN};
use kaha_core::RoleTier;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// API Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every REST path is joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token, if the session is already authenticated.
    #[serde(default)]
    pub token: Option<String>,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Tenant Scope
// =============================================================================

/// Which tenant and branch the client starts in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantSettings {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub branch_id: Option<i64>,
}

// =============================================================================
// Cache Lifetimes
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_long_ttl")]
    pub branches_ttl_secs: u64,

    #[serde(default = "default_short_ttl")]
    pub suppliers_ttl_secs: u64,

    #[serde(default = "default_short_ttl")]
    pub taxes_ttl_secs: u64,

    #[serde(default = "default_long_ttl")]
    pub payment_methods_ttl_secs: u64,

    #[serde(default = "default_long_ttl")]
    pub tenants_ttl_secs: u64,
}

fn default_short_ttl() -> u64 {
    120
}

fn default_long_ttl() -> u64 {
    300
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            branches_ttl_secs: default_long_ttl(),
            suppliers_ttl_secs: default_short_ttl(),
            taxes_ttl_secs: default_short_ttl(),
            payment_methods_ttl_secs: default_long_ttl(),
            tenants_ttl_secs: default_long_ttl(),
        }
    }
}

impl CacheSettings {
    pub fn branches_ttl(&self) -> Duration {
        Duration::from_secs(self.branches_ttl_secs)
    }

    pub fn suppliers_ttl(&self) -> Duration {
        Duration::from_secs(self.suppliers_ttl_secs)
    }

    pub fn taxes_ttl(&self) -> Duration {
        Duration::from_secs(self.taxes_ttl_secs)
    }

    pub fn payment_methods_ttl(&self) -> Duration {
        Duration::from_secs(self.payment_methods_ttl_secs)
    }

    pub fn tenants_ttl(&self) -> Duration {
        Duration::from_secs(self.tenants_ttl_secs)
    }

    fn all(&self) -> [(&'static str, u64); 5] {
        [
            ("branches_ttl_secs", self.branches_ttl_secs),
            ("suppliers_ttl_secs", self.suppliers_ttl_secs),
            ("taxes_ttl_secs", self.taxes_ttl_secs),
            ("payment_methods_ttl_secs", self.payment_methods_ttl_secs),
            ("tenants_ttl_secs", self.tenants_ttl_secs),
        ]
    }
}

// =============================================================================
// Register Policy
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterSettings {
    #[serde(default = "default_code_len")]
    pub override_code_min_len: usize,

    /// Role tiers that need an override code to open someone else's register.
    #[serde(default = "default_gated_tiers")]
    pub gated_tiers: Vec<RoleTier>,
}

fn default_code_len() -> usize {
    DEFAULT_MIN_OVERRIDE_CODE_LEN
}

fn default_gated_tiers() -> Vec<RoleTier> {
    OverridePolicy::default().gated_tiers
}

impl Default for RegisterSettings {
    fn default() -> Self {
        RegisterSettings {
            override_code_min_len: default_code_len(),
            gated_tiers: default_gated_tiers(),
        }
    }
}

impl RegisterSettings {
    pub fn override_policy(&self) -> OverridePolicy {
        OverridePolicy {
            gated_tiers: self.gated_tiers.clone(),
            min_code_len: self.override_code_min_len,
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub tenant: TenantSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub register: RegisterSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns the defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    pub fn validate(&self) -> ClientResult<()> {
        let url = url::Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if let Some((name, _)) = self.cache.all().into_iter().find(|(_, secs)| *secs == 0) {
            return Err(ClientError::InvalidConfig(format!(
                "{name} must be greater than 0"
            )));
        }

        if self.register.override_code_min_len == 0 {
            return Err(ClientError::InvalidConfig(
                "override_code_min_len must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("KAHA_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Ok(token) = std::env::var("KAHA_API_TOKEN") {
            self.api.token = Some(token);
        }

        if let Ok(timeout) = std::env::var("KAHA_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric KAHA_TIMEOUT_SECS"),
            }
        }

        if let Ok(id) = std::env::var("KAHA_TENANT_ID") {
            if let Ok(id) = id.parse::<i64>() {
                debug!(tenant_id = id, "Overriding tenant from environment");
                self.tenant.id = Some(id);
            }
        }

        if let Ok(id) = std::env::var("KAHA_BRANCH_ID") {
            if let Ok(id) = id.parse::<i64>() {
                debug!(branch_id = id, "Overriding branch from environment");
                self.tenant.branch_id = Some(id);
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "kaha", "erp")
            .map(|dirs| dirs.config_dir().join("client.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn override_policy(&self) -> OverridePolicy {
        self.register.override_policy()
    }
}
