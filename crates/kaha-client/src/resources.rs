//! # Resource Loaders
//!
//! Cached read-through access to the small reference lists every screen
//! needs: branches, suppliers, taxes, payment methods and tenants.
//!
//! ## Load Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  taxes(branch 4)                                                        │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  cache.read(Some(4)) ── HIT ──► return (no I/O)                         │
//! │      │ MISS                                                             │
//! │      ▼                                                                  │
//! │  ticket = cache.begin_fetch(Some(4))     (lock released here)           │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  backend.list_taxes(Some(4)).await ── Err ──► return Err, cache as-is   │
//! │      │ Ok                                                               │
//! │      ▼                                                                  │
//! │  cache.complete(ticket) ── stale ──► Err(ScopeChanged)                  │
//! │      │ stored                                                           │
//! │      ▼                                                                  │
//! │  return value                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two loaders racing on a cold cache both fetch; there is no in-flight
//! deduplication. Whoever switches branch calls [`ResourceStore::switch_branch`]
//! so branch-scoped lists are dropped before the next read. Branch-scoped
//! loaders called with `None` read the branch made current that way.

use kaha_core::cache::{Clock, KeyedCache, ScopeId, ScopedCache, SystemClock};
use kaha_core::{Branch, PaymentMethod, SupplierPage, Tax, Tenant};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::api::{Backend, SupplierQuery};
use crate::config::CacheSettings;
use crate::error::{ClientError, ClientResult};

/// Cached resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Branches,
    Suppliers,
    Taxes,
    PaymentMethods,
    Tenants,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Branches,
        Resource::Suppliers,
        Resource::Taxes,
        Resource::PaymentMethods,
        Resource::Tenants,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Branches => "branches",
            Resource::Suppliers => "suppliers",
            Resource::Taxes => "taxes",
            Resource::PaymentMethods => "payment methods",
            Resource::Tenants => "tenants",
        }
    }

    /// Lists partitioned by branch.
    pub fn is_branch_scoped(&self) -> bool {
        matches!(self, Resource::Taxes | Resource::PaymentMethods)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One cache per resource type, shared by every consumer of the store.
pub struct ResourceStore<B> {
    backend: Arc<B>,
    current_branch: Mutex<Option<ScopeId>>,
    branches: Mutex<ScopedCache<Vec<Branch>>>,
    suppliers: Mutex<KeyedCache<String, SupplierPage>>,
    taxes: Mutex<ScopedCache<Vec<Tax>>>,
    payment_methods: Mutex<ScopedCache<Vec<PaymentMethod>>>,
    tenants: Mutex<ScopedCache<Vec<Tenant>>>,
}

impl<B: Backend> ResourceStore<B> {
    pub fn new(backend: Arc<B>, settings: &CacheSettings, clock: Arc<dyn Clock>) -> Self {
        ResourceStore {
            backend,
            current_branch: Mutex::new(None),
            branches: Mutex::new(ScopedCache::new(settings.branches_ttl(), clock.clone())),
            suppliers: Mutex::new(KeyedCache::new(settings.suppliers_ttl(), clock.clone())),
            taxes: Mutex::new(ScopedCache::new(settings.taxes_ttl(), clock.clone())),
            payment_methods: Mutex::new(ScopedCache::new(
                settings.payment_methods_ttl(),
                clock.clone(),
            )),
            tenants: Mutex::new(ScopedCache::new(settings.tenants_ttl(), clock)),
        }
    }

    /// Store timed by the wall clock.
    pub fn with_system_clock(backend: Arc<B>, settings: &CacheSettings) -> Self {
        Self::new(backend, settings, Arc::new(SystemClock))
    }

    // =========================================================================
    // Loaders
    // =========================================================================

    pub async fn branches(&self) -> ClientResult<Vec<Branch>> {
        self.load_scoped(Resource::Branches, &self.branches, None, || {
            self.backend.list_branches()
        })
        .await
    }

    pub async fn suppliers(&self, query: &SupplierQuery) -> ClientResult<SupplierPage> {
        let key = query.cache_key();
        let ticket = {
            let cache = lock(&self.suppliers);
            if let Some(hit) = cache.read(&key) {
                debug!(key = %key, "Suppliers cache hit");
                return Ok(hit);
            }
            cache.begin_fetch(key)
        };

        debug!(key = %ticket.key, "Suppliers cache miss, fetching");
        let page = self.backend.list_suppliers(query).await?;

        if lock(&self.suppliers).complete(ticket, page.clone()) {
            Ok(page)
        } else {
            warn!("Suppliers invalidated while loading; discarding response");
            Err(ClientError::ScopeChanged {
                resource: Resource::Suppliers.name(),
            })
        }
    }

    /// Taxes for `branch_id`, or for the current branch when `None`.
    pub async fn taxes(&self, branch_id: Option<ScopeId>) -> ClientResult<Vec<Tax>> {
        let branch_id = self.branch_or_current(branch_id);
        self.load_scoped(Resource::Taxes, &self.taxes, branch_id, || {
            self.backend.list_taxes(branch_id)
        })
        .await
    }

    /// Payment methods for `branch_id`, or for the current branch when `None`.
    pub async fn payment_methods(&self, branch_id: Option<ScopeId>) -> ClientResult<Vec<PaymentMethod>> {
        let branch_id = self.branch_or_current(branch_id);
        self.load_scoped(Resource::PaymentMethods, &self.payment_methods, branch_id, || {
            self.backend.list_payment_methods(branch_id)
        })
        .await
    }

    fn branch_or_current(&self, branch_id: Option<ScopeId>) -> Option<ScopeId> {
        branch_id.or_else(|| self.current_branch())
    }

    pub async fn tenants(&self) -> ClientResult<Vec<Tenant>> {
        self.load_scoped(Resource::Tenants, &self.tenants, None, || {
            self.backend.list_tenants()
        })
        .await
    }

    async fn load_scoped<T, F, Fut>(
        &self,
        resource: Resource,
        cache: &Mutex<ScopedCache<T>>,
        scope: Option<ScopeId>,
        fetch: F,
    ) -> ClientResult<T>
    where
        T: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let ticket = {
            let cache = lock(cache);
            if let Some(hit) = cache.read(scope) {
                debug!(%resource, ?scope, "Cache hit");
                return Ok(hit);
            }
            cache.begin_fetch(scope)
        };

        debug!(%resource, ?scope, "Cache miss, fetching");
        let value = fetch().await?;

        if lock(cache).complete(ticket, value.clone()) {
            Ok(value)
        } else {
            warn!(%resource, ?scope, "Scope changed while loading; discarding response");
            Err(ClientError::ScopeChanged {
                resource: resource.name(),
            })
        }
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Drops a resource's cache. Call after any create/update/delete on it.
    pub fn invalidate(&self, resource: Resource) {
        debug!(%resource, "Invalidating cache");
        match resource {
            Resource::Branches => lock(&self.branches).invalidate(),
            Resource::Suppliers => lock(&self.suppliers).invalidate(),
            Resource::Taxes => lock(&self.taxes).invalidate(),
            Resource::PaymentMethods => lock(&self.payment_methods).invalidate(),
            Resource::Tenants => lock(&self.tenants).invalidate(),
        }
    }

    /// Makes `branch_id` current and drops every branch-scoped list.
    ///
    /// Fetches still in flight for the old branch are discarded on arrival.
    pub fn switch_branch(&self, branch_id: Option<ScopeId>) {
        let previous = std::mem::replace(&mut *lock(&self.current_branch), branch_id);
        info!(?previous, ?branch_id, "Switching branch");
        for resource in Resource::ALL.into_iter().filter(Resource::is_branch_scoped) {
            self.invalidate(resource);
        }
    }

    pub fn current_branch(&self) -> Option<ScopeId> {
        *lock(&self.current_branch)
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }
}

impl<B> fmt::Debug for ResourceStore<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceStore")
            .field("current_branch", &*lock(&self.current_branch))
            .finish_non_exhaustive()
    }
}
