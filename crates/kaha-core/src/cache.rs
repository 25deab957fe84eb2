//! # Scoped Cache
//!
//! Short-lived, single-slot caches for resource collections (branches,
//! suppliers, taxes, payment methods, tenants).
//!
//! ## Hit Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  read(scope) is a HIT only when                                         │
//! │    • an entry exists                                                    │
//! │    • entry.scope == scope        (unscoped caches: None == None)        │
//! │    • now − entry.fetched_at < ttl                                       │
//! │  Anything else is a MISS and the caller fetches.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Late Responses
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  t0  begin_fetch(branch 1)  ──► ticket { scope: 1, generation: 4 }      │
//! │  t1  branch switched        ──► invalidate()   generation = 5           │
//! │  t2  branch-1 response      ──► complete(ticket) → generation mismatch  │
//! │                                  → DISCARDED, cache untouched           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Time comes from an injected [`Clock`] so tests can move it by hand.

use chrono::{DateTime, Duration as TimeDelta, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Tenant or branch id partitioning cached data.
pub type ScopeId = i64;

// =============================================================================
// Clock
// =============================================================================

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualClock {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += to_delta(by);
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        ManualClock::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn to_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

// =============================================================================
// Entries & Tickets
// =============================================================================

/// A cached value with its fetch time and scope.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: DateTime<Utc>,
    pub scope: Option<ScopeId>,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Issued when a fetch starts; required to store its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub scope: Option<ScopeId>,
    generation: u64,
}

/// Ticket for a [`KeyedCache`] fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedTicket<K> {
    pub key: K,
    generation: u64,
}

// =============================================================================
// ScopedCache
// =============================================================================

/// Single-slot cache for one resource type.
///
/// A write for any scope replaces whatever was there before.
#[derive(Debug)]
pub struct ScopedCache<T> {
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    entry: Option<CacheEntry<T>>,
    generation: u64,
}

impl<T: Clone> ScopedCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        ScopedCache {
            ttl: to_delta(ttl),
            clock,
            entry: None,
            generation: 0,
        }
    }

    /// Returns the cached value if it is fresh and was fetched for `scope`.
    pub fn read(&self, scope: Option<ScopeId>) -> Option<T> {
        let now = self.clock.now();
        self.entry
            .as_ref()
            .filter(|e| e.scope == scope && e.is_fresh(now, self.ttl))
            .map(|e| e.value.clone())
    }

    /// Stores `value` for `scope`, stamped with the current time.
    pub fn write(&mut self, value: T, scope: Option<ScopeId>) {
        self.entry = Some(CacheEntry {
            value,
            fetched_at: self.clock.now(),
            scope,
        });
    }

    /// Drops the entry and orphans every outstanding ticket.
    pub fn invalidate(&mut self) {
        self.entry = None;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Starts a fetch for `scope`.
    pub fn begin_fetch(&self, scope: Option<ScopeId>) -> FetchTicket {
        FetchTicket {
            scope,
            generation: self.generation,
        }
    }

    /// Stores a fetched value unless the cache was invalidated after the
    /// ticket was issued. Returns whether the value was stored.
    pub fn complete(&mut self, ticket: FetchTicket, value: T) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.write(value, ticket.scope);
        true
    }

    /// The raw entry, fresh or not.
    pub fn entry(&self) -> Option<&CacheEntry<T>> {
        self.entry.as_ref()
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }
}

// =============================================================================
// KeyedCache
// =============================================================================

/// One independent single-slot entry per composite key
/// (e.g. `suppliers_{search}_{per_page}_{page}`).
#[derive(Debug)]
pub struct KeyedCache<K, T> {
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    entries: BTreeMap<K, CacheEntry<T>>,
    generation: u64,
}

impl<K: Ord + Clone, T: Clone> KeyedCache<K, T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        KeyedCache {
            ttl: to_delta(ttl),
            clock,
            entries: BTreeMap::new(),
            generation: 0,
        }
    }

    pub fn read(&self, key: &K) -> Option<T> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|e| e.is_fresh(now, self.ttl))
            .map(|e| e.value.clone())
    }

    /// Stores `value` under `key`; expired neighbours are pruned on the way.
    pub fn write(&mut self, key: K, value: T) {
        let now = self.clock.now();
        let ttl = self.ttl;
        self.entries.retain(|_, e| e.is_fresh(now, ttl));
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: now,
                scope: None,
            },
        );
    }

    /// Drops every key and orphans outstanding tickets.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn begin_fetch(&self, key: K) -> KeyedTicket<K> {
        KeyedTicket {
            key,
            generation: self.generation,
        }
    }

    pub fn complete(&mut self, ticket: KeyedTicket<K>, value: T) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.write(ticket.key, value);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
