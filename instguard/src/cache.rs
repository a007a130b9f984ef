//! Resolution cache.
//!
//! Memoizes ownership resolution per callable identity. Both outcomes are
//! stored: a resolved owner is returned as-is and a failure is replayed on
//! every later lookup without retrying.
//!
//! # Thread Safety
//!
//! Entries live in a sharded `DashMap`. Steady-state lookups take a shard
//! read lock only. First-time population goes through the entry API, which
//! holds the shard write lock while the resolver runs, so each key is
//! resolved at most once even when many threads race on it.
//!
//! # Lifetime
//!
//! Unbounded and never invalidated. A cached owner keeps its class alive
//! for as long as the cache lives.

use crate::resolver::{OwnershipResolver, Resolution};
use dashmap::DashMap;
use instguard_runtime::{FunctionId, FunctionObject};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

// =============================================================================
// Resolution Cache
// =============================================================================

/// Memoized ownership resolutions keyed by function identity.
pub struct ResolutionCache {
    entries: DashMap<FunctionId, Resolution>,
    /// Lookups answered from the cache
    hits: AtomicU64,
    /// Lookups that ran the resolver
    misses: AtomicU64,
}

impl ResolutionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached resolution for `func`, resolving it first if this
    /// is the first lookup.
    pub fn get_or_resolve(
        &self,
        func: &FunctionObject,
        resolver: &OwnershipResolver,
    ) -> Resolution {
        // Fast path: shard read lock
        if let Some(entry) = self.entries.get(&func.id()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return entry.value().clone();
        }

        let mut resolved = false;
        let resolution = self
            .entries
            .entry(func.id())
            .or_insert_with(|| {
                resolved = true;
                resolver.resolve(func)
            })
            .value()
            .clone();

        // Another thread may have populated the entry between the two locks
        if resolved {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        resolution
    }

    /// Cached resolution for `id`, without resolving.
    pub fn get(&self, id: FunctionId) -> Option<Resolution> {
        self.entries.get(&id).map(|entry| entry.value().clone())
    }

    /// Check whether `id` has been resolved.
    pub fn contains(&self, id: FunctionId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of cached resolutions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookup statistics as `(hits, misses)`.
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    /// Hit rate as a percentage. Returns 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let (hits, misses) = self.stats();
        let total = hits + misses;

        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (hits, misses) = self.stats();
        f.debug_struct("ResolutionCache")
            .field("entries", &self.len())
            .field("hits", &hits)
            .field("misses", &misses)
            .finish()
    }
}

// =============================================================================
// Global Cache
// =============================================================================

static GLOBAL_CACHE: OnceLock<Arc<ResolutionCache>> = OnceLock::new();

/// Process-wide cache shared by guards that were not given one.
#[inline]
pub fn global_cache() -> Arc<ResolutionCache> {
    GLOBAL_CACHE
        .get_or_init(|| Arc::new(ResolutionCache::new()))
        .clone()
}
