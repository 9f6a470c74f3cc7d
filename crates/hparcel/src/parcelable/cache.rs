// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Creator resolution cache.
//!
//! Keyed by `(ScopeId, type identifier)`, so one cache can serve several
//! scopes without one scope's resolutions leaking into another.

use super::registry::ScopeId;
use super::Creator;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hit/miss counters of a [`CreatorCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Creators currently cached.
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe creator cache shared by every decode running under the
/// scopes that hold it.
#[derive(Default)]
pub struct CreatorCache {
    creators: RwLock<HashMap<(ScopeId, String), Arc<dyn Creator>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for CreatorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatorCache")
            .field("stats", &self.stats())
            .finish()
    }
}

impl CreatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached creator, counting the hit or miss.
    ///
    /// # Thread Safety
    /// Takes the read lock only.
    pub fn get(&self, scope: ScopeId, identifier: &str) -> Option<Arc<dyn Creator>> {
        let found = self
            .creators
            .read()
            .get(&(scope, identifier.to_string()))
            .cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Cache `creator` unless another thread got there first.
    ///
    /// Returns the creator that ended up cached, so racing resolvers agree
    /// on a single instance.
    pub fn insert(&self, scope: ScopeId, identifier: &str, creator: Arc<dyn Creator>) -> Arc<dyn Creator> {
        let mut creators = self.creators.write();
        Arc::clone(
            creators
                .entry((scope, identifier.to_string()))
                .or_insert(creator),
        )
    }

    /// Drop every creator cached for `scope`.
    pub fn evict_scope(&self, scope: ScopeId) {
        self.creators.write().retain(|(s, _), _| *s != scope);
    }

    pub fn clear(&self) {
        self.creators.write().clear();
    }

    pub fn len(&self) -> usize {
        self.creators.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.creators.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
