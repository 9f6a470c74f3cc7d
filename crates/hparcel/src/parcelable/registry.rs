// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry and registry scopes.
//!
//! Creators are registered explicitly, up front. A [`RegistryScope`] is the
//! context a decode runs under: it names the registry to consult and the
//! cache that remembers what was already resolved.
//!
//! # Resolution
//!
//! ```text
//! read identifier
//!   -> cache.get(scope_id, identifier)        hit: done
//!   -> registry.resolve(identifier, scope_id) miss
//!   -> creator.type_identifier() == identifier ?
//!        yes: cache.insert, done
//!        no : BadPolymorphicType (never cached)
//! ```

use super::cache::{CacheStats, CreatorCache};
use super::{Creator, FromParcel, Parcelable, TypedCreator};
use crate::bundle::{BundleCreator, PersistableBundleCreator};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a registry scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Maps type identifiers to creators.
pub trait TypeRegistry: Send + Sync {
    /// Find the creator for `identifier` as seen from `scope`.
    fn resolve(&self, identifier: &str, scope: &ScopeId) -> Option<Arc<dyn Creator>>;
}

/// [`TypeRegistry`] backed by hash maps, filled before use.
///
/// Scope-restricted creators shadow global ones for their scope. The two
/// bundle types are registered globally from the start.
pub struct HashMapTypeRegistry {
    global: HashMap<String, Arc<dyn Creator>>,
    scoped: HashMap<(ScopeId, String), Arc<dyn Creator>>,
}

impl std::fmt::Debug for HashMapTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut global: Vec<_> = self.global.keys().collect();
        global.sort();
        f.debug_struct("HashMapTypeRegistry")
            .field("global", &global)
            .field("scoped", &self.scoped.len())
            .finish()
    }
}

impl Default for HashMapTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HashMapTypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            global: HashMap::new(),
            scoped: HashMap::new(),
        };
        registry.register_creator(Arc::new(BundleCreator));
        registry.register_creator(Arc::new(PersistableBundleCreator));
        registry
    }

    /// Register `creator` under its own type identifier.
    ///
    /// Returns the creator it replaced, if any.
    pub fn register_creator(&mut self, creator: Arc<dyn Creator>) -> Option<Arc<dyn Creator>> {
        let identifier = creator.type_identifier().to_string();
        log::debug!("[registry] register '{}'", identifier);
        self.global.insert(identifier, creator)
    }

    /// Register the static creator of `T`.
    pub fn register<T>(&mut self) -> Option<Arc<dyn Creator>>
    where
        T: FromParcel + Parcelable + 'static,
    {
        self.register_creator(Arc::new(TypedCreator::<T>::new()))
    }

    /// Register `creator` for decodes running under `scope` only.
    pub fn register_in_scope(&mut self, scope: ScopeId, creator: Arc<dyn Creator>) -> Option<Arc<dyn Creator>> {
        let identifier = creator.type_identifier().to_string();
        log::debug!(
            "[registry] register '{}' in scope {}",
            identifier,
            scope.as_u64()
        );
        self.scoped.insert((scope, identifier), creator)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.global.contains_key(identifier)
    }
}

impl TypeRegistry for HashMapTypeRegistry {
    fn resolve(&self, identifier: &str, scope: &ScopeId) -> Option<Arc<dyn Creator>> {
        self.scoped
            .get(&(*scope, identifier.to_string()))
            .or_else(|| self.global.get(identifier))
            .cloned()
    }
}

/// Context that type identifiers are resolved under.
///
/// Cloning is cheap and yields the same scope (same id, registry and
/// cache). [`RegistryScope::child`] makes a distinct scope over the same
/// registry and cache. When the last clone of a scope drops, its entries
/// are evicted from the cache.
#[derive(Clone)]
pub struct RegistryScope {
    handle: Arc<ScopeHandle>,
    registry: Arc<dyn TypeRegistry>,
}

/// Identity shared by every clone of one scope.
struct ScopeHandle {
    id: ScopeId,
    cache: Arc<CreatorCache>,
}

impl Drop for ScopeHandle {
    fn drop(&mut self) {
        log::trace!("[registry] scope {} closed", self.id.as_u64());
        self.cache.evict_scope(self.id);
    }
}

impl std::fmt::Debug for RegistryScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryScope")
            .field("id", &self.handle.id)
            .field("cache", &self.handle.cache)
            .finish()
    }
}

impl Default for RegistryScope {
    /// A scope over a registry holding only the built-in types.
    fn default() -> Self {
        Self::new(Arc::new(HashMapTypeRegistry::new()))
    }
}

impl RegistryScope {
    /// New scope with its own cache.
    pub fn new(registry: Arc<dyn TypeRegistry>) -> Self {
        Self::with_cache(registry, Arc::new(CreatorCache::new()))
    }

    /// New scope sharing an existing cache.
    pub fn with_cache(registry: Arc<dyn TypeRegistry>, cache: Arc<CreatorCache>) -> Self {
        Self {
            handle: Arc::new(ScopeHandle {
                id: ScopeId::next(),
                cache,
            }),
            registry,
        }
    }

    /// Process-wide scope over the built-in types, created on first use.
    pub fn builtin() -> &'static RegistryScope {
        static BUILTIN: OnceLock<RegistryScope> = OnceLock::new();
        BUILTIN.get_or_init(RegistryScope::default)
    }

    /// Distinct scope over the same registry and cache.
    pub fn child(&self) -> Self {
        Self::with_cache(Arc::clone(&self.registry), Arc::clone(&self.handle.cache))
    }

    pub fn id(&self) -> ScopeId {
        self.handle.id
    }

    pub fn cache(&self) -> &Arc<CreatorCache> {
        &self.handle.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache().stats()
    }

    /// Resolve `identifier` to a conformant creator, consulting the cache
    /// first.
    ///
    /// # Errors
    /// [`Error::BadPolymorphicType`] when nothing is registered under
    /// `identifier`, or when the registered creator produces a different
    /// type.
    pub fn resolve(&self, identifier: &str) -> Result<Arc<dyn Creator>> {
        let id = self.id();
        if let Some(creator) = self.cache().get(id, identifier) {
            return Ok(creator);
        }

        log::debug!(
            "[registry] resolve '{}' in scope {} (cache miss)",
            identifier,
            id.as_u64()
        );
        let creator = self
            .registry
            .resolve(identifier, &id)
            .ok_or_else(|| Error::bad_type(identifier, "no creator registered"))?;

        if creator.type_identifier() != identifier {
            log::warn!(
                "[registry] creator for '{}' produces '{}'",
                identifier,
                creator.type_identifier()
            );
            return Err(Error::bad_type(
                identifier,
                format!("creator produces '{}'", creator.type_identifier()),
            ));
        }
        Ok(self.cache().insert(id, identifier, creator))
    }
}
