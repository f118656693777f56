//! Accessor cache.
//!
//! Accessors are meant to be built once per callable and reused, since the
//! promotion state lives inside them. The cache keeps one shared accessor
//! per callable id.
//!
//! A hit is only returned for the descriptor the accessor was built from;
//! any other descriptor under the same id fails as stale.
//!
//! # Thread Safety
//!
//! Lookups go through a sharded `DashMap`. Two threads missing on the same
//! callable may both build an accessor; the first one inserted is kept and
//! returned to both.

use crate::accessor::ConstructorAccessor;
use crate::descriptor::{CallableDescriptor, CallableId};
use crate::error::{ReflectResult, ResolveError};
use crate::factory::AccessorFactory;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;

/// Shared accessors keyed by callable.
#[derive(Debug)]
pub struct AccessorCache {
    factory: AccessorFactory,
    entries: DashMap<CallableId, Arc<ConstructorAccessor>, FxBuildHasher>,
}

impl AccessorCache {
    pub fn new(factory: AccessorFactory) -> Self {
        Self {
            factory,
            entries: DashMap::with_hasher(FxBuildHasher),
        }
    }

    #[inline]
    pub fn factory(&self) -> &AccessorFactory {
        &self.factory
    }

    /// Cached accessor for `descriptor`, building it on first use.
    pub fn get_or_create(
        &self,
        descriptor: &Arc<CallableDescriptor>,
    ) -> ReflectResult<Arc<ConstructorAccessor>> {
        let id = descriptor.id();
        if let Some(accessor) = self.get(id) {
            tracing::trace!(callable = descriptor.name(), "accessor cache hit");
            return Self::matching(accessor, descriptor);
        }

        tracing::trace!(callable = descriptor.name(), "accessor cache miss");
        let built = Arc::new(self.factory.constructor_accessor(descriptor)?);
        let accessor = Arc::clone(self.entries.entry(id).or_insert(built).value());
        Self::matching(accessor, descriptor)
    }

    /// An accessor is only handed out for the exact descriptor it was built
    /// for; a different descriptor under the same id is stale.
    fn matching(
        accessor: Arc<ConstructorAccessor>,
        descriptor: &CallableDescriptor,
    ) -> ReflectResult<Arc<ConstructorAccessor>> {
        if **accessor.descriptor() != *descriptor {
            return Err(ResolveError::StaleDescriptor {
                name: descriptor.name_arc(),
            }
            .into());
        }
        Ok(accessor)
    }

    /// Cached accessor for `id`, if any.
    #[inline]
    pub fn get(&self, id: CallableId) -> Option<Arc<ConstructorAccessor>> {
        self.entries.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Drop the cached accessor for `id`. Holders of it are unaffected.
    pub fn invalidate(&self, id: CallableId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
