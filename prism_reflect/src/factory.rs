//! Accessor construction policy.
//!
//! The factory decides, once per callable, which kind of accessor to build:
//!
//! | Config | Accessor |
//! |--------|----------|
//! | `native_only` | native fallback entry |
//! | `no_inflation`, fixed `Specialized` | direct, linked up front |
//! | `no_inflation`, fixed `Generic` | direct, generic forever |
//! | default | adaptive, promotes past `inflation_threshold` |

use crate::accessor::ConstructorAccessor;
use crate::config::{FixedStrategy, ReflectionConfig};
use crate::descriptor::CallableDescriptor;
use crate::error::{ConfigError, ReflectResult, ResolveError};
use crate::invocable::{Invocable, Resolver};
use crate::invoker::{GenericInvoker, Invoker, SpecializedInvoker};
use crate::native::NativeAccessor;
use std::sync::Arc;

/// Builds constructor accessors according to a [`ReflectionConfig`].
pub struct AccessorFactory {
    config: ReflectionConfig,
    resolver: Arc<dyn Resolver>,
}

impl AccessorFactory {
    /// Create a factory. Rejects invalid configuration.
    pub fn new(config: ReflectionConfig, resolver: Arc<dyn Resolver>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, resolver })
    }

    #[inline]
    pub fn config(&self) -> &ReflectionConfig {
        &self.config
    }

    #[inline]
    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.resolver
    }

    /// Build an accessor for `descriptor`.
    ///
    /// # Errors
    ///
    /// [`ReflectError::ResolutionFailed`](crate::ReflectError::ResolutionFailed)
    /// if the descriptor is abstract or cannot be resolved.
    pub fn constructor_accessor(
        &self,
        descriptor: &Arc<CallableDescriptor>,
    ) -> ReflectResult<ConstructorAccessor> {
        if descriptor.is_abstract() {
            return Err(ResolveError::NotInstantiable {
                name: descriptor.name_arc(),
            }
            .into());
        }

        if self.config.native_only {
            let entry = self.resolver.native_entry(descriptor)?;
            tracing::debug!(callable = descriptor.name(), "built native constructor accessor");
            return Ok(ConstructorAccessor::native(
                Arc::clone(descriptor),
                NativeAccessor::new(entry),
            ));
        }

        let target = self.resolver.resolve(descriptor)?;

        if self.config.inflation_enabled() {
            tracing::debug!(
                callable = descriptor.name(),
                threshold = self.config.inflation_threshold,
                "built adaptive constructor accessor"
            );
            return Ok(ConstructorAccessor::adaptive(
                target,
                self.config.inflation_threshold,
            ));
        }

        let invoker = match self.config.fixed_strategy {
            FixedStrategy::Generic => Invoker::Generic(GenericInvoker::new(target)),
            FixedStrategy::Specialized => Self::link_or_generic(target),
        };
        tracing::debug!(
            callable = descriptor.name(),
            strategy = ?invoker.kind(),
            "built direct constructor accessor"
        );
        Ok(ConstructorAccessor::direct(Arc::clone(descriptor), invoker))
    }

    /// Link a specialized invoker, keeping the generic one if linking fails.
    fn link_or_generic(target: Arc<dyn Invocable>) -> Invoker {
        match SpecializedInvoker::link(&*target) {
            Ok(specialized) => Invoker::Specialized(specialized),
            Err(fault) => {
                tracing::warn!(
                    callable = target.descriptor().name(),
                    %fault,
                    "could not link specialized invoker; using generic"
                );
                Invoker::Generic(GenericInvoker::new(target))
            }
        }
    }
}

impl std::fmt::Debug for AccessorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessorFactory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
