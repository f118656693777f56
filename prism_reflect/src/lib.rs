//! Prism Reflective Constructor Accessors
//!
//! Reflective instantiation through accessors that adapt to how hot a
//! constructor is.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────────┐   descriptor   ┌─────────────────┐
//!  │  AccessorCache   │───────────────▶│ AccessorFactory │
//!  └──────────────────┘                └────────┬────────┘
//!                                               │ resolve
//!                                               ▼
//!  ┌──────────────────────────────────────────────────────┐
//!  │ ConstructorAccessor                                  │
//!  │   Direct(Invoker) │ Adaptive(Dispatcher) │ Native    │
//!  └──────────────────────────────────────────────────────┘
//!            │                  │
//!            │        generic ──┴──▶ specialized (promotion)
//!            ▼
//!   Invocable (resolved callable) ──▶ Fault ──▶ classify ──▶ ReflectError
//! ```
//!
//! - **Generic invoker**: calls the resolved target with an argument slice.
//!   Cheap to create, slower per call.
//! - **Specialized invoker**: a direct entry linked for the exact arity.
//!   Linking costs more, calls are cheaper.
//! - **Adaptive dispatcher**: starts generic and promotes once the call
//!   count passes the inflation threshold. Promotion happens at most once.
//!
//! # Usage
//!
//! ```
//! use prism_reflect::{AccessorCache, AccessorFactory, ClassRegistry, ParamType, ReflectionConfig, Value};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ClassRegistry::new());
//! let point = registry.register_record("Point", [ParamType::Int, ParamType::Int]);
//!
//! let factory = AccessorFactory::new(ReflectionConfig::default(), registry.clone()).unwrap();
//! let cache = AccessorCache::new(factory);
//!
//! let accessor = cache.get_or_create(&point).unwrap();
//! let instance = accessor.construct(&[Value::int(1), Value::int(2)]).unwrap();
//! assert_eq!(instance.as_object().unwrap().class_name(), "Point");
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

pub mod accessor;
pub mod cache;
pub mod config;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod fault;
pub mod invocable;
pub mod invoker;
pub mod native;
pub mod registry;
pub mod stats;
pub mod value;

// Re-exports for convenient access
pub use accessor::{AccessorKind, ConstructorAccessor, CurrentStrategy};
pub use cache::AccessorCache;
pub use config::{FixedStrategy, ReflectionConfig};
pub use descriptor::{CallableDescriptor, CallableId, ParamType};
pub use dispatcher::{AdaptiveDispatcher, PromotionState};
pub use error::{ConfigError, ReflectError, ReflectResult, ResolveError};
pub use factory::AccessorFactory;
pub use fault::{Fault, FaultClass, FaultKind, FaultOrigin, classify};
pub use invocable::{DirectEntry, Invocable, InvokeResult, Resolver};
pub use invoker::{GenericInvoker, Invoker, SPECIALIZED_PARAM_COUNT, SpecializedInvoker, StrategyKind};
pub use native::{NativeAccessor, NativeEntry};
pub use registry::{ClassRegistry, RegisteredConstructor};
pub use stats::{AccessorStats, StatsSnapshot};
pub use value::{Instance, Value};
