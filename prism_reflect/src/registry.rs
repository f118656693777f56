//! In-process constructor registry.
//!
//! [`ClassRegistry`] is the binding layer for constructors written in Rust.
//! Each registration yields a [`CallableDescriptor`]; resolving it yields a
//! [`RegisteredConstructor`] that binds arguments against the descriptor's
//! parameter types before running the constructor body.
//!
//! Binding and the body are kept apart so faults can be attributed:
//!
//! - arity, cast and null failures during binding are tagged
//!   [`FaultOrigin::ArgumentBinding`](crate::FaultOrigin::ArgumentBinding);
//! - anything the body returns is re-tagged as raised in the callee.

use crate::descriptor::{CallableDescriptor, CallableId, ParamType};
use crate::error::ResolveError;
use crate::fault::Fault;
use crate::invocable::{DirectEntry, Invocable, InvokeResult, Resolver};
use crate::native::NativeEntry;
use crate::value::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Constructor body. Receives arguments already bound to parameter types.
pub type ConstructorBody = Arc<dyn Fn(&[Value]) -> InvokeResult + Send + Sync>;

/// First id handed out by a registry.
const FIRST_CALLABLE_ID: u64 = 1;

// =============================================================================
// Class Entry
// =============================================================================

struct ClassEntry {
    descriptor: Arc<CallableDescriptor>,
    body: ConstructorBody,
}

impl ClassEntry {
    /// Run the body on bound arguments, attributing faults to the callee.
    #[inline]
    fn run(&self, bound: &[Value]) -> InvokeResult {
        (self.body)(bound).map_err(Fault::in_callee)
    }

    #[inline]
    fn bind_and_run(&self, args: &[Value]) -> InvokeResult {
        let bound = self.descriptor.bind_args(args)?;
        self.run(&bound)
    }
}

impl fmt::Debug for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Class Registry
// =============================================================================

/// Registry of constructors defined in Rust.
pub struct ClassRegistry {
    classes: RwLock<FxHashMap<CallableId, Arc<ClassEntry>>>,
    next_id: AtomicU64,
    links: Arc<AtomicU64>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self {
            classes: RwLock::new(FxHashMap::default()),
            next_id: AtomicU64::new(FIRST_CALLABLE_ID),
            links: Arc::new(AtomicU64::new(0)),
        }
    }

    fn allocate_id(&self) -> CallableId {
        CallableId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a constructor and return its descriptor.
    pub fn register<F>(
        &self,
        name: &str,
        params: impl IntoIterator<Item = ParamType>,
        body: F,
    ) -> Arc<CallableDescriptor>
    where
        F: Fn(&[Value]) -> InvokeResult + Send + Sync + 'static,
    {
        let descriptor = CallableDescriptor::new(self.allocate_id(), name, params);
        self.insert(descriptor, Arc::new(body))
    }

    /// Register a constructor whose body stores its arguments as fields.
    pub fn register_record(
        &self,
        name: &str,
        params: impl IntoIterator<Item = ParamType>,
    ) -> Arc<CallableDescriptor> {
        let class: Arc<str> = Arc::from(name);
        self.register(name, params, move |args| {
            Ok(Value::object(crate::value::Instance::new(
                Arc::clone(&class),
                args.iter().cloned(),
            )))
        })
    }

    /// Register an abstract class. Lookups find it; resolving it fails with
    /// [`ResolveError::NotInstantiable`].
    pub fn register_abstract(
        &self,
        name: &str,
        params: impl IntoIterator<Item = ParamType>,
    ) -> Arc<CallableDescriptor> {
        let descriptor = CallableDescriptor::new(self.allocate_id(), name, params).into_abstract();
        let body: ConstructorBody =
            Arc::new(|_: &[Value]| Err(Fault::internal("abstract class has no constructor body")));
        self.insert(descriptor, body)
    }

    fn insert(&self, descriptor: CallableDescriptor, body: ConstructorBody) -> Arc<CallableDescriptor> {
        let descriptor = Arc::new(descriptor);
        let entry = Arc::new(ClassEntry {
            descriptor: Arc::clone(&descriptor),
            body,
        });
        self.classes.write().insert(descriptor.id(), entry);
        descriptor
    }

    /// Remove a registration. Accessors already built keep working.
    pub fn unregister(&self, id: CallableId) -> bool {
        self.classes.write().remove(&id).is_some()
    }

    /// Look up a descriptor by class name.
    pub fn lookup(&self, name: &str) -> Option<Arc<CallableDescriptor>> {
        self.classes
            .read()
            .values()
            .find(|entry| entry.descriptor.name() == name)
            .map(|entry| Arc::clone(&entry.descriptor))
    }

    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Direct entries linked so far across all constructors.
    pub fn link_count(&self) -> u64 {
        self.links.load(Ordering::Relaxed)
    }

    fn entry(&self, descriptor: &CallableDescriptor) -> Result<Arc<ClassEntry>, ResolveError> {
        if descriptor.is_abstract() {
            return Err(ResolveError::NotInstantiable {
                name: descriptor.name_arc(),
            });
        }
        let entry = self
            .classes
            .read()
            .get(&descriptor.id())
            .cloned()
            .ok_or_else(|| ResolveError::UnknownCallable {
                id: descriptor.id(),
                name: descriptor.name_arc(),
            })?;
        if *entry.descriptor != *descriptor {
            return Err(ResolveError::StaleDescriptor {
                name: descriptor.name_arc(),
            });
        }
        Ok(entry)
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.len())
            .field("links", &self.link_count())
            .finish()
    }
}

impl Resolver for ClassRegistry {
    fn resolve(
        &self,
        descriptor: &CallableDescriptor,
    ) -> Result<Arc<dyn Invocable>, ResolveError> {
        let entry = self.entry(descriptor)?;
        Ok(Arc::new(RegisteredConstructor {
            entry,
            links: Arc::clone(&self.links),
        }))
    }

    fn native_entry(
        &self,
        descriptor: &CallableDescriptor,
    ) -> Result<Arc<dyn NativeEntry>, ResolveError> {
        let entry = self.entry(descriptor)?;
        Ok(Arc::new(RegisteredNative { entry }))
    }
}

// =============================================================================
// Registered Constructor
// =============================================================================

/// Invocable handle for a registered constructor.
#[derive(Debug)]
pub struct RegisteredConstructor {
    entry: Arc<ClassEntry>,
    links: Arc<AtomicU64>,
}

impl Invocable for RegisteredConstructor {
    fn descriptor(&self) -> &Arc<CallableDescriptor> {
        &self.entry.descriptor
    }

    fn invoke(&self, args: &[Value]) -> InvokeResult {
        self.entry.bind_and_run(args)
    }

    fn link_direct(&self) -> Result<DirectEntry, Fault> {
        let entry = Arc::clone(&self.entry);
        let direct = match entry.descriptor.arity() {
            0 => DirectEntry::Nullary(Box::new(move || entry.run(&[]))),
            1 => DirectEntry::Unary(Box::new(move |a| {
                let d = &entry.descriptor;
                entry.run(&[d.bind_arg(0, a)?])
            })),
            2 => DirectEntry::Binary(Box::new(move |a, b| {
                let d = &entry.descriptor;
                entry.run(&[d.bind_arg(0, a)?, d.bind_arg(1, b)?])
            })),
            3 => DirectEntry::Ternary(Box::new(move |a, b, c| {
                let d = &entry.descriptor;
                entry.run(&[d.bind_arg(0, a)?, d.bind_arg(1, b)?, d.bind_arg(2, c)?])
            })),
            _ => DirectEntry::Spread(Box::new(move |args: &[Value]| entry.bind_and_run(args))),
        };
        self.links.fetch_add(1, Ordering::Relaxed);
        Ok(direct)
    }
}

// =============================================================================
// Registered Native Entry
// =============================================================================

/// Fallback entry for a registered constructor.
#[derive(Debug)]
struct RegisteredNative {
    entry: Arc<ClassEntry>,
}

impl NativeEntry for RegisteredNative {
    fn new_instance(&self, descriptor: &CallableDescriptor, args: &[Value]) -> InvokeResult {
        if *descriptor != *self.entry.descriptor {
            return Err(Fault::internal(format!(
                "native entry for `{}` called with `{}`",
                self.entry.descriptor.name(),
                descriptor.name()
            )));
        }
        self.entry.bind_and_run(args)
    }
}
