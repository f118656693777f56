//! End-to-end tests for adaptive constructor accessors.
//!
//! Coverage:
//! - Generic to specialized promotion at the inflation threshold
//! - Promotion happens once and is never undone
//! - Disabled inflation keeps the built strategy for good
//! - Eager arity rejection never reaches the constructor
//! - A failed link keeps serving calls through the generic invoker

use prism_reflect::{
    AccessorCache, AccessorFactory, AccessorKind, CallableDescriptor, CallableId, ClassRegistry,
    CurrentStrategy, DirectEntry, Fault, FaultClass, FixedStrategy, Instance, Invocable,
    InvokeResult, NativeEntry, ParamType, PromotionState, ReflectionConfig, ResolveError, Resolver,
    Value,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// Helpers
// =============================================================================

fn factory(config: ReflectionConfig) -> (AccessorFactory, Arc<ClassRegistry>) {
    let registry = Arc::new(ClassRegistry::new());
    let factory = AccessorFactory::new(config, registry.clone()).unwrap();
    (factory, registry)
}

fn point_args(i: i64) -> [Value; 2] {
    [Value::int(i), Value::float(i as f64 * 0.5)]
}

// =============================================================================
// Promotion
// =============================================================================

#[test]
fn test_promotes_after_threshold() {
    let (factory, registry) = factory(ReflectionConfig::default().with_inflation_threshold(5));
    let point = registry.register_record("Point", [ParamType::Int, ParamType::Float]);
    let accessor = factory.constructor_accessor(&point).unwrap();

    let mut results = Vec::new();
    for i in 1..=5 {
        results.push(accessor.construct(&point_args(1)).unwrap());
        assert_eq!(accessor.current_strategy(), CurrentStrategy::Generic, "call {}", i);
    }
    assert_eq!(registry.link_count(), 0);

    results.push(accessor.construct(&point_args(1)).unwrap());
    assert_eq!(accessor.promotion_state(), Some(PromotionState::Promoted));
    assert_eq!(accessor.current_strategy(), CurrentStrategy::Specialized);

    let snap = accessor.stats().snapshot();
    assert_eq!(snap.generic_calls, 5);
    assert_eq!(snap.specialized_calls, 1);
    assert_eq!(snap.promotions, 1);

    let first = &results[0];
    assert!(results.iter().all(|r| r == first));
    let instance = first.as_object().unwrap();
    assert_eq!(instance.class_name(), "Point");
    assert_eq!(instance.fields(), &point_args(1));
}

#[test]
fn test_promotion_is_linked_once() {
    let (factory, registry) = factory(ReflectionConfig::default().with_inflation_threshold(3));
    let cell = registry.register_record("Cell", [ParamType::Any]);
    let accessor = factory.constructor_accessor(&cell).unwrap();

    for i in 0..1_000 {
        accessor.construct(&[Value::int(i)]).unwrap();
    }
    assert!(accessor.is_promoted());
    assert_eq!(registry.link_count(), 1);
    assert_eq!(accessor.stats().snapshot().promotions, 1);
    assert_eq!(accessor.stats().snapshot().generic_calls, 3);
}

#[test]
fn test_promoted_invoker_is_stable() {
    let (factory, registry) = factory(ReflectionConfig::for_testing());
    let unit = registry.register_record("Unit", []);
    let accessor = factory.constructor_accessor(&unit).unwrap();

    accessor.construct(&[]).unwrap();
    accessor.construct(&[]).unwrap();
    let first = accessor.promoted_invoker().unwrap();
    for _ in 0..10 {
        accessor.construct(&[]).unwrap();
    }
    assert!(std::ptr::eq(first, accessor.promoted_invoker().unwrap()));
    assert_eq!(registry.link_count(), 1);
}

#[test]
fn test_large_arity_promotes_to_spread_entry() {
    let (factory, registry) = factory(ReflectionConfig::for_testing());
    let wide = registry.register_record("Wide", vec![ParamType::Int; 5]);
    let accessor = factory.constructor_accessor(&wide).unwrap();
    let args: Vec<Value> = (0..5).map(Value::int).collect();

    let generic = accessor.construct(&args).unwrap();
    let _ = accessor.construct(&args).unwrap();
    assert!(accessor.is_promoted());
    assert_eq!(accessor.construct(&args).unwrap(), generic);
}

// =============================================================================
// Disabled Inflation
// =============================================================================

#[test]
fn test_no_inflation_specialized_never_changes() {
    let (factory, registry) = factory(ReflectionConfig::default().with_no_inflation(true));
    let point = registry.register_record("Point", [ParamType::Int, ParamType::Float]);
    let accessor = factory.constructor_accessor(&point).unwrap();

    assert_eq!(accessor.kind(), AccessorKind::Direct);
    for i in 0..100 {
        accessor.construct(&point_args(i)).unwrap();
        assert_eq!(accessor.current_strategy(), CurrentStrategy::Specialized);
    }
    assert_eq!(accessor.promotion_state(), None);
    assert_eq!(registry.link_count(), 1);
}

#[test]
fn test_no_inflation_generic_never_links() {
    let config = ReflectionConfig::default()
        .with_no_inflation(true)
        .with_fixed_strategy(FixedStrategy::Generic);
    let (factory, registry) = factory(config);
    let point = registry.register_record("Point", [ParamType::Int, ParamType::Float]);
    let accessor = factory.constructor_accessor(&point).unwrap();

    for i in 0..100 {
        accessor.construct(&point_args(i)).unwrap();
    }
    assert_eq!(accessor.current_strategy(), CurrentStrategy::Generic);
    assert_eq!(registry.link_count(), 0);
    assert_eq!(accessor.stats().snapshot().generic_calls, 100);
}

#[test]
fn test_config_from_lookup_drives_factory() {
    let config = ReflectionConfig::from_lookup(|var| match var {
        "PRISM_REFLECT_INFLATION_THRESHOLD" => Some("2".to_string()),
        _ => None,
    })
    .unwrap();
    let (factory, registry) = factory(config);
    let unit = registry.register_record("Unit", []);
    let accessor = factory.constructor_accessor(&unit).unwrap();

    accessor.construct(&[]).unwrap();
    accessor.construct(&[]).unwrap();
    assert!(!accessor.is_promoted());
    accessor.construct(&[]).unwrap();
    assert!(accessor.is_promoted());
}

// =============================================================================
// Eager Arity Check
// =============================================================================

#[test]
fn test_wrong_argc_never_invokes() {
    let (factory, registry) = factory(ReflectionConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&calls);
    let pair = registry.register("Pair", [ParamType::Any, ParamType::Any], move |args| {
        counted.fetch_add(1, Ordering::Relaxed);
        Ok(Value::int(args.len() as i64))
    });
    let accessor = factory.constructor_accessor(&pair).unwrap();

    for argc in [0, 1, 3] {
        let args = vec![Value::none(); argc];
        let err = accessor.construct(&args).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(err.fault_class(), Some(FaultClass::ArityMismatch));
        assert!(err.cause().is_none());
    }
    assert_eq!(calls.load(Ordering::Relaxed), 0);
    assert_eq!(accessor.stats().snapshot().total_calls(), 0);

    accessor.construct(&[Value::none(), Value::none()]).unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn test_cache_shares_promotion() {
    let (factory, registry) = factory(ReflectionConfig::default().with_inflation_threshold(4));
    let cache = AccessorCache::new(factory);
    let cell = registry.register_record("Cell", [ParamType::Int]);

    for i in 0..5 {
        let accessor = cache.get_or_create(&cell).unwrap();
        accessor.construct(&[Value::int(i)]).unwrap();
    }
    assert!(cache.get(cell.id()).unwrap().is_promoted());
    assert_eq!(registry.link_count(), 1);
}

// =============================================================================
// Link Failure
// =============================================================================

/// Constructor that works through the sequence entry but cannot be linked.
#[derive(Debug)]
struct Unlinkable {
    descriptor: Arc<CallableDescriptor>,
    links: AtomicUsize,
}

impl Invocable for Unlinkable {
    fn descriptor(&self) -> &Arc<CallableDescriptor> {
        &self.descriptor
    }

    fn invoke(&self, args: &[Value]) -> InvokeResult {
        let bound = self.descriptor.bind_args(args)?;
        Ok(Value::object(Instance::new(self.descriptor.name(), bound)))
    }

    fn link_direct(&self) -> Result<DirectEntry, Fault> {
        self.links.fetch_add(1, Ordering::Relaxed);
        Err(Fault::internal("direct entries unavailable"))
    }
}

struct UnlinkableResolver {
    target: Arc<Unlinkable>,
}

impl Resolver for UnlinkableResolver {
    fn resolve(
        &self,
        _descriptor: &CallableDescriptor,
    ) -> Result<Arc<dyn Invocable>, ResolveError> {
        Ok(self.target.clone())
    }

    fn native_entry(
        &self,
        descriptor: &CallableDescriptor,
    ) -> Result<Arc<dyn NativeEntry>, ResolveError> {
        Err(ResolveError::UnknownCallable {
            id: descriptor.id(),
            name: Arc::from(descriptor.name()),
        })
    }
}

#[test]
fn test_link_failure_keeps_generic_invoker() {
    let descriptor = Arc::new(CallableDescriptor::new(
        CallableId::new(7),
        "Point",
        [ParamType::Int, ParamType::Int],
    ));
    let target = Arc::new(Unlinkable {
        descriptor: descriptor.clone(),
        links: AtomicUsize::new(0),
    });
    let resolver = Arc::new(UnlinkableResolver {
        target: target.clone(),
    });
    let factory =
        AccessorFactory::new(ReflectionConfig::default().with_inflation_threshold(3), resolver)
            .unwrap();
    let accessor = factory.constructor_accessor(&descriptor).unwrap();

    for i in 0..5 {
        let value = accessor.construct(&[Value::int(i), Value::int(i)]).unwrap();
        assert_eq!(
            value,
            Value::object(Instance::new("Point", [Value::int(i), Value::int(i)]))
        );
    }

    assert_eq!(accessor.promotion_state(), Some(PromotionState::Abandoned));
    assert_eq!(accessor.current_strategy(), CurrentStrategy::Generic);
    assert!(accessor.promoted_invoker().is_none());
    let snap = accessor.stats().snapshot();
    assert_eq!(snap.generic_calls, 5);
    assert_eq!(snap.specialized_calls, 0);
    assert_eq!(snap.promotion_failures, 1);
    assert_eq!(target.links.load(Ordering::Relaxed), 1);
}

#[test]
fn test_fixed_specialized_falls_back_when_link_fails() {
    let descriptor = Arc::new(CallableDescriptor::new(CallableId::new(8), "Unit", []));
    let target = Arc::new(Unlinkable {
        descriptor: descriptor.clone(),
        links: AtomicUsize::new(0),
    });
    let resolver = Arc::new(UnlinkableResolver { target });
    let factory =
        AccessorFactory::new(ReflectionConfig::default().with_no_inflation(true), resolver)
            .unwrap();
    let accessor = factory.constructor_accessor(&descriptor).unwrap();

    assert_eq!(accessor.kind(), AccessorKind::Direct);
    assert_eq!(accessor.current_strategy(), CurrentStrategy::Generic);
    assert!(accessor.construct(&[]).is_ok());
}
