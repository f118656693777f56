//! Fault classification through the accessor boundary.
//!
//! The same failure kind must surface differently depending on where it
//! happened: during argument binding it is the caller's mistake, inside the
//! constructor body it is a failed invocation.

use prism_reflect::{
    AccessorFactory, CallableDescriptor, ClassRegistry, ConstructorAccessor, Fault, FaultClass,
    FaultKind, ParamType, ReflectError, ReflectionConfig, Value, classify,
};
use std::sync::Arc;

fn accessor_for(
    config: ReflectionConfig,
    register: impl FnOnce(&ClassRegistry) -> Arc<CallableDescriptor>,
) -> ConstructorAccessor {
    let registry = Arc::new(ClassRegistry::new());
    let descriptor = register(&registry);
    AccessorFactory::new(config, registry)
        .unwrap()
        .constructor_accessor(&descriptor)
        .unwrap()
}

/// Every accessor flavor the factory can build.
fn all_configs() -> [ReflectionConfig; 4] {
    [
        ReflectionConfig::default(),
        ReflectionConfig::for_testing(),
        ReflectionConfig::default().with_no_inflation(true),
        ReflectionConfig::default().with_native_only(true),
    ]
}

// =============================================================================
// Binding Faults
// =============================================================================

#[test]
fn test_argument_cast_is_invalid_argument() {
    for config in all_configs() {
        let accessor = accessor_for(config, |r| {
            r.register_record("Point", [ParamType::Int, ParamType::Int])
        });
        // Run past the promotion threshold so both strategies are covered.
        for _ in 0..3 {
            let err = accessor
                .construct(&[Value::int(1), Value::str("two")])
                .unwrap_err();
            assert!(err.is_invalid_argument(), "{:?}", accessor.kind());
            assert_eq!(err.fault_class(), Some(FaultClass::ArgumentTypeMismatch));
            assert_eq!(err.to_string(), "argument type mismatch");
            let cause = err.cause().unwrap();
            assert_eq!(cause.kind(), FaultKind::TypeCast);
            assert_eq!(cause.arg_index(), Some(1));
        }
    }
}

#[test]
fn test_null_argument_is_invalid_argument() {
    let accessor = accessor_for(ReflectionConfig::default(), |r| {
        r.register_record("Named", [ParamType::Str])
    });
    let err = accessor.construct(&[Value::none()]).unwrap_err();
    assert_eq!(err.fault_class(), Some(FaultClass::ArgumentTypeMismatch));
    assert_eq!(err.cause().map(Fault::kind), Some(FaultKind::NullValue));

    let optional = accessor_for(ReflectionConfig::default(), |r| {
        r.register_record("Named", [ParamType::nullable(ParamType::Str)])
    });
    assert!(optional.construct(&[Value::none()]).is_ok());
}

#[test]
fn test_large_arity_mismatch_comes_from_binding() {
    for config in all_configs() {
        let accessor = accessor_for(config, |r| {
            r.register_record("Quad", vec![ParamType::Int; 4])
        });
        let err = accessor.construct(&[Value::int(1), Value::int(2)]).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(err.fault_class(), Some(FaultClass::ArityMismatch));
        let cause = err.cause().unwrap();
        assert_eq!(cause.kind(), FaultKind::WrongArity);
        assert!(cause.originated_at_argument_binding());
        assert!(err.to_string().starts_with("wrong number of arguments"));
    }
}

#[test]
fn test_instance_parameter_checks_class() {
    let registry = Arc::new(ClassRegistry::new());
    let point = registry.register_record("Point", [ParamType::Int, ParamType::Int]);
    let segment = registry.register_record(
        "Segment",
        [ParamType::instance("Point"), ParamType::instance("Point")],
    );
    let factory = AccessorFactory::new(ReflectionConfig::default(), registry.clone()).unwrap();
    let points = factory.constructor_accessor(&point).unwrap();
    let segments = factory.constructor_accessor(&segment).unwrap();

    let a = points.construct(&[Value::int(0), Value::int(0)]).unwrap();
    let b = points.construct(&[Value::int(3), Value::int(4)]).unwrap();
    assert!(segments.construct(&[a.clone(), b]).is_ok());

    let err = segments.construct(&[a, Value::int(7)]).unwrap_err();
    assert_eq!(err.fault_class(), Some(FaultClass::ArgumentTypeMismatch));
}

// =============================================================================
// Callee Faults
// =============================================================================

#[test]
fn test_cast_inside_body_is_invocation_failure() {
    for config in all_configs() {
        let accessor = accessor_for(config, |r| {
            r.register("Parsed", [ParamType::Any], |args| {
                args[0]
                    .as_str()
                    .and_then(|s| s.parse::<i64>().ok())
                    .map(Value::int)
                    .ok_or_else(|| Fault::type_cast("expected a numeric string"))
            })
        });
        assert_eq!(accessor.construct(&[Value::str("42")]).unwrap(), Value::int(42));

        let err = accessor.construct(&[Value::int(42)]).unwrap_err();
        assert!(err.is_invocation_failed());
        assert_eq!(err.fault_class(), Some(FaultClass::CalleeFailure));
        let cause = err.cause().unwrap();
        assert_eq!(cause.kind(), FaultKind::TypeCast);
        assert!(!cause.originated_at_argument_binding());
    }
}

#[test]
fn test_binding_faults_raised_by_body_are_reattributed() {
    // A body that reports a binding-shaped fault for its own reasons is
    // still a callee failure.
    let accessor = accessor_for(ReflectionConfig::default(), |r| {
        r.register("Picky", [ParamType::Int], |_| Err(Fault::arg_type_cast(0, "int", "int")))
    });
    let err = accessor.construct(&[Value::int(1)]).unwrap_err();
    assert!(err.is_invocation_failed());
    assert_eq!(err.fault_class(), Some(FaultClass::CalleeFailure));
}

#[test]
fn test_raised_error_is_wrapped_with_callable_name() {
    let accessor = accessor_for(ReflectionConfig::default(), |r| {
        r.register("Account", [ParamType::Int], |_| Err(Fault::raised("insufficient funds")))
    });
    let err = accessor.construct(&[Value::int(-5)]).unwrap_err();
    match &err {
        ReflectError::InvocationFailed { callable, cause, .. } => {
            assert_eq!(&**callable, "Account");
            assert_eq!(cause.message(), "insufficient funds");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("Account"));
    assert_eq!(accessor.stats().snapshot().invocation_failures, 1);
}

// =============================================================================
// Classifier
// =============================================================================

#[test]
fn test_classify_runtime_fault_is_other_failure() {
    let descriptor = CallableDescriptor::new(prism_reflect::CallableId::new(9), "Thing", []);
    let err = classify(&descriptor, Fault::internal("stack overflow"));
    assert!(err.is_invocation_failed());
    assert_eq!(err.fault_class(), Some(FaultClass::OtherFailure));
}

#[test]
fn test_classify_binding_arity() {
    let descriptor = CallableDescriptor::new(prism_reflect::CallableId::new(9), "Thing", []);
    let err = classify(&descriptor, Fault::wrong_arity(0, 2));
    assert!(err.is_invalid_argument());
    assert_eq!(err.fault_class(), Some(FaultClass::ArityMismatch));
}
