//! Callable descriptors.
//!
//! A descriptor is the immutable identity and shape of a constructor: its
//! name, its arity, and one [`ParamType`] per formal parameter. Descriptors
//! are created when a constructor is registered and shared by every
//! accessor built for it.

use crate::fault::Fault;
use crate::value::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Callable Id
// =============================================================================

/// Unique identifier for a registered callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallableId(u64);

impl CallableId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

// =============================================================================
// Parameter Types
// =============================================================================

/// Formal parameter type, i.e. the "does value V match parameter I" check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Any value, including `None`.
    Any,
    Bool,
    Int,
    /// Accepts floats and widens integers.
    Float,
    Str,
    /// Instance of the named class.
    Instance(Arc<str>),
    /// The inner type or `None`.
    Nullable(Box<ParamType>),
}

impl ParamType {
    /// Instance parameter of the given class.
    pub fn instance(class: &str) -> Self {
        ParamType::Instance(Arc::from(class))
    }

    /// Nullable wrapper.
    pub fn nullable(inner: ParamType) -> Self {
        ParamType::Nullable(Box::new(inner))
    }

    /// Whether `value` can be bound to this parameter.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ParamType::Any, _) => true,
            (ParamType::Nullable(_), Value::None) => true,
            (ParamType::Nullable(inner), v) => inner.accepts(v),
            (ParamType::Bool, Value::Bool(_)) => true,
            (ParamType::Int, Value::Int(_)) => true,
            (ParamType::Float, Value::Float(_) | Value::Int(_)) => true,
            (ParamType::Str, Value::Str(_)) => true,
            (ParamType::Instance(class), Value::Object(obj)) => obj.class_name() == &**class,
            _ => false,
        }
    }

    /// Bind `value` as argument `index`, applying widening conversions.
    ///
    /// Failures are tagged as originating at argument binding.
    pub fn bind(&self, index: usize, value: Value) -> Result<Value, Fault> {
        match (self, value) {
            (ParamType::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
            (ParamType::Nullable(_), Value::None) => Ok(Value::None),
            (ParamType::Nullable(inner), v) => inner.bind(index, v),
            (param, Value::None) if *param != ParamType::Any => {
                Err(Fault::arg_null(index, &param.to_string()))
            }
            (param, v) if param.accepts(&v) => Ok(v),
            (param, v) => Err(Fault::arg_type_cast(index, &param.to_string(), v.type_name())),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Any => write!(f, "object"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Int => write!(f, "int"),
            ParamType::Float => write!(f, "float"),
            ParamType::Str => write!(f, "str"),
            ParamType::Instance(class) => write!(f, "{}", class),
            ParamType::Nullable(inner) => write!(f, "{} | None", inner),
        }
    }
}

// =============================================================================
// Callable Descriptor
// =============================================================================

/// Parameter list storage; inline up to the specialized arities.
pub type Params = SmallVec<[ParamType; 4]>;

/// Immutable metadata for a constructor-like callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableDescriptor {
    id: CallableId,
    name: Arc<str>,
    params: Params,
    is_abstract: bool,
}

impl CallableDescriptor {
    /// Create a descriptor for a concrete constructor.
    pub fn new(
        id: CallableId,
        name: impl Into<Arc<str>>,
        params: impl IntoIterator<Item = ParamType>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            params: params.into_iter().collect(),
            is_abstract: false,
        }
    }

    /// Mark the described class as abstract (not instantiable).
    #[must_use]
    pub fn into_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[inline]
    pub fn id(&self) -> CallableId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Number of formal parameters.
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Whether `value` matches parameter `index`. Out-of-range is `false`.
    pub fn accepts(&self, index: usize, value: &Value) -> bool {
        self.params
            .get(index)
            .is_some_and(|param| param.accepts(value))
    }

    /// Bind a single argument to parameter `index`.
    #[inline]
    pub fn bind_arg(&self, index: usize, value: Value) -> Result<Value, Fault> {
        match self.params.get(index) {
            Some(param) => param.bind(index, value),
            None => Err(Fault::wrong_arity(self.arity(), index + 1)),
        }
    }

    /// Bind a full argument list, checking the count first.
    pub fn bind_args(&self, args: &[Value]) -> Result<SmallVec<[Value; 4]>, Fault> {
        if args.len() != self.arity() {
            return Err(Fault::wrong_arity(self.arity(), args.len()));
        }
        self.params
            .iter()
            .zip(args)
            .enumerate()
            .map(|(index, (param, arg))| param.bind(index, arg.clone()))
            .collect()
    }
}

impl fmt::Display for CallableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}
