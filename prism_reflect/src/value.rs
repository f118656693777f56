//! Dynamic argument and result values.
//!
//! Values cross the accessor boundary untyped. The accessor never inspects
//! them; only parameter binding in the resolved callable does.

use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Inline storage for instance fields and bound argument lists.
///
/// Four slots cover every arity that has a specialized calling shape.
pub type Fields = SmallVec<[Value; 4]>;

// =============================================================================
// Value
// =============================================================================

/// A dynamically typed value.
///
/// Cloning is cheap: heap payloads are reference counted.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    None,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// IEEE 754 double.
    Float(f64),
    /// Immutable string.
    Str(Arc<str>),
    /// Constructed instance.
    Object(Arc<Instance>),
}

impl Value {
    /// The `None` value.
    #[inline]
    pub const fn none() -> Self {
        Value::None
    }

    /// Create an integer value.
    #[inline]
    pub const fn int(value: i64) -> Self {
        Value::Int(value)
    }

    /// Create a float value.
    #[inline]
    pub const fn float(value: f64) -> Self {
        Value::Float(value)
    }

    /// Create a boolean value.
    #[inline]
    pub const fn bool(value: bool) -> Self {
        Value::Bool(value)
    }

    /// Create a string value.
    #[inline]
    pub fn str(value: &str) -> Self {
        Value::Str(Arc::from(value))
    }

    /// Wrap an instance.
    #[inline]
    pub fn object(instance: Instance) -> Self {
        Value::Object(Arc::new(instance))
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&Arc<Instance>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Name of the runtime type, used in mismatch messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "None",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Object(obj) => obj.class_name(),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::str(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "'{}'", s),
            Value::Object(obj) => write!(f, "<{} object>", obj.class_name()),
        }
    }
}

// =============================================================================
// Instance
// =============================================================================

/// An object produced by a constructor.
///
/// Two instances are equal when they have the same class and field values,
/// which is what "equivalent to direct construction" means for callers.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    class: Arc<str>,
    fields: Fields,
}

impl Instance {
    /// Create an instance of `class` with the given field values.
    pub fn new(class: impl Into<Arc<str>>, fields: impl IntoIterator<Item = Value>) -> Self {
        Self {
            class: class.into(),
            fields: fields.into_iter().collect(),
        }
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class
    }

    #[inline]
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    #[inline]
    pub fn field(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }
}
