//! Runtime values.
//!
//! Primitive values compare structurally; classes, instances and
//! functions compare by identity.

use crate::object::class::ClassObject;
use crate::object::instance::Instance;
use crate::types::function::FunctionObject;
use std::fmt;
use std::sync::Arc;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex { re: f64, im: f64 },
    Str(Arc<str>),
    Bytes(Arc<[u8]>),
    List(Arc<[Value]>),
    Tuple(Arc<[Value]>),
    Dict(Arc<[(Value, Value)]>),
    Set(Arc<[Value]>),
    Range { start: i64, stop: i64, step: i64 },
    Class(Arc<ClassObject>),
    Instance(Arc<Instance>),
    Function(Arc<FunctionObject>),
}

impl Value {
    /// Name of the value's type, as shown in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Complex { .. } => "complex",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Dict(_) => "dict",
            Self::Set(_) => "set",
            Self::Range { .. } => "range",
            Self::Class(_) => "type",
            Self::Instance(instance) => instance.class().name(),
            Self::Function(_) => "function",
        }
    }

    /// Nominal subtype check: is this value an instance of `class` or of
    /// one of its subclasses?
    ///
    /// Only `Instance` values can satisfy the check. A class object is
    /// never an instance of a user class.
    #[inline]
    pub fn is_instance_of(&self, class: &ClassObject) -> bool {
        match self {
            Self::Instance(instance) => instance.class().is_subclass_of(class),
            _ => false,
        }
    }

    /// Class object, if this value is one.
    #[inline]
    pub fn as_class(&self) -> Option<&Arc<ClassObject>> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Function object, if this value is one.
    #[inline]
    pub fn as_function(&self) -> Option<&Arc<FunctionObject>> {
        match self {
            Self::Function(func) => Some(func),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Complex { re: ar, im: ai }, Self::Complex { re: br, im: bi }) => {
                ar == br && ai == bi
            }
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a == b,
            (
                Self::Range {
                    start: a0,
                    stop: a1,
                    step: a2,
                },
                Self::Range {
                    start: b0,
                    stop: b1,
                    step: b2,
                },
            ) => a0 == b0 && a1 == b1 && a2 == b2,
            (Self::Class(a), Self::Class(b)) => Arc::ptr_eq(a, b),
            (Self::Instance(a), Self::Instance(b)) => Arc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Complex { re, im } => write!(f, "({re}+{im}j)"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Self::List(items) => f.debug_list().entries(items.iter()).finish(),
            Self::Tuple(items) => {
                let mut t = f.debug_tuple("");
                for item in items.iter() {
                    t.field(item);
                }
                t.finish()
            }
            Self::Dict(items) => f
                .debug_map()
                .entries(items.iter().map(|(k, v)| (k, v)))
                .finish(),
            Self::Set(items) => f.debug_set().entries(items.iter()).finish(),
            Self::Range { start, stop, step } => write!(f, "range({start}, {stop}, {step})"),
            Self::Class(class) => write!(f, "<class '{}'>", class.qualname()),
            Self::Instance(instance) => write!(f, "<{} object>", instance.class().qualname()),
            Self::Function(func) => write!(f, "<function {}>", func.qualname()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s.into())
    }
}

impl From<Arc<ClassObject>> for Value {
    fn from(class: Arc<ClassObject>) -> Self {
        Self::Class(class)
    }
}

impl From<Arc<Instance>> for Value {
    fn from(instance: Arc<Instance>) -> Self {
        Self::Instance(instance)
    }
}

impl From<Arc<FunctionObject>> for Value {
    fn from(func: Arc<FunctionObject>) -> Self {
        Self::Function(func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_equality() {
        assert_eq!(Value::Int(3), Value::from(3i64));
        assert_eq!(Value::from("a"), Value::Str("a".into()));
        assert_ne!(Value::Int(1), Value::Bool(true));
        assert_ne!(Value::None, Value::Tuple(Arc::from(Vec::new())));
    }

    #[test]
    fn test_object_identity_equality() {
        let a = ClassObject::new_simple("A");
        let b = ClassObject::new_simple("A");
        assert_eq!(Value::Class(a.clone()), Value::Class(a.clone()));
        assert_ne!(Value::Class(a), Value::Class(b));
    }

    #[test]
    fn test_type_names() {
        let class = ClassObject::new_simple("Widget");
        let instance = class.new_instance();
        assert_eq!(Value::None.type_name(), "NoneType");
        assert_eq!(Value::Class(class).type_name(), "type");
        assert_eq!(Value::Instance(instance).type_name(), "Widget");
    }

    #[test]
    fn test_primitives_are_never_instances() {
        let class = ClassObject::new_simple("Widget");
        for value in [
            Value::None,
            Value::Int(0),
            Value::Float(0.0),
            Value::from(""),
            Value::Class(class.clone()),
        ] {
            assert!(!value.is_instance_of(&class), "{value:?}");
        }
        assert!(Value::Instance(class.new_instance()).is_instance_of(&class));
    }
}
