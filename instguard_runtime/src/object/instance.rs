//! Instance object implementation.
//!
//! An `Instance` is an object of a user-defined class. Attribute lookup
//! checks the instance's own dictionary first and then the class MRO.
//! Functions found on the class are bound: the instance becomes the first
//! positional argument of the call.

use crate::call::{CallArgs, CallError, CallResult};
use crate::object::class::{ClassObject, call_value};
use crate::value::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// An object of a user-defined class.
pub struct Instance {
    class: Arc<ClassObject>,
    dict: RwLock<FxHashMap<Arc<str>, Value>>,
}

impl Instance {
    /// Create an instance with an empty attribute dict.
    pub fn new(class: Arc<ClassObject>) -> Self {
        Self {
            class,
            dict: RwLock::new(FxHashMap::default()),
        }
    }

    /// The instance's class.
    #[inline]
    pub fn class(&self) -> &Arc<ClassObject> {
        &self.class
    }

    /// Look up an attribute: instance dict first, then the class MRO.
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.dict.read().get(name) {
            return Some(value.clone());
        }
        self.class.get_attr(name)
    }

    /// Set an instance attribute.
    pub fn set_attr(&self, name: impl Into<Arc<str>>, value: Value) {
        self.dict.write().insert(name.into(), value);
    }

    /// Call a method through this instance, i.e. `obj.name(*args)`.
    ///
    /// Functions stored on the instance itself are called as-is; functions
    /// found on the class receive the instance as their first argument.
    pub fn call_method(self: &Arc<Self>, name: &str, args: &CallArgs) -> CallResult<Value> {
        let own = self.dict.read().get(name).cloned();
        if let Some(value) = own {
            return call_value(&value, args);
        }

        match self.class.get_attr(name) {
            Some(Value::Function(func)) => func.call(&args.bind(Value::Instance(self.clone()))),
            Some(other) => call_value(&other, args),
            None => Err(CallError::AttributeError {
                owner: Arc::from(format!("'{}' object", self.class.name())),
                attr: Arc::from(name),
            }),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} object>", self.class.qualname())
    }
}
