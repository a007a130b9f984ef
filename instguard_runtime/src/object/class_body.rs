//! Class body evaluation.
//!
//! Mirrors what happens when a class statement runs: the body's functions
//! are created (and passed through their decorators) before the class
//! object exists, nested class bodies are evaluated in turn, and only then
//! is the class created and bound into its namespace.
//!
//! ```text
//! module.class_body("Class")
//!     .def_decorated("wrapped_method", instancemethod, body)
//!     .nested("Inner", |inner| inner.def("m", body))
//!     .finish()?;        // binds `Class` in `module`
//! ```
//!
//! Decorators therefore only ever see a function's qualified name and
//! defining scope; the owning class can be looked up once `finish` has
//! returned.

use crate::call::{CallArgs, CallResult, NativeFn};
use crate::object::class::{ClassFlags, ClassObject};
use crate::object::mro::ClassError;
use crate::object::namespace::Namespace;
use crate::types::function::FunctionObject;
use crate::types::qualname::QualName;
use crate::value::Value;
use std::sync::Arc;

/// A function decorator applied at definition time.
pub type Decorator = Box<dyn FnOnce(Arc<FunctionObject>) -> Arc<FunctionObject>>;

/// A member of a class body, in source order.
enum Member {
    Method {
        name: Arc<str>,
        decorators: Vec<Decorator>,
        body: NativeFn,
    },
    Attr {
        name: Arc<str>,
        value: Value,
    },
    Nested(ClassBody),
}

/// A class body under evaluation.
pub struct ClassBody {
    scope: Arc<Namespace>,
    qualname: QualName,
    bases: Vec<Arc<ClassObject>>,
    flags: ClassFlags,
    members: Vec<Member>,
}

impl ClassBody {
    /// Start a class body with an explicit qualified name.
    ///
    /// `scope` is the namespace the class statement runs in; functions
    /// defined in the body record it as their defining scope.
    pub fn new(scope: &Arc<Namespace>, qualname: QualName) -> Self {
        let flags = if qualname.has_locals() {
            ClassFlags::LOCAL
        } else {
            ClassFlags::empty()
        };
        Self {
            scope: scope.clone(),
            qualname,
            bases: Vec::new(),
            flags,
            members: Vec::new(),
        }
    }

    /// Add a base class.
    pub fn base(mut self, base: &Arc<ClassObject>) -> Self {
        self.bases.push(base.clone());
        self
    }

    /// Add class flags.
    pub fn flags(mut self, flags: ClassFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Define a class attribute.
    pub fn attr(mut self, name: &str, value: Value) -> Self {
        self.members.push(Member::Attr {
            name: Arc::from(name),
            value,
        });
        self
    }

    /// Define an undecorated method.
    pub fn def<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&CallArgs) -> CallResult<Value> + Send + Sync + 'static,
    {
        self.def_with(name, Vec::new(), body)
    }

    /// Define a method with a single decorator.
    pub fn def_decorated<D, F>(self, name: &str, decorator: D, body: F) -> Self
    where
        D: FnOnce(Arc<FunctionObject>) -> Arc<FunctionObject> + 'static,
        F: Fn(&CallArgs) -> CallResult<Value> + Send + Sync + 'static,
    {
        self.def_with(name, vec![Box::new(decorator)], body)
    }

    /// Define a method with a decorator stack, listed top to bottom as in
    /// source: the last decorator is applied first.
    pub fn def_with<F>(mut self, name: &str, decorators: Vec<Decorator>, body: F) -> Self
    where
        F: Fn(&CallArgs) -> CallResult<Value> + Send + Sync + 'static,
    {
        self.members.push(Member::Method {
            name: Arc::from(name),
            decorators,
            body: Arc::new(body),
        });
        self
    }

    /// Evaluate a nested class body.
    pub fn nested<B>(mut self, name: &str, build: B) -> Self
    where
        B: FnOnce(ClassBody) -> ClassBody,
    {
        let inner = ClassBody::new(&self.scope, self.qualname.child(name)).flags(ClassFlags::NESTED);
        self.members.push(Member::Nested(build(inner)));
        self
    }

    /// Create the class and bind it in the body's namespace.
    pub fn finish(self) -> Result<Arc<ClassObject>, ClassError> {
        let scope = self.scope.clone();
        let class = self.build()?;
        scope.define(class.name(), Value::Class(class.clone()));
        Ok(class)
    }

    /// Create the class without binding it anywhere.
    pub fn build(self) -> Result<Arc<ClassObject>, ClassError> {
        let mut attrs: Vec<(Arc<str>, Value)> = Vec::with_capacity(self.members.len());

        for member in self.members {
            match member {
                Member::Method {
                    name,
                    decorators,
                    body,
                } => {
                    let qualname = self.qualname.child(name.clone());
                    let mut func = FunctionObject::new(qualname, &self.scope, move |args| body(args));
                    for decorator in decorators.into_iter().rev() {
                        func = decorator(func);
                    }
                    attrs.push((name, Value::Function(func)));
                }
                Member::Attr { name, value } => attrs.push((name, value)),
                Member::Nested(inner) => {
                    let class = inner.build()?;
                    attrs.push((Arc::from(class.name()), Value::Class(class)));
                }
            }
        }

        let class = ClassObject::new(self.qualname, &self.bases, self.flags)?;
        for (name, value) in attrs {
            class.set_attr(name, value);
        }
        Ok(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn truthy(_: &CallArgs) -> CallResult<Value> {
        Ok(Value::Bool(true))
    }

    #[test]
    fn test_finish_binds_class() {
        let module = Namespace::module("classes");
        let class = module.class_body("Class").def("method", truthy).finish().unwrap();

        assert_eq!(module.get("Class"), Some(Value::Class(class.clone())));
        let method = class.get_attr("method").unwrap();
        let func = method.as_function().unwrap();
        assert_eq!(func.qualname().to_string(), "Class.method");
        assert!(Arc::ptr_eq(func.scope(), &module));
    }

    #[test]
    fn test_nested_class_qualnames() {
        let module = Namespace::module("classes");
        let outer = module
            .class_body("Outer")
            .nested("Inner", |inner| inner.def("method", truthy))
            .finish()
            .unwrap();

        let inner = outer.get_attr("Inner").unwrap();
        let inner = inner.as_class().unwrap();
        assert_eq!(inner.qualname().to_string(), "Outer.Inner");
        assert!(inner.flags().contains(ClassFlags::NESTED));

        let method = inner.get_attr("method").unwrap();
        assert_eq!(
            method.as_function().unwrap().qualname().to_string(),
            "Outer.Inner.method"
        );
        // Nested classes are not bound at module level
        assert!(!module.contains("Inner"));
    }

    #[test]
    fn test_decorators_apply_bottom_up_before_class_exists() {
        let module = Namespace::module("classes");
        let order = Arc::new(Mutex::new(Vec::new()));

        let tag = |label: &'static str, order: Arc<Mutex<Vec<&'static str>>>| -> Decorator {
            Box::new(move |func: Arc<FunctionObject>| {
                order.lock().unwrap().push(label);
                func
            })
        };

        let before = module.len();
        module
            .class_body("Class")
            .def_with(
                "method",
                vec![tag("outer", order.clone()), tag("inner", order.clone())],
                truthy,
            )
            .finish()
            .unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["inner", "outer"]);
        assert_eq!(module.len(), before + 1);
    }

    #[test]
    fn test_local_class_flagged() {
        let module = Namespace::module("classes");
        let qualname = QualName::top_level("factory").local_child("Local");
        let class = ClassBody::new(&module, qualname).build().unwrap();
        assert!(class.flags().contains(ClassFlags::LOCAL));
        assert!(!module.contains("Local"));
    }

    #[test]
    fn test_subclass_body() {
        let module = Namespace::module("classes");
        let base = module.class_body("Base").def("method", truthy).finish().unwrap();
        let sub = module.class_body("Sub").base(&base).finish().unwrap();

        assert!(sub.is_subclass_of(&base));
        assert!(sub.get_attr("method").is_some());
    }
}
