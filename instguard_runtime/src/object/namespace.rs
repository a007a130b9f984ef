//! Module and frame namespaces.
//!
//! A namespace holds name → value bindings in definition order. Alongside
//! the bindings it keeps an index from class name (`__name__`, not the
//! binding name) to the positions of bindings holding a class of that
//! name. The index is maintained at definition time so class lookups by
//! name never scan the whole namespace.
//!
//! ```text
//! bindings:  [ Class -> <class Class>, helper -> <function>, Alias -> <class Class> ]
//! classes:   { "Class" -> [0, 2] }
//! ```

use crate::call::{CallArgs, CallResult};
use crate::object::class::ClassObject;
use crate::object::class_body::ClassBody;
use crate::types::function::FunctionObject;
use crate::types::qualname::QualName;
use crate::value::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Kind of scope a namespace models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Module globals.
    Module,
    /// Local variables of a function frame.
    Frame,
}

/// Ordered bindings plus the class-name index.
#[derive(Default)]
struct Bindings {
    entries: Vec<(Arc<str>, Value)>,
    positions: FxHashMap<Arc<str>, usize>,
    classes: FxHashMap<Arc<str>, SmallVec<[usize; 1]>>,
}

impl Bindings {
    fn rebuild_class_index(&mut self) {
        self.classes.clear();
        for (pos, (_, value)) in self.entries.iter().enumerate() {
            if let Value::Class(class) = value {
                self.classes
                    .entry(Arc::from(class.name()))
                    .or_default()
                    .push(pos);
            }
        }
    }
}

/// A module or frame scope.
pub struct Namespace {
    name: Arc<str>,
    kind: ScopeKind,
    bindings: RwLock<Bindings>,
}

impl Namespace {
    /// Create an empty module namespace.
    pub fn module(name: impl Into<Arc<str>>) -> Arc<Self> {
        Self::with_kind(name, ScopeKind::Module)
    }

    /// Create an empty frame namespace.
    pub fn frame(name: impl Into<Arc<str>>) -> Arc<Self> {
        Self::with_kind(name, ScopeKind::Frame)
    }

    fn with_kind(name: impl Into<Arc<str>>, kind: ScopeKind) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            kind,
            bindings: RwLock::new(Bindings::default()),
        })
    }

    /// Namespace name (module name or function qualname).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope kind.
    #[inline]
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    /// Bind `name` to `value`.
    ///
    /// Rebinding an existing name keeps its original position.
    pub fn define(&self, name: impl Into<Arc<str>>, value: Value) {
        let name = name.into();
        let mut bindings = self.bindings.write();

        if let Some(&pos) = bindings.positions.get(&name) {
            let was_class = matches!(bindings.entries[pos].1, Value::Class(_));
            let is_class = matches!(value, Value::Class(_));
            bindings.entries[pos].1 = value;
            if was_class || is_class {
                bindings.rebuild_class_index();
            }
            return;
        }

        let pos = bindings.entries.len();
        if let Value::Class(class) = &value {
            tracing::trace!(namespace = %self.name, binding = %name, class = %class.qualname(), "class bound");
            bindings
                .classes
                .entry(Arc::from(class.name()))
                .or_default()
                .push(pos);
        }
        bindings.positions.insert(name.clone(), pos);
        bindings.entries.push((name, value));
    }

    /// Look up a binding.
    pub fn get(&self, name: &str) -> Option<Value> {
        let bindings = self.bindings.read();
        let pos = *bindings.positions.get(name)?;
        Some(bindings.entries[pos].1.clone())
    }

    /// Remove a binding, returning its value.
    pub fn remove(&self, name: &str) -> Option<Value> {
        let mut bindings = self.bindings.write();
        let pos = bindings.positions.remove(name)?;
        let (_, value) = bindings.entries.remove(pos);
        for p in bindings.positions.values_mut() {
            if *p > pos {
                *p -= 1;
            }
        }
        bindings.rebuild_class_index();
        Some(value)
    }

    /// Check if a name is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.read().positions.contains_key(name)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.read().entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.read().entries.is_empty()
    }

    /// Binding names in definition order.
    pub fn names(&self) -> Vec<Arc<str>> {
        self.bindings
            .read()
            .entries
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Classes whose `__name__` equals `name`, in binding order.
    ///
    /// A class bound under several names appears once per binding.
    pub fn classes_named(&self, name: &str) -> SmallVec<[Arc<ClassObject>; 1]> {
        let bindings = self.bindings.read();
        let Some(positions) = bindings.classes.get(name) else {
            return SmallVec::new();
        };
        positions
            .iter()
            .filter_map(|&pos| bindings.entries[pos].1.as_class().cloned())
            .collect()
    }

    // =========================================================================
    // Definitions
    // =========================================================================

    /// Define a top-level function and bind it.
    pub fn def_function<F>(self: &Arc<Self>, name: &str, body: F) -> Arc<FunctionObject>
    where
        F: Fn(&CallArgs) -> CallResult<Value> + Send + Sync + 'static,
    {
        let func = FunctionObject::new(QualName::top_level(name), self, body);
        self.define(name, Value::Function(func.clone()));
        func
    }

    /// Define a top-level function, pass it through `decorator` and bind
    /// the result.
    pub fn def_decorated<D, F>(
        self: &Arc<Self>,
        name: &str,
        decorator: D,
        body: F,
    ) -> Arc<FunctionObject>
    where
        D: FnOnce(Arc<FunctionObject>) -> Arc<FunctionObject>,
        F: Fn(&CallArgs) -> CallResult<Value> + Send + Sync + 'static,
    {
        let func = decorator(FunctionObject::new(QualName::top_level(name), self, body));
        self.define(name, Value::Function(func.clone()));
        func
    }

    /// Start evaluating a top-level class body in this namespace.
    pub fn class_body(self: &Arc<Self>, name: &str) -> ClassBody {
        ClassBody::new(self, QualName::top_level(name))
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_basic() {
        let module = Namespace::module("mod");
        module.define("x", Value::Int(42));
        assert_eq!(module.get("x"), Some(Value::Int(42)));
        assert!(module.get("y").is_none());
        assert_eq!(module.kind(), ScopeKind::Module);
    }

    #[test]
    fn test_definition_order_preserved() {
        let module = Namespace::module("mod");
        module.define("b", Value::Int(1));
        module.define("a", Value::Int(2));
        module.define("b", Value::Int(3));
        // Rebinding keeps the original slot
        let names: Vec<String> = module.names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(module.get("b"), Some(Value::Int(3)));
    }

    #[test]
    fn test_classes_indexed_by_class_name() {
        let module = Namespace::module("mod");
        let first = ClassObject::new_simple("Thing");
        let second = ClassObject::new_simple("Thing");
        module.define("Thing", Value::Class(first.clone()));
        module.define("helper", Value::Int(0));
        module.define("OtherThing", Value::Class(second.clone()));

        let found = module.classes_named("Thing");
        assert_eq!(found.len(), 2);
        assert!(Arc::ptr_eq(&found[0], &first));
        assert!(Arc::ptr_eq(&found[1], &second));

        // Binding names are not class names
        assert!(module.classes_named("OtherThing").is_empty());
        assert!(module.classes_named("helper").is_empty());
    }

    #[test]
    fn test_rebinding_class_updates_index() {
        let module = Namespace::module("mod");
        module.define("Thing", Value::Class(ClassObject::new_simple("Thing")));
        module.define("Thing", Value::Int(1));
        assert!(module.classes_named("Thing").is_empty());
    }

    #[test]
    fn test_remove_updates_positions() {
        let module = Namespace::module("mod");
        let thing = ClassObject::new_simple("Thing");
        module.define("a", Value::Int(1));
        module.define("Thing", Value::Class(thing.clone()));

        assert_eq!(module.remove("a"), Some(Value::Int(1)));
        assert_eq!(module.len(), 1);
        assert_eq!(module.get("Thing"), Some(Value::Class(thing.clone())));
        assert!(Arc::ptr_eq(&module.classes_named("Thing")[0], &thing));
        assert!(module.remove("a").is_none());
    }

    #[test]
    fn test_def_function_binds() {
        let module = Namespace::module("mod");
        let func = module.def_function("free", |_| Ok(Value::Bool(true)));
        assert_eq!(func.qualname().to_string(), "free");
        assert_eq!(module.get("free"), Some(Value::Function(func)));
    }
}
