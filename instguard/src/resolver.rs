//! Ownership resolution.
//!
//! Finds the class that lexically owns a callable from its qualified-name
//! path and defining scope:
//!
//! ```text
//! qualname:  Outer . Inner . method
//!            ^^^^^   ^^^^^   ^^^^^^
//!            head    tail    name
//!
//! 1. head  -> classes named `Outer` in the defining scope
//! 2. tail  -> Outer.Inner           (markers such as `<locals>` skipped)
//! 3. none  -> follow `wraps` and retry on the wrapped callable
//! ```
//!
//! The resolver is pure: it reads scopes and class dicts but never mutates
//! them, and it keeps no state of its own. Memoization is the cache's job.

use crate::config::{GuardConfig, ShadowingPolicy};
use crate::enumerator::find_classes;
use crate::error::ResolutionFailure;
use instguard_runtime::{ClassObject, FunctionObject, QualName, Value};
use std::sync::Arc;

/// Outcome of resolving one callable.
pub type Resolution = Result<Arc<ClassObject>, ResolutionFailure>;

/// Resolves the owning class of callables.
#[derive(Debug, Clone, Default)]
pub struct OwnershipResolver {
    config: GuardConfig,
}

impl OwnershipResolver {
    /// Create a resolver with the given configuration.
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Resolver configuration.
    #[inline]
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Resolve the owner of `func`.
    pub fn resolve(&self, func: &FunctionObject) -> Resolution {
        let resolution = self.resolve_through_wraps(func);
        match &resolution {
            Ok(owner) => tracing::debug!(
                function = %func.qualname(),
                owner = %owner.qualname(),
                "owner resolved"
            ),
            Err(failure) => tracing::debug!(
                function = %func.qualname(),
                ?failure,
                "owner unresolved"
            ),
        }
        resolution
    }

    /// Try `func` lexically, then each callable it wraps in turn.
    fn resolve_through_wraps(&self, func: &FunctionObject) -> Resolution {
        let max_depth = self.config.max_wrap_depth;
        let chain = std::iter::once(func).chain(func.wrap_chain().map(|inner| inner.as_ref()));

        for (depth, current) in chain.enumerate() {
            if depth > max_depth {
                return Err(ResolutionFailure::WrapDepthExceeded { depth: max_depth });
            }
            if let Some(owner) = self.resolve_lexical(current)? {
                return Ok(owner);
            }
        }
        Err(ResolutionFailure::Unowned)
    }

    /// Resolve from `func`'s own path and scope.
    ///
    /// `Ok(None)` means no class matches the head, so the caller may try a
    /// wrapped callable instead.
    fn resolve_lexical(
        &self,
        func: &FunctionObject,
    ) -> Result<Option<Arc<ClassObject>>, ResolutionFailure> {
        let qualname = func.qualname();
        // A bare name has no enclosing class
        if qualname.len() < 2 {
            return Ok(None);
        }
        let head = qualname.head();
        let matches = find_classes(func.scope(), head);
        let Some(first) = matches.first() else {
            return Ok(None);
        };
        if matches.len() > 1 && self.config.shadowing == ShadowingPolicy::Reject {
            return Err(ResolutionFailure::Ambiguous {
                owner: Arc::from(head),
                candidates: matches.len(),
            });
        }

        let mut owner = Value::Class(first.clone());
        for segment in qualname.tail() {
            if QualName::is_marker(segment) {
                continue;
            }
            let Value::Class(class) = &owner else {
                continue;
            };
            owner = class
                .get_attr(segment)
                .ok_or_else(|| ResolutionFailure::MissingAttribute {
                    segment: segment.clone(),
                })?;
        }

        match owner {
            Value::Class(class) => Ok(Some(class)),
            _ => Err(ResolutionFailure::NotAClass),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instguard_runtime::{CallArgs, ClassBody, Namespace};

    fn noop(qualname: &str, scope: &Arc<Namespace>) -> Arc<FunctionObject> {
        FunctionObject::new(QualName::parse(qualname).unwrap(), scope, |_| Ok(Value::None))
    }

    fn method_of(class: &ClassObject, name: &str) -> Arc<FunctionObject> {
        class.get_attr(name).unwrap().as_function().unwrap().clone()
    }

    #[test]
    fn test_resolves_top_level_class() {
        let module = Namespace::module("mod");
        let class = module
            .class_body("Class")
            .def("method", |_| Ok(Value::None))
            .finish()
            .unwrap();

        let owner = OwnershipResolver::default().resolve(&method_of(&class, "method")).unwrap();
        assert!(Arc::ptr_eq(&owner, &class));
    }

    #[test]
    fn test_resolves_nested_class() {
        let module = Namespace::module("mod");
        let outer = module
            .class_body("Outer")
            .nested("Inner", |inner| inner.def("method", |_| Ok(Value::None)))
            .finish()
            .unwrap();
        let inner = outer.get_attr("Inner").unwrap().as_class().unwrap().clone();

        let owner = OwnershipResolver::default().resolve(&method_of(&inner, "method")).unwrap();
        assert!(Arc::ptr_eq(&owner, &inner));
        assert!(!Arc::ptr_eq(&owner, &outer));
    }

    #[test]
    fn test_free_function_unowned() {
        let module = Namespace::module("mod");
        let func = module.def_function("free", |_| Ok(Value::None));
        assert_eq!(
            OwnershipResolver::default().resolve(&func),
            Err(ResolutionFailure::Unowned)
        );
    }

    #[test]
    fn test_function_named_like_class_is_unowned() {
        let module = Namespace::module("mod");
        module.class_body("Thing").finish().unwrap();
        let func = noop("Thing", &module);
        assert_eq!(
            OwnershipResolver::default().resolve(&func),
            Err(ResolutionFailure::Unowned)
        );
    }

    #[test]
    fn test_markers_skipped() {
        let module = Namespace::module("mod");
        let class = module.class_body("Class").finish().unwrap();
        let func = noop("Class.<locals>.helper", &module);

        let owner = OwnershipResolver::default().resolve(&func).unwrap();
        assert!(Arc::ptr_eq(&owner, &class));
    }

    #[test]
    fn test_missing_tail_attribute() {
        let module = Namespace::module("mod");
        module.class_body("Class").finish().unwrap();
        let func = noop("Class.Gone.method", &module);
        assert_eq!(
            OwnershipResolver::default().resolve(&func),
            Err(ResolutionFailure::MissingAttribute {
                segment: "Gone".into()
            })
        );
    }

    #[test]
    fn test_non_class_owner_fails() {
        let module = Namespace::module("mod");
        module
            .class_body("Class")
            .attr("limit", Value::Int(3))
            .finish()
            .unwrap();
        let func = noop("Class.limit.method", &module);
        assert_eq!(
            OwnershipResolver::default().resolve(&func),
            Err(ResolutionFailure::NotAClass)
        );
    }

    #[test]
    fn test_follows_wraps_chain() {
        let module = Namespace::module("mod");
        let class = module
            .class_body("Class")
            .def("method", |_| Ok(Value::None))
            .finish()
            .unwrap();
        let method = method_of(&class, "method");

        let wrapper = FunctionObject::wrapping(
            QualName::parse("null_decorator.<locals>.wrapper").unwrap(),
            &module,
            method.clone(),
            move |args: &CallArgs| method.call(args),
        );

        let owner = OwnershipResolver::default().resolve(&wrapper).unwrap();
        assert!(Arc::ptr_eq(&owner, &class));
    }

    #[test]
    fn test_wrap_depth_bounded() {
        let module = Namespace::module("mod");
        let mut func = noop("free", &module);
        for _ in 0..4 {
            func = FunctionObject::wrapping(
                QualName::parse("deco.<locals>.wrapper").unwrap(),
                &module,
                func,
                |_| Ok(Value::None),
            );
        }

        let resolver = OwnershipResolver::new(GuardConfig {
            max_wrap_depth: 2,
            ..GuardConfig::default()
        });
        assert_eq!(
            resolver.resolve(&func),
            Err(ResolutionFailure::WrapDepthExceeded { depth: 2 })
        );
        assert_eq!(
            OwnershipResolver::default().resolve(&func),
            Err(ResolutionFailure::Unowned)
        );
    }

    #[test]
    fn test_shadowing_policies() {
        let module = Namespace::module("mod");
        let first = module
            .class_body("Thing")
            .def("method", |_| Ok(Value::None))
            .finish()
            .unwrap();
        let method = method_of(&first, "method");
        let second = ClassBody::new(&module, QualName::top_level("Thing")).build().unwrap();
        module.define("OtherThing", Value::Class(second));

        let owner = OwnershipResolver::default().resolve(&method).unwrap();
        assert!(Arc::ptr_eq(&owner, &first));

        assert_eq!(
            OwnershipResolver::new(GuardConfig::strict()).resolve(&method),
            Err(ResolutionFailure::Ambiguous {
                owner: "Thing".into(),
                candidates: 2
            })
        );
    }

    #[test]
    fn test_resolves_after_module_handle_dropped() {
        let class = {
            let module = Namespace::module("temp");
            let class = module
                .class_body("Class")
                .def("method", |_| Ok(Value::None))
                .finish()
                .unwrap();
            class
        };

        let owner = OwnershipResolver::default().resolve(&method_of(&class, "method")).unwrap();
        assert!(Arc::ptr_eq(&owner, &class));
    }
}
