//! Scope enumeration: find the classes visible in a scope under a name.
//!
//! Matching is on the class's own name (`__name__`), not on the binding
//! name, so `Alias = Class` still yields `Class` for the name `"Class"`.
//! Results follow the scope's binding order and each distinct class
//! appears once. When several distinct classes share a name the first one
//! is what a first-match resolver will use.
//!
//! Closures are not enumerated through their captures: a decorator that
//! delegates to another callable records it in `wraps`, and the resolver
//! follows that link instead.

use instguard_runtime::{ClassObject, Namespace};
use smallvec::SmallVec;
use std::sync::Arc;

/// Classes matching a name, in enumeration order.
pub type ClassMatches = SmallVec<[Arc<ClassObject>; 1]>;

/// Classes directly visible in `scope` whose name is `name`.
pub fn find_classes(scope: &Namespace, name: &str) -> ClassMatches {
    let mut matches = ClassMatches::new();
    for class in scope.classes_named(name) {
        if !matches.iter().any(|seen| seen.id() == class.id()) {
            matches.push(class);
        }
    }
    matches
}
