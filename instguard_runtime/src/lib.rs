//! Dynamic object model hosting the instguard receiver guard.
//!
//! This crate provides:
//! - `Value`, the tagged runtime value passed to and returned from calls
//! - Class objects with C3 method resolution order and attribute dicts
//! - Instances with per-object attribute storage and method binding
//! - Function objects carrying a qualified-name path, a defining scope
//!   and an optional `wraps` link to the callable they delegate to
//! - Namespaces (module and frame scopes) with a by-class-name index
//! - A class-body evaluator that applies decorators before binding

pub mod call;
pub mod object;
pub mod types;
pub mod value;

// Re-export commonly used items
pub use call::{CallArgs, CallError, CallResult, NativeFn};
pub use object::class::{ClassDict, ClassFlags, ClassObject};
pub use object::class_body::{ClassBody, Decorator};
pub use object::instance::Instance;
pub use object::mro::{ClassError, ClassId, Mro};
pub use object::namespace::{Namespace, ScopeKind};
pub use types::function::{FunctionId, FunctionObject};
pub use types::qualname::{LOCALS_MARKER, QualName, QualNameError};
pub use value::Value;
