//! Function objects.
//!
//! A function object pairs a native body with the reflection data a
//! decorator needs: its qualified-name path and the scope it was defined
//! in, held strongly like a module's globals. Decorators that delegate to another callable record it
//! in `wraps`, so the wrapped callable stays reachable without inspecting
//! closure captures.

use crate::call::{CallArgs, CallResult, NativeFn};
use crate::object::namespace::Namespace;
use crate::types::qualname::QualName;
use crate::value::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// =============================================================================
// Function Identity
// =============================================================================

/// Global counter for function identities.
static NEXT_FUNCTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a function object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(u64);

impl FunctionId {
    fn allocate() -> Self {
        Self(NEXT_FUNCTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identity value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

// =============================================================================
// Function Object
// =============================================================================

/// A callable with its lexical metadata.
pub struct FunctionObject {
    /// Identity, unique for the process lifetime.
    id: FunctionId,
    /// Qualified-name path (its last segment is the short name).
    qualname: QualName,
    /// Defining module or frame.
    scope: Arc<Namespace>,
    /// Native body.
    body: NativeFn,
    /// Callable this one delegates to, if it was produced by a decorator.
    wraps: Option<Arc<FunctionObject>>,
}

impl FunctionObject {
    /// Create a plain function.
    pub fn new<F>(qualname: QualName, scope: &Arc<Namespace>, body: F) -> Arc<Self>
    where
        F: Fn(&CallArgs) -> CallResult<Value> + Send + Sync + 'static,
    {
        Arc::new(Self {
            id: FunctionId::allocate(),
            qualname,
            scope: scope.clone(),
            body: Arc::new(body),
            wraps: None,
        })
    }

    /// Create a function that delegates to `wrapped` under its own name,
    /// like a decorator that returns an inner closure.
    pub fn wrapping<F>(
        qualname: QualName,
        scope: &Arc<Namespace>,
        wrapped: Arc<FunctionObject>,
        body: F,
    ) -> Arc<Self>
    where
        F: Fn(&CallArgs) -> CallResult<Value> + Send + Sync + 'static,
    {
        Arc::new(Self {
            id: FunctionId::allocate(),
            qualname,
            scope: scope.clone(),
            body: Arc::new(body),
            wraps: Some(wrapped),
        })
    }

    /// Create a function that delegates to `wrapped` and takes over its
    /// name, qualified name and scope.
    pub fn decorating<F>(wrapped: &Arc<FunctionObject>, body: F) -> Arc<Self>
    where
        F: Fn(&CallArgs) -> CallResult<Value> + Send + Sync + 'static,
    {
        Arc::new(Self {
            id: FunctionId::allocate(),
            qualname: wrapped.qualname.clone(),
            scope: wrapped.scope.clone(),
            body: Arc::new(body),
            wraps: Some(wrapped.clone()),
        })
    }

    /// Function identity.
    #[inline]
    pub fn id(&self) -> FunctionId {
        self.id
    }

    /// Short name.
    #[inline]
    pub fn name(&self) -> &str {
        self.qualname.name()
    }

    /// Qualified-name path.
    #[inline]
    pub fn qualname(&self) -> &QualName {
        &self.qualname
    }

    /// Defining scope.
    #[inline]
    pub fn scope(&self) -> &Arc<Namespace> {
        &self.scope
    }

    /// Directly wrapped callable.
    #[inline]
    pub fn wraps(&self) -> Option<&Arc<FunctionObject>> {
        self.wraps.as_ref()
    }

    /// Iterate the chain of wrapped callables, innermost last.
    pub fn wrap_chain(&self) -> impl Iterator<Item = &Arc<FunctionObject>> {
        std::iter::successors(self.wraps.as_ref(), |func| func.wraps.as_ref())
    }

    /// Call the function.
    #[inline]
    pub fn call(&self, args: &CallArgs) -> CallResult<Value> {
        (self.body)(args)
    }
}

impl fmt::Debug for FunctionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionObject")
            .field("id", &self.id)
            .field("qualname", &self.qualname)
            .field("wraps", &self.wraps.as_ref().map(|w| w.id))
            .finish()
    }
}
