//! The instance guard and the `instancemethod` decorator.
//!
//! A guard wraps one callable. It captures the callable (and through it
//! the qualified name and defining scope) when it is built, but resolves
//! the owning class lazily on the first call, because decorators run
//! while the class body is still being evaluated and the class does not
//! exist yet.
//!
//! ```text
//! call(args)
//!   ├─ owner  = cache.get_or_resolve(func)   ── failure ──► FailedInstanceCheck
//!   ├─ recv   = args[0]                      ── missing ──► NotAnInstance
//!   ├─ recv is instance of owner?            ── no ───────► NotAnInstance
//!   └─ func(args)                            (result or error passed through)
//! ```

use crate::cache::{ResolutionCache, global_cache};
use crate::config::{ConfigError, GuardConfig};
use crate::error::GuardError;
use crate::resolver::OwnershipResolver;
use instguard_runtime::{CallArgs, CallResult, ClassObject, FunctionObject, Value};
use std::sync::Arc;

// =============================================================================
// Instance Guard
// =============================================================================

/// Receiver check for one callable.
#[derive(Debug)]
pub struct InstanceGuard {
    func: Arc<FunctionObject>,
    resolver: OwnershipResolver,
    cache: Arc<ResolutionCache>,
}

impl InstanceGuard {
    /// Guard `func` using the global cache and default configuration.
    pub fn new(func: Arc<FunctionObject>) -> Self {
        Self::with_cache(func, global_cache(), GuardConfig::default())
    }

    /// Guard `func` with an explicit cache and configuration.
    pub fn with_cache(
        func: Arc<FunctionObject>,
        cache: Arc<ResolutionCache>,
        config: GuardConfig,
    ) -> Self {
        tracing::trace!(function = %func.qualname(), "instance guard created");
        Self {
            func,
            resolver: OwnershipResolver::new(config),
            cache,
        }
    }

    /// The guarded callable.
    #[inline]
    pub fn function(&self) -> &Arc<FunctionObject> {
        &self.func
    }

    /// The owning class, resolving it on first use.
    pub fn owner(&self) -> Result<Arc<ClassObject>, GuardError> {
        self.cache
            .get_or_resolve(&self.func, &self.resolver)
            .map_err(|failure| failure.to_error(&self.func))
    }

    /// Check that the first positional argument is an instance of the
    /// owner or one of its subclasses. Returns the owner.
    pub fn check(&self, args: &CallArgs) -> Result<Arc<ClassObject>, GuardError> {
        let owner = self.owner()?;
        match args.receiver() {
            Some(receiver) if receiver.is_instance_of(&owner) => Ok(owner),
            _ => Err(GuardError::NotAnInstance {
                method: Arc::from(self.func.name()),
                owner: Arc::from(owner.name()),
            }),
        }
    }

    /// Check the receiver, then call the guarded callable with the same
    /// arguments.
    pub fn call(&self, args: &CallArgs) -> CallResult<Value> {
        self.check(args)?;
        self.func.call(args)
    }

    /// Turn the guard into a callable that stands in for the original.
    ///
    /// The result keeps the original's name and qualified name and
    /// records it as wrapped, so decorators applied on top still resolve.
    pub fn into_function(self) -> Arc<FunctionObject> {
        let func = self.func.clone();
        FunctionObject::decorating(&func, move |args| self.call(args))
    }
}

// =============================================================================
// Decorator
// =============================================================================

/// Guard `func` with the global cache and default configuration.
///
/// ```text
/// module
///     .class_body("Class")
///     .def_decorated("method", instancemethod, body)
///     .finish()?;
/// ```
pub fn instancemethod(func: Arc<FunctionObject>) -> Arc<FunctionObject> {
    InstanceGuard::new(func).into_function()
}

/// Decorator with an injected cache or configuration.
#[derive(Debug, Clone)]
pub struct InstanceMethod {
    cache: Arc<ResolutionCache>,
    config: GuardConfig,
}

impl InstanceMethod {
    /// Decorator using the global cache and default configuration.
    pub fn new() -> Self {
        Self {
            cache: global_cache(),
            config: GuardConfig::default(),
        }
    }

    /// Decorator configured from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new().with_config(GuardConfig::from_env()?))
    }

    /// Use `cache` instead of the global cache.
    pub fn with_cache(mut self, cache: Arc<ResolutionCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Use `config` for resolution.
    pub fn with_config(mut self, config: GuardConfig) -> Self {
        self.config = config;
        self
    }

    /// The cache guards built by this decorator share.
    #[inline]
    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Build a guard for `func`.
    pub fn guard(&self, func: Arc<FunctionObject>) -> InstanceGuard {
        InstanceGuard::with_cache(func, self.cache.clone(), self.config.clone())
    }

    /// Guard `func`.
    pub fn decorate(&self, func: Arc<FunctionObject>) -> Arc<FunctionObject> {
        self.guard(func).into_function()
    }

    /// This decorator as a closure for definition-time application.
    pub fn decorator(&self) -> impl FnOnce(Arc<FunctionObject>) -> Arc<FunctionObject> + 'static {
        let this = self.clone();
        move |func| this.decorate(func)
    }
}

impl Default for InstanceMethod {
    fn default() -> Self {
        Self::new()
    }
}
