//! Call arguments and call errors.
//!
//! Every callable in the runtime is a native closure taking `&CallArgs`
//! and returning `CallResult<Value>`. Errors raised by a callable body
//! travel back to the caller untouched; `CallError::Raised` carries
//! errors defined outside this crate (such as the guard's own errors).

use crate::value::Value;
use smallvec::SmallVec;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

// =============================================================================
// Native Function Body
// =============================================================================

/// Body of a function object.
pub type NativeFn = Arc<dyn Fn(&CallArgs) -> CallResult<Value> + Send + Sync>;

// =============================================================================
// Call Errors
// =============================================================================

/// Errors raised while calling into the runtime.
#[derive(Debug, Clone, Error)]
pub enum CallError {
    /// Attribute lookup failed. `owner` describes the object searched.
    #[error("{owner} has no attribute '{attr}'")]
    AttributeError { owner: Arc<str>, attr: Arc<str> },

    /// The looked-up attribute cannot be called.
    #[error("'{type_name}' object is not callable")]
    NotCallable { type_name: Arc<str> },

    /// Generic type error raised by a function body.
    #[error("{message}")]
    TypeError { message: String },

    /// An error defined by another crate, propagated unchanged.
    #[error("{0}")]
    Raised(Arc<dyn StdError + Send + Sync + 'static>),
}

impl CallError {
    /// Wrap an arbitrary error so it can travel through a call.
    pub fn raised<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Raised(Arc::new(err))
    }

    /// Build a `TypeError`.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError {
            message: message.into(),
        }
    }

    /// Recover a typed error previously wrapped with [`CallError::raised`].
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match self {
            Self::Raised(err) => err.as_ref().downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Result type for call operations.
pub type CallResult<T> = Result<T, CallError>;

// =============================================================================
// Call Arguments
// =============================================================================

/// Positional and keyword arguments of a single call.
///
/// Most calls carry a receiver plus a couple of arguments, so both lists
/// stay inline.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: SmallVec<[Value; 4]>,
    keywords: SmallVec<[(Arc<str>, Value); 2]>,
}

impl CallArgs {
    /// Empty argument list.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from positional arguments only.
    pub fn positional<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            positional: values.into_iter().collect(),
            keywords: SmallVec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a keyword argument.
    pub fn kwarg(mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.keywords.push((name.into(), value.into()));
        self
    }

    /// Arguments with `receiver` inserted in front (method binding).
    pub fn bind(&self, receiver: Value) -> Self {
        let mut positional = SmallVec::with_capacity(self.positional.len() + 1);
        positional.push(receiver);
        positional.extend(self.positional.iter().cloned());
        Self {
            positional,
            keywords: self.keywords.clone(),
        }
    }

    /// First positional argument, if any.
    #[inline]
    pub fn receiver(&self) -> Option<&Value> {
        self.positional.first()
    }

    /// Positional argument at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Keyword argument by name.
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords
            .iter()
            .find(|(key, _)| &**key == name)
            .map(|(_, value)| value)
    }

    /// All keyword arguments in call order.
    #[inline]
    pub fn keywords(&self) -> &[(Arc<str>, Value)] {
        &self.keywords
    }

    /// Number of positional arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// Check if no positional arguments were supplied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
    }
}
