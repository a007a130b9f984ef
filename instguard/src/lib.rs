//! Receiver guard for methods that must only be called on instances.
//!
//! This crate provides:
//! - `instancemethod`, a decorator that rejects calls whose first
//!   positional argument is not an instance of the method's owning class
//! - Ownership resolution from a callable's qualified name and defining
//!   scope, including nested classes and callables wrapped by other
//!   decorators
//! - A concurrent resolution cache keyed by callable identity
//! - Configuration for shadowed class names and `wraps` depth
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   first call   ┌─────────────────┐
//! │  InstanceGuard   │ ─────────────► │ ResolutionCache │
//! │  (per callable)  │ ◄───────────── │   (DashMap)     │
//! └──────────────────┘  owner/failure └────────┬────────┘
//!                                              │ miss
//!                                     ┌────────▼────────┐
//!                                     │OwnershipResolver│
//!                                     └────────┬────────┘
//!                                              │ head
//!                                     ┌────────▼────────┐
//!                                     │ find_classes    │
//!                                     │ (scope index)   │
//!                                     └─────────────────┘
//! ```

pub mod cache;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod guard;
pub mod resolver;

// Re-export commonly used items
pub use cache::{ResolutionCache, global_cache};
pub use config::{ConfigError, GuardConfig, ShadowingPolicy};
pub use enumerator::{ClassMatches, find_classes};
pub use error::{GuardError, ResolutionFailure, guard_error};
pub use guard::{InstanceGuard, InstanceMethod, instancemethod};
pub use resolver::{OwnershipResolver, Resolution};
