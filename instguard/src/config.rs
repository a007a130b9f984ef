//! Guard configuration.
//!
//! Settings are resolved once, when a guard is built, and read without
//! locking afterwards. Environment variables:
//!
//! | variable | values | default |
//! |---|---|---|
//! | `INSTGUARD_SHADOWING` | `first`, `reject` | `first` |
//! | `INSTGUARD_MAX_WRAP_DEPTH` | integer ≥ 1 | 64 |

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable selecting the shadowing policy.
pub const ENV_SHADOWING: &str = "INSTGUARD_SHADOWING";
/// Environment variable bounding `wraps` traversal.
pub const ENV_MAX_WRAP_DEPTH: &str = "INSTGUARD_MAX_WRAP_DEPTH";

/// Default bound on `wraps` traversal.
pub const DEFAULT_MAX_WRAP_DEPTH: usize = 64;

// =============================================================================
// Shadowing Policy
// =============================================================================

/// What to do when several distinct classes in the defining scope share
/// the name at the head of a method's qualified name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowingPolicy {
    /// Use the first class in binding order.
    #[default]
    FirstMatch,
    /// Fail resolution with `AmbiguousOwner`.
    Reject,
}

impl FromStr for ShadowingPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first-match" | "first_match" => Ok(Self::FirstMatch),
            "reject" | "strict" => Ok(Self::Reject),
            _ => Err(ConfigError::InvalidShadowing {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ShadowingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstMatch => f.write_str("first"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration shared by a resolver and the guards using it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Handling of same-named classes in the defining scope.
    pub shadowing: ShadowingPolicy,
    /// Maximum number of `wraps` links followed during resolution.
    pub max_wrap_depth: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            shadowing: ShadowingPolicy::FirstMatch,
            max_wrap_depth: DEFAULT_MAX_WRAP_DEPTH,
        }
    }
}

impl GuardConfig {
    /// Configuration that refuses to guess between shadowed classes.
    pub fn strict() -> Self {
        Self {
            shadowing: ShadowingPolicy::Reject,
            ..Self::default()
        }
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`, falling back to defaults for unset
    /// keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_SHADOWING) {
            config.shadowing = value.parse()?;
        }
        if let Some(value) = lookup(ENV_MAX_WRAP_DEPTH) {
            let parsed = value.trim().parse::<usize>();
            config.max_wrap_depth = parsed.map_err(|_| ConfigError::InvalidWrapDepth { value })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_wrap_depth == 0 {
            return Err(ConfigError::InvalidWrapDepth {
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Unknown shadowing policy.
    #[error("invalid INSTGUARD_SHADOWING value '{value}' (expected 'first' or 'reject')")]
    InvalidShadowing { value: String },

    /// Wrap depth is not a positive integer.
    #[error("invalid INSTGUARD_MAX_WRAP_DEPTH value '{value}' (expected an integer >= 1)")]
    InvalidWrapDepth { value: String },
}
