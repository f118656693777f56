//! Accessor policy configuration.
//!
//! Resolved once and handed to the [`AccessorFactory`](crate::AccessorFactory);
//! nothing on the call path reads the environment.
//!
//! | Variable | Field | Values |
//! |----------|-------|--------|
//! | `PRISM_REFLECT_NO_INFLATION` | `no_inflation` | truthy / falsy |
//! | `PRISM_REFLECT_INFLATION_THRESHOLD` | `inflation_threshold` | integer > 0 |
//! | `PRISM_REFLECT_FIXED_STRATEGY` | `fixed_strategy` | `generic`, `specialized` |
//! | `PRISM_REFLECT_NATIVE_ONLY` | `native_only` | truthy / falsy |

use crate::error::ConfigError;

pub const ENV_NO_INFLATION: &str = "PRISM_REFLECT_NO_INFLATION";
pub const ENV_INFLATION_THRESHOLD: &str = "PRISM_REFLECT_INFLATION_THRESHOLD";
pub const ENV_FIXED_STRATEGY: &str = "PRISM_REFLECT_FIXED_STRATEGY";
pub const ENV_NATIVE_ONLY: &str = "PRISM_REFLECT_NATIVE_ONLY";

/// Calls before an adaptive accessor promotes to a specialized invoker.
pub const DEFAULT_INFLATION_THRESHOLD: u32 = 15;

/// Strategy used for every call when inflation is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixedStrategy {
    /// Link a specialized invoker when the accessor is built.
    #[default]
    Specialized,
    /// Never link; always use the generic invoker.
    Generic,
}

/// Policy for building constructor accessors.
///
/// # Example
///
/// ```
/// use prism_reflect::ReflectionConfig;
///
/// let config = ReflectionConfig::default().with_inflation_threshold(100);
/// assert!(config.inflation_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionConfig {
    /// Disable adaptive promotion; accessors use `fixed_strategy` forever.
    ///
    /// Default: false
    pub no_inflation: bool,

    /// Calls an adaptive accessor makes through the generic invoker before
    /// it links a specialized one. Promotion happens on the first call
    /// after the count exceeds this value.
    ///
    /// Default: 15
    pub inflation_threshold: u32,

    /// Strategy used when `no_inflation` is set.
    ///
    /// Default: `Specialized`
    pub fixed_strategy: FixedStrategy,

    /// Route every accessor through the native fallback entry.
    ///
    /// Default: false
    pub native_only: bool,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            no_inflation: false,
            inflation_threshold: DEFAULT_INFLATION_THRESHOLD,
            fixed_strategy: FixedStrategy::default(),
            native_only: false,
        }
    }
}

impl ReflectionConfig {
    /// Configuration that promotes after a single generic call.
    pub fn for_testing() -> Self {
        Self {
            inflation_threshold: 1,
            ..Self::default()
        }
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read overrides through `lookup`; unset variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_NO_INFLATION) {
            config.no_inflation = parse_bool(ENV_NO_INFLATION, &value)?;
        }
        if let Some(value) = lookup(ENV_INFLATION_THRESHOLD) {
            config.inflation_threshold =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Malformed {
                        var: ENV_INFLATION_THRESHOLD,
                        value: value.clone(),
                    })?;
        }
        if let Some(value) = lookup(ENV_FIXED_STRATEGY) {
            let strategy = value.trim().to_ascii_lowercase();
            config.fixed_strategy = match strategy.as_str() {
                "generic" => FixedStrategy::Generic,
                "specialized" => FixedStrategy::Specialized,
                _ => {
                    return Err(ConfigError::Malformed {
                        var: ENV_FIXED_STRATEGY,
                        value,
                    });
                }
            };
        }
        if let Some(value) = lookup(ENV_NATIVE_ONLY) {
            config.native_only = parse_bool(ENV_NATIVE_ONLY, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that the factory relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inflation_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        Ok(())
    }

    /// Whether accessors start unpromoted and promote when hot.
    #[inline]
    pub fn inflation_enabled(&self) -> bool {
        !self.no_inflation && !self.native_only
    }

    #[must_use]
    pub fn with_no_inflation(mut self, no_inflation: bool) -> Self {
        self.no_inflation = no_inflation;
        self
    }

    #[must_use]
    pub fn with_inflation_threshold(mut self, threshold: u32) -> Self {
        self.inflation_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_fixed_strategy(mut self, strategy: FixedStrategy) -> Self {
        self.fixed_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_native_only(mut self, native_only: bool) -> Self {
        self.native_only = native_only;
        self
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "off" | "no" => Ok(false),
        "1" | "true" | "on" | "yes" => Ok(true),
        _ => Err(ConfigError::Malformed {
            var,
            value: value.to_string(),
        }),
    }
}
