//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use super::error::ConfigError;
use super::manifest::{DeclarationDef, DeclarationError};
use crate::filter::Declaration;
use crate::registry::PredicateRegistry;
use permgate_types::PermissionValue;
use serde::{Deserialize, Serialize};

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers.
///
/// # Example
///
/// ```
/// use permgate_runtime::config::GateConfig;
///
/// let config = GateConfig::from_toml(r#"
/// granted = ["editor", "viewer"]
///
/// [[declarations]]
/// kind = "resource"
/// name = "dashboard"
/// "#).unwrap();
///
/// assert!(!config.debug);
/// assert_eq!(config.declarations.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    /// Enable debug logging.
    pub debug: bool,

    /// Permissions granted to the actor when no external authority is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granted: Option<PermissionValue<String>>,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Declarations, in evaluation order.
    pub declarations: Vec<DeclarationDef>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when neither a CLI flag nor `RUST_LOG`
    /// sets one (e.g. `"info"` or `"permgate_core=trace"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl GateConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Scalar values from `other` override values in `self` only if they
    /// differ from the default. Declarations accumulate: one whose name
    /// matches an existing declaration replaces it in place, others are
    /// appended.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.debug != default.debug {
            self.debug = other.debug;
        }
        if other.granted.is_some() {
            self.granted.clone_from(&other.granted);
        }
        if other.logging.level.is_some() {
            self.logging.level.clone_from(&other.logging.level);
        }

        for def in &other.declarations {
            match self
                .declarations
                .iter_mut()
                .find(|existing| existing.name() == def.name())
            {
                Some(existing) => *existing = def.clone(),
                None => self.declarations.push(def.clone()),
            }
        }
    }

    /// Validates every declaration.
    ///
    /// Returns all validation errors (not just the first one).
    #[must_use]
    pub fn validate_declarations(
        &self,
        registry: &PredicateRegistry<String>,
    ) -> Vec<DeclarationError> {
        self.declarations
            .iter()
            .filter_map(|d| d.validate(registry).err())
            .collect()
    }

    /// Builds runtime declarations, in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`DeclarationError`].
    pub fn build_declarations(
        &self,
        registry: &PredicateRegistry<String>,
    ) -> Result<Vec<Declaration<String, String>>, DeclarationError> {
        self.declarations.iter().map(|d| d.build(registry)).collect()
    }
}
