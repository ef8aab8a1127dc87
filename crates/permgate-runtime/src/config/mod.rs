//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌─────────────────────────────────────────────┐
//! │  1. Environment Variables (PERMGATE_*)      │  Runtime override
//! ├─────────────────────────────────────────────┤
//! │  2. Project Config (.permgate/config.toml)  │  Project-specific
//! ├─────────────────────────────────────────────┤
//! │  3. Global Config (~/.permgate/config.toml) │  User defaults
//! ├─────────────────────────────────────────────┤
//! │  4. Default Values (compile-time)           │  Fallback
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `PERMGATE_DEBUG` | `debug` | bool |
//! | `PERMGATE_GRANTED` | `granted` | comma list (one item is a scalar) |
//! | `PERMGATE_LOG_LEVEL` | `logging.level` | String |
//!
//! # Example Configuration
//!
//! ```toml
//! # <project>/.permgate/config.toml
//!
//! granted = ["editor", "viewer"]
//!
//! [logging]
//! level = "info"
//!
//! [[declarations]]
//! kind = "resource"
//! name = "dashboard"
//!
//! [[declarations]]
//! kind = "with_permission"
//! name = "admin-area"
//! value = "admin"
//! resources = ["users", "settings"]
//! ```

mod error;
mod loader;
mod manifest;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use manifest::{ActionDef, BranchDef, DeclarationDef, DeclarationError};
pub use types::{GateConfig, LoggingConfig};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(PROJECT_CONFIG_DIR)
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join(PROJECT_CONFIG_FILE)
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".permgate";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
