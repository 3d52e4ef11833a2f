//! hello-bridge configuration
//!
//! The only configurable values are the native library name, the exported
//! symbol name, the directories the library name is resolved against, and
//! logging.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults (`hello` / `main`)
//! 2. Global config (~/.hello-bridge/config.toml)
//! 3. Project config (./hello-bridge.toml, found by walking up)
//! 4. Environment variables (HELLO_BRIDGE_*)
//!
//! # Example
//!
//! ```no_run
//! use hello_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("{}::{}", config.library, config.symbol);
//! ```

pub mod file;
pub mod loader;
pub mod logging;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use file::ConfigFile;
pub use loader::{Config, ConfigLoader, CONFIG_FILE_NAME};
pub use logging::{LogFormat, LogLevel};
