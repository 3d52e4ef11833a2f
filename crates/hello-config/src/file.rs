//! Configuration file format (hello-bridge.toml)
//!
//! ```toml
//! [library]
//! name = "hello"
//! symbol = "main"
//! search_paths = ["lib"]
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use crate::logging::{LogFormat, LogLevel};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One configuration file, global or project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<LibraryTable>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingTable>,
}

/// `[library]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LibraryTable {
    /// Library name or path (default: "hello")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Exported function to call (default: "main")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    /// Extra directories searched for the library, relative to the file
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_paths: Vec<PathBuf>,
}

/// `[logging]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load and validate a configuration file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;

        if let Some(base) = path.parent() {
            config.anchor_search_paths(base);
        }
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(library) = &self.library {
            if let Some(name) = &library.name {
                validate_name("library.name", name)?;
            }
            if let Some(symbol) = &library.symbol {
                validate_name("library.symbol", symbol)?;
            }
        }

        if let Some(logging) = &self.logging {
            if let Some(level) = &logging.level {
                parse_level("logging.level", level)?;
            }
            if let Some(format) = &logging.format {
                parse_format("logging.format", format)?;
            }
        }

        Ok(())
    }

    /// Make relative search paths relative to `base`
    fn anchor_search_paths(&mut self, base: &Path) {
        if let Some(library) = self.library.as_mut() {
            for path in library.search_paths.iter_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }

    pub fn library_name(&self) -> Option<&str> {
        self.library.as_ref().and_then(|l| l.name.as_deref())
    }

    pub fn symbol(&self) -> Option<&str> {
        self.library.as_ref().and_then(|l| l.symbol.as_deref())
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        self.library
            .as_ref()
            .map(|l| l.search_paths.as_slice())
            .unwrap_or(&[])
    }

    pub fn log_level(&self) -> Option<LogLevel> {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .and_then(LogLevel::parse)
    }

    pub fn log_format(&self) -> Option<LogFormat> {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .and_then(LogFormat::parse)
    }
}

pub(crate) fn validate_name(field: &str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if value.contains('\0') {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "must not contain NUL bytes".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn parse_level(field: &str, value: &str) -> ConfigResult<LogLevel> {
    LogLevel::parse(value).ok_or_else(|| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!(
            "must be one of error, warn, info, debug, trace; got '{}'",
            value
        ),
    })
}

pub(crate) fn parse_format(field: &str, value: &str) -> ConfigResult<LogFormat> {
    LogFormat::parse(value).ok_or_else(|| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!("must be one of auto, text, json; got '{}'", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[library]
name = "hello"
symbol = "main"
search_paths = ["lib", "/opt/hello"]

[logging]
level = "debug"
format = "json"
"#;

        let config: ConfigFile = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.library_name(), Some("hello"));
        assert_eq!(config.symbol(), Some("main"));
        assert_eq!(config.search_paths().len(), 2);
        assert_eq!(config.log_level(), Some(LogLevel::Debug));
        assert_eq!(config.log_format(), Some(LogFormat::Json));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert!(config.search_paths().is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
[library]
name = "hello"
argument = "Bard"
"#;
        assert!(toml::from_str::<ConfigFile>(toml).is_err());
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let toml = r#"
[library]
symbol = ""
"#;
        let config: ConfigFile = toml::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "library.symbol"
        ));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let toml = r#"
[logging]
level = "loud"
"#;
        let config: ConfigFile = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_load_anchors_relative_search_paths() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hello-bridge.toml");
        std::fs::write(
            &path,
            r#"
[library]
search_paths = ["lib", "/abs/dir"]
"#,
        )
        .unwrap();

        let config = ConfigFile::load_from_file(&path).unwrap();
        assert_eq!(
            config.search_paths(),
            &[temp_dir.path().join("lib"), PathBuf::from("/abs/dir")]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigFile::load_from_file(Path::new("/nonexistent/hello-bridge.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hello-bridge.toml");
        std::fs::write(&path, "[library\nname = ").unwrap();

        let result = ConfigFile::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::TomlParseError { .. })));
    }
}
