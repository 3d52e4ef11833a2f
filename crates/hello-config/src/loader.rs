//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::file::{parse_format, parse_level, validate_name, ConfigFile};
use crate::logging::{LogFormat, LogLevel};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "hello-bridge.toml";

const DEFAULT_LIBRARY: &str = "hello";
const DEFAULT_SYMBOL: &str = "main";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.hello-bridge/config.toml) - lowest priority
/// 2. Project config (./hello-bridge.toml) - overrides global
/// 3. Environment variables (HELLO_BRIDGE_*) - overrides project
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Library name or path
    pub library: String,
    /// Exported function name
    pub symbol: String,
    /// Directories searched for the library ahead of the defaults
    pub search_paths: Vec<PathBuf>,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    /// Project config file the values came from, if any
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: DEFAULT_LIBRARY.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            search_paths: Vec::new(),
            log_level: LogLevel::default(),
            log_format: LogFormat::default(),
            source: None,
        }
    }
}

impl Config {
    /// Layer a configuration file over the current values
    fn merge(&mut self, file: &ConfigFile) {
        if let Some(name) = file.library_name() {
            self.library = name.to_string();
        }
        if let Some(symbol) = file.symbol() {
            self.symbol = symbol.to_string();
        }
        // Later files search first
        let mut paths = file.search_paths().to_vec();
        paths.append(&mut self.search_paths);
        self.search_paths = paths;

        if let Some(level) = file.log_level() {
            self.log_level = level;
        }
        if let Some(format) = file.log_format() {
            self.log_format = format;
        }
    }

    /// Check if a project config file was found
    pub fn is_project(&self) -> bool {
        self.source.is_some()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use `path` as the global config file instead of ~/.hello-bridge/config.toml
    pub fn with_global_config_path(path: PathBuf) -> Self {
        Self {
            global_config_path: Some(path),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find hello-bridge.toml, then layers it
    /// over the global config and applies environment overrides.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let project = Self::find_project_config(start_dir)?;
        self.build(project)
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let file = ConfigFile::load_from_file(config_path)?;
        self.build(Some((config_path.to_path_buf(), file)))
    }

    fn build(&mut self, project: Option<(PathBuf, ConfigFile)>) -> ConfigResult<Config> {
        let mut config = Config::default();

        if let Some(global) = self.load_global_config()? {
            config.merge(&global);
        }

        if let Some((path, file)) = project {
            config.merge(&file);
            config.source = Some(path);
        }

        apply_overrides(config, |key| env::var(key).ok())
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(start_dir: &Path) -> ConfigResult<Option<(PathBuf, ConfigFile)>> {
        for dir in start_dir.ancestors() {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                let file = ConfigFile::load_from_file(&config_path)?;
                return Ok(Some((config_path, file)));
            }
        }
        Ok(None)
    }

    /// Load global configuration (optional)
    fn load_global_config(&mut self) -> ConfigResult<Option<ConfigFile>> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => match Self::global_config_dir() {
                Ok(dir) => {
                    let path = dir.join("config.toml");
                    self.global_config_path = Some(path.clone());
                    path
                }
                // No home directory: nothing to load
                Err(ConfigError::HomeNotFound) => return Ok(None),
                Err(e) => return Err(e),
            },
        };

        if !path.exists() {
            return Ok(None);
        }

        ConfigFile::load_from_file(&path).map(Some)
    }

    /// Get the global configuration directory (~/.hello-bridge)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".hello-bridge"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply HELLO_BRIDGE_* overrides read through `lookup`
///
/// - HELLO_BRIDGE_LIBRARY
/// - HELLO_BRIDGE_SYMBOL
/// - HELLO_BRIDGE_LOG_LEVEL
/// - HELLO_BRIDGE_LOG_FORMAT
fn apply_overrides(
    mut config: Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<Config> {
    if let Some(library) = lookup("HELLO_BRIDGE_LIBRARY") {
        validate_name("HELLO_BRIDGE_LIBRARY", &library)?;
        config.library = library;
    }

    if let Some(symbol) = lookup("HELLO_BRIDGE_SYMBOL") {
        validate_name("HELLO_BRIDGE_SYMBOL", &symbol)?;
        config.symbol = symbol;
    }

    if let Some(level) = lookup("HELLO_BRIDGE_LOG_LEVEL") {
        config.log_level = parse_level("HELLO_BRIDGE_LOG_LEVEL", &level)?;
    }

    if let Some(format) = lookup("HELLO_BRIDGE_LOG_FORMAT") {
        config.log_format = parse_format("HELLO_BRIDGE_LOG_FORMAT", &format)?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    /// Loader whose global config lives in `dir` (and may not exist)
    fn isolated_loader(dir: &Path) -> ConfigLoader {
        ConfigLoader::with_global_config_path(dir.join("global.toml"))
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    #[serial]
    fn test_defaults_without_any_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = isolated_loader(temp_dir.path())
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert_eq!(config.library, "hello");
        assert_eq!(config.symbol, "main");
        assert!(config.search_paths.is_empty());
        assert!(!config.is_project());
    }

    #[test]
    #[serial]
    fn test_find_config_in_parent() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config_file(
            temp_dir.path(),
            r#"
[library]
name = "greeter"
"#,
        );

        let sub_dir = temp_dir.path().join("subdir");
        fs::create_dir(&sub_dir).unwrap();

        let config = isolated_loader(temp_dir.path())
            .load_from_directory(&sub_dir)
            .unwrap();

        assert_eq!(config.library, "greeter");
        assert_eq!(config.symbol, "main");
        assert_eq!(config.source, Some(config_path));
    }

    #[test]
    #[serial]
    #[cfg(unix)]
    fn test_project_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("global.toml"),
            r#"
[library]
name = "global-lib"
symbol = "global_main"
search_paths = ["/global"]

[logging]
level = "debug"
"#,
        )
        .unwrap();
        let project_dir = temp_dir.path().join("project");
        fs::create_dir(&project_dir).unwrap();
        create_config_file(
            &project_dir,
            r#"
[library]
name = "project-lib"
search_paths = ["vendor"]
"#,
        );

        let config = isolated_loader(temp_dir.path())
            .load_from_directory(&project_dir)
            .unwrap();

        assert_eq!(config.library, "project-lib");
        assert_eq!(config.symbol, "global_main");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(
            config.search_paths,
            vec![project_dir.join("vendor"), PathBuf::from("/global")]
        );
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
[logging]
format = "json"
"#,
        )
        .unwrap();

        let config = isolated_loader(temp_dir.path())
            .load_from_file(&path)
            .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.source, Some(path));
    }

    #[test]
    #[serial]
    fn test_invalid_project_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(temp_dir.path(), "[library]\nname = \"\"\n");

        let result = isolated_loader(temp_dir.path()).load_from_directory(temp_dir.path());
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_overrides_replace_values() {
        let config = apply_overrides(
            Config::default(),
            vars(&[
                ("HELLO_BRIDGE_LIBRARY", "/opt/hello/libhello.so"),
                ("HELLO_BRIDGE_SYMBOL", "greet"),
                ("HELLO_BRIDGE_LOG_LEVEL", "trace"),
                ("HELLO_BRIDGE_LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.library, "/opt/hello/libhello.so");
        assert_eq!(config.symbol, "greet");
        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let result = apply_overrides(
            Config::default(),
            vars(&[("HELLO_BRIDGE_LOG_LEVEL", "chatty")]),
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "HELLO_BRIDGE_LOG_LEVEL"
        ));
    }

    #[test]
    #[serial]
    fn test_env_override_symbol() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(temp_dir.path(), "[library]\nsymbol = \"from_file\"\n");

        env::set_var("HELLO_BRIDGE_SYMBOL", "from_env");
        let result = isolated_loader(temp_dir.path()).load_from_directory(temp_dir.path());
        env::remove_var("HELLO_BRIDGE_SYMBOL");

        assert_eq!(result.unwrap().symbol, "from_env");
    }
}
