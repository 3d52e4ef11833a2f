//! Dynamic library loading for FFI
//!
//! Provides cross-platform dynamic library loading using `libloading`.
//! Handles platform-specific library naming conventions and search paths.

use libloading::Library;
use std::collections::HashMap;
use std::ffi::{c_void, OsString};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Library loading errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Library file not found in search paths or by the dynamic linker
    #[error("Library not found: {name} ({reason})")]
    LibraryNotFound { name: String, reason: String },

    /// Symbol not found in library
    #[error("Symbol '{symbol}' not found in library '{library}' ({reason})")]
    SymbolNotFound {
        library: String,
        symbol: String,
        reason: String,
    },

    /// Library file exists but the dynamic linker rejected it
    #[error("Failed to load library {}: {reason}", .path.display())]
    LoadFailed { path: PathBuf, reason: String },
}

/// Where a library was found
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LibraryLocation {
    /// A concrete file on disk
    Path(PathBuf),
    /// A bare file name handed to the platform dynamic linker
    System(OsString),
}

impl LibraryLocation {
    fn as_os_str(&self) -> &std::ffi::OsStr {
        match self {
            LibraryLocation::Path(path) => path.as_os_str(),
            LibraryLocation::System(name) => name.as_os_str(),
        }
    }
}

/// Dynamic library loader with caching and platform-specific path resolution
///
/// Each library is loaded at most once; later `load` calls for the same name
/// return the cached handle. Libraries stay loaded until the loader is dropped.
///
/// # Safety
///
/// Loading dynamic libraries is inherently unsafe. The loaded code runs in the
/// same process and can perform arbitrary operations.
pub struct LibraryLoader {
    /// Loaded libraries by location
    loaded: HashMap<LibraryLocation, Library>,
    /// Resolved location for each requested name
    resolved: HashMap<String, LibraryLocation>,
    /// Directories searched before falling back to the dynamic linker
    search_paths: Vec<PathBuf>,
}

impl LibraryLoader {
    /// Create a new library loader with default search paths
    pub fn new() -> Self {
        Self::with_search_paths(Vec::new())
    }

    /// Create a loader that searches `paths` (in order) ahead of the defaults
    pub fn with_search_paths(paths: Vec<PathBuf>) -> Self {
        let mut search_paths = paths;
        search_paths.extend(Self::default_search_paths());
        Self {
            loaded: HashMap::new(),
            resolved: HashMap::new(),
            search_paths,
        }
    }

    /// Platform-specific default library search paths
    ///
    /// The current working directory comes first. System directories are
    /// left to the dynamic linker fallback.
    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }

        #[cfg(target_os = "macos")]
        {
            paths.push(PathBuf::from("/opt/homebrew/lib"));
        }

        paths
    }

    /// Shared library extensions recognised on this platform
    fn library_extensions() -> &'static [&'static str] {
        if cfg!(target_os = "windows") {
            &["dll"]
        } else if cfg!(target_os = "macos") {
            &["dylib", "so"]
        } else {
            &["so"]
        }
    }

    /// Whether `name` is already a library file name such as `libhello.so`
    fn is_library_file_name(name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                Self::library_extensions()
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
    }

    /// Candidate file names for a library name, in priority order
    ///
    /// A name that already carries a library extension is used unchanged.
    /// Otherwise:
    /// - Linux: lib{name}.so, {name}.so
    /// - macOS: lib{name}.dylib, lib{name}.so, {name}.dylib, {name}.so
    /// - Windows: {name}.dll, lib{name}.dll
    fn candidate_file_names(name: &str) -> Vec<String> {
        if Self::is_library_file_name(name) {
            return vec![name.to_string()];
        }

        let extensions = Self::library_extensions();

        let prefixes: &[&str] = if cfg!(target_os = "windows") {
            &["", "lib"]
        } else {
            &["lib", ""]
        };

        let mut names = Vec::new();
        for prefix in prefixes {
            for ext in extensions {
                names.push(format!("{}{}.{}", prefix, name, ext));
            }
        }
        names
    }

    /// Resolve a library name to a file in the search paths
    ///
    /// Accepts an existing path (absolute, or containing a separator) as-is.
    pub fn resolve_library_path(&self, name: &str) -> Option<PathBuf> {
        let path = Path::new(name);
        if (path.is_absolute() || path.components().count() > 1) && path.is_file() {
            return Some(path.to_path_buf());
        }

        let candidates = Self::candidate_file_names(name);
        for search_path in &self.search_paths {
            for filename in &candidates {
                let full_path = search_path.join(filename);
                if full_path.is_file() {
                    return Some(full_path);
                }
            }
        }

        None
    }

    /// Load a library by name or path
    ///
    /// Resolution order: explicit path, search paths, then the platform
    /// dynamic linker by canonical file name (honours `LD_LIBRARY_PATH`,
    /// `DYLD_LIBRARY_PATH` or `PATH`). Returns the cached instance when the
    /// name was loaded before.
    ///
    /// # Safety
    ///
    /// Loading a dynamic library executes its initialization code. The caller
    /// must ensure the library is trusted.
    pub fn load(&mut self, name: &str) -> Result<&Library, LoadError> {
        if let Some(location) = self.resolved.get(name).cloned() {
            tracing::debug!(library = name, "library already loaded");
            return Ok(&self.loaded[&location]);
        }

        let (location, library) = match self.resolve_library_path(name) {
            Some(path) => {
                tracing::debug!(library = name, path = %path.display(), "resolved library path");
                let library = unsafe { Library::new(&path) }.map_err(|e| LoadError::LoadFailed {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                (LibraryLocation::Path(path), library)
            }
            None => {
                let filename = if Self::is_library_file_name(name) {
                    OsString::from(name)
                } else {
                    libloading::library_filename(name)
                };
                tracing::debug!(
                    library = name,
                    filename = %filename.to_string_lossy(),
                    "not in search paths, asking the dynamic linker"
                );
                let library =
                    unsafe { Library::new(&filename) }.map_err(|e| LoadError::LibraryNotFound {
                        name: name.to_string(),
                        reason: e.to_string(),
                    })?;
                (LibraryLocation::System(filename), library)
            }
        };

        tracing::info!(
            library = name,
            location = %location.as_os_str().to_string_lossy(),
            "loaded native library"
        );

        // Two names can resolve to the same file; keep the first handle
        let library = self.loaded.entry(location.clone()).or_insert(library);
        self.resolved.insert(name.to_string(), location);
        Ok(library)
    }

    /// Look up the address of an exported symbol in a loaded library
    ///
    /// The library must have been loaded with `load()` first.
    ///
    /// # Safety
    ///
    /// The returned pointer is only valid while the library stays loaded.
    /// Nothing is known about its type; the caller must cast it to the
    /// correct function signature.
    pub unsafe fn lookup(
        &self,
        library_name: &str,
        symbol_name: &str,
    ) -> Result<*const (), LoadError> {
        let library = self
            .resolved
            .get(library_name)
            .and_then(|location| self.loaded.get(location))
            .ok_or_else(|| LoadError::LibraryNotFound {
                name: library_name.to_string(),
                reason: "not loaded - call load() first".to_string(),
            })?;

        let symbol = library
            .get::<*const c_void>(symbol_name.as_bytes())
            .map_err(|e| LoadError::SymbolNotFound {
                library: library_name.to_string(),
                symbol: symbol_name.to_string(),
                reason: e.to_string(),
            })?;

        let ptr = *symbol as *const ();
        if ptr.is_null() {
            return Err(LoadError::SymbolNotFound {
                library: library_name.to_string(),
                symbol: symbol_name.to_string(),
                reason: "symbol address is null".to_string(),
            });
        }

        tracing::debug!(library = library_name, symbol = symbol_name, "resolved symbol");
        Ok(ptr)
    }

    /// Add a custom search path (prepended to search list)
    pub fn add_search_path(&mut self, path: PathBuf) {
        self.search_paths.insert(0, path);
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Whether `name` has already been loaded by this loader
    pub fn is_loaded(&self, name: &str) -> bool {
        self.resolved.contains_key(name)
    }

    /// Get the number of loaded libraries
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }
}

impl Default for LibraryLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_search_paths_start_with_cwd() {
        let paths = LibraryLoader::default_search_paths();
        if let Ok(cwd) = std::env::current_dir() {
            assert_eq!(paths[0], cwd);
        }
    }

    #[test]
    fn test_candidate_file_names() {
        let names = LibraryLoader::candidate_file_names("hello");

        #[cfg(target_os = "linux")]
        assert_eq!(names, vec!["libhello.so", "hello.so"]);

        #[cfg(target_os = "macos")]
        assert_eq!(
            names,
            vec!["libhello.dylib", "libhello.so", "hello.dylib", "hello.so"]
        );

        #[cfg(target_os = "windows")]
        assert_eq!(names, vec!["hello.dll", "libhello.dll"]);
    }

    #[test]
    fn test_file_name_is_used_unchanged() {
        let filename = libloading::library_filename("hello");
        let filename = filename.to_str().unwrap();
        assert!(LibraryLoader::is_library_file_name(filename));
        assert_eq!(LibraryLoader::candidate_file_names(filename), vec![filename]);

        assert!(!LibraryLoader::is_library_file_name("hello"));
        assert!(!LibraryLoader::is_library_file_name("hello.v2"));
    }

    #[test]
    fn test_resolve_file_name_from_search_path() {
        let dir = TempDir::new().unwrap();
        let filename = libloading::library_filename("hello");
        let lib_path = dir.path().join(&filename);
        std::fs::write(&lib_path, b"not really a library").unwrap();

        let loader = LibraryLoader::with_search_paths(vec![dir.path().to_path_buf()]);
        assert_eq!(
            loader.resolve_library_path(filename.to_str().unwrap()),
            Some(lib_path)
        );
    }

    #[test]
    fn test_library_not_found() {
        let mut loader = LibraryLoader::new();
        let result = loader.load("nonexistent_library_xyz");
        assert!(matches!(result, Err(LoadError::LibraryNotFound { .. })));
        assert_eq!(loader.loaded_count(), 0);
        assert!(!loader.is_loaded("nonexistent_library_xyz"));
    }

    #[test]
    fn test_resolve_from_custom_search_path() {
        let dir = TempDir::new().unwrap();
        let filename = &LibraryLoader::candidate_file_names("hello")[0];
        let lib_path = dir.path().join(filename);
        std::fs::write(&lib_path, b"not really a library").unwrap();

        let loader = LibraryLoader::with_search_paths(vec![dir.path().to_path_buf()]);
        assert_eq!(loader.resolve_library_path("hello"), Some(lib_path.clone()));

        let absolute = lib_path.to_str().unwrap();
        assert_eq!(loader.resolve_library_path(absolute), Some(lib_path));
    }

    #[test]
    fn test_existing_file_that_is_not_a_library() {
        let dir = TempDir::new().unwrap();
        let filename = &LibraryLoader::candidate_file_names("hello")[0];
        std::fs::write(dir.path().join(filename), b"garbage").unwrap();

        let mut loader = LibraryLoader::with_search_paths(vec![dir.path().to_path_buf()]);
        let result = loader.load("hello");
        assert!(matches!(result, Err(LoadError::LoadFailed { .. })));
    }

    #[test]
    fn test_lookup_before_load() {
        let loader = LibraryLoader::new();
        let result = unsafe { loader.lookup("hello", "main") };
        assert!(matches!(result, Err(LoadError::LibraryNotFound { .. })));
    }

    #[test]
    fn test_loader_starts_empty() {
        let loader = LibraryLoader::new();
        assert_eq!(loader.loaded_count(), 0);
    }

    #[test]
    fn test_add_custom_search_path() {
        let mut loader = LibraryLoader::new();
        let custom_path = PathBuf::from("/custom/path");
        loader.add_search_path(custom_path.clone());

        // Custom path should be first
        assert_eq!(loader.search_paths()[0], custom_path);
    }
}
