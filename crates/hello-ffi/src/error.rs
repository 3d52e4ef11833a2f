//! Top-level invocation errors

use crate::caller::CallError;
use crate::loader::LoadError;
use crate::signature::SignatureError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a native entry invocation
///
/// Every variant indicates a misconfigured deployment; none is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// The named library is not in the search path
    #[error("native library '{name}' not found: {reason}")]
    LibraryNotFound { name: String, reason: String },

    /// The library file was found but could not be loaded
    #[error("native library {} could not be loaded: {reason}", .path.display())]
    LoadFailed { path: PathBuf, reason: String },

    /// The library does not export the requested function
    #[error("symbol '{symbol}' not exported by native library '{library}': {reason}")]
    SymbolNotFound {
        library: String,
        symbol: String,
        reason: String,
    },

    /// The descriptor is unusable before any loading happens
    #[error("invalid foreign function descriptor: {0}")]
    InvalidDescriptor(#[from] SignatureError),

    /// The call could not be carried out
    #[error("native call to '{symbol}' failed: {source}")]
    Invocation {
        symbol: String,
        #[source]
        source: CallError,
    },
}

impl InvokeError {
    pub(crate) fn invocation(symbol: &str, source: impl Into<CallError>) -> Self {
        InvokeError::Invocation {
            symbol: symbol.to_string(),
            source: source.into(),
        }
    }

    /// Short machine-readable kind, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            InvokeError::LibraryNotFound { .. } => "library_not_found",
            InvokeError::LoadFailed { .. } => "load_failed",
            InvokeError::SymbolNotFound { .. } => "symbol_not_found",
            InvokeError::InvalidDescriptor(_) => "invalid_descriptor",
            InvokeError::Invocation { .. } => "invocation",
        }
    }
}

impl From<LoadError> for InvokeError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::LibraryNotFound { name, reason } => {
                InvokeError::LibraryNotFound { name, reason }
            }
            LoadError::LoadFailed { path, reason } => InvokeError::LoadFailed { path, reason },
            LoadError::SymbolNotFound {
                library,
                symbol,
                reason,
            } => InvokeError::SymbolNotFound {
                library,
                symbol,
                reason,
            },
        }
    }
}
