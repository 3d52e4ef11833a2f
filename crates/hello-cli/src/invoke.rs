//! Load the configured library and call its entry point with "Bard"

use anyhow::{Context, Result};
use hello_config::Config;
use hello_ffi::{ForeignFunction, LibraryLoader, NativeEntryInvoker, HELLO_ARGUMENT, HELLO_MAIN};

/// Descriptor for the configured library and symbol
pub fn descriptor(config: &Config) -> ForeignFunction {
    HELLO_MAIN
        .with_library(config.library.clone())
        .with_symbol(config.symbol.clone())
}

pub fn run(config: &Config) -> Result<()> {
    let descriptor = descriptor(config);
    tracing::debug!(
        function = %descriptor,
        signature = %descriptor.signature(),
        search_paths = config.search_paths.len(),
        "preparing native entry"
    );

    let loader = LibraryLoader::with_search_paths(config.search_paths.clone());
    let mut invoker = NativeEntryInvoker::with_loader(descriptor, loader)?;

    invoker
        .call_text(HELLO_ARGUMENT)
        .with_context(|| format!("Failed to invoke {}", invoker.descriptor()))
}
