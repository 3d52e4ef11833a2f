//! Native entry invoker
//!
//! Binds a `ForeignFunction` descriptor to a loaded library and calls it.
//! The library is loaded and the symbol resolved on first use only; every
//! later call reuses the bound function pointer.

use crate::caller::ExternFunction;
use crate::error::InvokeError;
use crate::loader::LibraryLoader;
use crate::signature::ForeignFunction;
use crate::value::Value;
use std::path::PathBuf;

/// Text passed to the bundled `hello` entry point
pub const HELLO_ARGUMENT: &str = "Bard";

/// Calls one exported native function described by a `ForeignFunction`
///
/// Owns its `LibraryLoader`, so the library stays loaded (and the bound
/// pointer valid) for the invoker's lifetime.
///
/// # Safety
///
/// The descriptor's signature must match the native symbol. A mismatch or a
/// fault inside native code is undefined behaviour and usually kills the
/// process.
pub struct NativeEntryInvoker {
    descriptor: ForeignFunction,
    loader: LibraryLoader,
    bound: Option<ExternFunction>,
    calls: usize,
}

impl NativeEntryInvoker {
    /// Create an invoker using the default search paths
    pub fn new(descriptor: ForeignFunction) -> Result<Self, InvokeError> {
        Self::with_loader(descriptor, LibraryLoader::new())
    }

    /// Create an invoker that loads through `loader`
    ///
    /// The descriptor is validated here, before anything is loaded.
    pub fn with_loader(
        descriptor: ForeignFunction,
        loader: LibraryLoader,
    ) -> Result<Self, InvokeError> {
        descriptor.validate()?;
        Ok(Self {
            descriptor,
            loader,
            bound: None,
            calls: 0,
        })
    }

    /// Load the library and resolve the symbol, once
    pub fn bind(&mut self) -> Result<&ExternFunction, InvokeError> {
        let function = match self.bound.take() {
            Some(function) => function,
            None => self.resolve()?,
        };
        Ok(self.bound.insert(function))
    }

    fn resolve(&mut self) -> Result<ExternFunction, InvokeError> {
        let library = self.descriptor.library();
        let symbol = self.descriptor.symbol();

        self.loader.load(library)?;
        let fn_ptr = unsafe { self.loader.lookup(library, symbol)? };

        tracing::debug!(
            library,
            symbol,
            signature = %self.descriptor.signature(),
            "bound foreign function"
        );

        unsafe { ExternFunction::new(fn_ptr, self.descriptor.signature().clone()) }
            .map_err(|e| InvokeError::invocation(symbol, e))
    }

    /// Call the bound function with `args`, binding first if needed
    pub fn call(&mut self, args: &[Value]) -> Result<Value, InvokeError> {
        let symbol = self.descriptor.symbol().to_string();
        let function = self.bind()?;

        tracing::info!(symbol = %symbol, args = args.len(), "invoking native function");
        let result = unsafe { function.call(args) }
            .map_err(|e| InvokeError::invocation(&symbol, e))?;

        self.calls += 1;
        tracing::info!(symbol = %symbol, result = %result, "native function returned");
        Ok(result)
    }

    /// Call a `fn(text)` entry point, discarding any return value
    pub fn call_text(&mut self, text: &str) -> Result<(), InvokeError> {
        self.call(&[Value::from(text)]).map(|_| ())
    }

    pub fn descriptor(&self) -> &ForeignFunction {
        &self.descriptor
    }

    pub fn loader(&self) -> &LibraryLoader {
        &self.loader
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Number of completed calls
    pub fn call_count(&self) -> usize {
        self.calls
    }
}

/// Resolve library, resolve symbol, invoke once with `text`
///
/// `search_paths` are searched (in order) before the defaults.
pub fn invoke_once(
    descriptor: ForeignFunction,
    search_paths: Vec<PathBuf>,
    text: &str,
) -> Result<(), InvokeError> {
    let loader = LibraryLoader::with_search_paths(search_paths);
    let mut invoker = NativeEntryInvoker::with_loader(descriptor, loader)?;
    invoker.call_text(text)
}
