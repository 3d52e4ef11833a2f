//! Native entry invocation over a C ABI
//!
//! Loads a prebuilt shared library by name, resolves one exported function
//! and calls it through a declared signature:
//! - Type marshaling (host ↔ C conversions)
//! - Dynamic library loading with load-once caching
//! - Extern function calls through typed function pointers
//!
//! # Example
//!
//! ```no_run
//! use hello_ffi::{NativeEntryInvoker, HELLO_ARGUMENT, HELLO_MAIN};
//!
//! let mut invoker = NativeEntryInvoker::new(HELLO_MAIN)?;
//! invoker.call_text(HELLO_ARGUMENT)?;
//! # Ok::<(), hello_ffi::InvokeError>(())
//! ```
//!
//! # Safety
//!
//! FFI operations involve `unsafe` code and careful memory management.
//! All unsafe code is isolated in this crate behind safe wrappers; the
//! remaining obligation is that a descriptor's signature matches the
//! native symbol it names.

pub mod caller;
pub mod error;
pub mod invoker;
pub mod loader;
pub mod marshal;
pub mod signature;
pub mod types;
pub mod value;

pub use caller::{CallError, ExternFunction};
pub use error::InvokeError;
pub use invoker::{invoke_once, NativeEntryInvoker, HELLO_ARGUMENT};
pub use loader::{LibraryLoader, LoadError};
pub use marshal::{MarshalContext, MarshalError};
pub use signature::{ForeignFunction, Signature, SignatureError, HELLO_MAIN};
pub use types::{CType, ExternType};
pub use value::{Value, ValueKind};
