//! Foreign function descriptors
//!
//! A `ForeignFunction` names a library, an exported symbol and the C
//! signature the symbol is called with. Descriptors are plain values and are
//! validated before any symbol is bound.

use crate::types::ExternType;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Library name used by the bundled entry point
pub const HELLO_LIBRARY: &str = "hello";
/// Exported symbol invoked by the bundled entry point
pub const HELLO_SYMBOL: &str = "main";

/// Call shapes `ExternFunction` can dispatch, keyed by `Signature::key()`
pub(crate) const SUPPORTED_SIGNATURES: &[&str] = &[
    "()->CVoid",
    "()->CInt",
    "(CCharPtr)->CVoid",
    "(CCharPtr)->CInt",
    "(CInt)->CInt",
];

/// Descriptor validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("Unsupported FFI signature: {0}")]
    Unsupported(String),

    #[error("c_void is only valid as a return type")]
    VoidParameter,

    #[error("Invalid {field} name '{name}': {reason}")]
    InvalidName {
        field: &'static str,
        name: String,
        reason: &'static str,
    },
}

/// Parameter and return types of a foreign function (C calling convention)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: Cow<'static, [ExternType]>,
    ret: ExternType,
}

impl Signature {
    pub fn new(params: Vec<ExternType>, ret: ExternType) -> Self {
        Self {
            params: Cow::Owned(params),
            ret,
        }
    }

    /// `fn(*const c_char)` with no return value
    pub const fn text_to_void() -> Self {
        Self {
            params: Cow::Borrowed(&[ExternType::CCharPtr]),
            ret: ExternType::CVoid,
        }
    }

    pub fn params(&self) -> &[ExternType] {
        &self.params
    }

    pub fn return_type(&self) -> ExternType {
        self.ret
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Dispatch key, e.g. `(CCharPtr)->CVoid`
    pub fn key(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|t| format!("{:?}", t)).collect();
        format!("({})->{:?}", params.join(","), self.ret)
    }

    /// Check that the signature has a call shape the dispatcher knows
    pub fn validate(&self) -> Result<(), SignatureError> {
        if self.params.contains(&ExternType::CVoid) {
            return Err(SignatureError::VoidParameter);
        }

        let key = self.key();
        if SUPPORTED_SIGNATURES.contains(&key.as_str()) {
            Ok(())
        } else {
            Err(SignatureError::Unsupported(key))
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.params.iter().map(|t| t.display_name()).collect();
        write!(f, "extern \"C\" fn({}) -> {}", params.join(", "), self.ret)
    }
}

/// Library name, symbol name and signature of one foreign function
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForeignFunction {
    library: Cow<'static, str>,
    symbol: Cow<'static, str>,
    signature: Signature,
}

/// The `hello` / `main(text)` entry point
pub const HELLO_MAIN: ForeignFunction = ForeignFunction {
    library: Cow::Borrowed(HELLO_LIBRARY),
    symbol: Cow::Borrowed(HELLO_SYMBOL),
    signature: Signature::text_to_void(),
};

impl ForeignFunction {
    pub fn new(
        library: impl Into<Cow<'static, str>>,
        symbol: impl Into<Cow<'static, str>>,
        signature: Signature,
    ) -> Self {
        Self {
            library: library.into(),
            symbol: symbol.into(),
            signature,
        }
    }

    pub fn hello_main() -> Self {
        HELLO_MAIN
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Same descriptor bound to a different library
    pub fn with_library(mut self, library: impl Into<Cow<'static, str>>) -> Self {
        self.library = library.into();
        self
    }

    /// Same descriptor bound to a different symbol
    pub fn with_symbol(mut self, symbol: impl Into<Cow<'static, str>>) -> Self {
        self.symbol = symbol.into();
        self
    }

    pub fn validate(&self) -> Result<(), SignatureError> {
        validate_name("library", &self.library)?;
        validate_name("symbol", &self.symbol)?;
        self.signature.validate()
    }
}

impl fmt::Display for ForeignFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.library, self.symbol)
    }
}

fn validate_name(field: &'static str, name: &str) -> Result<(), SignatureError> {
    let reason = if name.trim().is_empty() {
        "must not be empty"
    } else if name.contains('\0') {
        "must not contain NUL bytes"
    } else {
        return Ok(());
    };

    Err(SignatureError::InvalidName {
        field,
        name: name.to_string(),
        reason,
    })
}
