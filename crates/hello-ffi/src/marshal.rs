//! Type marshaling - host ↔ C type conversions
//!
//! - `MarshalContext::marshal()`: convert host values to C representations
//! - `MarshalContext::unmarshal()`: convert C values back to host values
//!
//! # Memory Safety
//!
//! C strings produced by `marshal()` are owned by the context and stay valid
//! until it is dropped, so the context must outlive the foreign call.

use crate::types::{CType, ExternType};
use crate::value::Value;
use std::ffi::{CStr, CString};
use thiserror::Error;

/// Marshal error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    /// Host value does not match the declared extern type
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// Null pointer encountered
    #[error("Null pointer")]
    NullPointer,

    /// Text cannot be encoded as a C string (interior NUL or invalid UTF-8)
    #[error("Invalid string: {0}")]
    InvalidString(String),
}

/// Marshal context for host ↔ C conversions
///
/// # Example
///
/// ```
/// # use hello_ffi::{MarshalContext, ExternType, Value};
/// let mut ctx = MarshalContext::new();
/// let c_value = ctx.marshal(&Value::from("Bard"), &ExternType::CCharPtr).unwrap();
/// assert_eq!(ctx.unmarshal(&c_value).unwrap(), Value::from("Bard"));
/// ```
#[derive(Debug, Default)]
pub struct MarshalContext {
    /// C strings kept alive for the duration of a call
    allocated_strings: Vec<CString>,
}

impl MarshalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marshal a host value to the given C type
    pub fn marshal(&mut self, value: &Value, target: &ExternType) -> Result<CType, MarshalError> {
        if !target.accepts(value.kind()) {
            return Err(MarshalError::TypeMismatch {
                expected: target.display_name().to_string(),
                got: value.type_name().to_string(),
            });
        }

        match value {
            Value::Int(n) => Ok(CType::Int(*n)),

            Value::Text(s) => {
                let c_string = CString::new(s.as_bytes()).map_err(|e| {
                    MarshalError::InvalidString(format!(
                        "text contains a NUL byte at offset {}",
                        e.nul_position()
                    ))
                })?;

                // CString's heap buffer does not move when the CString itself is moved
                let ptr = c_string.as_ptr();
                self.allocated_strings.push(c_string);

                Ok(CType::CharPtr(ptr))
            }

            Value::Unit => Ok(CType::Void),
        }
    }

    /// Marshal a C value back to a host value
    ///
    /// For `CType::CharPtr` the pointer must be null or point to a
    /// NUL-terminated string.
    pub fn unmarshal(&self, c_value: &CType) -> Result<Value, MarshalError> {
        match c_value {
            CType::Int(i) => Ok(Value::Int(*i)),

            CType::CharPtr(ptr) => {
                if ptr.is_null() {
                    return Err(MarshalError::NullPointer);
                }

                let c_str = unsafe { CStr::from_ptr(*ptr) };
                let s = c_str
                    .to_str()
                    .map_err(|e| MarshalError::InvalidString(format!("Invalid UTF-8: {}", e)))?;
                Ok(Value::Text(s.to_string()))
            }

            CType::Void => Ok(Value::Unit),
        }
    }

    /// Number of C strings currently owned by this context
    pub fn allocated_count(&self) -> usize {
        self.allocated_strings.len()
    }
}
