//! FFI type system - C-compatible types for the FFI boundary
//!
//! Defines:
//! - `ExternType`: declared C types in a foreign function signature
//! - `CType`: runtime representation of C values
//!
//! Type mapping:
//! - ExternType::CInt → CType::Int(i32)
//! - ExternType::CCharPtr → CType::CharPtr(*const c_char)
//! - ExternType::CVoid → CType::Void

use crate::value::ValueKind;
use std::fmt;
use std::os::raw::c_char;

/// C-compatible extern types used to declare a foreign signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternType {
    /// C int (platform-specific, typically i32)
    CInt,
    /// C char* (null-terminated string pointer)
    CCharPtr,
    /// C void (only valid as a return type)
    CVoid,
}

impl ExternType {
    /// Check if a host value kind can be marshaled to this extern type
    ///
    /// # Examples
    ///
    /// ```
    /// # use hello_ffi::ExternType;
    /// # use hello_ffi::value::ValueKind;
    /// assert!(ExternType::CCharPtr.accepts(ValueKind::Text));
    /// assert!(!ExternType::CInt.accepts(ValueKind::Text));
    /// ```
    pub fn accepts(&self, kind: ValueKind) -> bool {
        matches!(
            (self, kind),
            (ExternType::CInt, ValueKind::Int)
                | (ExternType::CCharPtr, ValueKind::Text)
                | (ExternType::CVoid, ValueKind::Unit)
        )
    }

    /// Get a display name for this extern type
    pub fn display_name(&self) -> &'static str {
        match self {
            ExternType::CInt => "c_int",
            ExternType::CCharPtr => "c_char_ptr",
            ExternType::CVoid => "c_void",
        }
    }
}

impl fmt::Display for ExternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// C value passed across the FFI boundary
///
/// Pointer variants borrow memory owned by a `MarshalContext`.
#[derive(Debug, Clone)]
pub enum CType {
    /// C int value
    Int(i32),
    /// C char* (null-terminated string pointer)
    ///
    /// # Safety
    ///
    /// The pointer must be valid and point to a null-terminated string.
    /// Lifetime managed by MarshalContext.
    CharPtr(*const c_char),
    /// C void (no value)
    Void,
}

// Manual PartialEq because we can't derive it for raw pointers
impl PartialEq for CType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CType::Int(a), CType::Int(b)) => a == b,
            (CType::CharPtr(a), CType::CharPtr(b)) => a == b,
            (CType::Void, CType::Void) => true,
            _ => false,
        }
    }
}
