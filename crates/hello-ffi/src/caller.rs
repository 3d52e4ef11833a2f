//! FFI function calling using direct function pointers
//!
//! Foreign signatures are declared up front as `Signature` values, so calls
//! go through direct `extern "C"` function pointer casts chosen by the
//! signature's dispatch key.

use crate::marshal::{MarshalContext, MarshalError};
use crate::signature::{Signature, SignatureError};
use crate::types::CType;
use crate::value::Value;
use std::os::raw::{c_char, c_int};
use thiserror::Error;

/// FFI call errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// Marshaling error (host ↔ C conversion failed)
    #[error("Marshal error: {0}")]
    Marshal(#[from] MarshalError),

    /// Wrong number of arguments
    #[error("Expected {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    /// Declared signature has no call shape
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Extern function pointer paired with its declared signature
#[derive(Clone)]
pub struct ExternFunction {
    /// Raw function pointer (type-erased)
    fn_ptr: *const (),
    signature: Signature,
}

impl std::fmt::Debug for ExternFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternFunction")
            .field("fn_ptr", &self.fn_ptr)
            .field("signature", &self.signature.key())
            .finish()
    }
}

impl ExternFunction {
    /// Create a new extern function with its signature
    ///
    /// Fails if the signature has no supported call shape.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    /// - `fn_ptr` points to a valid function
    /// - The function's actual signature matches `signature`
    /// - The function remains valid for the lifetime of this ExternFunction
    pub unsafe fn new(fn_ptr: *const (), signature: Signature) -> Result<Self, CallError> {
        signature.validate()?;
        Ok(Self { fn_ptr, signature })
    }

    /// Call the extern function with host values
    ///
    /// Marshals arguments to C types, calls the function, and marshals the
    /// result back. Marshaled strings live until the call returns.
    ///
    /// # Safety
    ///
    /// This calls foreign code; a fault inside it cannot be recovered.
    pub unsafe fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        if args.len() != self.signature.arity() {
            return Err(CallError::ArityMismatch {
                expected: self.signature.arity(),
                got: args.len(),
            });
        }

        let mut ctx = MarshalContext::new();
        let c_args: Vec<CType> = args
            .iter()
            .zip(self.signature.params())
            .map(|(arg, ty)| ctx.marshal(arg, ty))
            .collect::<Result<Vec<_>, _>>()?;

        let c_result = self.call_with_signature(&c_args)?;

        Ok(ctx.unmarshal(&c_result)?)
    }

    /// Call function using direct function pointer casts
    unsafe fn call_with_signature(&self, args: &[CType]) -> Result<CType, CallError> {
        let key = self.signature.key();

        match (key.as_str(), args) {
            ("()->CVoid", []) => {
                let f: extern "C" fn() = std::mem::transmute(self.fn_ptr);
                f();
                Ok(CType::Void)
            }
            ("()->CInt", []) => {
                let f: extern "C" fn() -> c_int = std::mem::transmute(self.fn_ptr);
                Ok(CType::Int(f()))
            }
            ("(CCharPtr)->CVoid", [CType::CharPtr(a)]) => {
                let f: extern "C" fn(*const c_char) = std::mem::transmute(self.fn_ptr);
                f(*a);
                Ok(CType::Void)
            }
            ("(CCharPtr)->CInt", [CType::CharPtr(a)]) => {
                let f: extern "C" fn(*const c_char) -> c_int = std::mem::transmute(self.fn_ptr);
                Ok(CType::Int(f(*a)))
            }
            ("(CInt)->CInt", [CType::Int(a)]) => {
                let f: extern "C" fn(c_int) -> c_int = std::mem::transmute(self.fn_ptr);
                Ok(CType::Int(f(*a)))
            }
            _ => Err(SignatureError::Unsupported(key).into()),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}
