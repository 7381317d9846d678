//! Error types for runtime invocation.
//!
//! Two layers of failure exist:
//!
//! - [`ConversionError`] - a dynamic [`Value`](crate::Value) could not become
//!   the statically expected Rust type. Raised by the conversion traits in
//!   [`convert`](crate::convert).
//! - [`CallError`] - an invocation failed. Raised at the
//!   [`FunctionCaller`](crate::runtime::FunctionCaller) boundary (argument
//!   count) or inside the delegated execution path (receiver / argument /
//!   callability problems).
//!
//! Construction with no matching overload is deliberately *not* an error:
//! [`ObjectFactory::construct`](crate::runtime::ObjectFactory::construct)
//! reports it as the [`Object::nothing`](crate::Object::nothing) sentinel,
//! which callers check explicitly.

use thiserror::Error;

/// Failure to convert a dynamic value to a concrete Rust type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The value holds a different kind than the target type expects.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// An integer value does not fit the target integer type.
    #[error("integer {value} out of range for {target_type}")]
    OutOfRange { value: i64, target_type: &'static str },
}

/// Failure raised by a runtime function invocation.
///
/// The argument-count check is performed once, centrally, before the bound
/// execution record runs; the remaining variants originate inside the
/// delegated execution path and propagate unmodified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// Fewer arguments were supplied than the function requires.
    #[error("not enough arguments for '{function}': supplied {supplied}, required {required}")]
    NotEnoughArguments {
        function: String,
        supplied: usize,
        required: usize,
    },

    /// An argument could not be converted to the expected parameter type.
    #[error("bad argument {index} for '{function}': {source}")]
    BadArgument {
        function: String,
        index: usize,
        source: ConversionError,
    },

    /// The receiver was the "no instance" sentinel but the function needs one.
    #[error("null object passed to '{function}'")]
    NullObject { function: String },

    /// The receiver's storage is already borrowed by an enclosing call.
    #[error("object is already in use in call to '{function}'")]
    ObjectInUse { function: String },

    /// The function descriptor is marked non-invocable.
    #[error("call to '{function}' is forbidden")]
    ForbiddenCall { function: String },
}
