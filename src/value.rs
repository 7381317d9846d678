//! Dynamic value type for arguments and return values.

use crate::Object;

/// A dynamically typed value.
///
/// This enum represents every value the reflection runtime can pass to a
/// constructor or function, or hand back from an invocation. Integers of all
/// widths are stored as `i64`, floats as `f64`; registered class instances
/// travel as [`Object`] handles.
///
/// Conversion to and from concrete Rust types goes through the
/// [`FromValue`](crate::FromValue) / [`IntoValue`](crate::IntoValue) traits.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value (function returned nothing).
    #[default]
    Void,
    /// Boolean value.
    Bool(bool),
    /// Integer value (i8..i64, u8..u64 all stored as i64).
    Int(i64),
    /// Floating point value (f32, f64 both stored as f64).
    Float(f64),
    /// String value (owned).
    String(String),
    /// Handle to a reflected class instance.
    Object(Object),
}

impl Value {
    /// Get a human-readable name for this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Object(_) => "object",
        }
    }

    /// Check if this value is void.
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }
}
