//! Conversion traits between Rust types and dynamic [`Value`]s.
//!
//! - [`FromValue`]: extract a concrete Rust value from a [`Value`]
//! - [`IntoValue`]: wrap a Rust value into a [`Value`]
//!
//! These traits are the convertibility contract the whole runtime is defined
//! in terms of: constructor match predicates ask "could every argument
//! convert", and typed execution records use the same conversions when they
//! actually run, so matching and execution can never disagree.
//!
//! ## Supported types
//!
//! - Integers: `i8`, `i16`, `i32`, `i64`, `u8`, `u16`, `u32`, `u64`
//!   (narrowing is bounds checked; `u64` round-trips by bit reinterpretation)
//! - Floats: `f32`, `f64` (integers promote to float)
//! - `bool`, `String` (`&str` converts in only), `()` (void)
//! - [`Object`] instance handles

use crate::error::ConversionError;
use crate::object::Object;
use crate::value::Value;

/// Extract a concrete Rust value from a dynamic [`Value`].
pub trait FromValue: Sized {
    /// Extract a value, or report why the conversion is impossible.
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

/// Convert a Rust value into a dynamic [`Value`].
pub trait IntoValue {
    /// Wrap this value.
    fn into_value(self) -> Value;
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::Int(v) => {
                            if *v >= Self::MIN as i64 && *v <= Self::MAX as i64 {
                                Ok(*v as Self)
                            } else {
                                Err(ConversionError::OutOfRange {
                                    value: *v,
                                    target_type: stringify!($ty),
                                })
                            }
                        }
                        _ => Err(ConversionError::TypeMismatch {
                            expected: "int",
                            actual: value.type_name(),
                        }),
                    }
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Int(self as i64)
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, u8, u16, u32);

// u64 reinterprets the bits so the full range survives the i64 storage.
impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int(v) => Ok(*v as u64),
            _ => Err(ConversionError::TypeMismatch {
                expected: "int",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for u64 {
    fn into_value(self) -> Value {
        Value::Int(self as i64)
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(v) => Ok(*v as f32),
            Value::Int(v) => Ok(*v as f32),
            _ => Err(ConversionError::TypeMismatch {
                expected: "float",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            _ => Err(ConversionError::TypeMismatch {
                expected: "float",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(v) => Ok(*v),
            _ => Err(ConversionError::TypeMismatch {
                expected: "bool",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(ConversionError::TypeMismatch {
                expected: "string",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_owned())
    }
}

impl FromValue for () {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Void => Ok(()),
            _ => Err(ConversionError::TypeMismatch {
                expected: "void",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Void
    }
}

impl FromValue for Object {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Object(obj) => Ok(obj.clone()),
            _ => Err(ConversionError::TypeMismatch {
                expected: "object",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for Object {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_is_bounds_checked() {
        assert_eq!(i8::from_value(&Value::Int(127)).unwrap(), 127i8);
        assert!(matches!(
            i8::from_value(&Value::Int(128)),
            Err(ConversionError::OutOfRange { value: 128, .. })
        ));
        assert!(u8::from_value(&Value::Int(-1)).is_err());
        assert!(u32::from_value(&Value::Int(-1)).is_err());
    }

    #[test]
    fn u64_reinterprets_bits() {
        assert_eq!(u64::from_value(&Value::Int(-1)).unwrap(), u64::MAX);
        assert!(matches!(u64::MAX.into_value(), Value::Int(-1)));
    }

    #[test]
    fn int_promotes_to_float() {
        assert_eq!(f64::from_value(&Value::Int(42)).unwrap(), 42.0);
        assert_eq!(f32::from_value(&Value::Int(42)).unwrap(), 42.0f32);
    }

    #[test]
    fn kind_mismatch_reports_both_sides() {
        let err = i64::from_value(&Value::String("a".into())).unwrap_err();
        assert_eq!(
            err,
            ConversionError::TypeMismatch {
                expected: "int",
                actual: "string",
            }
        );
        assert!(bool::from_value(&Value::Int(1)).is_err());
        assert!(String::from_value(&Value::Bool(true)).is_err());
    }

    #[test]
    fn str_converts_in() {
        assert_eq!("hi".into_value(), Value::String("hi".into()));
    }

    #[test]
    fn object_round_trips() {
        let value = Object::nothing().into_value();
        assert!(Object::from_value(&value).unwrap().is_nothing());
        assert!(Object::from_value(&Value::Int(0)).is_err());
    }

    #[test]
    fn roundtrip_primitives() {
        assert_eq!(i64::from_value(&42i64.into_value()).unwrap(), 42);
        assert_eq!(f64::from_value(&1.5f64.into_value()).unwrap(), 1.5);
        assert!(bool::from_value(&true.into_value()).unwrap());
        assert_eq!(<()>::from_value(&().into_value()).unwrap(), ());
    }
}
