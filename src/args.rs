//! Ordered dynamic argument lists.

use crate::convert::IntoValue;
use crate::value::Value;

/// An ordered sequence of dynamic values passed to a constructor or function.
///
/// `Args` can be built explicitly, collected from an iterator of [`Value`]s,
/// or converted from a tuple of convertible values for positional call sites:
///
/// ```
/// use speculo::{Args, Value};
///
/// let args = Args::from((1i64, 2i64));
/// assert_eq!(args.count(), 2);
/// assert_eq!(args.get(0), Some(&Value::Int(1)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Number of arguments supplied.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Check if no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the argument at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Append an argument.
    pub fn push(&mut self, value: impl IntoValue) {
        self.values.push(value.into_value());
    }

    /// Iterate over the arguments in order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

macro_rules! impl_args_from_tuple {
    ($($a:ident),*) => {
        impl<$($a: IntoValue),*> From<($($a,)*)> for Args {
            #[allow(non_snake_case)]
            fn from(tuple: ($($a,)*)) -> Self {
                let ($($a,)*) = tuple;
                Self {
                    values: vec![$($a.into_value()),*],
                }
            }
        }
    };
}

impl_args_from_tuple!();
impl_args_from_tuple!(A0);
impl_args_from_tuple!(A0, A1);
impl_args_from_tuple!(A0, A1, A2);
impl_args_from_tuple!(A0, A1, A2, A3);
impl_args_from_tuple!(A0, A1, A2, A3, A4);
