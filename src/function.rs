//! Function descriptors and their type-erased execution records.
//!
//! A [`Function`] describes one bound function: name, parameter count, flags,
//! and an opaque user-data map. The runtime execution record - a
//! [`RuntimeCaller`] wrapping the actual call logic - is stored in that map
//! under the fixed [`RUNTIME_CALLER_KEY`] and retrieved by
//! [`FunctionCaller`](crate::runtime::FunctionCaller) when it binds.
//!
//! Typed member and static functions are registered from plain Rust closures
//! through [`Function::method`] and [`Function::static_fn`]; the static
//! signature is erased at registration time, one generated record per bound
//! signature, all stored behind the same [`RuntimeCallable`] contract.

use std::any::{self, Any};
use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::args::Args;
use crate::convert::{FromValue, IntoValue};
use crate::error::{CallError, ConversionError};
use crate::object::{AccessError, Object};
use crate::value::Value;

/// Fixed user-data key under which the runtime execution record is stored.
pub const RUNTIME_CALLER_KEY: &str = "speculo.runtime.caller";

bitflags! {
    /// Properties of a bound function.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FunctionFlags: u8 {
        /// The function may be invoked. Descriptors without this flag fail
        /// with `ForbiddenCall` (write-only or inaccessible bindings).
        const CALLABLE = 1 << 0;
        /// The function requires no instance.
        const STATIC = 1 << 1;
    }
}

/// Trait for the type-erased execution capability of a bound function.
///
/// Implementations receive the receiver and arguments unmodified; argument
/// counts were already validated centrally by the invoker.
pub trait RuntimeCallable {
    /// Perform the call.
    fn execute(&self, receiver: &Object, args: &Args) -> Result<Value, CallError>;
}

// Closures of the right shape are callable directly.
impl<F> RuntimeCallable for F
where
    F: Fn(&Object, &Args) -> Result<Value, CallError>,
{
    fn execute(&self, receiver: &Object, args: &Args) -> Result<Value, CallError> {
        (self)(receiver, args)
    }
}

/// The per-function execution record.
///
/// Wraps any [`RuntimeCallable`] so that functions of different signatures
/// store uniformly; cloning shares the underlying implementation.
pub struct RuntimeCaller {
    inner: Arc<dyn RuntimeCallable + Send + Sync>,
}

impl RuntimeCaller {
    /// Wrap a callable.
    pub fn new<F>(f: F) -> Self
    where
        F: RuntimeCallable + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Execute the call this record was built for.
    pub fn execute(&self, receiver: &Object, args: &Args) -> Result<Value, CallError> {
        self.inner.execute(receiver, args)
    }

    /// Clone this record, sharing the same underlying callable.
    pub fn clone_arc(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Clone for RuntimeCaller {
    fn clone(&self) -> Self {
        self.clone_arc()
    }
}

impl fmt::Debug for RuntimeCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeCaller").finish_non_exhaustive()
    }
}

fn extract<V: FromValue>(
    function: &str,
    args: &Args,
    index: usize,
    required: usize,
) -> Result<V, CallError> {
    let value = args.get(index).ok_or_else(|| CallError::NotEnoughArguments {
        function: function.to_owned(),
        supplied: args.count(),
        required,
    })?;
    V::from_value(value).map_err(|source| CallError::BadArgument {
        function: function.to_owned(),
        index,
        source,
    })
}

/// Typed execution logic for a member function.
///
/// Implemented for closures `Fn(&mut T, A0, .., An) -> R` for arities
/// 0 through 5, with each parameter extracted through [`FromValue`] and the
/// return value wrapped through [`IntoValue`].
pub trait MethodFn<T, A, R>: Send + Sync + 'static {
    /// Number of parameters (excluding the receiver).
    const ARITY: usize;

    /// Run against an already-resolved receiver.
    fn invoke(&self, function: &str, receiver: &mut T, args: &Args) -> Result<Value, CallError>;
}

macro_rules! impl_method_fn {
    ($count:expr $(, $a:ident => $idx:expr)*) => {
        impl<T, R, F $(, $a)*> MethodFn<T, ($($a,)*), R> for F
        where
            T: 'static,
            R: IntoValue + 'static,
            F: Fn(&mut T $(, $a)*) -> R + Send + Sync + 'static,
            $($a: FromValue + 'static,)*
        {
            const ARITY: usize = $count;

            fn invoke(
                &self,
                function: &str,
                receiver: &mut T,
                args: &Args,
            ) -> Result<Value, CallError> {
                let _ = (function, args);
                Ok(self(receiver $(, extract::<$a>(function, args, $idx, $count)?)*).into_value())
            }
        }
    };
}

impl_method_fn!(0);
impl_method_fn!(1, A0 => 0);
impl_method_fn!(2, A0 => 0, A1 => 1);
impl_method_fn!(3, A0 => 0, A1 => 1, A2 => 2);
impl_method_fn!(4, A0 => 0, A1 => 1, A2 => 2, A3 => 3);
impl_method_fn!(5, A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4);

/// Typed execution logic for a static function (no receiver).
///
/// Implemented for closures `Fn(A0, .., An) -> R` for arities 0 through 5.
pub trait StaticFn<A, R>: Send + Sync + 'static {
    /// Number of parameters.
    const ARITY: usize;

    /// Run with the supplied arguments.
    fn invoke(&self, function: &str, args: &Args) -> Result<Value, CallError>;
}

macro_rules! impl_static_fn {
    ($count:expr $(, $a:ident => $idx:expr)*) => {
        impl<R, F $(, $a)*> StaticFn<($($a,)*), R> for F
        where
            R: IntoValue + 'static,
            F: Fn($($a),*) -> R + Send + Sync + 'static,
            $($a: FromValue + 'static,)*
        {
            const ARITY: usize = $count;

            fn invoke(&self, function: &str, args: &Args) -> Result<Value, CallError> {
                let _ = (function, args);
                Ok(self($(extract::<$a>(function, args, $idx, $count)?),*).into_value())
            }
        }
    };
}

impl_static_fn!(0);
impl_static_fn!(1, A0 => 0);
impl_static_fn!(2, A0 => 0, A1 => 1);
impl_static_fn!(3, A0 => 0, A1 => 1, A2 => 2);
impl_static_fn!(4, A0 => 0, A1 => 1, A2 => 2, A3 => 3);
impl_static_fn!(5, A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4);

/// Descriptor for one bound function (member or static).
pub struct Function {
    name: String,
    param_count: usize,
    flags: FunctionFlags,
    user_data: FxHashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl Function {
    /// Create a bare descriptor. Registration layers normally use
    /// [`Function::method`] or [`Function::static_fn`] instead, which also
    /// install the execution record.
    pub fn new(name: impl Into<String>, param_count: usize, flags: FunctionFlags) -> Self {
        Self {
            name: name.into(),
            param_count,
            flags,
            user_data: FxHashMap::default(),
        }
    }

    /// Register a member function from a typed closure.
    ///
    /// The generated execution record resolves the receiver first:
    /// a sentinel receiver fails with `NullObject`, a receiver of the wrong
    /// type with `BadArgument` at index 0, and a receiver whose storage is
    /// borrowed by an enclosing call with `ObjectInUse`; argument conversion
    /// failures carry their own index.
    pub fn method<T, A, R, F>(name: impl Into<String>, f: F) -> Self
    where
        T: 'static,
        A: 'static,
        R: 'static,
        F: MethodFn<T, A, R>,
    {
        let name = name.into();
        let function_name = name.clone();
        let caller = RuntimeCaller::new(move |receiver: &Object, args: &Args| {
            match receiver.with_mut::<T, _>(|instance| f.invoke(&function_name, instance, args)) {
                Ok(result) => result,
                Err(AccessError::Nothing) => Err(CallError::NullObject {
                    function: function_name.clone(),
                }),
                Err(AccessError::TypeMismatch) => Err(CallError::BadArgument {
                    function: function_name.clone(),
                    index: 0,
                    source: ConversionError::TypeMismatch {
                        expected: any::type_name::<T>(),
                        actual: "object",
                    },
                }),
                Err(AccessError::InUse) => Err(CallError::ObjectInUse {
                    function: function_name.clone(),
                }),
            }
        });

        let mut function = Self::new(name, F::ARITY, FunctionFlags::CALLABLE);
        function.set_user_data(RUNTIME_CALLER_KEY, Arc::new(caller));
        function
    }

    /// Register a static function from a typed closure. The receiver is
    /// ignored entirely, so the sentinel is a valid receiver.
    pub fn static_fn<A, R, F>(name: impl Into<String>, f: F) -> Self
    where
        A: 'static,
        R: 'static,
        F: StaticFn<A, R>,
    {
        let name = name.into();
        let function_name = name.clone();
        let caller = RuntimeCaller::new(move |_receiver: &Object, args: &Args| {
            f.invoke(&function_name, args)
        });

        let mut function = Self::new(
            name,
            F::ARITY,
            FunctionFlags::CALLABLE | FunctionFlags::STATIC,
        );
        function.set_user_data(RUNTIME_CALLER_KEY, Arc::new(caller));
        function
    }

    /// Create a descriptor marked non-invocable. Any invocation attempt
    /// fails with `ForbiddenCall`.
    pub fn not_callable(name: impl Into<String>, param_count: usize) -> Self {
        Self::new(name, param_count, FunctionFlags::empty())
    }

    /// Function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum number of arguments an invocation must supply.
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    /// Flags of this function.
    pub fn flags(&self) -> FunctionFlags {
        self.flags
    }

    /// Check whether invocation is permitted.
    pub fn is_callable(&self) -> bool {
        self.flags.contains(FunctionFlags::CALLABLE)
    }

    /// Check whether this function requires no instance.
    pub fn is_static(&self) -> bool {
        self.flags.contains(FunctionFlags::STATIC)
    }

    /// Attach opaque user data under `key`, replacing any previous entry.
    pub fn set_user_data(&mut self, key: &'static str, data: Arc<dyn Any + Send + Sync>) {
        self.user_data.insert(key, data);
    }

    /// Retrieve opaque user data by key.
    pub fn user_data(&self, key: &'static str) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.user_data.get(key)
    }

    /// Retrieve the runtime execution record, if one was installed.
    pub fn runtime_caller(&self) -> Option<RuntimeCaller> {
        self.user_data
            .get(RUNTIME_CALLER_KEY)?
            .downcast_ref::<RuntimeCaller>()
            .map(RuntimeCaller::clone_arc)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("param_count", &self.param_count)
            .field("flags", &self.flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Constructor;
    use crate::object::Object;

    struct Counter {
        total: i64,
    }

    #[test]
    fn method_descriptor_shape() {
        let func = Function::method("add", |c: &mut Counter, n: i64| {
            c.total += n;
            c.total
        });
        assert_eq!(func.name(), "add");
        assert_eq!(func.param_count(), 1);
        assert!(func.is_callable());
        assert!(!func.is_static());
        assert!(func.runtime_caller().is_some());
    }

    #[test]
    fn static_descriptor_shape() {
        let func = Function::static_fn("make", |a: i64, b: i64| a + b);
        assert_eq!(func.param_count(), 2);
        assert!(func.is_static());
    }

    #[test]
    fn not_callable_has_no_record() {
        let func = Function::not_callable("hidden", 0);
        assert!(!func.is_callable());
        assert!(func.runtime_caller().is_none());
    }

    #[test]
    fn method_record_rejects_sentinel_receiver() {
        let func = Function::method("read", |c: &mut Counter| c.total);
        let record = func.runtime_caller().expect("installed");
        let err = record
            .execute(&Object::nothing(), &Args::new())
            .unwrap_err();
        assert_eq!(
            err,
            CallError::NullObject {
                function: "read".into(),
            }
        );
    }

    #[test]
    fn method_record_rejects_wrong_receiver_type() {
        let func = Function::method("read", |c: &mut Counter| c.total);
        let record = func.runtime_caller().expect("installed");
        let receiver = Constructor::from_fn(|| 5i64).create(None, &Args::new());
        let err = record.execute(&receiver, &Args::new()).unwrap_err();
        assert!(matches!(err, CallError::BadArgument { index: 0, .. }));
    }

    #[test]
    fn method_record_reports_borrowed_receiver_as_in_use() {
        let func = Function::method("read", |c: &mut Counter| c.total);
        let record = func.runtime_caller().expect("installed");
        let receiver =
            Constructor::from_fn(|| Counter { total: 0 }).create(None, &Args::new());
        let alias = receiver.clone();

        let nested = receiver.with_mut::<Counter, _>(|_| record.execute(&alias, &Args::new()));
        assert_eq!(
            nested,
            Ok(Err(CallError::ObjectInUse {
                function: "read".into(),
            }))
        );

        // Once the outer borrow ends the call succeeds again.
        assert_eq!(record.execute(&receiver, &Args::new()), Ok(Value::Int(0)));
    }

    #[test]
    fn record_reports_full_arity_when_arguments_missing() {
        let func = Function::static_fn("sum3", |a: i64, b: i64, c: i64| a + b + c);
        let record = func.runtime_caller().expect("installed");
        // Executing the record directly bypasses the central count check; the
        // record's own report still names the full arity.
        let err = record
            .execute(&Object::nothing(), &Args::from((1i64,)))
            .unwrap_err();
        assert_eq!(
            err,
            CallError::NotEnoughArguments {
                function: "sum3".into(),
                supplied: 1,
                required: 3,
            }
        );
    }

    #[test]
    fn method_record_reports_argument_index() {
        let func = Function::method("add2", |c: &mut Counter, a: i64, b: i64| {
            c.total += a + b;
            c.total
        });
        let record = func.runtime_caller().expect("installed");
        let receiver =
            Constructor::from_fn(|| Counter { total: 0 }).create(None, &Args::new());
        let err = record
            .execute(&receiver, &Args::from((1i64, "x")))
            .unwrap_err();
        assert!(matches!(err, CallError::BadArgument { index: 1, .. }));
    }

    #[test]
    fn static_record_ignores_receiver() {
        let func = Function::static_fn("sum", |a: i64, b: i64| a + b);
        let record = func.runtime_caller().expect("installed");
        let result = record
            .execute(&Object::nothing(), &Args::from((2i64, 3i64)))
            .unwrap();
        assert_eq!(result, Value::Int(5));
    }

    #[test]
    fn user_data_round_trip() {
        let mut func = Function::new("f", 0, FunctionFlags::CALLABLE);
        func.set_user_data("extra", Arc::new(42u32));
        let stored = func.user_data("extra").expect("present");
        assert_eq!(stored.downcast_ref::<u32>(), Some(&42));
        assert!(func.user_data("missing").is_none());
    }
}
