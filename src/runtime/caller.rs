//! Function invocation against dynamic receivers and arguments.

use crate::args::Args;
use crate::error::CallError;
use crate::function::{Function, RuntimeCaller};
use crate::object::Object;
use crate::value::Value;

/// Executes one bound function against a dynamic receiver and argument list.
///
/// A caller binds to exactly one [`Function`] descriptor at creation and is
/// immutable afterward; the per-function execution record is fetched once,
/// from the descriptor's user data, when the caller is built.
///
/// The argument-count precondition is validated here, centrally, before any
/// delegation, so every bound function gets uniform `NotEnoughArguments`
/// semantics. All other failures (`NullObject`, `BadArgument`,
/// `ForbiddenCall`) originate in the delegated execution path and propagate
/// unmodified.
#[derive(Debug)]
pub struct FunctionCaller<'a> {
    function: &'a Function,
    caller: Option<RuntimeCaller>,
}

impl<'a> FunctionCaller<'a> {
    /// Bind a caller to a function descriptor.
    pub fn new(function: &'a Function) -> Self {
        Self {
            function,
            caller: function.runtime_caller(),
        }
    }

    /// The bound function descriptor.
    pub fn function(&self) -> &Function {
        self.function
    }

    /// Call the function on `receiver`.
    ///
    /// Fails with `NotEnoughArguments` if `args.count()` is below the
    /// function's parameter count, without reaching the execution record.
    pub fn call(&self, receiver: &Object, args: &Args) -> Result<Value, CallError> {
        self.check_arg_count(args)?;
        self.execute(receiver, args)
    }

    /// Call the function without an instance.
    ///
    /// Applies the same argument-count precondition, then delegates with the
    /// "no instance" sentinel as the receiver, regardless of any receiver a
    /// previous [`call`](Self::call) used.
    pub fn call_static(&self, args: &Args) -> Result<Value, CallError> {
        self.check_arg_count(args)?;
        self.execute(&Object::nothing(), args)
    }

    fn check_arg_count(&self, args: &Args) -> Result<(), CallError> {
        if args.count() < self.function.param_count() {
            return Err(CallError::NotEnoughArguments {
                function: self.function.name().to_owned(),
                supplied: args.count(),
                required: self.function.param_count(),
            });
        }
        Ok(())
    }

    /// Delegate to the execution record. A descriptor marked non-invocable,
    /// or one with no record installed, fails with `ForbiddenCall`.
    fn execute(&self, receiver: &Object, args: &Args) -> Result<Value, CallError> {
        if !self.function.is_callable() {
            return Err(CallError::ForbiddenCall {
                function: self.function.name().to_owned(),
            });
        }
        match &self.caller {
            Some(caller) => caller.execute(receiver, args),
            None => Err(CallError::ForbiddenCall {
                function: self.function.name().to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Constructor;
    use crate::function::{FunctionFlags, RUNTIME_CALLER_KEY};
    use std::sync::Arc;

    struct Counter {
        total: i64,
    }

    fn counter() -> Object {
        Constructor::from_fn(|| Counter { total: 0 }).create(None, &Args::new())
    }

    #[test]
    fn arity_checked_before_execution() {
        let reached = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let seen = Arc::clone(&reached);
        let mut func = Function::new("add", 2, FunctionFlags::CALLABLE);
        func.set_user_data(
            RUNTIME_CALLER_KEY,
            Arc::new(RuntimeCaller::new(move |_: &Object, _: &Args| {
                seen.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(Value::Void)
            })),
        );

        let caller = FunctionCaller::new(&func);
        let err = caller.call(&counter(), &Args::from((1i64,))).unwrap_err();
        assert_eq!(
            err,
            CallError::NotEnoughArguments {
                function: "add".into(),
                supplied: 1,
                required: 2,
            }
        );
        assert!(!reached.load(std::sync::atomic::Ordering::SeqCst));

        let err = caller.call_static(&Args::new()).unwrap_err();
        assert!(matches!(
            err,
            CallError::NotEnoughArguments { supplied: 0, .. }
        ));
        assert!(!reached.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn extra_arguments_are_allowed() {
        let func = Function::method("get", |c: &mut Counter| c.total);
        let caller = FunctionCaller::new(&func);
        let result = caller.call(&counter(), &Args::from((9i64,))).unwrap();
        assert_eq!(result, Value::Int(0));
    }

    #[test]
    fn call_static_always_passes_sentinel() {
        let mut func = Function::new("who_am_i", 0, FunctionFlags::CALLABLE | FunctionFlags::STATIC);
        func.set_user_data(
            RUNTIME_CALLER_KEY,
            Arc::new(RuntimeCaller::new(|receiver: &Object, _: &Args| {
                Ok(Value::Bool(receiver.is_nothing()))
            })),
        );

        let caller = FunctionCaller::new(&func);
        assert_eq!(caller.call(&counter(), &Args::new()), Ok(Value::Bool(false)));
        assert_eq!(caller.call_static(&Args::new()), Ok(Value::Bool(true)));
    }

    #[test]
    fn non_callable_descriptor_is_forbidden() {
        let func = Function::not_callable("hidden", 0);
        let caller = FunctionCaller::new(&func);
        let err = caller.call(&counter(), &Args::new()).unwrap_err();
        assert_eq!(
            err,
            CallError::ForbiddenCall {
                function: "hidden".into(),
            }
        );
    }

    #[test]
    fn missing_record_is_forbidden() {
        let func = Function::new("bare", 0, FunctionFlags::CALLABLE);
        let caller = FunctionCaller::new(&func);
        assert!(matches!(
            caller.call_static(&Args::new()),
            Err(CallError::ForbiddenCall { .. })
        ));
    }

    #[test]
    fn null_receiver_propagates_from_execution() {
        let func = Function::method("get", |c: &mut Counter| c.total);
        let caller = FunctionCaller::new(&func);
        let err = caller.call(&Object::nothing(), &Args::new()).unwrap_err();
        assert_eq!(
            err,
            CallError::NullObject {
                function: "get".into(),
            }
        );
    }

    #[test]
    fn bad_argument_propagates_from_execution() {
        let func = Function::method("add", |c: &mut Counter, n: i64| {
            c.total += n;
            c.total
        });
        let caller = FunctionCaller::new(&func);
        let err = caller.call(&counter(), &Args::from(("x",))).unwrap_err();
        assert!(matches!(err, CallError::BadArgument { index: 0, .. }));
    }
}
