//! Runtime invocation engine for reflected classes.
//!
//! `speculo` sits on top of a class metadata registry and makes registered
//! types usable with no compile-time knowledge of them: construct instances
//! from dynamic argument lists, invoke member and static functions, retire
//! instances - with overload selection, argument validation and value
//! conversion handled at runtime, and mismatches reported as structured
//! failures instead of crashes.
//!
//! ## Architecture
//!
//! ```text
//! Registry ── Class ─┬─ Constructor*  ──► ObjectFactory::construct / create
//! (lookup)  (metadata)├─ Destructor    ──► ObjectFactory::destroy / destruct
//!                     └─ Function*     ──► FunctionCaller::call / call_static
//! ```
//!
//! Metadata ([`Class`], [`Function`], [`Registry`]) is immutable once
//! published and safe for concurrent reads; instances ([`Object`]) are owned
//! by the calling thread. The engine is synchronous: every operation
//! completes or fails on the caller's stack.
//!
//! ## Example
//!
//! ```
//! use speculo::runtime::{FunctionCaller, ObjectFactory};
//! use speculo::{Args, Class, Constructor, Function, Registry, Value};
//!
//! struct Point { x: i64, y: i64 }
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     Class::new("Point")
//!         .with_constructor(Constructor::from_fn(|| Point { x: 0, y: 0 }))
//!         .with_constructor(Constructor::from_fn(|x: i64, y: i64| Point { x, y }))
//!         .with_function(Function::method(
//!             "move_by",
//!             |p: &mut Point, dx: i64, dy: i64| {
//!                 p.x += dx;
//!                 p.y += dy;
//!             },
//!         ))
//!         .with_function(Function::method("x", |p: &mut Point| p.x)),
//! )?;
//!
//! let class = registry.class("Point").expect("registered");
//! let factory = ObjectFactory::new(class);
//!
//! // Overload selection is first-match-wins over the dynamic arguments.
//! let mut point = factory.create((3i64, 4i64));
//! assert!(!point.is_nothing());
//!
//! let move_by = FunctionCaller::new(class.function("move_by").expect("bound"));
//! move_by.call(&point, &Args::from((1i64, 1i64)))?;
//!
//! let x = FunctionCaller::new(class.function("x").expect("bound"));
//! assert_eq!(x.call(&point, &Args::new())?, Value::Int(4));
//!
//! factory.destroy(&mut point);
//! assert!(point.is_nothing());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Failure model
//!
//! Invocation problems surface as [`CallError`]: `NotEnoughArguments`
//! (checked centrally before execution), `BadArgument`, `NullObject` and
//! `ForbiddenCall` (raised in the execution path). Construction with no
//! matching overload is *not* an error - it yields the checkable
//! [`Object::nothing`] sentinel.

pub mod args;
pub mod class;
pub mod convert;
pub mod error;
pub mod function;
pub mod object;
pub mod registry;
pub mod runtime;
pub mod value;

pub use args::Args;
pub use class::{Class, Constructor, ConstructorFn, Destructor};
pub use convert::{FromValue, IntoValue};
pub use error::{CallError, ConversionError};
pub use function::{
    Function, FunctionFlags, MethodFn, RUNTIME_CALLER_KEY, RuntimeCallable, RuntimeCaller,
    StaticFn,
};
pub use object::{AccessError, Object, ObjectStorage};
pub use registry::{Registry, RegistryError};
pub use value::Value;
