//! Runtime uses of registered class metadata.
//!
//! Two independent components, both reading metadata and never mutating it:
//!
//! - [`ObjectFactory`] constructs and retires instances of one class through
//!   its registered constructors and destructor.
//! - [`FunctionCaller`] executes one bound function against a dynamic
//!   receiver and argument list.
//!
//! Control flow is caller-driven: look a [`Class`](crate::Class) up, build an
//! instance with the factory, invoke behavior through callers bound to its
//! functions, retire the instance with the factory again.

mod caller;
mod factory;

pub use caller::FunctionCaller;
pub use factory::ObjectFactory;
