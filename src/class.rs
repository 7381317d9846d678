//! Class metadata: constructor overloads, destructor, bound functions.
//!
//! A [`Class`] is the immutable descriptor set for one bound type. It is
//! assembled once by the registration layer (ordered constructor overloads,
//! an optional destructor hook, a function table) and treated as read-only by
//! the runtime components, so shared read access from multiple factories and
//! callers is safe.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::args::Args;
use crate::convert::FromValue;
use crate::function::Function;
use crate::object::{Object, ObjectStorage};

/// Typed construction logic for one constructor overload.
///
/// Implemented for plain Rust closures `Fn(A0, .., An) -> T` for arities
/// 0 through 5. The match predicate and the build step are generated from the
/// same parameter list, so an overload that matched an argument list can
/// always build from it.
pub trait ConstructorFn<T, A>: Send + Sync + 'static {
    /// Number of parameters this overload takes.
    const ARITY: usize;

    /// Check whether an argument list could satisfy this overload.
    fn matches(args: &Args) -> bool;

    /// Build an instance from the argument list.
    fn build(&self, args: &Args) -> Option<T>;
}

macro_rules! impl_constructor_fn {
    ($count:expr $(, $a:ident => $idx:expr)*) => {
        impl<T, F $(, $a)*> ConstructorFn<T, ($($a,)*)> for F
        where
            T: 'static,
            F: Fn($($a),*) -> T + Send + Sync + 'static,
            $($a: FromValue + 'static,)*
        {
            const ARITY: usize = $count;

            fn matches(args: &Args) -> bool {
                args.count() == $count
                    $(&& args.get($idx).is_some_and(|v| <$a as FromValue>::from_value(v).is_ok()))*
            }

            fn build(&self, args: &Args) -> Option<T> {
                Some(self($(<$a as FromValue>::from_value(args.get($idx)?).ok()?),*))
            }
        }
    };
}

impl_constructor_fn!(0);
impl_constructor_fn!(1, A0 => 0);
impl_constructor_fn!(2, A0 => 0, A1 => 1);
impl_constructor_fn!(3, A0 => 0, A1 => 1, A2 => 2);
impl_constructor_fn!(4, A0 => 0, A1 => 1, A2 => 2, A3 => 3);
impl_constructor_fn!(5, A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4);

/// One constructor overload: a match predicate plus a type-erased build step.
///
/// The static signature is erased behind two closures captured at
/// registration time; overloads of different signatures store uniformly in a
/// [`Class`].
pub struct Constructor {
    arity: usize,
    matcher: Arc<dyn Fn(&Args) -> bool + Send + Sync>,
    builder: Arc<dyn Fn(&Args) -> Option<Box<dyn Any>> + Send + Sync>,
}

impl Constructor {
    /// Wrap a typed construction closure.
    ///
    /// ```
    /// use speculo::{Args, Constructor};
    ///
    /// struct Point { x: i64, y: i64 }
    ///
    /// let ctor = Constructor::from_fn(|x: i64, y: i64| Point { x, y });
    /// assert!(ctor.matches(&Args::from((1i64, 2i64))));
    /// assert!(!ctor.matches(&Args::from(("a",))));
    /// ```
    pub fn from_fn<T, A, F>(f: F) -> Self
    where
        T: 'static,
        A: 'static,
        F: ConstructorFn<T, A>,
    {
        Self {
            arity: F::ARITY,
            matcher: Arc::new(|args: &Args| F::matches(args)),
            builder: Arc::new(move |args: &Args| {
                f.build(args).map(|value| Box::new(value) as Box<dyn Any>)
            }),
        }
    }

    /// Number of parameters this overload takes.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Check whether `args` could satisfy this overload: the count must be
    /// exact and every argument convertible to its parameter type.
    pub fn matches(&self, args: &Args) -> bool {
        (self.matcher)(args)
    }

    /// Build an instance, into `storage` when supplied (placed) or into
    /// fresh engine-owned storage otherwise (owned).
    ///
    /// Returns the sentinel if an argument fails to convert or the storage
    /// was already released.
    pub fn create(&self, storage: Option<&ObjectStorage>, args: &Args) -> Object {
        let Some(value) = (self.builder)(args) else {
            return Object::nothing();
        };
        match storage {
            Some(storage) => Object::place(storage, value),
            None => Object::from_boxed(value),
        }
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Type-erased destructor hook, run on the value before its storage empties.
pub struct Destructor {
    hook: Arc<dyn Fn(&mut dyn Any) + Send + Sync>,
}

impl Destructor {
    /// Wrap a typed cleanup closure. The hook is skipped if the torn-down
    /// value has a different type.
    pub fn from_fn<T: 'static>(f: impl Fn(&mut T) + Send + Sync + 'static) -> Self {
        Self {
            hook: Arc::new(move |value| {
                if let Some(typed) = value.downcast_mut::<T>() {
                    f(typed);
                }
            }),
        }
    }

    pub(crate) fn invoke(&self, value: &mut dyn Any) {
        (self.hook)(value)
    }
}

impl fmt::Debug for Destructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destructor").finish_non_exhaustive()
    }
}

/// Immutable metadata for one bound type.
pub struct Class {
    name: String,
    constructors: Vec<Constructor>,
    destructor: Option<Destructor>,
    functions: FxHashMap<String, Function>,
}

impl Class {
    /// Start a class descriptor with no members.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructors: Vec::new(),
            destructor: None,
            functions: FxHashMap::default(),
        }
    }

    /// Append a constructor overload. Registration order is the overload
    /// resolution order.
    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Set the destructor hook.
    pub fn with_destructor(mut self, destructor: Destructor) -> Self {
        self.destructor = Some(destructor);
        self
    }

    /// Add a bound function, keyed by its name.
    ///
    /// A later function with the same name replaces the earlier one. This is
    /// the last-write-wins behavior of a builder; cross-class name collisions
    /// are rejected at [`Registry::register`](crate::Registry::register)
    /// instead.
    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.insert(function.name().to_owned(), function);
        self
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registered constructor overloads.
    pub fn constructor_count(&self) -> usize {
        self.constructors.len()
    }

    /// Constructor overload by registration index.
    pub fn constructor(&self, index: usize) -> Option<&Constructor> {
        self.constructors.get(index)
    }

    /// Iterate constructor overloads in registration order.
    pub fn constructors(&self) -> impl Iterator<Item = &Constructor> {
        self.constructors.iter()
    }

    /// Look up a bound function by name.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Tear down the instance behind `object`: run the destructor hook, then
    /// empty the storage. With `release_storage` the storage is additionally
    /// marked released and refuses further placement.
    ///
    /// A sentinel or already-torn-down handle is a no-op.
    pub fn destruct(&self, object: &Object, release_storage: bool) {
        if let Some(mut value) = object.take_boxed() {
            if let Some(destructor) = &self.destructor {
                destructor.invoke(value.as_mut());
            }
        }
        if release_storage {
            object.release_storage();
        }
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("constructors", &self.constructors.len())
            .field("functions", &self.functions.len())
            .finish()
    }
}
