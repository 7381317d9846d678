//! Instance construction and teardown for one bound class.

use crate::args::Args;
use crate::class::Class;
use crate::object::{Object, ObjectStorage};

/// Constructs and retires instances of one registered class, without static
/// knowledge of the bound type.
///
/// ```
/// use speculo::runtime::ObjectFactory;
/// use speculo::{Args, Class, Constructor};
///
/// struct Point { x: i64, y: i64 }
///
/// let class = Class::new("Point")
///     .with_constructor(Constructor::from_fn(|| Point { x: 0, y: 0 }))
///     .with_constructor(Constructor::from_fn(|x: i64, y: i64| Point { x, y }));
///
/// let factory = ObjectFactory::new(&class);
/// let mut point = factory.create((1i64, 2i64));
/// assert!(!point.is_nothing());
/// factory.destroy(&mut point);
/// assert!(point.is_nothing());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ObjectFactory<'a> {
    class: &'a Class,
}

impl<'a> ObjectFactory<'a> {
    /// Bind a factory to a class.
    pub fn new(class: &'a Class) -> Self {
        Self { class }
    }

    /// The bound class.
    pub fn class(&self) -> &Class {
        self.class
    }

    /// Construct a new instance of the bound class.
    ///
    /// Constructor overloads are tried in registration order and the first
    /// whose signature matches `args` wins; there is no ambiguity detection
    /// or best-match scoring. With `storage` supplied the instance is built
    /// into that caller-owned storage (retire it with
    /// [`destruct`](Self::destruct)); otherwise the factory allocates
    /// (retire with [`destroy`](Self::destroy)).
    ///
    /// No matching overload yields [`Object::nothing`] - a normal, checkable
    /// result, not an error.
    pub fn construct(&self, args: &Args, storage: Option<&ObjectStorage>) -> Object {
        for constructor in self.class.constructors() {
            if constructor.matches(args) {
                return constructor.create(storage, args);
            }
        }
        Object::nothing()
    }

    /// Construct from positional arguments, without building an [`Args`]
    /// list by hand. Equivalent to `construct(&args.into(), None)`.
    pub fn create(&self, args: impl Into<Args>) -> Object {
        self.construct(&args.into(), None)
    }

    /// Destroy an instance the factory allocated: runs the destructor and
    /// releases the storage, then resets `object` to the sentinel.
    ///
    /// Valid only for owned handles. Calling it on a placed handle releases
    /// the caller's storage cell, which then refuses further placement - the
    /// mistake is detectable, but the caller remains responsible for using
    /// the teardown matching the construction mode.
    ///
    /// Destroying a sentinel handle is a safe no-op, so double teardown is
    /// harmless.
    pub fn destroy(&self, object: &mut Object) {
        self.class.destruct(object, true);
        *object = Object::nothing();
    }

    /// Destruct an instance built into caller-supplied storage: runs the
    /// destructor only, then resets `object` to the sentinel. The storage
    /// stays caller-owned, empty and reusable.
    ///
    /// Valid only for placed handles. Like [`destroy`](Self::destroy), a
    /// second call is a safe no-op.
    pub fn destruct(&self, object: &mut Object) {
        self.class.destruct(object, false);
        *object = Object::nothing();
    }
}
