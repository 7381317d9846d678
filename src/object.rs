//! Type-erased instance handles and caller-supplied storage.
//!
//! An [`Object`] is an opaque reference to a live instance of a registered
//! class, or the "no instance" sentinel. The sentinel does double duty: it is
//! the result of a failed construction *and* the receiver passed to static
//! calls, with the two call sites interpreting it differently.
//!
//! Live objects reference a shared storage cell. Who owns that cell decides
//! the teardown operation:
//!
//! - *owned* - the factory allocated the cell; retire with
//!   [`ObjectFactory::destroy`](crate::runtime::ObjectFactory::destroy)
//! - *placed* - the caller supplied an [`ObjectStorage`]; retire with
//!   [`ObjectFactory::destruct`](crate::runtime::ObjectFactory::destruct),
//!   which leaves the storage reusable
//!
//! The construction mode is *not* recorded on the handle; the caller must
//! remember which teardown applies. Instances are owned by a single thread
//! for the duration of a call, so storage uses `Rc`/`RefCell`, not atomics.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Why typed access to an [`Object`] failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// The handle is the "no instance" sentinel, or the value was torn down.
    Nothing,
    /// The handle is live but holds a different type.
    TypeMismatch,
    /// The value is already borrowed by an enclosing access through another
    /// handle to the same cell (aliased receiver/argument handles).
    InUse,
}

/// Shared storage for one type-erased instance.
pub(crate) struct ObjectCell {
    value: RefCell<Option<Box<dyn Any>>>,
    /// Set when the storage was released through the destroy path. A released
    /// cell refuses further placement, so destroying a placed handle is a
    /// detectable mistake instead of silent storage corruption.
    released: Cell<bool>,
}

impl ObjectCell {
    fn empty() -> Self {
        Self {
            value: RefCell::new(None),
            released: Cell::new(false),
        }
    }
}

/// Opaque handle to a live, type-erased instance.
///
/// Cloning an `Object` clones the handle, not the instance: all clones
/// reference the same storage cell, and tearing the instance down through any
/// of them empties the cell for all of them.
#[derive(Clone, Default)]
pub struct Object {
    cell: Option<Rc<ObjectCell>>,
}

impl Object {
    /// The "no instance" sentinel.
    ///
    /// Returned by failed constructions and passed as the receiver of static
    /// calls. Checkable, never an error by itself.
    pub fn nothing() -> Self {
        Self { cell: None }
    }

    /// Check whether this handle is the sentinel.
    pub fn is_nothing(&self) -> bool {
        self.cell.is_none()
    }

    /// Check whether this handle still references a live value.
    ///
    /// Differs from [`is_nothing`](Self::is_nothing) for clones of a handle
    /// whose instance has already been torn down.
    pub fn is_alive(&self) -> bool {
        // An in-use cell necessarily holds a live value.
        self.cell
            .as_ref()
            .is_some_and(|cell| cell.value.try_borrow().map_or(true, |v| v.is_some()))
    }

    /// Wrap a freshly built value in engine-owned storage.
    pub(crate) fn from_boxed(value: Box<dyn Any>) -> Self {
        let cell = ObjectCell::empty();
        *cell.value.borrow_mut() = Some(value);
        Self {
            cell: Some(Rc::new(cell)),
        }
    }

    /// Build a value into caller-supplied storage.
    ///
    /// Returns the sentinel if the storage was already released.
    pub(crate) fn place(storage: &ObjectStorage, value: Box<dyn Any>) -> Self {
        if storage.cell.released.get() {
            return Self::nothing();
        }
        let Ok(mut slot) = storage.cell.value.try_borrow_mut() else {
            return Self::nothing();
        };
        *slot = Some(value);
        drop(slot);
        Self {
            cell: Some(Rc::clone(&storage.cell)),
        }
    }

    /// Run `f` against the contained value as `&T`.
    ///
    /// Fails with [`AccessError::InUse`] instead of aborting when the cell is
    /// already mutably borrowed through an aliasing handle.
    pub fn with_ref<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, AccessError> {
        let cell = self.cell.as_ref().ok_or(AccessError::Nothing)?;
        let borrow = cell.value.try_borrow().map_err(|_| AccessError::InUse)?;
        let value = borrow.as_ref().ok_or(AccessError::Nothing)?;
        let typed = value.downcast_ref::<T>().ok_or(AccessError::TypeMismatch)?;
        Ok(f(typed))
    }

    /// Run `f` against the contained value as `&mut T`.
    ///
    /// Fails with [`AccessError::InUse`] instead of aborting when the cell is
    /// already borrowed through an aliasing handle.
    pub fn with_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, AccessError> {
        let cell = self.cell.as_ref().ok_or(AccessError::Nothing)?;
        let mut borrow = cell.value.try_borrow_mut().map_err(|_| AccessError::InUse)?;
        let value = borrow.as_mut().ok_or(AccessError::Nothing)?;
        let typed = value.downcast_mut::<T>().ok_or(AccessError::TypeMismatch)?;
        Ok(f(typed))
    }

    /// Take the contained value out, leaving the cell empty.
    ///
    /// Returns `None` for the sentinel or an already-emptied cell, which is
    /// what makes double teardown a no-op. A cell borrowed by an enclosing
    /// call also yields `None`; the value stays put rather than crashing.
    pub(crate) fn take_boxed(&self) -> Option<Box<dyn Any>> {
        self.cell.as_ref()?.value.try_borrow_mut().ok()?.take()
    }

    /// Mark the underlying storage as released.
    pub(crate) fn release_storage(&self) {
        if let Some(cell) = &self.cell {
            cell.released.set(true);
        }
    }
}

impl PartialEq for Object {
    /// Handles compare by cell identity; two sentinels are equal.
    fn eq(&self, other: &Self) -> bool {
        match (&self.cell, &other.cell) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nothing() {
            write!(f, "Object(nothing)")
        } else if self.is_alive() {
            write!(f, "Object(live)")
        } else {
            write!(f, "Object(destroyed)")
        }
    }
}

/// Caller-owned storage an instance can be constructed into.
///
/// Pass a reference to
/// [`ObjectFactory::construct`](crate::runtime::ObjectFactory::construct) to
/// build in place. The resulting handle is *placed*: retire it with
/// `destruct`, after which the storage is empty and reusable.
pub struct ObjectStorage {
    cell: Rc<ObjectCell>,
}

impl ObjectStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self {
            cell: Rc::new(ObjectCell::empty()),
        }
    }

    /// Check whether an instance currently lives in this storage.
    pub fn is_occupied(&self) -> bool {
        self.cell.value.try_borrow().map_or(true, |v| v.is_some())
    }

    /// Check whether this storage was released and can no longer be built
    /// into. Only the destroy path releases storage; `destruct` leaves it
    /// reusable.
    pub fn is_released(&self) -> bool {
        self.cell.released.get()
    }
}

impl Default for ObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStorage")
            .field("occupied", &self.is_occupied())
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_nothing() {
        let obj = Object::nothing();
        assert!(obj.is_nothing());
        assert!(!obj.is_alive());
        assert_eq!(obj.with_ref::<i32, _>(|v| *v), Err(AccessError::Nothing));
    }

    #[test]
    fn typed_access_distinguishes_nothing_from_mismatch() {
        let obj = Object::from_boxed(Box::new(5i32));
        assert_eq!(obj.with_ref::<i32, _>(|v| *v), Ok(5));
        assert_eq!(
            obj.with_ref::<String, _>(|s| s.len()),
            Err(AccessError::TypeMismatch)
        );
    }

    #[test]
    fn clones_share_the_cell() {
        let obj = Object::from_boxed(Box::new(1i32));
        let alias = obj.clone();
        obj.with_mut::<i32, _>(|v| *v = 2).unwrap();
        assert_eq!(alias.with_ref::<i32, _>(|v| *v), Ok(2));
        assert_eq!(obj, alias);

        obj.take_boxed();
        assert!(!alias.is_alive());
        assert!(!alias.is_nothing());
    }

    #[test]
    fn access_through_alias_while_borrowed_is_in_use() {
        let obj = Object::from_boxed(Box::new(1i32));
        let alias = obj.clone();
        let nested = obj.with_mut::<i32, _>(|_| alias.with_ref::<i32, _>(|v| *v));
        assert_eq!(nested, Ok(Err(AccessError::InUse)));

        let nested_mut = obj.with_ref::<i32, _>(|_| alias.with_mut::<i32, _>(|v| *v));
        assert_eq!(nested_mut, Ok(Err(AccessError::InUse)));

        // The cell is usable again once the outer borrow ends.
        assert_eq!(obj.with_ref::<i32, _>(|v| *v), Ok(1));
    }

    #[test]
    fn take_is_idempotent() {
        let obj = Object::from_boxed(Box::new(1i32));
        assert!(obj.take_boxed().is_some());
        assert!(obj.take_boxed().is_none());
    }

    #[test]
    fn released_storage_refuses_placement() {
        let storage = ObjectStorage::new();
        let obj = Object::place(&storage, Box::new(1i32));
        assert!(storage.is_occupied());
        assert!(!obj.is_nothing());

        obj.take_boxed();
        obj.release_storage();
        assert!(storage.is_released());
        assert!(Object::place(&storage, Box::new(2i32)).is_nothing());
        assert!(!storage.is_occupied());
    }

    #[test]
    fn storage_reusable_after_plain_take() {
        let storage = ObjectStorage::new();
        let obj = Object::place(&storage, Box::new(1i32));
        obj.take_boxed();
        assert!(!storage.is_occupied());
        assert!(!storage.is_released());

        let again = Object::place(&storage, Box::new(2i32));
        assert_eq!(again.with_ref::<i32, _>(|v| *v), Ok(2));
    }
}
