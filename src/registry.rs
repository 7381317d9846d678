//! Class metadata registry.
//!
//! [`Registry`] is the lookup seam between the registration layer and the
//! runtime components. It is *not* ambient state: callers hold it and pass
//! references into [`ObjectFactory`](crate::runtime::ObjectFactory) /
//! [`FunctionCaller`](crate::runtime::FunctionCaller) explicitly, which keeps
//! the runtime testable against local registries.
//!
//! # Thread safety
//!
//! Usage follows two phases: a single-threaded registration phase that
//! populates the registry, and an execution phase during which it is
//! effectively read-only and safe to share for concurrent reads (wrap it
//! yourself if you need concurrent *registration*).

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::class::Class;

/// Registration failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// A class with the same name is already registered.
    #[error("class '{name}' is already registered")]
    DuplicateClass { name: String },
}

/// Storage for registered class metadata, keyed by class name.
#[derive(Debug, Default)]
pub struct Registry {
    classes: FxHashMap<String, Class>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class. Names are unique; a duplicate is an error rather
    /// than a silent replacement.
    pub fn register(&mut self, class: Class) -> Result<(), RegistryError> {
        let name = class.name().to_owned();
        if self.classes.contains_key(&name) {
            return Err(RegistryError::DuplicateClass { name });
        }
        self.classes.insert(name, class);
        Ok(())
    }

    /// Look up a class by name.
    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate over registered classes in no particular order.
    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }
}
