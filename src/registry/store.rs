//! The base name-to-object store.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::config::RegistryConfig;
use crate::observable::{ObservableList, Subscribers, Subscription};

use super::events::{EntryChange, Projection, RenameEvent};
use super::traits::NamedObjects;

/// Error returned by [`NamedObjects::rename`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The name to rename is not in the registry
    #[error("Name '{0}' not found")]
    UnknownName(String),
    /// The target name already belongs to a different association
    #[error("Name '{0}' is already taken")]
    NameTaken(String),
}

struct RegistryCore<T> {
    entries: RefCell<IndexMap<String, T>>,
    projection: Projection<T>,
    renames: Subscribers<RenameEvent<T>>,
}

/// Insertion-ordered store of uniquely named objects.
///
/// `Registry` is a handle: clones share the same store. Name lookup is O(1);
/// object-to-name resolution scans in order.
///
/// The names and objects lists returned by
/// [`names_list`](NamedObjects::names_list) and
/// [`objects_list`](NamedObjects::objects_list) are live and always
/// index-aligned.
pub struct Registry<T> {
    core: Rc<RegistryCore<T>>,
}

impl<T> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self { core: Rc::clone(&self.core) }
    }
}

impl<T: Clone + PartialEq + 'static> Registry<T> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new empty registry with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            core: Rc::new(RegistryCore {
                entries: RefCell::new(IndexMap::with_capacity(capacity)),
                projection: Projection::from_entries(Vec::new()),
                renames: Subscribers::new(),
            }),
        }
    }

    /// Create a registry sized by the `[registry]` config section.
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self::with_capacity(config.initial_capacity)
    }

    /// Check if two handles refer to the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    /// Index of `name` in the registry order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.core.entries.borrow().get_index_of(name)
    }
}

impl<T: Clone + PartialEq + 'static> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.core.entries.borrow().iter()).finish()
    }
}

impl<T: Clone + PartialEq + 'static> NamedObjects<T> for Registry<T> {
    fn add(&self, name: impl Into<String>, object: T) {
        let name = name.into();
        let change = {
            let mut entries = self.core.entries.borrow_mut();
            if let Some(index) = entries.get_index_of(name.as_str()) {
                let old = std::mem::replace(&mut entries[index], object.clone());
                tracing::trace!(name = %name, index, "registry entry replaced");
                EntryChange::Replaced { index, name, old, new: object }
            } else {
                let (index, _) = entries.insert_full(name.clone(), object.clone());
                tracing::trace!(name = %name, index, "registry entry added");
                EntryChange::Inserted { index, name, object }
            }
        };
        self.core.projection.apply(change);
    }

    fn remove(&self, name: &str) -> bool {
        let removed = self.core.entries.borrow_mut().shift_remove_full(name);
        match removed {
            Some((index, name, object)) => {
                tracing::trace!(name = %name, index, "registry entry removed");
                self.core.projection.apply(EntryChange::Removed { index, name, object });
                true
            }
            None => false,
        }
    }

    fn get(&self, name: &str) -> Option<T> {
        self.core.entries.borrow().get(name).cloned()
    }

    fn name_for_object(&self, object: &T) -> Option<String> {
        self.core
            .entries
            .borrow()
            .iter()
            .find(|(_, candidate)| *candidate == object)
            .map(|(name, _)| name.clone())
    }

    fn contains_name(&self, name: &str) -> bool {
        self.core.entries.borrow().contains_key(name)
    }

    fn contains_object(&self, object: &T) -> bool {
        self.core.entries.borrow().values().any(|candidate| candidate == object)
    }

    fn rename(&self, old_name: &str, new_name: &str) -> Result<(), RegistryError> {
        let (index, object) = {
            let mut entries = self.core.entries.borrow_mut();
            let Some(index) = entries.get_index_of(old_name) else {
                tracing::debug!(old_name, new_name, "rename rejected: unknown name");
                return Err(RegistryError::UnknownName(old_name.to_string()));
            };
            if old_name == new_name {
                return Ok(());
            }
            if entries.contains_key(new_name) {
                tracing::debug!(old_name, new_name, "rename rejected: name taken");
                return Err(RegistryError::NameTaken(new_name.to_string()));
            }
            let Some((_, _, object)) = entries.shift_remove_full(old_name) else {
                return Err(RegistryError::UnknownName(old_name.to_string()));
            };
            entries.shift_insert(index, new_name.to_string(), object.clone());
            (index, object)
        };

        tracing::debug!(old_name, new_name, index, "registry entry renamed");
        self.core.projection.apply(EntryChange::Renamed {
            index,
            object: object.clone(),
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        });
        self.core.renames.emit(&RenameEvent {
            object,
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        });
        Ok(())
    }

    fn len(&self) -> usize {
        self.core.entries.borrow().len()
    }

    fn is_empty(&self) -> bool {
        self.core.entries.borrow().is_empty()
    }

    fn names(&self) -> HashSet<String> {
        self.core.entries.borrow().keys().cloned().collect()
    }

    // Read from the live lists so that a view built inside a listener starts
    // from the state its queued entry changes apply to.
    fn entries(&self) -> Vec<(String, T)> {
        self.core.projection.snapshot()
    }

    fn names_list(&self) -> ObservableList<String> {
        self.core.projection.names()
    }

    fn objects_list(&self) -> ObservableList<T> {
        self.core.projection.objects()
    }

    fn subscribe_renames(&self, listener: impl Fn(&RenameEvent<T>) + 'static) -> Subscription {
        self.core.renames.subscribe(listener)
    }

    fn unsubscribe_renames(&self, id: Subscription) -> bool {
        self.core.renames.unsubscribe(id)
    }

    fn subscribe_entries(&self, listener: impl Fn(&EntryChange<T>) + 'static) -> Subscription {
        self.core.projection.entries().subscribe(listener)
    }

    fn unsubscribe_entries(&self, id: Subscription) -> bool {
        self.core.projection.entries().unsubscribe(id)
    }
}
