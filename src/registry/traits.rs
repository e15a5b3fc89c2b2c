//! Common trait for collections that store named objects.

use std::collections::HashSet;

use crate::observable::{ObservableList, Subscription};

use super::events::{EntryChange, RenameEvent};
use super::store::RegistryError;

/// Common interface of [`Registry`](super::Registry) and
/// [`FilteredView`](super::FilteredView).
///
/// All methods take `&self`: implementors are shared handles over
/// single-threaded interior state, so a UI facade, a filtered view and the
/// owning session can all hold the same collection.
///
/// # Type Parameters
///
/// * `T` - The stored object type. Compared with `PartialEq`; wrap it in `Rc`
///   to share one instance between the collection and its callers.
///
/// # Example
///
/// ```
/// use named_objects::registry::{NamedObjects, Registry};
///
/// let registry = Registry::new();
/// registry.add("mnist", 784);
/// registry.add("xor", 2);
///
/// assert_eq!(registry.get("xor"), Some(2));
/// assert_eq!(registry.names_list(), vec!["mnist".to_string(), "xor".to_string()]);
/// ```
pub trait NamedObjects<T> {
    /// Associate `object` with `name`.
    ///
    /// An existing name keeps its position and has its object replaced; a new
    /// name is appended.
    fn add(&self, name: impl Into<String>, object: T);

    /// Remove the association for `name`. Returns `false` if there was none.
    fn remove(&self, name: &str) -> bool;

    /// Get the object stored under `name`.
    fn get(&self, name: &str) -> Option<T>;

    /// Name of the first association, in order, whose object equals `object`.
    fn name_for_object(&self, object: &T) -> Option<String>;

    /// Check if an association exists for `name`.
    fn contains_name(&self, name: &str) -> bool;

    /// Check if any association holds an object equal to `object`.
    fn contains_object(&self, object: &T) -> bool;

    /// Rekey the association for `old_name` without moving it.
    ///
    /// # Errors
    ///
    /// * [`RegistryError::UnknownName`] if `old_name` is not present.
    /// * [`RegistryError::NameTaken`] if `new_name` belongs to another association.
    fn rename(&self, old_name: &str, new_name: &str) -> Result<(), RegistryError>;

    /// Number of associations.
    fn len(&self) -> usize;

    /// Check if there are no associations.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unordered set of current names.
    fn names(&self) -> HashSet<String>;

    /// Current `(name, object)` pairs in order.
    fn entries(&self) -> Vec<(String, T)>;

    /// Live, ordered list of names.
    fn names_list(&self) -> ObservableList<String>;

    /// Live, ordered list of objects, index-aligned with [`names_list`](Self::names_list).
    fn objects_list(&self) -> ObservableList<T>;

    /// Call `listener` after every successful rename to a different name.
    fn subscribe_renames(&self, listener: impl Fn(&RenameEvent<T>) + 'static) -> Subscription;

    /// Detach a rename listener. Returns `false` if it was not registered.
    fn unsubscribe_renames(&self, id: Subscription) -> bool;

    /// Call `listener` after every change to the ordered entries.
    fn subscribe_entries(&self, listener: impl Fn(&EntryChange<T>) + 'static) -> Subscription;

    /// Detach an entry listener. Returns `false` if it was not registered.
    fn unsubscribe_entries(&self, id: Subscription) -> bool;
}
