//! Live sequences and change channels.
//!
//! An [`ObservableList`] is a shared, read-only handle onto a sequence owned by
//! a registry (or a filtered view). Every handle cloned from the same list sees
//! the same items, and subscribers receive each mutation as an incremental
//! [`ListChange`].
//!
//! Everything here is single-threaded: handles are `Rc`-based and therefore
//! neither `Send` nor `Sync`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

/// Handle returned by every `subscribe*` call, used to unsubscribe.
///
/// Ids are unique for the lifetime of the process, so a handle from one channel
/// never matches a listener registered on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subscription(u64);

impl Subscription {
    fn next() -> Self {
        Self(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed))
    }
}

/// A multi-subscriber notification channel.
///
/// Listeners run synchronously, in subscription order. The listener set is
/// snapshotted before dispatch, so a listener may subscribe or unsubscribe
/// (itself included) while being called.
pub struct Subscribers<E> {
    slots: RefCell<Vec<(Subscription, Rc<dyn Fn(&E)>)>>,
}

impl<E> Subscribers<E> {
    /// Create a channel with no listeners.
    pub fn new() -> Self {
        Self { slots: RefCell::new(Vec::new()) }
    }

    /// Register a listener and return its handle.
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> Subscription {
        let id = Subscription::next();
        self.slots.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if the handle was not registered here.
    pub fn unsubscribe(&self, id: Subscription) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|(slot, _)| *slot != id);
        slots.len() != before
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Check if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    /// Deliver `event` to every listener.
    pub fn emit(&self, event: &E) {
        let listeners: Vec<Rc<dyn Fn(&E)>> =
            self.slots.borrow().iter().map(|(_, listener)| Rc::clone(listener)).collect();
        for listener in listeners {
            listener(event);
        }
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers").field("listeners", &self.len()).finish()
    }
}

/// A single incremental mutation of an [`ObservableList`].
#[derive(Debug, Clone, PartialEq)]
pub enum ListChange<E> {
    /// `item` now occupies `index`; later items shifted right by one.
    Inserted { index: usize, item: E },
    /// `item` was removed from `index`; later items shifted left by one.
    Removed { index: usize, item: E },
    /// The item at `index` changed from `old` to `new`.
    Replaced { index: usize, old: E, new: E },
}

impl<E> ListChange<E> {
    /// Position the change applies to.
    pub fn index(&self) -> usize {
        match self {
            ListChange::Inserted { index, .. }
            | ListChange::Removed { index, .. }
            | ListChange::Replaced { index, .. } => *index,
        }
    }
}

struct ListCore<E> {
    items: RefCell<Vec<E>>,
    changes: Subscribers<ListChange<E>>,
}

/// Read-only handle onto a live, ordered sequence.
///
/// Cloning the handle does not copy the items: both handles observe the same
/// sequence object. Only the owning registry, view or sample set can mutate it.
pub struct ObservableList<E> {
    core: Rc<ListCore<E>>,
}

impl<E> Clone for ObservableList<E> {
    fn clone(&self) -> Self {
        Self { core: Rc::clone(&self.core) }
    }
}

impl<E: Clone> ObservableList<E> {
    pub(crate) fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub(crate) fn from_vec(items: Vec<E>) -> Self {
        Self { core: Rc::new(ListCore { items: RefCell::new(items), changes: Subscribers::new() }) }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.core.items.borrow().len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.core.items.borrow().is_empty()
    }

    /// Get a copy of the item at `index`.
    pub fn get(&self, index: usize) -> Option<E> {
        self.core.items.borrow().get(index).cloned()
    }

    /// Copy the current contents.
    pub fn to_vec(&self) -> Vec<E> {
        self.core.items.borrow().clone()
    }

    /// Run `f` against the current contents without copying them.
    ///
    /// `f` must not mutate the owning collection.
    pub fn with_items<R>(&self, f: impl FnOnce(&[E]) -> R) -> R {
        f(&self.core.items.borrow())
    }

    /// Check if the list holds an item equal to `item`.
    pub fn contains(&self, item: &E) -> bool
    where
        E: PartialEq,
    {
        self.core.items.borrow().contains(item)
    }

    /// Index of the first item equal to `item`.
    pub fn position(&self, item: &E) -> Option<usize>
    where
        E: PartialEq,
    {
        self.core.items.borrow().iter().position(|candidate| candidate == item)
    }

    /// Observe every later mutation of this list.
    pub fn subscribe(&self, listener: impl Fn(&ListChange<E>) + 'static) -> Subscription {
        self.core.changes.subscribe(listener)
    }

    /// Stop observing. Returns `false` if the handle was not registered on this list.
    pub fn unsubscribe(&self, id: Subscription) -> bool {
        self.core.changes.unsubscribe(id)
    }

    /// Check if two handles refer to the same sequence object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }

    // Staged edits mutate the items without notifying, so an owner keeping
    // several lists aligned can update all of them before any listener runs.

    pub(crate) fn stage_insert(&self, index: usize, item: E) -> ListChange<E> {
        self.core.items.borrow_mut().insert(index, item.clone());
        ListChange::Inserted { index, item }
    }

    pub(crate) fn stage_remove(&self, index: usize) -> ListChange<E> {
        let item = self.core.items.borrow_mut().remove(index);
        ListChange::Removed { index, item }
    }

    pub(crate) fn stage_replace(&self, index: usize, new: E) -> ListChange<E> {
        let old = std::mem::replace(&mut self.core.items.borrow_mut()[index], new.clone());
        ListChange::Replaced { index, old, new }
    }

    pub(crate) fn publish(&self, change: &ListChange<E>) {
        self.core.changes.emit(change);
    }

    pub(crate) fn push(&self, item: E) {
        let index = self.len();
        let change = self.stage_insert(index, item);
        self.publish(&change);
    }

    pub(crate) fn remove(&self, index: usize) -> E {
        let item = self.core.items.borrow_mut().remove(index);
        self.publish(&ListChange::Removed { index, item: item.clone() });
        item
    }
}

impl<E: fmt::Debug> fmt::Debug for ObservableList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.core.items.borrow().iter()).finish()
    }
}

impl<E: PartialEq> PartialEq<Vec<E>> for ObservableList<E> {
    fn eq(&self, other: &Vec<E>) -> bool {
        *self.core.items.borrow() == *other
    }
}

impl<E: PartialEq> PartialEq<[E]> for ObservableList<E> {
    fn eq(&self, other: &[E]) -> bool {
        self.core.items.borrow().as_slice() == other
    }
}
