//! Change events emitted by registries and filtered views.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::observable::{ObservableList, Subscribers};

/// Payload of a rename notification.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameEvent<T> {
    /// The object whose name changed.
    pub object: T,
    pub old_name: String,
    pub new_name: String,
}

/// An index-tagged mutation of a collection's ordered entries.
///
/// Indices are positions in the emitting collection's own order: a filtered
/// view re-emits its source's changes with view-relative indices.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryChange<T> {
    /// A new association was appended or inserted at `index`.
    Inserted { index: usize, name: String, object: T },
    /// The association at `index` was removed.
    Removed { index: usize, name: String, object: T },
    /// The object under `name` was replaced in place.
    Replaced { index: usize, name: String, old: T, new: T },
    /// The association at `index` was rekeyed.
    Renamed { index: usize, object: T, old_name: String, new_name: String },
}

impl<T> EntryChange<T> {
    /// Position the change applies to.
    pub fn index(&self) -> usize {
        match self {
            EntryChange::Inserted { index, .. }
            | EntryChange::Removed { index, .. }
            | EntryChange::Replaced { index, .. }
            | EntryChange::Renamed { index, .. } => *index,
        }
    }
}

/// The ordered, observable face of a collection: aligned names and objects
/// lists plus the entry-change channel.
///
/// Both lists are edited before either publishes, so listeners never observe
/// them with different lengths.
///
/// Changes are delivered strictly in the order they were made. A change made
/// by a listener while another change is being delivered is queued and
/// delivered once every listener of the current one has run.
pub(crate) struct Projection<T> {
    names: ObservableList<String>,
    objects: ObservableList<T>,
    entries: Subscribers<EntryChange<T>>,
    pending: RefCell<VecDeque<EntryChange<T>>>,
    dispatching: Cell<bool>,
}

impl<T: Clone> Projection<T> {
    pub(crate) fn from_entries(entries: Vec<(String, T)>) -> Self {
        let (names, objects): (Vec<String>, Vec<T>) = entries.into_iter().unzip();
        Self {
            names: ObservableList::from_vec(names),
            objects: ObservableList::from_vec(objects),
            entries: Subscribers::new(),
            pending: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        }
    }

    pub(crate) fn names(&self) -> ObservableList<String> {
        self.names.clone()
    }

    pub(crate) fn objects(&self) -> ObservableList<T> {
        self.objects.clone()
    }

    pub(crate) fn entries(&self) -> &Subscribers<EntryChange<T>> {
        &self.entries
    }

    /// Snapshot of `(name, object)` pairs in order.
    pub(crate) fn snapshot(&self) -> Vec<(String, T)> {
        self.names.to_vec().into_iter().zip(self.objects.to_vec()).collect()
    }

    /// Mirror `change` into both lists, then notify list and entry subscribers.
    ///
    /// Called from inside a listener, the change is only queued; the outermost
    /// call drains the queue.
    pub(crate) fn apply(&self, change: EntryChange<T>) {
        self.pending.borrow_mut().push_back(change);
        if self.dispatching.replace(true) {
            tracing::trace!("entry change queued behind the one being delivered");
            return;
        }
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(change) = next else { break };
            self.dispatch(&change);
        }
        self.dispatching.set(false);
    }

    fn dispatch(&self, change: &EntryChange<T>) {
        match change {
            EntryChange::Inserted { index, name, object } => {
                let names = self.names.stage_insert(*index, name.clone());
                let objects = self.objects.stage_insert(*index, object.clone());
                self.names.publish(&names);
                self.objects.publish(&objects);
            }
            EntryChange::Removed { index, .. } => {
                let names = self.names.stage_remove(*index);
                let objects = self.objects.stage_remove(*index);
                self.names.publish(&names);
                self.objects.publish(&objects);
            }
            EntryChange::Replaced { index, new, .. } => {
                let objects = self.objects.stage_replace(*index, new.clone());
                self.objects.publish(&objects);
            }
            EntryChange::Renamed { index, new_name, .. } => {
                let names = self.names.stage_replace(*index, new_name.clone());
                self.names.publish(&names);
            }
        }
        self.entries.emit(change);
    }
}
