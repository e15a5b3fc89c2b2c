//! Predicate-filtered lens over a named-object collection.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::observable::{ObservableList, Subscription};

use super::events::{EntryChange, Projection, RenameEvent};
use super::store::{Registry, RegistryError};
use super::traits::NamedObjects;

/// Mask of visible source positions plus the view's own live lists.
struct FilterState<T> {
    predicate: Rc<dyn Fn(&T) -> bool>,
    /// Source indices whose object passes, ascending.
    mask: RefCell<Vec<usize>>,
    projection: Projection<T>,
}

impl<T: Clone> FilterState<T> {
    fn passes(&self, object: &T) -> bool {
        (self.predicate)(object)
    }

    /// Translate a source change into a view change, updating the mask.
    fn translate(&self, change: &EntryChange<T>) -> Option<EntryChange<T>> {
        let mut mask = self.mask.borrow_mut();
        match change {
            EntryChange::Inserted { index, name, object } => {
                for position in mask.iter_mut().filter(|position| **position >= *index) {
                    *position += 1;
                }
                if !self.passes(object) {
                    return None;
                }
                let at = mask.partition_point(|position| position < index);
                mask.insert(at, *index);
                Some(EntryChange::Inserted {
                    index: at,
                    name: name.clone(),
                    object: object.clone(),
                })
            }
            EntryChange::Removed { index, name, object } => {
                let found = mask.binary_search(index);
                if let Ok(at) = found {
                    mask.remove(at);
                }
                for position in mask.iter_mut().filter(|position| **position > *index) {
                    *position -= 1;
                }
                found.ok().map(|at| EntryChange::Removed {
                    index: at,
                    name: name.clone(),
                    object: object.clone(),
                })
            }
            EntryChange::Replaced { index, name, old, new } => {
                match (mask.binary_search(index), self.passes(new)) {
                    (Ok(at), true) => Some(EntryChange::Replaced {
                        index: at,
                        name: name.clone(),
                        old: old.clone(),
                        new: new.clone(),
                    }),
                    (Ok(at), false) => {
                        mask.remove(at);
                        Some(EntryChange::Removed {
                            index: at,
                            name: name.clone(),
                            object: old.clone(),
                        })
                    }
                    (Err(at), true) => {
                        mask.insert(at, *index);
                        Some(EntryChange::Inserted {
                            index: at,
                            name: name.clone(),
                            object: new.clone(),
                        })
                    }
                    (Err(_), false) => None,
                }
            }
            EntryChange::Renamed { index, object, old_name, new_name } => {
                mask.binary_search(index).ok().map(|at| EntryChange::Renamed {
                    index: at,
                    object: object.clone(),
                    old_name: old_name.clone(),
                    new_name: new_name.clone(),
                })
            }
        }
    }

    fn on_source_change(&self, change: &EntryChange<T>) {
        // The mask borrow ends inside translate, before downstream listeners run.
        if let Some(change) = self.translate(change) {
            self.projection.apply(change);
        }
    }
}

struct FilterCore<T, S: NamedObjects<T>> {
    source: S,
    state: Rc<FilterState<T>>,
    subscription: Subscription,
}

impl<T, S: NamedObjects<T>> Drop for FilterCore<T, S> {
    fn drop(&mut self) {
        self.source.unsubscribe_entries(self.subscription);
        tracing::trace!("filtered view detached");
    }
}

/// A live, read-filtered lens over a [`Registry`] or another `FilteredView`.
///
/// Reads (`get`, `contains_*`, `name_for_object`, `names`, `len`, the live
/// lists) only see associations whose object passes the predicate. Writes
/// (`add`, `remove`, `rename`) and rename subscriptions go straight to the
/// source, unfiltered: an object that fails the predicate can be added through
/// the view and will show up in the source but not here.
///
/// The view stores no objects of its own beyond its live lists, which it keeps
/// in step with the source's entry changes. Dropping the last handle detaches
/// it from the source.
///
/// # Example
///
/// ```
/// use named_objects::registry::{FilteredView, NamedObjects, Registry};
///
/// let registry = Registry::new();
/// registry.add("N1", "AAA".to_string());
/// registry.add("N2", "BB".to_string());
///
/// let view = FilteredView::new(registry.clone(), |s: &String| s.len() == 3);
/// view.add("N3", "E".to_string());
///
/// assert_eq!(view.objects_list(), vec!["AAA".to_string()]);
/// assert_eq!(registry.len(), 3);
/// ```
pub struct FilteredView<T, S: NamedObjects<T> = Registry<T>> {
    core: Rc<FilterCore<T, S>>,
}

impl<T, S: NamedObjects<T>> Clone for FilteredView<T, S> {
    fn clone(&self) -> Self {
        Self { core: Rc::clone(&self.core) }
    }
}

impl<T, S> FilteredView<T, S>
where
    T: Clone + PartialEq + 'static,
    S: NamedObjects<T>,
{
    /// Create a view of `source` showing only objects for which `predicate` holds.
    pub fn new(source: S, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        let predicate: Rc<dyn Fn(&T) -> bool> = Rc::new(predicate);

        let mut mask = Vec::new();
        let mut visible = Vec::new();
        for (index, (name, object)) in source.entries().into_iter().enumerate() {
            if predicate(&object) {
                mask.push(index);
                visible.push((name, object));
            }
        }
        tracing::debug!(visible = mask.len(), source = source.len(), "filtered view attached");

        let state = Rc::new(FilterState {
            predicate,
            mask: RefCell::new(mask),
            projection: Projection::from_entries(visible),
        });
        let listener = Rc::clone(&state);
        let subscription =
            source.subscribe_entries(move |change| listener.on_source_change(change));

        Self { core: Rc::new(FilterCore { source, state, subscription }) }
    }

    /// Create a transparent view that shows every association.
    pub fn unfiltered(source: S) -> Self {
        Self::new(source, |_| true)
    }

    /// The collection this view reads from and writes through to.
    pub fn source(&self) -> &S {
        &self.core.source
    }

    /// Check if `object` passes this view's predicate.
    pub fn accepts(&self, object: &T) -> bool {
        self.core.state.passes(object)
    }
}

impl<T, S> fmt::Debug for FilteredView<T, S>
where
    T: Clone + fmt::Debug,
    S: NamedObjects<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredView")
            .field("names", &self.core.state.projection.names())
            .field("objects", &self.core.state.projection.objects())
            .finish()
    }
}

impl<T, S> NamedObjects<T> for FilteredView<T, S>
where
    T: Clone + PartialEq + 'static,
    S: NamedObjects<T>,
{
    fn add(&self, name: impl Into<String>, object: T) {
        self.core.source.add(name, object);
    }

    fn remove(&self, name: &str) -> bool {
        self.core.source.remove(name)
    }

    fn get(&self, name: &str) -> Option<T> {
        self.core.source.get(name).filter(|object| self.accepts(object))
    }

    fn name_for_object(&self, object: &T) -> Option<String> {
        if !self.accepts(object) {
            return None;
        }
        self.core.source.name_for_object(object)
    }

    fn contains_name(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn contains_object(&self, object: &T) -> bool {
        self.core.source.contains_object(object) && self.accepts(object)
    }

    fn rename(&self, old_name: &str, new_name: &str) -> Result<(), RegistryError> {
        self.core.source.rename(old_name, new_name)
    }

    fn len(&self) -> usize {
        self.names().len()
    }

    fn names(&self) -> HashSet<String> {
        self.core.source.names().into_iter().filter(|name| self.contains_name(name)).collect()
    }

    fn entries(&self) -> Vec<(String, T)> {
        self.core.state.projection.snapshot()
    }

    fn names_list(&self) -> ObservableList<String> {
        self.core.state.projection.names()
    }

    fn objects_list(&self) -> ObservableList<T> {
        self.core.state.projection.objects()
    }

    fn subscribe_renames(&self, listener: impl Fn(&RenameEvent<T>) + 'static) -> Subscription {
        self.core.source.subscribe_renames(listener)
    }

    fn unsubscribe_renames(&self, id: Subscription) -> bool {
        self.core.source.unsubscribe_renames(id)
    }

    fn subscribe_entries(&self, listener: impl Fn(&EntryChange<T>) + 'static) -> Subscription {
        self.core.state.projection.entries().subscribe(listener)
    }

    fn unsubscribe_entries(&self, id: Subscription) -> bool {
        self.core.state.projection.entries().unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::ListChange;
    use std::cell::Cell;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn lengths() -> Registry<String> {
        let registry = Registry::new();
        registry.add("N1", "AAA".to_string());
        registry.add("N2", "BB".to_string());
        registry.add("N3", "CCCC".to_string());
        registry.add("N4", "DDD".to_string());
        registry
    }

    fn three_letter(registry: &Registry<String>) -> FilteredView<String> {
        FilteredView::new(registry.clone(), |s: &String| s.len() == 3)
    }

    fn assert_aligned<T: Clone + PartialEq + std::fmt::Debug + 'static, S: NamedObjects<T>>(view: &S) {
        let names = view.names_list().to_vec();
        let objects = view.objects_list().to_vec();
        assert_eq!(names.len(), objects.len());
        for (name, object) in names.iter().zip(&objects) {
            assert_eq!(view.get(name).as_ref(), Some(object));
        }
    }

    #[test]
    fn test_initial_lists_are_filtered_in_order() {
        let registry = lengths();
        let view = three_letter(&registry);

        assert_eq!(view.objects_list(), strings(&["AAA", "DDD"]));
        assert_eq!(view.names_list(), strings(&["N1", "N4"]));
        assert_eq!(view.len(), 2);
        assert_aligned(&view);
    }

    #[test]
    fn test_add_passing_object_through_view_appears() {
        let registry = lengths();
        let view = three_letter(&registry);
        let objects = view.objects_list();

        view.add("N5", "EEE".to_string());

        assert_eq!(objects, strings(&["AAA", "DDD", "EEE"]));
        assert_eq!(view.names_list(), strings(&["N1", "N4", "N5"]));
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_add_failing_object_through_view_reaches_source_only() {
        let registry = lengths();
        let view = three_letter(&registry);

        view.add("N6", "E".to_string());

        assert_eq!(view.objects_list(), strings(&["AAA", "DDD"]));
        assert!(!view.contains_name("N6"));
        assert_eq!(view.get("N6"), None);
        assert_eq!(registry.get("N6"), Some("E".to_string()));
        assert_eq!(registry.objects_list().to_vec().last(), Some(&"E".to_string()));
    }

    #[test]
    fn test_source_changes_after_construction_are_visible() {
        let registry = lengths();
        let view = three_letter(&registry);

        registry.add("N0", "ZZZ".to_string());
        registry.remove("N1");

        assert_eq!(view.names_list(), strings(&["N4", "N0"]));
        assert_eq!(view.len(), 2);
        assert_aligned(&view);
    }

    #[test]
    fn test_remove_through_view_is_unfiltered() {
        let registry = lengths();
        let view = three_letter(&registry);

        assert!(view.remove("N2"));
        assert!(!registry.contains_name("N2"));
        assert_eq!(view.names_list(), strings(&["N1", "N4"]));
        assert!(!view.remove("N2"));
    }

    #[test]
    fn test_replace_flips_visibility() {
        let registry = lengths();
        let view = three_letter(&registry);

        registry.add("N2", "BBB".to_string());
        assert_eq!(view.names_list(), strings(&["N1", "N2", "N4"]));

        registry.add("N1", "A".to_string());
        assert_eq!(view.names_list(), strings(&["N2", "N4"]));
        assert_eq!(view.objects_list(), strings(&["BBB", "DDD"]));

        registry.add("N4", "XYZ".to_string());
        assert_eq!(view.objects_list(), strings(&["BBB", "XYZ"]));
        assert_aligned(&view);
    }

    #[test]
    fn test_rename_updates_visible_name_in_place() {
        let registry = lengths();
        let view = three_letter(&registry);

        view.rename("N4", "M4").unwrap();
        assert_eq!(view.names_list(), strings(&["N1", "M4"]));

        view.rename("N2", "M2").unwrap();
        assert!(registry.contains_name("M2"));
        assert_eq!(view.names_list(), strings(&["N1", "M4"]));
    }

    #[test]
    fn test_rename_errors_pass_through() {
        let registry = lengths();
        let view = three_letter(&registry);

        assert_eq!(view.rename("nope", "x"), Err(RegistryError::UnknownName("nope".to_string())));
        assert_eq!(view.rename("N1", "N2"), Err(RegistryError::NameTaken("N2".to_string())));
    }

    #[test]
    fn test_get_and_contains_apply_predicate() {
        let registry = lengths();
        let view = three_letter(&registry);

        assert_eq!(view.get("N1"), Some("AAA".to_string()));
        assert_eq!(view.get("N2"), None);
        assert!(view.contains_name("N4"));
        assert!(!view.contains_name("N3"));
        assert!(view.contains_object(&"DDD".to_string()));
        assert!(!view.contains_object(&"BB".to_string()));
        assert!(!view.contains_object(&"QQQ".to_string()));
    }

    #[test]
    fn test_name_for_object_filtered_out_returns_none() {
        let registry = lengths();
        let view = three_letter(&registry);

        assert_eq!(view.name_for_object(&"DDD".to_string()), Some("N4".to_string()));
        assert_eq!(view.name_for_object(&"BB".to_string()), None);
        assert_eq!(view.name_for_object(&"QQQ".to_string()), None);
    }

    #[test]
    fn test_len_matches_names() {
        let registry = lengths();
        let view = three_letter(&registry);

        assert_eq!(view.len(), view.names().len());
        view.add("N7", "GGG".to_string());
        assert_eq!(view.len(), 3);
        registry.remove("N7");
        registry.remove("N3");
        assert_eq!(view.len(), view.names().len());
        assert_eq!(view.len(), 2);
        assert!(!view.is_empty());
    }

    #[test]
    fn test_is_empty_when_nothing_passes() {
        let registry = Registry::new();
        registry.add("only", "toolong".to_string());
        let view = three_letter(&registry);
        assert!(view.is_empty());
        assert!(view.names().is_empty());
    }

    #[test]
    fn test_unfiltered_view_mirrors_source() {
        let registry = lengths();
        let view = FilteredView::unfiltered(registry.clone());

        registry.add("N5", "E".to_string());
        assert_eq!(view.names_list().to_vec(), registry.names_list().to_vec());
        assert_eq!(view.len(), registry.len());
    }

    #[test]
    fn test_rename_subscription_delegates_to_source() {
        let registry = lengths();
        let view = three_letter(&registry);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let id = view.subscribe_renames(move |_| counter.set(counter.get() + 1));

        registry.rename("N2", "M2").unwrap();
        assert_eq!(calls.get(), 1);
        assert!(registry.unsubscribe_renames(id));
    }

    #[test]
    fn test_stacked_views_have_independent_rename_subscribers() {
        let registry = lengths();
        let short = FilteredView::new(registry.clone(), |s: &String| s.len() < 3);
        let long = FilteredView::new(registry.clone(), |s: &String| s.len() > 3);
        let seen = Rc::new(RefCell::new(Vec::new()));

        for (tag, view) in [("short", &short), ("long", &long)] {
            let sink = Rc::clone(&seen);
            view.subscribe_renames(move |event: &RenameEvent<String>| {
                sink.borrow_mut().push((tag, event.new_name.clone()))
            });
        }

        registry.rename("N3", "M3").unwrap();
        assert_eq!(*seen.borrow(), vec![("short", "M3".to_string()), ("long", "M3".to_string())]);
    }

    #[test]
    fn test_chained_views_compose_predicates() {
        let registry = lengths();
        let view = three_letter(&registry);
        let chained = FilteredView::new(view.clone(), |s: &String| s.starts_with('D'));

        assert_eq!(chained.names_list(), strings(&["N4"]));

        chained.add("N8", "DAB".to_string());
        chained.add("N9", "DA".to_string());
        assert_eq!(chained.names_list(), strings(&["N4", "N8"]));
        assert_eq!(view.names_list(), strings(&["N1", "N4", "N8"]));
        assert!(registry.contains_name("N9"));
        assert!(!chained.contains_name("N9"));
        assert_aligned(&chained);
    }

    #[test]
    fn test_view_entry_changes_use_view_indices() {
        let registry = lengths();
        let view = three_letter(&registry);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        view.subscribe_entries(move |change| sink.borrow_mut().push(change.clone()));

        registry.add("N5", "EEE".to_string());
        registry.remove("N1");

        assert_eq!(
            *seen.borrow(),
            vec![
                EntryChange::Inserted {
                    index: 2,
                    name: "N5".to_string(),
                    object: "EEE".to_string(),
                },
                EntryChange::Removed {
                    index: 0,
                    name: "N1".to_string(),
                    object: "AAA".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_dropping_view_detaches_from_source() {
        let registry = lengths();
        let view = three_letter(&registry);
        let names = view.names_list();
        drop(view);

        registry.add("N5", "EEE".to_string());
        assert_eq!(names, strings(&["N1", "N4"]));
    }

    #[test]
    fn test_clone_keeps_view_attached() {
        let registry = lengths();
        let view = three_letter(&registry);
        let other = view.clone();
        drop(view);

        registry.add("N5", "EEE".to_string());
        assert_eq!(other.names_list(), strings(&["N1", "N4", "N5"]));
    }

    #[test]
    fn test_listener_edit_during_delivery_keeps_view_in_step() {
        let registry = Registry::new();
        registry.add("placeholder", 0);
        let view = FilteredView::unfiltered(registry.clone());

        let handle = registry.clone();
        registry.names_list().subscribe(move |change| {
            if let ListChange::Inserted { .. } = change {
                handle.remove("placeholder");
            }
        });
        let object_changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&object_changes);
        registry.objects_list().subscribe(move |change| sink.borrow_mut().push(change.clone()));

        registry.add("real", 1);
        assert_eq!(registry.names_list(), strings(&["real"]));
        assert_eq!(view.names_list(), strings(&["real"]));
        assert_eq!(view.objects_list(), vec![1]);
        assert_aligned(&view);

        registry.remove("real");
        assert!(registry.is_empty());
        assert!(view.names_list().is_empty());
        assert_eq!(view.len(), 0);
        assert!(!view.contains_name("real"));
        assert_eq!(
            *object_changes.borrow(),
            vec![
                ListChange::Inserted { index: 1, item: 1 },
                ListChange::Removed { index: 0, item: 0 },
                ListChange::Removed { index: 0, item: 1 },
            ]
        );
    }

    #[test]
    fn test_view_entry_stream_follows_source_order_under_nested_edits() {
        let registry = Registry::new();
        let view = FilteredView::new(registry.clone(), |n: &i32| *n > 0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        view.subscribe_entries(move |change| sink.borrow_mut().push(change.index()));

        let handle = registry.clone();
        registry.subscribe_entries(move |change| {
            if let EntryChange::Inserted { name, .. } = change {
                if name == "a" {
                    handle.add("b", 2);
                    handle.add("c", -1);
                }
            }
        });

        registry.add("a", 1);

        assert_eq!(registry.names_list(), strings(&["a", "b", "c"]));
        assert_eq!(view.names_list(), strings(&["a", "b"]));
        assert_eq!(*seen.borrow(), vec![0, 1]);
    }
}
