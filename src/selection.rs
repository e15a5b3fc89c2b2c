//! Headless select-by-object model for list and combo-box style widgets.
//!
//! A [`Selection`] binds to any [`NamedObjects`] source, offers its live
//! objects list as the widget items, resolves display names through the
//! source, and only accepts selections of objects the source contains.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::observable::{ObservableList, Subscription};
use crate::registry::{EntryChange, NamedObjects};

/// Error when selecting an item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SelectionError {
    /// No source has been bound with `set_source`
    #[error("Selection source is not set")]
    SourceNotSet,
    /// The item is not in the bound source
    #[error("Item is not in the selection source")]
    NotFound,
}

struct Binding<S> {
    source: S,
    watch: Subscription,
}

type Converter<T> = Box<dyn Fn(&T, Option<String>) -> String>;

/// Selection state over a named-object source.
pub struct Selection<T, S: NamedObjects<T>> {
    binding: Option<Binding<S>>,
    selected: Rc<RefCell<Option<T>>>,
    on_selected: Option<Box<dyn FnMut(&T)>>,
    converter: Converter<T>,
}

impl<T, S> Selection<T, S>
where
    T: Clone + PartialEq + 'static,
    S: NamedObjects<T>,
{
    /// Create an unbound selection that displays items by their source name.
    pub fn new() -> Self {
        Self::with_converter(|_, name| name.unwrap_or_default())
    }

    /// Create an unbound selection whose display text is
    /// `converter(item, name_in_source)`.
    pub fn with_converter(converter: impl Fn(&T, Option<String>) -> String + 'static) -> Self {
        Self {
            binding: None,
            selected: Rc::new(RefCell::new(None)),
            on_selected: None,
            converter: Box::new(converter),
        }
    }

    /// Bind to `source`, replacing any previous source and clearing the selection.
    pub fn set_source(&mut self, source: S) {
        self.detach();
        *self.selected.borrow_mut() = None;

        let selected = Rc::clone(&self.selected);
        // The objects list already reflects a change when its entry event fires.
        let objects = source.objects_list();
        let watch = source.subscribe_entries(move |change| {
            if !matches!(change, EntryChange::Removed { .. } | EntryChange::Replaced { .. }) {
                return;
            }
            let mut current = selected.borrow_mut();
            if current.as_ref().is_some_and(|item| !objects.contains(item)) {
                tracing::trace!("selected item left the source");
                *current = None;
            }
        });
        self.binding = Some(Binding { source, watch });
    }

    /// The bound source, if any.
    pub fn source(&self) -> Option<&S> {
        self.binding.as_ref().map(|binding| &binding.source)
    }

    /// The widget items: the bound source's live objects list.
    pub fn items(&self) -> Option<ObservableList<T>> {
        self.source().map(|source| source.objects_list())
    }

    /// Select `item`.
    ///
    /// The `on_selected` handler runs only when the selection changes.
    ///
    /// # Errors
    ///
    /// * [`SelectionError::SourceNotSet`] if no source is bound.
    /// * [`SelectionError::NotFound`] if the source does not contain `item`.
    pub fn select(&mut self, item: &T) -> Result<(), SelectionError> {
        let source = self.source().ok_or(SelectionError::SourceNotSet)?;
        if !source.contains_object(item) {
            return Err(SelectionError::NotFound);
        }

        let changed = self.selected.borrow().as_ref() != Some(item);
        if changed {
            *self.selected.borrow_mut() = Some(item.clone());
            if let Some(handler) = self.on_selected.as_mut() {
                handler(item);
            }
        }
        Ok(())
    }

    /// Clear the selection without notifying.
    pub fn clear(&mut self) {
        *self.selected.borrow_mut() = None;
    }

    /// The selected item.
    pub fn selected(&self) -> Option<T> {
        self.selected.borrow().clone()
    }

    /// Check if an item is selected.
    pub fn is_selected(&self) -> bool {
        self.selected.borrow().is_some()
    }

    /// Set the handler called with each newly selected item.
    pub fn set_on_selected(&mut self, handler: impl FnMut(&T) + 'static) {
        self.on_selected = Some(Box::new(handler));
    }

    /// Display text for `item`.
    pub fn display_name(&self, item: &T) -> String {
        let name = self.source().and_then(|source| source.name_for_object(item));
        (self.converter)(item, name)
    }
}

impl<T, S: NamedObjects<T>> Selection<T, S> {
    fn detach(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.source.unsubscribe_entries(binding.watch);
        }
    }
}

impl<T, S> Default for Selection<T, S>
where
    T: Clone + PartialEq + 'static,
    S: NamedObjects<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: NamedObjects<T>> Drop for Selection<T, S> {
    fn drop(&mut self) {
        self.detach();
    }
}
