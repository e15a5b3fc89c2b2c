//! Named-object registries and their filtered views.
//!
//! This module provides:
//! - A unified `NamedObjects` trait for anything that maps unique names to objects
//! - `Registry`, the insertion-ordered base store with live names/objects lists
//! - `FilteredView`, a predicate-filtered lens over a registry (or another view)
//! - `EntryChange` and `RenameEvent`, the notifications both of them emit
//!
//! Writes through a filtered view are never filtered; only reads are.

mod events;
mod filtered;
mod store;
mod traits;

// Re-export all public items from submodules
pub use events::{EntryChange, RenameEvent};
pub use filtered::FilteredView;
pub use store::{Registry, RegistryError};
pub use traits::NamedObjects;
