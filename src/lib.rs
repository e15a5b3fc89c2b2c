//! named-objects - Observable registries of uniquely named objects
//!
//! This library provides functionality to:
//! - Store objects under unique names with live, change-notifying lists
//! - Derive predicate-filtered views that track their source automatically
//! - Rename entries in place and notify any number of rename subscribers
//! - Back sample tables and select-by-object widgets with the same lists
//! - Load optional `named-objects.toml` settings and set up `tracing` output

pub mod config;
pub mod logging;
pub mod naming;
pub mod observable;
pub mod registry;
pub mod samples;
pub mod selection;

pub use observable::{ListChange, ObservableList, Subscription};
pub use registry::{EntryChange, FilteredView, NamedObjects, Registry, RegistryError, RenameEvent};
