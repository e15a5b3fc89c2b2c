//! Keeping self-named objects in step with registry renames.

use std::rc::Rc;

use crate::observable::Subscription;
use crate::registry::{NamedObjects, RenameEvent};

/// An object that carries its own display name.
///
/// `set_name` takes `&self` because registry objects are shared; implementors
/// hold the name behind a `RefCell` (or similar).
pub trait Named {
    fn name(&self) -> String;
    fn set_name(&self, name: &str);
}

impl<N: Named + ?Sized> Named for Rc<N> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn set_name(&self, name: &str) {
        (**self).set_name(name)
    }
}

/// Add `object` to `target` under its own name.
pub fn add_named<T, S>(target: &S, object: T)
where
    T: Named,
    S: NamedObjects<T>,
{
    target.add(object.name(), object);
}

/// Write every rename on `source` back into the renamed object.
///
/// Returns the rename subscription; pass it to
/// [`unsubscribe_renames`](NamedObjects::unsubscribe_renames) to stop syncing.
pub fn sync_names<T, S>(source: &S) -> Subscription
where
    T: Named + 'static,
    S: NamedObjects<T>,
{
    source.subscribe_renames(|event: &RenameEvent<T>| {
        tracing::trace!(
            old_name = %event.old_name,
            new_name = %event.new_name,
            "syncing object name"
        );
        event.object.set_name(&event.new_name);
    })
}
