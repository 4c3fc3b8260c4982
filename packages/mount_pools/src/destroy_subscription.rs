use std::any::type_name;
use std::fmt;
use std::rc::Weak;

use crate::root_context::RootContextInner;

/// Registration of a destruction listener on a [`RootContext`][crate::RootContext].
///
/// Returned by [`RootContext::on_destroyed()`][crate::RootContext::on_destroyed]. The
/// subscription only weakly references the root, so holding it does not keep the root alive.
///
/// Dropping the subscription leaves the listener registered. Call [`cancel()`][Self::cancel]
/// to unregister it.
pub struct DestroySubscription {
    root: Weak<RootContextInner>,
    listener_id: u64,
}

impl DestroySubscription {
    pub(crate) fn new(root: Weak<RootContextInner>, listener_id: u64) -> Self {
        Self { root, listener_id }
    }

    pub(crate) fn inactive() -> Self {
        Self {
            root: Weak::new(),
            listener_id: 0,
        }
    }

    /// Unregisters the listener if it has not yet been invoked.
    ///
    /// Returns `true` if this call removed the listener. Calling this more than once, after the
    /// root has been destroyed or after the root itself has been dropped is a no-op.
    #[expect(
        clippy::must_use_candidate,
        reason = "callers usually do not care whether the listener was still registered"
    )]
    pub fn cancel(&self) -> bool {
        self.root
            .upgrade()
            .is_some_and(|root| root.remove_listener(self.listener_id))
    }

    /// Whether the listener is still registered and waiting for the root to be destroyed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.root
            .upgrade()
            .is_some_and(|root| root.has_listener(self.listener_id))
    }
}

impl fmt::Debug for DestroySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("listener_id", &self.listener_id)
            .field("active", &self.is_active())
            .finish()
    }
}
