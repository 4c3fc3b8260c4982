use std::any::type_name;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::DestroySubscription;

static NEXT_ROOT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one [`RootContext`].
///
/// Every root context receives a fresh identifier when created, so a UI hierarchy that is torn
/// down and recreated is a different root as far as pooling is concerned.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RootContextId(u64);

impl RootContextId {
    fn next() -> Self {
        // Only uniqueness matters here, there is no data to synchronize with.
        Self(NEXT_ROOT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the numeric value of the identifier.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RootContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of owner a [`RootContext`] represents.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum RootKind {
    /// The process-wide application context. Contexts that are not attached to any UI
    /// hierarchy resolve to this root.
    Application,

    /// The owner of one UI hierarchy, such as a window or an activity.
    Hierarchy,
}

type DestroyListener = Box<dyn FnOnce(&RootContext)>;

struct Lifecycle {
    destroyed: bool,
    next_listener_id: u64,
    listeners: Vec<(u64, DestroyListener)>,
}

pub(crate) struct RootContextInner {
    id: RootContextId,
    kind: RootKind,
    lifecycle: RefCell<Lifecycle>,
}

impl RootContextInner {
    pub(crate) fn remove_listener(&self, listener_id: u64) -> bool {
        let removed = {
            let mut lifecycle = self.lifecycle.borrow_mut();
            lifecycle
                .listeners
                .iter()
                .position(|(id, _)| *id == listener_id)
                .map(|index| lifecycle.listeners.swap_remove(index))
        };

        // The listener may own captured state with its own drop logic, so it is dropped only
        // after the lifecycle borrow has ended.
        removed.is_some()
    }

    pub(crate) fn has_listener(&self, listener_id: u64) -> bool {
        self.lifecycle
            .borrow()
            .listeners
            .iter()
            .any(|(id, _)| *id == listener_id)
    }
}

/// The owner of one UI hierarchy lifetime, against which mount content pools are scoped.
///
/// This is a cheaply cloneable handle. All clones refer to the same root and compare equal.
/// A root starts out alive and becomes destroyed exactly once, via [`destroy()`][1], at which
/// point every listener registered via [`on_destroyed()`][2] is invoked.
///
/// # Thread safety
///
/// This type is single-threaded and is neither [`Send`] nor [`Sync`]. All operations are
/// expected to happen on the thread that owns the UI hierarchy.
///
/// # Example
///
/// ```rust
/// use mount_pools::RootContext;
///
/// let window = RootContext::hierarchy();
/// assert!(!window.is_destroyed());
///
/// window.destroy();
/// assert!(window.is_destroyed());
/// ```
///
/// [1]: Self::destroy
/// [2]: Self::on_destroyed
#[derive(Clone)]
pub struct RootContext {
    inner: Rc<RootContextInner>,
}

impl RootContext {
    /// Creates a new application-level root context.
    #[must_use]
    pub fn application() -> Self {
        Self::new(RootKind::Application)
    }

    /// Creates a new root context that owns one UI hierarchy.
    #[must_use]
    pub fn hierarchy() -> Self {
        Self::new(RootKind::Hierarchy)
    }

    /// Creates a new root context of the given kind.
    #[must_use]
    pub fn new(kind: RootKind) -> Self {
        Self {
            inner: Rc::new(RootContextInner {
                id: RootContextId::next(),
                kind,
                lifecycle: RefCell::new(Lifecycle {
                    destroyed: false,
                    next_listener_id: 0,
                    listeners: Vec::new(),
                }),
            }),
        }
    }

    /// The identity of this root.
    #[must_use]
    pub fn id(&self) -> RootContextId {
        self.inner.id
    }

    /// The kind of owner this root represents.
    #[must_use]
    pub fn kind(&self) -> RootKind {
        self.inner.kind
    }

    /// Whether [`destroy()`][Self::destroy] has been called on this root.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.lifecycle.borrow().destroyed
    }

    /// Marks the root as destroyed and notifies every registered destruction listener.
    ///
    /// Each listener is invoked exactly once. Calling this on a root that is already destroyed
    /// does nothing.
    pub fn destroy(&self) {
        let listeners = {
            let mut lifecycle = self.inner.lifecycle.borrow_mut();

            if lifecycle.destroyed {
                return;
            }

            lifecycle.destroyed = true;
            mem::take(&mut lifecycle.listeners)
        };

        // Listeners are free to call back into this root (e.g. to cancel subscriptions).
        for (_, listener) in listeners {
            listener(self);
        }
    }

    /// Registers a listener to be invoked when this root is destroyed.
    ///
    /// The returned [`DestroySubscription`] can be used to unregister the listener before the
    /// root is destroyed. Dropping the subscription does not unregister the listener.
    ///
    /// If the root is already destroyed, the listener is invoked immediately and the returned
    /// subscription is inactive.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// use mount_pools::RootContext;
    ///
    /// let root = RootContext::hierarchy();
    /// let notified = Rc::new(Cell::new(false));
    ///
    /// let subscription = root.on_destroyed({
    ///     let notified = Rc::clone(&notified);
    ///     move |_| notified.set(true)
    /// });
    /// assert!(subscription.is_active());
    ///
    /// root.destroy();
    /// assert!(notified.get());
    /// assert!(!subscription.is_active());
    /// ```
    pub fn on_destroyed<F>(&self, listener: F) -> DestroySubscription
    where
        F: FnOnce(&Self) + 'static,
    {
        let mut lifecycle = self.inner.lifecycle.borrow_mut();

        if lifecycle.destroyed {
            drop(lifecycle);
            listener(self);
            return DestroySubscription::inactive();
        }

        let listener_id = lifecycle.next_listener_id;
        lifecycle.next_listener_id = listener_id.wrapping_add(1);
        lifecycle.listeners.push((listener_id, Box::new(listener)));

        DestroySubscription::new(Rc::downgrade(&self.inner), listener_id)
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        self.inner.lifecycle.borrow().listeners.len()
    }
}

impl PartialEq for RootContext {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for RootContext {}

impl Hash for RootContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for RootContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use static_assertions::assert_not_impl_any;

    use super::*;

    #[test]
    fn single_threaded_assertions() {
        assert_not_impl_any!(RootContext: Send, Sync);
    }

    #[test]
    fn every_root_is_unique() {
        let a = RootContext::hierarchy();
        let b = RootContext::hierarchy();

        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
        assert_eq!(a, a.clone());
    }

    #[test]
    fn kind_is_preserved() {
        assert_eq!(RootContext::application().kind(), RootKind::Application);
        assert_eq!(RootContext::hierarchy().kind(), RootKind::Hierarchy);
    }

    #[test]
    fn destroy_notifies_each_listener_once() {
        let root = RootContext::hierarchy();
        let calls = Rc::new(Cell::new(0_u32));

        for _ in 0..3 {
            let calls = Rc::clone(&calls);
            _ = root.on_destroyed(move |_| calls.set(calls.get() + 1));
        }

        root.destroy();
        assert_eq!(calls.get(), 3);

        root.destroy();
        assert_eq!(calls.get(), 3);
        assert_eq!(root.listener_count(), 0);
    }

    #[test]
    fn listener_receives_destroyed_root() {
        let root = RootContext::hierarchy();
        let seen = Rc::new(Cell::new(None));

        _ = root.on_destroyed({
            let seen = Rc::clone(&seen);
            move |destroyed| seen.set(Some((destroyed.id(), destroyed.is_destroyed())))
        });

        root.destroy();
        assert_eq!(seen.get(), Some((root.id(), true)));
    }

    #[test]
    fn subscribe_after_destroy_invokes_immediately() {
        let root = RootContext::hierarchy();
        root.destroy();

        let called = Rc::new(Cell::new(false));
        let subscription = root.on_destroyed({
            let called = Rc::clone(&called);
            move |_| called.set(true)
        });

        assert!(called.get());
        assert!(!subscription.is_active());
        assert_eq!(root.listener_count(), 0);
    }

    #[test]
    fn listener_may_reenter_root() {
        let root = RootContext::hierarchy();
        let nested_called = Rc::new(Cell::new(false));

        _ = root.on_destroyed({
            let nested_called = Rc::clone(&nested_called);
            move |root| {
                // Subscribing during destruction must not deadlock on the lifecycle borrow.
                _ = root.on_destroyed(move |_| nested_called.set(true));
            }
        });

        root.destroy();
        assert!(nested_called.get());
    }
}
