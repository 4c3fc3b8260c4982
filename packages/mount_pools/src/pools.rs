use std::any::type_name;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::content_pool::ContentPool;
use crate::metrics::{
    ACQUIRE_HITS, ACQUIRE_MISSES, PURGED_CONTENT, RELEASES_ACCEPTED, RELEASES_DISCARDED,
};
use crate::registry::{PoolKey, Registry};
use crate::{
    ContentTypeId, Context, ContextResolver, DestroySubscription, MountContentDefinition,
    MountContentPoolsBuilder, RootContext, RootContextId,
};

/// Recycling pools for mount content, keyed by content type and by the root that owns the UI
/// hierarchy the content was used in.
///
/// Content released under one root is never handed out under another root. Contexts that wrap
/// the same root share pools. When a root is destroyed, every pool it owns is discarded; content
/// released under a destroyed root is dropped immediately.
///
/// Pooling is purely an optimization: every operation degrades to "nothing pooled" rather than
/// failing, and callers construct fresh content whenever [`acquire()`][Self::acquire] comes back
/// empty.
///
/// # Thread safety
///
/// This type is single-threaded and is neither [`Send`] nor [`Sync`]. It is meant to be owned by
/// whatever composes the rendering pipeline on the thread that owns the UI.
///
/// # Example
///
/// ```rust
/// use mount_pools::{Context, ContentTypeId, MountContentDefinition, MountContentPools, RootContext};
///
/// struct ButtonDefinition;
///
/// impl MountContentDefinition<Vec<u8>> for ButtonDefinition {
///     fn content_type_id(&self) -> ContentTypeId {
///         ContentTypeId::new(1)
///     }
///
///     fn create_mount_content(&self, _context: &Context) -> Vec<u8> {
///         Vec::with_capacity(1024)
///     }
/// }
///
/// let pools = MountContentPools::new();
/// let window = RootContext::hierarchy();
/// let context = Context::wrap(&window);
///
/// assert!(pools.acquire(&context, ButtonDefinition.content_type_id()).is_none());
///
/// let content = ButtonDefinition.create_mount_content(&context);
/// pools.release(&context, &ButtonDefinition, content);
///
/// assert!(pools.acquire(&context, ButtonDefinition.content_type_id()).is_some());
///
/// // Destroying the window discards everything pooled for it.
/// pools.release(&context, &ButtonDefinition, Vec::new());
/// window.destroy();
/// assert!(pools.acquire(&context, ButtonDefinition.content_type_id()).is_none());
/// ```
pub struct MountContentPools<C> {
    resolver: ContextResolver,

    // Destruction listeners hold weak references to the registry, so it lives behind an `Rc`.
    registry: Rc<RefCell<Registry<C>>>,
}

impl<C: 'static> MountContentPools<C> {
    /// Creates pools with a fresh application root.
    ///
    /// For custom configuration, use [`MountContentPools::builder()`].
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for configuring and constructing [`MountContentPools`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use mount_pools::{MountContentPools, RootContext};
    ///
    /// let application = RootContext::application();
    ///
    /// let pools = MountContentPools::<String>::builder()
    ///     .application(application.clone())
    ///     .build();
    ///
    /// assert_eq!(*pools.application(), application);
    /// ```
    pub fn builder() -> MountContentPoolsBuilder<C> {
        MountContentPoolsBuilder::new()
    }

    pub(crate) fn new_inner(application: RootContext) -> Self {
        Self {
            resolver: ContextResolver::new(application),
            registry: Rc::new(RefCell::new(Registry::new())),
        }
    }

    /// The root that detached contexts resolve to.
    #[must_use]
    pub fn application(&self) -> &RootContext {
        self.resolver.application()
    }

    /// Resolves `context` to the root whose pools it uses.
    #[must_use]
    pub fn resolve_root(&self, context: &Context) -> RootContext {
        self.resolver.resolve(context)
    }

    /// Takes one pooled instance of `content_type` for the root of `context`.
    ///
    /// Returns `None` if nothing is pooled, in which case the caller is expected to construct
    /// a fresh instance. Acquiring never creates a pool.
    #[must_use]
    pub fn acquire(&self, context: &Context, content_type: ContentTypeId) -> Option<C> {
        let root = self.resolver.resolve(context);
        let key = PoolKey::new(root.id(), content_type);

        let content = self
            .registry
            .borrow_mut()
            .pool_mut(&key)
            .and_then(ContentPool::pop);

        if content.is_some() {
            trace!(root = %root.id(), %content_type, "acquired pooled mount content");
            ACQUIRE_HITS.with(|e| e.observe_once());
        } else {
            trace!(root = %root.id(), %content_type, "no pooled mount content available");
            ACQUIRE_MISSES.with(|e| e.observe_once());
        }

        content
    }

    /// Takes one pooled instance for the root of `context` or constructs a fresh one using the
    /// definition's factory.
    pub fn acquire_or_create<D>(&self, context: &Context, definition: &D) -> C
    where
        D: MountContentDefinition<C> + ?Sized,
    {
        self.acquire(context, definition.content_type_id())
            .unwrap_or_else(|| definition.create_mount_content(context))
    }

    /// Returns `content` to the pool for the root of `context`.
    ///
    /// The content is dropped instead of pooled if the root is already destroyed (either via
    /// [`RootContext::destroy()`] or via [`on_context_destroyed()`][Self::on_context_destroyed]),
    /// if the content type does not pool (capacity of zero) or if the pool already holds as many
    /// instances as the definition's capacity.
    pub fn release<D>(&self, context: &Context, definition: &D, content: C)
    where
        D: MountContentDefinition<C> + ?Sized,
    {
        let root = self.resolver.resolve(context);
        let content_type = definition.content_type_id();

        if self.is_known_destroyed(&root) {
            trace!(root = %root.id(), %content_type, "discarding mount content of destroyed root");
            RELEASES_DISCARDED.with(|e| e.observe_once());
            return;
        }

        let capacity = definition.pool_capacity();

        if capacity == 0 {
            trace!(%content_type, "discarding mount content of type that does not pool");
            RELEASES_DISCARDED.with(|e| e.observe_once());
            return;
        }

        self.ensure_tracked(&root);

        let rejected = self
            .registry
            .borrow_mut()
            .get_or_create_pool(PoolKey::new(root.id(), content_type))
            .try_push(content, capacity)
            .err();

        // Rejected content is dropped here, outside the registry borrow.
        if rejected.is_some() {
            trace!(root = %root.id(), %content_type, "discarding mount content, pool is full");
            RELEASES_DISCARDED.with(|e| e.observe_once());
        } else {
            trace!(root = %root.id(), %content_type, "pooled mount content");
            RELEASES_ACCEPTED.with(|e| e.observe_once());
        }
    }

    /// Whether the pool for the root of `context` would accept one more instance of the
    /// definition's content type.
    ///
    /// The answer compares the number of pooled instances with the definition's current
    /// capacity, the same check [`release()`][Self::release] applies. Contexts that share a root
    /// always agree on the answer. Destroyed roots never accept content.
    #[must_use]
    pub fn can_add_more_to_pool<D>(&self, context: &Context, definition: &D) -> bool
    where
        D: MountContentDefinition<C> + ?Sized,
    {
        let root = self.resolver.resolve(context);

        if self.is_known_destroyed(&root) {
            return false;
        }

        let capacity = definition.pool_capacity();
        let key = PoolKey::new(root.id(), definition.content_type_id());

        self.registry
            .borrow()
            .pool(&key)
            .map_or(capacity > 0, |pool| pool.has_room(capacity))
    }

    /// Constructs one instance via the definition's factory and pools it, if the pool for the
    /// root of `context` has room for it.
    ///
    /// Returns whether an instance was added. Nothing is constructed for destroyed roots or
    /// full pools.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mount_pools::{Context, ContentTypeId, MountContentDefinition, MountContentPools};
    ///
    /// struct Label;
    ///
    /// impl MountContentDefinition<String> for Label {
    ///     fn content_type_id(&self) -> ContentTypeId {
    ///         ContentTypeId::new(3)
    ///     }
    ///
    ///     fn pool_capacity(&self) -> usize {
    ///         2
    ///     }
    ///
    ///     fn create_mount_content(&self, _context: &Context) -> String {
    ///         String::from("label")
    ///     }
    /// }
    ///
    /// let pools = MountContentPools::new();
    /// let context = Context::Detached;
    ///
    /// while pools.preallocate(&context, &Label) {}
    ///
    /// assert_eq!(pools.pool_len(&context, Label.content_type_id()), 2);
    /// assert!(!pools.can_add_more_to_pool(&context, &Label));
    /// ```
    #[expect(
        clippy::must_use_candidate,
        reason = "preallocation is usually done for its side effect"
    )]
    pub fn preallocate<D>(&self, context: &Context, definition: &D) -> bool
    where
        D: MountContentDefinition<C> + ?Sized,
    {
        if !self.can_add_more_to_pool(context, definition) {
            return false;
        }

        let content = definition.create_mount_content(context);
        self.release(context, definition, content);
        true
    }

    /// Discards every pool owned by `root`, stops tracking it and treats it as destroyed from
    /// now on: later releases under `root` drop their content and no pool is created for it again.
    ///
    /// This is invoked automatically when a tracked root is destroyed. Calling it for a root
    /// that owns no pools discards nothing. [`clear_all()`][Self::clear_all] forgets which roots
    /// were announced as destroyed.
    pub fn on_context_destroyed(&self, root: &RootContext) {
        purge_root(&self.registry, root.id());
    }

    /// Discards every pool, stops tracking every root and forgets which roots were announced as
    /// destroyed.
    pub fn clear_all(&self) {
        let pools = self.registry.borrow_mut().clear();

        debug!(pools = pools.len(), "cleared all mount content pools");

        // Content is dropped outside the registry borrow.
        drop(pools);
    }

    /// Number of instances pooled for `content_type` under the root of `context`.
    #[must_use]
    pub fn pool_len(&self, context: &Context, content_type: ContentTypeId) -> usize {
        let root = self.resolver.resolve(context);

        self.registry
            .borrow()
            .pool(&PoolKey::new(root.id(), content_type))
            .map_or(0, ContentPool::len)
    }

    /// Number of pools currently alive, across all roots and content types.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.registry.borrow().pool_count()
    }

    /// Number of roots currently tracked for destruction.
    #[must_use]
    pub fn tracked_root_count(&self) -> usize {
        self.registry.borrow().tracked_count()
    }

    fn is_known_destroyed(&self, root: &RootContext) -> bool {
        root.is_destroyed() || self.registry.borrow().is_destroyed(root.id())
    }

    fn ensure_tracked(&self, root: &RootContext) {
        if self.registry.borrow().is_tracked(root.id()) {
            return;
        }

        // The root is alive (checked by the caller), so subscribing does not invoke the
        // listener right away and the registry is not borrowed while we subscribe.
        let subscription = subscribe(Rc::downgrade(&self.registry), root);

        self.registry.borrow_mut().track(root.id(), subscription);
    }
}

fn subscribe<C: 'static>(
    registry: Weak<RefCell<Registry<C>>>,
    root: &RootContext,
) -> DestroySubscription {
    root.on_destroyed(move |root| {
        if let Some(registry) = registry.upgrade() {
            purge_root(&registry, root.id());
        }
    })
}

fn purge_root<C>(registry: &RefCell<Registry<C>>, root: RootContextId) {
    let pools = registry.borrow_mut().purge(root);

    if pools.is_empty() {
        trace!(%root, "no mount content pools to purge");
        return;
    }

    let content_count = pools.iter().map(ContentPool::len).sum::<usize>();

    debug!(
        %root,
        pools = pools.len(),
        content_count,
        "purged mount content pools of destroyed root"
    );
    PURGED_CONTENT.with(|e| e.observe(content_count));

    // Content may call back into the pools when dropped, so the borrow must be gone by now.
    drop(pools);
}

impl<C: 'static> Default for MountContentPools<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for MountContentPools<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("resolver", &self.resolver)
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use static_assertions::assert_not_impl_any;

    use super::*;

    struct Definition {
        content_type: u32,
        capacity: usize,
    }

    impl MountContentDefinition<u32> for Definition {
        fn content_type_id(&self) -> ContentTypeId {
            ContentTypeId::new(self.content_type)
        }

        fn pool_capacity(&self) -> usize {
            self.capacity
        }

        fn create_mount_content(&self, _context: &Context) -> u32 {
            1000
        }
    }

    const DEFINITION: Definition = Definition {
        content_type: 1,
        capacity: 3,
    };

    #[test]
    fn single_threaded_assertions() {
        assert_not_impl_any!(MountContentPools<u32>: Send, Sync);
    }

    #[test]
    fn acquire_from_empty_does_not_create_pool() {
        let pools = MountContentPools::<u32>::new();

        assert_eq!(pools.acquire(&Context::Detached, ContentTypeId::new(1)), None);
        assert_eq!(pools.pool_count(), 0);
        assert_eq!(pools.tracked_root_count(), 0);
    }

    #[test]
    fn release_then_acquire() {
        let pools = MountContentPools::new();
        let root = RootContext::hierarchy();
        let context = Context::from(&root);

        pools.release(&context, &DEFINITION, 5);

        assert_eq!(pools.pool_len(&context, DEFINITION.content_type_id()), 1);
        assert_eq!(pools.acquire(&context, DEFINITION.content_type_id()), Some(5));
        assert_eq!(pools.acquire(&context, DEFINITION.content_type_id()), None);
    }

    #[test]
    fn release_tracks_root_once() {
        let pools = MountContentPools::new();
        let root = RootContext::hierarchy();
        let context = Context::wrap(&root);

        pools.release(&context, &DEFINITION, 1);
        pools.release(&context, &DEFINITION, 2);
        pools.release(
            &context,
            &Definition {
                content_type: 2,
                capacity: 3,
            },
            3,
        );

        assert_eq!(pools.tracked_root_count(), 1);
        assert_eq!(root.listener_count(), 1);
        assert_eq!(pools.pool_count(), 2);
    }

    #[test]
    fn destroy_purges_pools_and_subscription() {
        let pools = MountContentPools::new();
        let root = RootContext::hierarchy();
        let context = Context::from(&root);

        pools.release(&context, &DEFINITION, 1);
        root.destroy();

        assert_eq!(pools.pool_count(), 0);
        assert_eq!(pools.tracked_root_count(), 0);
        assert_eq!(pools.acquire(&context, DEFINITION.content_type_id()), None);
    }

    #[test]
    fn release_to_destroyed_root_does_not_track() {
        let pools = MountContentPools::new();
        let root = RootContext::hierarchy();
        root.destroy();

        pools.release(&Context::from(&root), &DEFINITION, 1);

        assert_eq!(pools.pool_count(), 0);
        assert_eq!(pools.tracked_root_count(), 0);
        assert_eq!(root.listener_count(), 0);
    }

    #[test]
    fn zero_capacity_never_pools() {
        let pools = MountContentPools::new();
        let context = Context::Detached;
        let definition = Definition {
            content_type: 9,
            capacity: 0,
        };

        assert!(!pools.can_add_more_to_pool(&context, &definition));
        assert!(!pools.preallocate(&context, &definition));

        pools.release(&context, &definition, 1);

        assert_eq!(pools.acquire(&context, definition.content_type_id()), None);
        assert_eq!(pools.pool_count(), 0);
        assert_eq!(pools.tracked_root_count(), 0);
    }

    #[test]
    fn explicit_notification_for_unknown_root_is_noop() {
        let pools = MountContentPools::new();
        let known = RootContext::hierarchy();
        pools.release(&Context::from(&known), &DEFINITION, 1);

        pools.on_context_destroyed(&RootContext::hierarchy());

        assert_eq!(
            pools.pool_len(&Context::from(&known), DEFINITION.content_type_id()),
            1
        );
        assert_eq!(pools.tracked_root_count(), 1);
    }

    #[test]
    fn explicit_notification_cancels_subscription() {
        let pools = MountContentPools::new();
        let root = RootContext::hierarchy();
        pools.release(&Context::from(&root), &DEFINITION, 1);

        pools.on_context_destroyed(&root);

        assert_eq!(pools.pool_count(), 0);
        assert_eq!(root.listener_count(), 0);
    }

    #[test]
    fn explicit_notification_is_terminal() {
        let pools = MountContentPools::new();
        let root = RootContext::hierarchy();
        let context = Context::wrap(&root);

        pools.release(&context, &DEFINITION, 1);
        pools.on_context_destroyed(&root);
        pools.release(&context, &DEFINITION, 2);

        assert!(!root.is_destroyed());
        assert_eq!(pools.acquire(&context, DEFINITION.content_type_id()), None);
        assert_eq!(pools.pool_count(), 0);
        assert_eq!(pools.tracked_root_count(), 0);
        assert_eq!(root.listener_count(), 0);
        assert!(!pools.can_add_more_to_pool(&context, &DEFINITION));
        assert!(!pools.preallocate(&context, &DEFINITION));
    }

    #[test]
    fn clear_all_forgets_explicit_notifications() {
        let pools = MountContentPools::new();
        let root = RootContext::hierarchy();
        let context = Context::from(&root);

        pools.on_context_destroyed(&root);
        pools.clear_all();
        pools.release(&context, &DEFINITION, 4);

        assert_eq!(pools.acquire(&context, DEFINITION.content_type_id()), Some(4));
    }

    #[test]
    fn capacity_follows_definition_on_every_call() {
        let pools = MountContentPools::new();
        let context = Context::Detached;
        let single = Definition {
            content_type: 4,
            capacity: 1,
        };
        let triple = Definition {
            content_type: 4,
            capacity: 3,
        };
        let none = Definition {
            content_type: 4,
            capacity: 0,
        };

        pools.release(&context, &single, 1);
        assert!(!pools.can_add_more_to_pool(&context, &single));
        assert!(pools.can_add_more_to_pool(&context, &triple));

        pools.release(&context, &triple, 2);
        assert_eq!(pools.pool_len(&context, triple.content_type_id()), 2);

        // A pool that already exists still follows a capacity of zero.
        assert!(!pools.can_add_more_to_pool(&context, &none));
        pools.release(&context, &none, 3);
        assert_eq!(pools.pool_len(&context, none.content_type_id()), 2);

        pools.release(&context, &single, 4);
        assert_eq!(pools.pool_len(&context, single.content_type_id()), 2);
    }

    #[test]
    fn clear_all_resets_state() {
        let pools = MountContentPools::new();
        let a = RootContext::hierarchy();
        let b = RootContext::hierarchy();

        pools.release(&Context::from(&a), &DEFINITION, 1);
        pools.release(&Context::from(&b), &DEFINITION, 2);

        pools.clear_all();

        assert_eq!(pools.pool_count(), 0);
        assert_eq!(pools.tracked_root_count(), 0);
        assert_eq!(a.listener_count(), 0);
        assert_eq!(b.listener_count(), 0);
        assert_eq!(
            pools.acquire(&Context::from(&a), DEFINITION.content_type_id()),
            None
        );
    }

    #[test]
    fn dropping_pools_unsubscribes_from_roots() {
        let root = RootContext::hierarchy();

        {
            let pools = MountContentPools::new();
            pools.release(&Context::from(&root), &DEFINITION, 1);
            assert_eq!(root.listener_count(), 1);
        }

        assert_eq!(root.listener_count(), 0);
        root.destroy();
    }

    #[test]
    fn acquire_or_create_falls_back_to_factory() {
        let pools = MountContentPools::new();
        let context = Context::Detached;

        assert_eq!(pools.acquire_or_create(&context, &DEFINITION), 1000);

        pools.release(&context, &DEFINITION, 7);
        assert_eq!(pools.acquire_or_create(&context, &DEFINITION), 7);
    }

    #[test]
    fn preallocate_fills_to_capacity() {
        let pools = MountContentPools::new();
        let context = Context::Detached;

        for _ in 0..DEFINITION.capacity {
            assert!(pools.preallocate(&context, &DEFINITION));
        }

        assert!(!pools.preallocate(&context, &DEFINITION));
        assert_eq!(
            pools.pool_len(&context, DEFINITION.content_type_id()),
            DEFINITION.capacity
        );
    }

    #[test]
    fn preallocate_skips_destroyed_root() {
        let pools = MountContentPools::new();
        let root = RootContext::hierarchy();
        root.destroy();

        assert!(!pools.preallocate(&Context::from(&root), &DEFINITION));
    }

    #[test]
    fn detached_contexts_use_application_pools() {
        let pools = MountContentPools::new();

        pools.release(&Context::wrap(Context::Detached), &DEFINITION, 3);

        let application = Context::from(pools.application());
        assert_eq!(
            pools.acquire(&application, DEFINITION.content_type_id()),
            Some(3)
        );
    }

    /// Content that releases a sibling back into the pools when dropped.
    struct Reentrant {
        pools: Rc<MountContentPools<Reentrant>>,
        context: Context,
        dropped: Rc<Cell<u32>>,
    }

    struct ReentrantDefinition;

    impl MountContentDefinition<Reentrant> for ReentrantDefinition {
        fn content_type_id(&self) -> ContentTypeId {
            ContentTypeId::new(77)
        }

        fn create_mount_content(&self, _context: &Context) -> Reentrant {
            unreachable!("tests construct content explicitly")
        }
    }

    impl Drop for Reentrant {
        fn drop(&mut self) {
            self.dropped.set(self.dropped.get() + 1);

            // Touch the pools while they may be in the middle of discarding content.
            _ = self.pools.pool_len(&self.context, ContentTypeId::new(77));
            _ = self.pools.can_add_more_to_pool(&self.context, &ReentrantDefinition);
        }
    }

    #[test]
    fn dropping_purged_content_may_reenter_pools() {
        let pools = Rc::new(MountContentPools::new());
        let root = RootContext::hierarchy();
        let context = Context::from(&root);
        let dropped = Rc::new(Cell::new(0));

        for _ in 0..2 {
            pools.release(
                &context,
                &ReentrantDefinition,
                Reentrant {
                    pools: Rc::clone(&pools),
                    context: context.clone(),
                    dropped: Rc::clone(&dropped),
                },
            );
        }

        root.destroy();
        assert_eq!(dropped.get(), 2);

        for _ in 0..4 {
            pools.release(
                &Context::Detached,
                &ReentrantDefinition,
                Reentrant {
                    pools: Rc::clone(&pools),
                    context: Context::Detached,
                    dropped: Rc::clone(&dropped),
                },
            );
        }

        // One instance is over capacity and is dropped right away.
        assert_eq!(dropped.get(), 3);

        pools.clear_all();
        assert_eq!(dropped.get(), 6);
    }
}
