use std::any::type_name;
use std::fmt;

use foldhash::{HashMap, HashMapExt, HashSet, HashSetExt};
use tracing::debug;

use crate::content_pool::ContentPool;
use crate::{ContentTypeId, DestroySubscription, RootContextId};

/// Identifies one bounded pool: the root that owns it and the type of content it holds.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct PoolKey {
    pub(crate) root: RootContextId,
    pub(crate) content_type: ContentTypeId,
}

impl PoolKey {
    pub(crate) fn new(root: RootContextId, content_type: ContentTypeId) -> Self {
        Self { root, content_type }
    }
}

/// The bookkeeping behind [`MountContentPools`][crate::MountContentPools].
///
/// Holds every live pool, the destruction subscription of every root that owns pools and the
/// roots that were announced as destroyed. Content removed from the registry is handed back to
/// the caller instead of being dropped here, so the caller can drop it once the registry is no
/// longer borrowed.
pub(crate) struct Registry<C> {
    /// We use foldhash for better performance with small hash tables.
    pools: HashMap<PoolKey, ContentPool<C>>,

    tracked_roots: HashMap<RootContextId, DestroySubscription>,

    /// Roots that were announced as destroyed. They never get pools again.
    destroyed_roots: HashSet<RootContextId>,
}

impl<C> Registry<C> {
    pub(crate) fn new() -> Self {
        Self {
            pools: HashMap::new(),
            tracked_roots: HashMap::new(),
            destroyed_roots: HashSet::new(),
        }
    }

    pub(crate) fn pool(&self, key: &PoolKey) -> Option<&ContentPool<C>> {
        self.pools.get(key)
    }

    pub(crate) fn pool_mut(&mut self, key: &PoolKey) -> Option<&mut ContentPool<C>> {
        self.pools.get_mut(key)
    }

    pub(crate) fn get_or_create_pool(&mut self, key: PoolKey) -> &mut ContentPool<C> {
        self.pools.entry(key).or_insert_with(|| {
            debug!(
                root = key.root.get(),
                content_type = key.content_type.get(),
                "created mount content pool"
            );

            ContentPool::new()
        })
    }

    pub(crate) fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub(crate) fn is_tracked(&self, root: RootContextId) -> bool {
        self.tracked_roots.contains_key(&root)
    }

    pub(crate) fn is_destroyed(&self, root: RootContextId) -> bool {
        self.destroyed_roots.contains(&root)
    }

    pub(crate) fn tracked_count(&self) -> usize {
        self.tracked_roots.len()
    }

    pub(crate) fn track(&mut self, root: RootContextId, subscription: DestroySubscription) {
        debug!(root = root.get(), "tracking root for destruction");

        if let Some(previous) = self.tracked_roots.insert(root, subscription) {
            previous.cancel();
        }
    }

    /// Forgets every pool owned by `root`, stops tracking it and remembers it as destroyed.
    ///
    /// Returns the removed pools. Unknown roots yield an empty result.
    pub(crate) fn purge(&mut self, root: RootContextId) -> Vec<ContentPool<C>> {
        self.destroyed_roots.insert(root);

        if let Some(subscription) = self.tracked_roots.remove(&root) {
            subscription.cancel();
        }

        let keys = self
            .pools
            .keys()
            .filter(|key| key.root == root)
            .copied()
            .collect::<Vec<_>>();

        keys.iter()
            .filter_map(|key| self.pools.remove(key))
            .collect()
    }

    /// Forgets every pool, every tracked root and every destroyed root.
    ///
    /// Returns the removed pools.
    pub(crate) fn clear(&mut self) -> Vec<ContentPool<C>> {
        self.destroyed_roots.clear();

        for (_, subscription) in self.tracked_roots.drain() {
            subscription.cancel();
        }

        self.pools.drain().map(|(_, pool)| pool).collect()
    }
}

impl<C> Drop for Registry<C> {
    fn drop(&mut self) {
        // Roots may outlive the registry, leave no listeners behind on them.
        for subscription in self.tracked_roots.values() {
            subscription.cancel();
        }
    }
}

impl<C> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("pools", &self.pools)
            .field("tracked_roots", &self.tracked_roots.len())
            .field("destroyed_roots", &self.destroyed_roots.len())
            .finish()
    }
}
