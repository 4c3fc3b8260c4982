//! Metrics for mount content pooling.
//!
//! Hit and miss counts show how effective pooling is for the current workload. The purge
//! histogram shows how much pooled content is thrown away when UI hierarchies are destroyed.

use nm::{Event, Magnitude};

/// Histogram buckets for the number of instances discarded when a root is purged.
const PURGED_CONTENT_BUCKETS: &[Magnitude] = &[0, 1, 2, 5, 10, 20, 50, 100, 200, 500];

thread_local! {
    /// An acquire found a pooled instance.
    pub(crate) static ACQUIRE_HITS: Event = Event::builder()
        .name("mount_pools_acquire_hits")
        .build();

    /// An acquire found no pooled instance and the caller has to construct one.
    pub(crate) static ACQUIRE_MISSES: Event = Event::builder()
        .name("mount_pools_acquire_misses")
        .build();

    /// A released instance was retained by a pool.
    pub(crate) static RELEASES_ACCEPTED: Event = Event::builder()
        .name("mount_pools_releases_accepted")
        .build();

    /// A released instance was dropped because the pool was full, the content type opted out
    /// of pooling or the owning root was already destroyed.
    pub(crate) static RELEASES_DISCARDED: Event = Event::builder()
        .name("mount_pools_releases_discarded")
        .build();

    /// A root was purged. The magnitude is the number of pooled instances dropped.
    pub(crate) static PURGED_CONTENT: Event = Event::builder()
        .name("mount_pools_purged_content")
        .histogram(PURGED_CONTENT_BUCKETS)
        .build();
}
