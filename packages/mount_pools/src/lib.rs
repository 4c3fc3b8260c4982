//! Recycling pools for expensive UI mount content.
//!
//! Rendering a UI produces "mount content": views, drawables and similar objects that are costly
//! to construct. This package provides [`MountContentPools`], which keeps released mount content
//! around so it can be handed out again instead of being constructed from scratch.
//!
//! # Scoping
//!
//! Pools are keyed by two things:
//!
//! * The [`ContentTypeId`] of the content, declared by a [`MountContentDefinition`].
//! * The [`RootContext`] that owns the UI hierarchy the content was used in.
//!
//! Callers pass in a [`Context`], which may wrap other contexts any number of times. Contexts are
//! resolved to their root via [`ContextResolver`] and two contexts share pools exactly when they
//! resolve to the same root. Content is never shared between unrelated UI hierarchies.
//!
//! # Lifecycle
//!
//! The first time content is released for a root, the pools subscribe to the destruction of that
//! root. When the root is [destroyed][RootContext::destroy], every pool it owns is discarded and
//! the subscription is removed. A root can also be announced as destroyed directly with
//! [`MountContentPools::on_context_destroyed()`], with the same effect on the pools. Content
//! released for a root that is already destroyed is dropped on the spot.
//!
//! # Capacity
//!
//! Each content type declares how many instances a single pool may retain. The declared capacity
//! is consulted on every release and every capacity check, so content released into a pool that
//! already holds that many instances is dropped. A capacity of zero opts the content type out of
//! pooling.
//!
//! # Example
//!
//! ```rust
//! use mount_pools::{Context, ContentTypeId, MountContentDefinition, MountContentPools, RootContext};
//!
//! struct ImageView {
//!     pixels: Vec<u32>,
//! }
//!
//! struct ImageDefinition;
//!
//! impl MountContentDefinition<ImageView> for ImageDefinition {
//!     fn content_type_id(&self) -> ContentTypeId {
//!         ContentTypeId::new(12)
//!     }
//!
//!     fn pool_capacity(&self) -> usize {
//!         4
//!     }
//!
//!     fn create_mount_content(&self, _context: &Context) -> ImageView {
//!         ImageView {
//!             pixels: vec![0; 64 * 64],
//!         }
//!     }
//! }
//!
//! let pools = MountContentPools::new();
//!
//! let window = RootContext::hierarchy();
//! let list_item = Context::wrap(Context::wrap(&window));
//! let header = Context::wrap(&window);
//!
//! // Nothing pooled yet, so the caller constructs the content itself.
//! let image = pools.acquire_or_create(&list_item, &ImageDefinition);
//! pools.release(&list_item, &ImageDefinition, image);
//!
//! // Both contexts belong to the same window, so they share the pool.
//! let reused = pools.acquire(&header, ImageDefinition.content_type_id());
//! assert!(reused.is_some_and(|view| view.pixels.len() == 64 * 64));
//! ```
//!
//! # Observability
//!
//! Pool activity is reported as `tracing` events and as `nm` metrics events with names
//! starting with `mount_pools_`.

mod builder;
mod content_pool;
mod context;
mod definition;
mod destroy_subscription;
mod metrics;
mod pools;
mod registry;
mod resolver;
mod root_context;

pub use builder::*;
pub use context::*;
pub use definition::*;
pub use destroy_subscription::*;
pub use pools::*;
pub use resolver::*;
pub use root_context::*;
