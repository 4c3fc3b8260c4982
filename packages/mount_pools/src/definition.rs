use std::fmt;

use crate::Context;

/// Number of instances a content type may keep pooled per root unless it declares otherwise.
pub const DEFAULT_POOL_CAPACITY: usize = 3;

/// Stable identifier of one kind of mount content.
///
/// Identifiers are assigned by whatever defines the content types. Pools do not check that
/// identifiers are unique, they only use them as part of the pool key.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ContentTypeId(u32);

impl ContentTypeId {
    /// Creates a content type identifier from its numeric value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the numeric value of the identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ContentTypeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ContentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A component definition that produces mount content of type `C`.
///
/// The definition tells the pools which pool an instance belongs to and how many instances the
/// pool may retain. Construction of fresh content is the caller's job; the pools only invoke the
/// factory from the convenience methods [`preallocate()`][1] and [`acquire_or_create()`][2].
///
/// A definition that returns a capacity of zero opts out of pooling entirely.
///
/// # Example
///
/// ```rust
/// use mount_pools::{Context, ContentTypeId, MountContentDefinition};
///
/// struct TextDefinition;
///
/// impl MountContentDefinition<String> for TextDefinition {
///     fn content_type_id(&self) -> ContentTypeId {
///         ContentTypeId::new(7)
///     }
///
///     fn pool_capacity(&self) -> usize {
///         10
///     }
///
///     fn create_mount_content(&self, _context: &Context) -> String {
///         String::with_capacity(256)
///     }
/// }
/// ```
///
/// [1]: crate::MountContentPools::preallocate
/// [2]: crate::MountContentPools::acquire_or_create
pub trait MountContentDefinition<C> {
    /// Identifies the pool that content of this definition is recycled through.
    fn content_type_id(&self) -> ContentTypeId;

    /// Maximum number of instances a pool for this content type retains at once.
    fn pool_capacity(&self) -> usize {
        DEFAULT_POOL_CAPACITY
    }

    /// Creates a fresh instance of the mount content.
    fn create_mount_content(&self, context: &Context) -> C;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl MountContentDefinition<u32> for Plain {
        fn content_type_id(&self) -> ContentTypeId {
            ContentTypeId::new(1)
        }

        fn create_mount_content(&self, _context: &Context) -> u32 {
            42
        }
    }

    #[test]
    fn default_capacity() {
        assert_eq!(Plain.pool_capacity(), DEFAULT_POOL_CAPACITY);
    }

    #[test]
    fn type_id_round_trips_number() {
        let id = ContentTypeId::from(99);

        assert_eq!(id.get(), 99);
        assert_eq!(id, ContentTypeId::new(99));
        assert_eq!(id.to_string(), "99");
    }

    #[test]
    fn usable_as_trait_object() {
        let definition: &dyn MountContentDefinition<u32> = &Plain;

        assert_eq!(definition.content_type_id(), ContentTypeId::new(1));
        assert_eq!(definition.create_mount_content(&Context::Detached), 42);
    }
}
