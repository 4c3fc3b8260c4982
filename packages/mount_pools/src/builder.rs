use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{MountContentPools, RootContext};

/// Builder for creating an instance of [`MountContentPools`].
///
/// You only need to use this builder if you want to customize the configuration. The default
/// configuration used by [`MountContentPools::new()`][1] creates a fresh application root.
///
/// # Examples
///
/// ```
/// use mount_pools::{Context, MountContentPools, RootContext};
///
/// let application = RootContext::application();
///
/// let pools = MountContentPools::<u64>::builder()
///     .application(application.clone())
///     .build();
///
/// assert_eq!(pools.resolve_root(&Context::Detached), application);
/// ```
///
/// [1]: MountContentPools::new
#[must_use]
pub struct MountContentPoolsBuilder<C> {
    application: Option<RootContext>,

    _content: PhantomData<C>,
}

impl<C> fmt::Debug for MountContentPoolsBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("content_type", &format_args!("{}", type_name::<C>()))
            .field("application", &self.application)
            .finish()
    }
}

impl<C: 'static> MountContentPoolsBuilder<C> {
    pub(crate) fn new() -> Self {
        Self {
            application: None,
            _content: PhantomData,
        }
    }

    /// Sets the process-wide application root. Contexts that are not attached to any UI
    /// hierarchy resolve to this root.
    ///
    /// If not set, a new application root is created when the pools are built.
    pub fn application(mut self, application: RootContext) -> Self {
        self.application = Some(application);
        self
    }

    /// Builds the pools with the specified configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use mount_pools::MountContentPools;
    ///
    /// let pools = MountContentPools::<String>::builder().build();
    /// assert_eq!(pools.pool_count(), 0);
    /// ```
    #[must_use]
    pub fn build(self) -> MountContentPools<C> {
        MountContentPools::new_inner(self.application.unwrap_or_else(RootContext::application))
    }
}
