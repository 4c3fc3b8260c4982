use std::mem;
use std::rc::Rc;

use crate::RootContext;

/// A presentation context handle as seen by callers of the pools.
///
/// Rendering code rarely holds a [`RootContext`] directly. Instead it holds contexts that wrap
/// other contexts, possibly several layers deep. Two contexts are pool-equivalent if they
/// resolve to the same root via [`ContextResolver`][crate::ContextResolver].
///
/// # Example
///
/// ```rust
/// use mount_pools::{Context, RootContext};
///
/// let window = RootContext::hierarchy();
///
/// let context = Context::wrap(Context::wrap(&window));
/// assert_eq!(context.depth(), 2);
/// ```
#[derive(Clone, Debug)]
#[expect(
    clippy::exhaustive_enums,
    reason = "a context is either a root, a wrapper or detached, there is nothing else"
)]
pub enum Context {
    /// The context is itself the owner of a UI hierarchy (or the application).
    Root(RootContext),

    /// The context wraps another context and is transparent for pooling purposes.
    Wrapped(Rc<Self>),

    /// The context is not attached to any root. Resolves to the application root.
    Detached,
}

impl Context {
    /// Creates a context that wraps `inner`.
    #[must_use]
    pub fn wrap(inner: impl Into<Self>) -> Self {
        Self::Wrapped(Rc::new(inner.into()))
    }

    /// The context directly wrapped by this one, if any.
    #[must_use]
    pub fn base(&self) -> Option<&Self> {
        match self {
            Self::Wrapped(inner) => Some(inner.as_ref()),
            Self::Root(_) | Self::Detached => None,
        }
    }

    /// Number of wrapping layers between this context and the innermost one.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth: usize = 0;
        let mut current = self;

        while let Some(base) = current.base() {
            depth = depth.saturating_add(1);
            current = base;
        }

        depth
    }
}

impl Drop for Context {
    // Unlinks uniquely owned wrapping layers one at a time so that dropping a deep chain does
    // not recurse once per layer.
    fn drop(&mut self) {
        let mut current = mem::replace(self, Self::Detached);

        while let Self::Wrapped(inner) = &mut current {
            let Some(base) = Rc::get_mut(inner) else {
                // Someone else still holds the rest of the chain.
                break;
            };

            let base = mem::replace(base, Self::Detached);
            current = base;
        }
    }
}

impl From<RootContext> for Context {
    fn from(root: RootContext) -> Self {
        Self::Root(root)
    }
}

impl From<&RootContext> for Context {
    fn from(root: &RootContext) -> Self {
        Self::Root(root.clone())
    }
}
