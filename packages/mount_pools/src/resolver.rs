use crate::{Context, RootContext};

/// Finds the root that owns the UI hierarchy a [`Context`] belongs to.
///
/// Resolution walks through any number of [`Context::Wrapped`] layers. A chain that ends in
/// [`Context::Detached`] resolves to the application root this resolver was created with.
///
/// Resolution has no side effects and always returns the same root for the same context.
///
/// # Example
///
/// ```rust
/// use mount_pools::{Context, ContextResolver, RootContext};
///
/// let application = RootContext::application();
/// let window = RootContext::hierarchy();
/// let resolver = ContextResolver::new(application.clone());
///
/// assert_eq!(resolver.resolve(&Context::wrap(&window)), window);
/// assert_eq!(resolver.resolve(&Context::Detached), application);
/// ```
#[derive(Clone, Debug)]
pub struct ContextResolver {
    application: RootContext,
}

impl ContextResolver {
    /// Creates a resolver that maps detached contexts to `application`.
    #[must_use]
    pub fn new(application: RootContext) -> Self {
        Self { application }
    }

    /// The root that detached contexts resolve to.
    #[must_use]
    pub fn application(&self) -> &RootContext {
        &self.application
    }

    /// Resolves `context` to the root that owns it.
    #[must_use]
    pub fn resolve(&self, context: &Context) -> RootContext {
        let mut current = context;

        loop {
            match current {
                Context::Root(root) => return root.clone(),
                Context::Wrapped(inner) => current = inner.as_ref(),
                Context::Detached => return self.application.clone(),
            }
        }
    }

    /// Whether two contexts share a root and therefore share pools.
    #[must_use]
    pub fn is_equivalent(&self, a: &Context, b: &Context) -> bool {
        self.resolve(a) == self.resolve(b)
    }
}
