use std::any::type_name;
use std::fmt;

/// An unordered stack of interchangeable mount content instances of one type.
///
/// The pool does not know its own limit. Callers pass in the capacity declared by the content
/// definition on every push, so the bound always reflects what the definition says right now.
pub(crate) struct ContentPool<C> {
    items: Vec<C>,
}

impl<C> ContentPool<C> {
    pub(crate) fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn has_room(&self, capacity: usize) -> bool {
        self.items.len() < capacity
    }

    /// Adds an instance to the pool, handing it back if the pool already holds `capacity`
    /// instances.
    pub(crate) fn try_push(&mut self, item: C, capacity: usize) -> Result<(), C> {
        if !self.has_room(capacity) {
            return Err(item);
        }

        self.items.push(item);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Option<C> {
        self.items.pop()
    }
}

impl<C> fmt::Debug for ContentPool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("len", &self.items.len())
            .finish()
    }
}
