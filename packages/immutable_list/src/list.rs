use std::ops::Deref;
use std::slice;
use std::sync::Arc;

/// A list that cannot be modified after it has been created.
///
/// All clones share the same storage. The list is [`Send`] and [`Sync`] whenever `T` is.
///
/// # Example
///
/// ```rust
/// use immutable_list::ImmutableList;
///
/// let source = vec![1, 2, 3];
/// let list = ImmutableList::copy_of(&source);
///
/// assert_eq!(&*list, &[1, 2, 3]);
/// assert_eq!(list.iter().sum::<i32>(), 6);
/// ```
#[derive(Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ImmutableList<T> {
    items: Arc<[T]>,
}

impl<T> ImmutableList<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Arc::new([]),
        }
    }

    /// Creates a list holding exactly the given elements, in order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use immutable_list::ImmutableList;
    ///
    /// let list = ImmutableList::of(['a', 'b']);
    /// assert_eq!(list.first(), Some(&'a'));
    /// ```
    #[must_use]
    pub fn of<const N: usize>(items: [T; N]) -> Self {
        Self {
            items: Arc::from(items),
        }
    }

    /// Creates a list holding clones of the elements of `items`.
    ///
    /// Later changes to the source do not affect the list.
    #[must_use]
    pub fn copy_of(items: &[T]) -> Self
    where
        T: Clone,
    {
        Self {
            items: Arc::from(items),
        }
    }

    /// The elements of the list as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns an iterator over the elements of the list.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Whether two lists share the same storage, which is the case for clones of one list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl<T> Clone for ImmutableList<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for ImmutableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for ImmutableList<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> AsRef<[T]> for ImmutableList<T> {
    fn as_ref(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for ImmutableList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: Arc::from(items),
        }
    }
}

impl<T> FromIterator<T> for ImmutableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a ImmutableList<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
