//! Zero-copy views over the live prefix of a [`GrowableArray`].
//!
//! A view borrows `[0, len)` of the array's block. It never exposes the
//! unused tail `[len, capacity)`, so search, sort and iteration cannot
//! observe stale slots.
//!
//! [`GrowableArray`]: crate::array::GrowableArray

use std::ops::Range;

use burrow_core::{CollectionError, Element};

/// Read-only, bounds-limited view over a live element range.
#[derive(Clone, Copy, Debug)]
pub struct ArrayView<'a, T: Element> {
    items: &'a [T],
}

impl<'a, T: Element> ArrayView<'a, T> {
    pub(crate) fn new(items: &'a [T]) -> Self {
        Self { items }
    }

    /// Number of elements in the view.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read the element at `index`.
    pub fn get(&self, index: usize) -> Result<T, CollectionError> {
        self.items
            .get(index)
            .copied()
            .ok_or(CollectionError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            })
    }

    /// A narrower view over `range`, which must lie inside this view.
    pub fn slice(&self, range: Range<usize>) -> Result<ArrayView<'a, T>, CollectionError> {
        if range.start > range.end || range.end > self.items.len() {
            return Err(CollectionError::IndexOutOfBounds {
                index: range.end,
                len: self.items.len(),
            });
        }
        Ok(ArrayView::new(&self.items[range]))
    }

    /// Iterate the elements in index order.
    pub fn iter(&self) -> std::slice::Iter<'a, T> {
        self.items.iter()
    }

    /// The underlying slice.
    pub fn as_slice(&self) -> &'a [T] {
        self.items
    }

    /// Copy the viewed elements into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.to_vec()
    }

    /// Position of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.items.iter().position(|v| v == value)
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    /// Binary search a sorted view.
    ///
    /// `Ok(i)` is the position of a matching element; `Err(i)` is where
    /// `value` would have to be inserted to keep the view sorted.
    pub fn binary_search(&self, value: &T) -> Result<usize, usize>
    where
        T: Ord,
    {
        self.items.binary_search(value)
    }

    /// Binary search a view sorted by `f`.
    pub fn binary_search_by_key<K: Ord>(&self, key: &K, f: impl FnMut(&T) -> K) -> Result<usize, usize> {
        self.items.binary_search_by_key(key, f)
    }
}

impl<'a, T: Element> IntoIterator for ArrayView<'a, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Mutable, bounds-limited view over a live element range.
#[derive(Debug)]
pub struct ArrayViewMut<'a, T: Element> {
    items: &'a mut [T],
}

impl<'a, T: Element> ArrayViewMut<'a, T> {
    pub(crate) fn new(items: &'a mut [T]) -> Self {
        Self { items }
    }

    /// Number of elements in the view.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> ArrayView<'_, T> {
        ArrayView::new(&*self.items)
    }

    /// Read the element at `index`.
    pub fn get(&self, index: usize) -> Result<T, CollectionError> {
        self.as_view().get(index)
    }

    /// Overwrite the element at `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), CollectionError> {
        let len = self.items.len();
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(CollectionError::IndexOutOfBounds { index, len }),
        }
    }

    /// Swap the elements at `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), CollectionError> {
        let len = self.items.len();
        if let Some(&index) = [a, b].iter().find(|&&i| i >= len) {
            return Err(CollectionError::IndexOutOfBounds { index, len });
        }
        self.items.swap(a, b);
        Ok(())
    }

    /// Overwrite every element with `value`.
    pub fn fill(&mut self, value: T) {
        self.items.fill(value);
    }

    /// Reverse the element order in place.
    pub fn reverse(&mut self) {
        self.items.reverse();
    }

    /// Sort in place (unstable; elements are plain values).
    pub fn sort_unstable(&mut self)
    where
        T: Ord,
    {
        self.items.sort_unstable();
    }

    /// Sort in place by a comparator.
    pub fn sort_unstable_by(&mut self, compare: impl FnMut(&T, &T) -> std::cmp::Ordering) {
        self.items.sort_unstable_by(compare);
    }

    /// The underlying slice.
    pub fn as_slice(&self) -> &[T] {
        &*self.items
    }

    /// The underlying mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut *self.items
    }

    /// Consume the view, keeping the full borrow lifetime.
    pub fn into_mut_slice(self) -> &'a mut [T] {
        self.items
    }
}
