//! Growable arrays over a single memory block.
//!
//! [`GrowableArray`] is a resizable, randomly indexable sequence. It keeps
//! two distinct sizes: `capacity` (slots allocated in the block) and `len`
//! (the logically used prefix), with `0 <= len <= capacity` at all times.
//!
//! Growth is explicit and predictable: when an operation needs more room
//! the capacity doubles, or jumps straight to the required size if doubling
//! would not be enough. Capacity never shrinks implicitly; only
//! [`shrink_to_fit`](GrowableArray::shrink_to_fit) returns memory.

use std::fmt;

use burrow_arena::{BlockStats, MemoryBlock};
use burrow_core::{CollectionError, Element};

use crate::view::{ArrayView, ArrayViewMut};

/// A resizable sequence backed by one exclusively owned [`MemoryBlock`].
///
/// Slots in `[len, capacity)` hold unspecified values. They are zero right
/// after allocation or growth, but a shrink-then-grow cycle (via
/// [`truncate`](Self::truncate) then [`resize`](Self::resize)) exposes
/// whatever was there before unless [`zero_fill`](Self::zero_fill) is used.
pub struct GrowableArray<T: Element> {
    block: MemoryBlock<T>,
    len: usize,
}

impl<T: Element> GrowableArray<T> {
    /// Create an empty array with no allocated slots.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty array with `capacity` zero-filled slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            block: MemoryBlock::allocate(capacity),
            len: 0,
        }
    }

    /// Create an array holding a copy of `items`, with capacity equal to
    /// its length.
    pub fn from_slice(items: &[T]) -> Self {
        let mut block = MemoryBlock::allocate(items.len());
        if let Ok(slots) = block.slots_mut() {
            slots.copy_from_slice(items);
        }
        Self {
            block,
            len: items.len(),
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array has no live elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    /// Read the element at `index`, which must be below `len`.
    pub fn get(&self, index: usize) -> Result<T, CollectionError> {
        self.as_view()?.get(index)
    }

    /// Overwrite the element at `index`, which must be below `len`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), CollectionError> {
        self.as_view_mut()?.set(index, value)
    }

    /// First live element, if any.
    pub fn first(&self) -> Option<T> {
        self.get(0).ok()
    }

    /// Last live element, if any.
    pub fn last(&self) -> Option<T> {
        self.len.checked_sub(1).and_then(|i| self.get(i).ok())
    }

    /// Append `value`, growing the block first if it is full.
    pub fn add(&mut self, value: T) -> Result<(), CollectionError> {
        let index = self.len;
        self.ensure_capacity(index + 1)?;
        self.block.set(index, value)?;
        self.len += 1;
        Ok(())
    }

    /// Append every element of `items`, growing at most once.
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<(), CollectionError> {
        let start = self.len;
        let end = start
            .checked_add(items.len())
            .ok_or_else(|| CollectionError::invalid("length overflows usize"))?;
        self.ensure_capacity(end)?;
        self.block.slots_mut()?[start..end].copy_from_slice(items);
        self.len = end;
        Ok(())
    }

    /// Insert `count` copies of `value` at `index`.
    ///
    /// The suffix `[index, len)` shifts right by `count`. `index == len`
    /// appends. A `count` of zero is a no-op.
    pub fn insert_at(&mut self, index: usize, value: T, count: usize) -> Result<(), CollectionError> {
        self.ensure_live()?;
        if index > self.len {
            return Err(CollectionError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        if count == 0 {
            return Ok(());
        }
        let new_len = self
            .len
            .checked_add(count)
            .ok_or_else(|| CollectionError::invalid("length overflows usize"))?;
        self.ensure_capacity(new_len)?;
        self.block.copy_within(index..self.len, index + count)?;
        self.block.slots_mut()?[index..index + count].fill(value);
        self.len = new_len;
        Ok(())
    }

    /// Remove `count` elements starting at `index`.
    ///
    /// The suffix shifts left by `count`. Capacity is unchanged.
    pub fn remove_at(&mut self, index: usize, count: usize) -> Result<(), CollectionError> {
        self.ensure_live()?;
        let end = index.checked_add(count).filter(|&end| end <= self.len);
        let Some(end) = end else {
            return Err(CollectionError::IndexOutOfBounds {
                index: index.saturating_add(count),
                len: self.len,
            });
        };
        if count == 0 {
            return Ok(());
        }
        self.block.copy_within(end..self.len, index)?;
        self.len -= count;
        Ok(())
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        let last = self.last()?;
        self.len -= 1;
        Some(last)
    }

    /// Set the live length to `new_len`.
    ///
    /// Growing may reallocate; the newly exposed slots hold unspecified
    /// values. Shrinking only changes `len` and never frees memory.
    pub fn resize(&mut self, new_len: usize) -> Result<(), CollectionError> {
        self.ensure_capacity(new_len)?;
        self.len = new_len;
        Ok(())
    }

    /// Shorten the live length to `new_len`. No-op if already shorter.
    pub fn truncate(&mut self, new_len: usize) {
        self.len = self.len.min(new_len);
    }

    /// Drop all live elements, keeping capacity.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Zero-fill the live prefix `[0, len)` in place.
    pub fn zero_fill(&mut self) -> Result<(), CollectionError> {
        self.block.clear(self.len)
    }

    /// Make room for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) -> Result<(), CollectionError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or_else(|| CollectionError::invalid("capacity overflows usize"))?;
        self.ensure_capacity(required)
    }

    /// Grow capacity to at least `required` slots.
    ///
    /// Doubles the current capacity, or uses `required` exactly when
    /// doubling falls short.
    pub fn ensure_capacity(&mut self, required: usize) -> Result<(), CollectionError> {
        self.ensure_live()?;
        let capacity = self.capacity();
        if required <= capacity {
            return Ok(());
        }
        let doubled = capacity.saturating_mul(2);
        let target = if doubled >= required { doubled } else { required };
        self.block.reallocate(target)
    }

    /// Release unused slots so that capacity equals length.
    pub fn shrink_to_fit(&mut self) -> Result<(), CollectionError> {
        self.ensure_live()?;
        self.block.reallocate(self.len)
    }

    /// Zero-copy view over the live prefix.
    pub fn as_view(&self) -> Result<ArrayView<'_, T>, CollectionError> {
        Ok(ArrayView::new(&self.block.slots()?[..self.len]))
    }

    /// Mutable zero-copy view over the live prefix.
    pub fn as_view_mut(&mut self) -> Result<ArrayViewMut<'_, T>, CollectionError> {
        let len = self.len;
        Ok(ArrayViewMut::new(&mut self.block.slots_mut()?[..len]))
    }

    /// Iterate the live elements. Empty once released.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.live().iter()
    }

    /// Copy the live elements into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.live().to_vec()
    }

    /// Allocate an independent array with a byte copy of the block.
    pub fn try_clone(&self) -> Result<Self, CollectionError> {
        Ok(Self {
            block: self.block.try_clone()?,
            len: self.len,
        })
    }

    /// Free the block now. Later operations report
    /// [`CollectionError::Released`].
    pub fn release(&mut self) -> Result<(), CollectionError> {
        self.block.release()?;
        self.len = 0;
        Ok(())
    }

    /// Whether [`release`](Self::release) has been called.
    pub fn is_released(&self) -> bool {
        self.block.is_released()
    }

    /// Memory usage of the block in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.block.memory_bytes()
    }

    /// Size and state of the underlying block.
    pub fn stats(&self) -> BlockStats {
        self.block.stats()
    }

    fn live(&self) -> &[T] {
        match self.block.slots() {
            Ok(slots) => &slots[..self.len],
            Err(_) => &[],
        }
    }

    fn ensure_live(&self) -> Result<(), CollectionError> {
        if self.block.is_released() {
            return Err(CollectionError::Released);
        }
        Ok(())
    }
}

impl<T: Element> Default for GrowableArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Clone for GrowableArray<T> {
    fn clone(&self) -> Self {
        Self {
            block: self.block.clone(),
            len: self.len,
        }
    }
}

impl<T: Element + PartialEq> PartialEq for GrowableArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.live() == other.live()
    }
}

impl<T: Element + fmt::Debug> fmt::Debug for GrowableArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.live()).finish()
    }
}

impl<T: Element> FromIterator<T> for GrowableArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut array = Self::with_capacity(iter.size_hint().0);
        for item in iter {
            // A freshly created array is never released.
            let _ = array.add(item);
        }
        array
    }
}

impl<'a, T: Element> IntoIterator for &'a GrowableArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array_of(items: &[i32]) -> GrowableArray<i32> {
        GrowableArray::from_slice(items)
    }

    #[test]
    fn append_doubles_full_array() {
        let mut a = GrowableArray::<u32>::with_capacity(4);
        for i in 0..4 {
            a.add(i).unwrap();
        }
        assert_eq!(a.capacity(), 4);
        a.add(4).unwrap();
        assert_eq!(a.capacity(), 8);
        assert_eq!(a.len(), 5);
        assert_eq!(a.to_vec(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn growth_from_empty_uses_exact_minimum() {
        let mut a = GrowableArray::<u8>::new();
        assert_eq!(a.capacity(), 0);
        a.add(1).unwrap();
        assert_eq!(a.capacity(), 1);
        a.add(2).unwrap();
        assert_eq!(a.capacity(), 2);
        a.extend_from_slice(&[3, 4, 5, 6, 7]).unwrap();
        assert_eq!(a.capacity(), 7);
    }

    #[test]
    fn get_and_set_are_bounded_by_len_not_capacity() {
        let mut a = GrowableArray::<i64>::with_capacity(8);
        a.add(5).unwrap();
        assert_eq!(a.get(0).unwrap(), 5);
        assert_eq!(
            a.get(1),
            Err(CollectionError::IndexOutOfBounds { index: 1, len: 1 })
        );
        assert!(a.set(3, 1).is_err());
    }

    #[test]
    fn insert_at_shifts_suffix_right() {
        let mut a = array_of(&[1, 2, 3]);
        a.insert_at(1, 9, 2).unwrap();
        assert_eq!(a.to_vec(), vec![1, 9, 9, 2, 3]);
        a.insert_at(5, 7, 1).unwrap();
        assert_eq!(a.to_vec(), vec![1, 9, 9, 2, 3, 7]);
        assert!(a.insert_at(7, 0, 1).is_err());
    }

    #[test]
    fn remove_at_shifts_suffix_left_and_keeps_capacity() {
        let mut a = array_of(&[1, 2, 3, 4, 5]);
        let cap = a.capacity();
        a.remove_at(1, 3).unwrap();
        assert_eq!(a.to_vec(), vec![1, 5]);
        assert_eq!(a.capacity(), cap);
        assert!(a.remove_at(1, 2).is_err());
        assert_eq!(a.to_vec(), vec![1, 5], "failed remove leaves array unchanged");
    }

    #[test]
    fn resize_shrink_keeps_memory() {
        let mut a = array_of(&[1, 2, 3, 4]);
        a.resize(1).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a.capacity(), 4);
        // The old tail is still there: shrinking never clears.
        a.resize(3).unwrap();
        assert_eq!(a.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn zero_fill_clears_live_prefix() {
        let mut a = array_of(&[7, 8]);
        a.zero_fill().unwrap();
        assert_eq!(a.to_vec(), vec![0, 0]);
    }

    #[test]
    fn shrink_to_fit_is_explicit() {
        let mut a = GrowableArray::<u16>::with_capacity(32);
        a.add(1).unwrap();
        assert_eq!(a.capacity(), 32);
        a.shrink_to_fit().unwrap();
        assert_eq!(a.capacity(), 1);
    }

    #[test]
    fn views_cover_live_prefix_only() {
        let mut a = GrowableArray::<i32>::with_capacity(16);
        a.extend_from_slice(&[3, 1, 2]).unwrap();
        assert_eq!(a.as_view().unwrap().len(), 3);
        a.as_view_mut().unwrap().sort_unstable();
        assert_eq!(a.as_view().unwrap().binary_search(&2), Ok(1));
    }

    #[test]
    fn clone_owns_independent_block() {
        let a = array_of(&[1, 2]);
        let mut b = a.clone();
        b.set(0, 100).unwrap();
        assert_eq!(a.get(0).unwrap(), 1);
        assert_eq!(b.get(0).unwrap(), 100);
    }

    #[test]
    fn pop_and_last() {
        let mut a = array_of(&[4, 5]);
        assert_eq!(a.last(), Some(5));
        assert_eq!(a.pop(), Some(5));
        assert_eq!(a.pop(), Some(4));
        assert_eq!(a.pop(), None);
        assert_eq!(a.first(), None);
    }

    #[test]
    fn released_array_rejects_operations() {
        let mut a = array_of(&[1, 2, 3]);
        a.release().unwrap();
        assert!(a.is_released());
        assert_eq!(a.len(), 0);
        assert_eq!(a.add(1), Err(CollectionError::Released));
        assert_eq!(a.get(0), Err(CollectionError::Released));
        assert_eq!(a.insert_at(0, 1, 1), Err(CollectionError::Released));
        assert_eq!(a.iter().count(), 0);
        assert_eq!(a.release(), Err(CollectionError::Released));
    }

    #[test]
    fn collect_and_iterate() {
        let a: GrowableArray<u64> = (1..=5).collect();
        let total: u64 = a.iter().sum();
        assert_eq!(total, 15);
        assert_eq!(format!("{a:?}"), "[1, 2, 3, 4, 5]");
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn insert_then_remove_restores_sequence(
                data in proptest::collection::vec(any::<i32>(), 0..64),
                at in 0usize..64,
                value in any::<i32>(),
                count in 0usize..16,
            ) {
                let mut a = GrowableArray::from_slice(&data);
                let at = at.min(data.len());
                a.insert_at(at, value, count).unwrap();
                prop_assert_eq!(a.len(), data.len() + count);
                a.remove_at(at, count).unwrap();
                prop_assert_eq!(a.to_vec(), data);
            }

            #[test]
            fn len_never_exceeds_capacity(
                ops in proptest::collection::vec((0u8..4, any::<u16>()), 1..100),
            ) {
                let mut a = GrowableArray::<u16>::new();
                for (op, v) in ops {
                    match op {
                        0 => a.add(v).unwrap(),
                        1 => {
                            let at = v as usize % (a.len() + 1);
                            a.insert_at(at, v, 2).unwrap();
                        }
                        2 if !a.is_empty() => {
                            let at = v as usize % a.len();
                            a.remove_at(at, 1).unwrap();
                        }
                        _ => a.resize(v as usize % 40).unwrap(),
                    }
                    prop_assert!(a.len() <= a.capacity());
                }
            }
        }
    }
}
