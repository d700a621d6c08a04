//! Exclusively-owned raw memory blocks.
//!
//! A [`MemoryBlock`] holds `capacity` elements of one fixed-size
//! [`Element`] type in a single contiguous allocation. It is the storage
//! unit underneath every Burrow container: a growable array owns one block,
//! a map owns one block of slots, a sorted store owns three.
//!
//! Blocks are released deterministically, either by an explicit
//! [`release`](MemoryBlock::release) or when the owner goes out of scope.
//! After an explicit release every operation reports
//! [`CollectionError::Released`] instead of touching freed memory.

use std::fmt;
use std::ops::Range;

use burrow_core::{CollectionError, Element};

use crate::raw::RawBuf;

/// Size and footprint of a [`MemoryBlock`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockStats {
    /// Allocated slots.
    pub capacity: usize,
    /// Size of one element in bytes.
    pub element_size: usize,
    /// Total bytes held by the allocation.
    pub bytes: usize,
    /// Whether the block has been explicitly released.
    pub released: bool,
}

/// A contiguous, zero-initialised block of `capacity` elements.
///
/// Every slot in `[0, capacity)` always holds a valid value: new memory is
/// zero-filled on allocation and on growth. Containers layer their own
/// logical length on top; the block itself has no notion of "used".
pub struct MemoryBlock<T: Element> {
    /// `None` once the block has been explicitly released.
    buf: Option<RawBuf<T>>,
}

impl<T: Element> MemoryBlock<T> {
    /// Allocate a zero-filled block for `capacity` elements.
    ///
    /// Exhaustion of the global allocator is fatal and does not return.
    pub fn allocate(capacity: usize) -> Self {
        Self {
            buf: Some(RawBuf::zeroed(capacity)),
        }
    }

    /// Resize the block to `new_capacity` elements.
    ///
    /// The first `min(capacity, new_capacity)` elements are preserved and
    /// any new tail is zero-filled. The block may move, so previously
    /// obtained slices are invalidated (the borrow checker enforces this).
    pub fn reallocate(&mut self, new_capacity: usize) -> Result<(), CollectionError> {
        self.raw_mut()?.resize(new_capacity);
        Ok(())
    }

    /// Zero-fill the first `n` elements without resizing.
    pub fn clear(&mut self, n: usize) -> Result<(), CollectionError> {
        let slots = self.raw_mut()?.as_mut_slice();
        if n > slots.len() {
            return Err(CollectionError::IndexOutOfBounds {
                index: n,
                len: slots.len(),
            });
        }
        slots[..n].fill(T::zeroed());
        Ok(())
    }

    /// Free the block's memory now.
    ///
    /// Subsequent operations return [`CollectionError::Released`],
    /// including a second `release`.
    pub fn release(&mut self) -> Result<(), CollectionError> {
        match self.buf.take() {
            Some(buf) => {
                drop(buf);
                Ok(())
            }
            None => Err(CollectionError::Released),
        }
    }

    /// Whether [`release`](Self::release) has been called.
    pub fn is_released(&self) -> bool {
        self.buf.is_none()
    }

    /// Allocated slots, or zero once released.
    pub fn capacity(&self) -> usize {
        self.buf.as_ref().map_or(0, RawBuf::capacity)
    }

    /// Read the element at `index`.
    pub fn get(&self, index: usize) -> Result<T, CollectionError> {
        let slots = self.slots()?;
        slots
            .get(index)
            .copied()
            .ok_or(CollectionError::IndexOutOfBounds {
                index,
                len: slots.len(),
            })
    }

    /// Overwrite the element at `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), CollectionError> {
        let slots = self.slots_mut()?;
        let len = slots.len();
        match slots.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(CollectionError::IndexOutOfBounds { index, len }),
        }
    }

    /// All `capacity` slots as a shared slice.
    pub fn slots(&self) -> Result<&[T], CollectionError> {
        Ok(self.raw()?.as_slice())
    }

    /// All `capacity` slots as a mutable slice.
    pub fn slots_mut(&mut self) -> Result<&mut [T], CollectionError> {
        Ok(self.raw_mut()?.as_mut_slice())
    }

    /// Copy the elements in `src` so that they start at `dest`.
    ///
    /// The ranges may overlap. This is the element-level shift used for
    /// positional insertion and removal.
    pub fn copy_within(&mut self, src: Range<usize>, dest: usize) -> Result<(), CollectionError> {
        let slots = self.slots_mut()?;
        let len = slots.len();
        if src.start > src.end || src.end > len {
            return Err(CollectionError::IndexOutOfBounds {
                index: src.end,
                len,
            });
        }
        let count = src.end - src.start;
        if dest.checked_add(count).is_none_or(|end| end > len) {
            return Err(CollectionError::IndexOutOfBounds {
                index: dest.saturating_add(count),
                len,
            });
        }
        slots.copy_within(src, dest);
        Ok(())
    }

    /// Allocate an independent block holding a byte copy of this one.
    pub fn try_clone(&self) -> Result<Self, CollectionError> {
        Ok(Self {
            buf: Some(self.raw()?.clone()),
        })
    }

    /// Memory usage of the allocation in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.capacity() * std::mem::size_of::<T>()
    }

    /// Snapshot of the block's size and state.
    pub fn stats(&self) -> BlockStats {
        BlockStats {
            capacity: self.capacity(),
            element_size: std::mem::size_of::<T>(),
            bytes: self.memory_bytes(),
            released: self.is_released(),
        }
    }

    fn raw(&self) -> Result<&RawBuf<T>, CollectionError> {
        self.buf.as_ref().ok_or(CollectionError::Released)
    }

    fn raw_mut(&mut self) -> Result<&mut RawBuf<T>, CollectionError> {
        self.buf.as_mut().ok_or(CollectionError::Released)
    }
}

impl<T: Element> Clone for MemoryBlock<T> {
    /// Clones the allocation byte-for-byte; a released block clones to
    /// another released block.
    fn clone(&self) -> Self {
        Self {
            buf: self.buf.clone(),
        }
    }
}

impl<T: Element> fmt::Debug for MemoryBlock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBlock")
            .field("capacity", &self.capacity())
            .field("element_size", &std::mem::size_of::<T>())
            .field("released", &self.is_released())
            .finish()
    }
}
