//! Low-level primitives for raw block memory.
//!
//! [`RawBuf`] is the only owner of a raw allocation in the workspace and
//! this is the only module allowed to contain `unsafe` code. Every slot of
//! a `RawBuf` is initialised at all times: fresh allocations come from
//! `alloc_zeroed`, growth zero-fills the new tail, and [`Element`] payloads
//! accept the all-zero bit pattern. That invariant is what makes the safe
//! full-capacity slice accessors sound.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::NonNull;
use std::slice;

use burrow_core::Element;

/// An owned, zero-initialised allocation of `cap` elements of `T`.
pub(crate) struct RawBuf<T: Element> {
    ptr: NonNull<T>,
    cap: usize,
}

// SAFETY: `RawBuf` uniquely owns its allocation. Moving it to another
// thread moves the `T`s with it, and `&RawBuf` only hands out `&[T]`.
unsafe impl<T: Element + Send> Send for RawBuf<T> {}
// SAFETY: see above; shared access only yields shared element references.
unsafe impl<T: Element + Sync> Sync for RawBuf<T> {}

/// Zero-sized requests and zero-sized types never reach the allocator.
fn needs_alloc<T>(cap: usize) -> bool {
    cap != 0 && mem::size_of::<T>() != 0
}

fn layout_for<T>(cap: usize) -> Layout {
    match Layout::array::<T>(cap) {
        Ok(layout) => layout,
        Err(_) => capacity_overflow::<T>(cap),
    }
}

#[cold]
fn capacity_overflow<T>(cap: usize) -> ! {
    panic!(
        "burrow: a block of {cap} elements of {} bytes overflows the address space",
        mem::size_of::<T>()
    )
}

impl<T: Element> RawBuf<T> {
    /// Allocate `cap` zero-filled elements.
    ///
    /// Allocation failure is fatal: it goes through
    /// [`handle_alloc_error`](alloc::handle_alloc_error) and never returns.
    pub(crate) fn zeroed(cap: usize) -> Self {
        if !needs_alloc::<T>(cap) {
            return Self {
                ptr: NonNull::dangling(),
                cap,
            };
        }
        let layout = layout_for::<T>(cap);
        // SAFETY: `layout` has non-zero size, checked by `needs_alloc`.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = match NonNull::new(raw.cast::<T>()) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(layout),
        };
        Self { ptr, cap }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        // SAFETY: `ptr` is valid for `cap` reads (or dangling and aligned
        // when nothing was allocated, which is valid for zero-byte reads),
        // and every slot is initialised per the module invariant.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.cap) }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for `as_slice`; `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.cap) }
    }

    /// Change the capacity to `new_cap`, preserving the first
    /// `min(cap, new_cap)` elements and zero-filling any new tail.
    ///
    /// The allocation may move.
    pub(crate) fn resize(&mut self, new_cap: usize) {
        if new_cap == self.cap {
            return;
        }
        if mem::size_of::<T>() == 0 {
            self.cap = new_cap;
            return;
        }
        if new_cap == 0 || self.cap == 0 {
            // Nothing to preserve: the old buffer (if any) is freed by the
            // assignment and the new one arrives already zeroed.
            *self = Self::zeroed(new_cap);
            return;
        }

        let old_layout = layout_for::<T>(self.cap);
        let new_layout = layout_for::<T>(new_cap);
        // SAFETY: `ptr` was allocated by the global allocator with
        // `old_layout`; the new size is non-zero and was validated by
        // `layout_for`, and the alignment is unchanged.
        let raw = unsafe { alloc::realloc(self.ptr.as_ptr().cast(), old_layout, new_layout.size()) };
        let ptr = match NonNull::new(raw.cast::<T>()) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(new_layout),
        };
        if new_cap > self.cap {
            // SAFETY: `[cap, new_cap)` lies inside the new allocation.
            unsafe { ptr.as_ptr().add(self.cap).write_bytes(0, new_cap - self.cap) };
        }
        self.ptr = ptr;
        self.cap = new_cap;
    }
}

impl<T: Element> Clone for RawBuf<T> {
    fn clone(&self) -> Self {
        let mut copy = Self::zeroed(self.cap);
        copy.as_mut_slice().copy_from_slice(self.as_slice());
        copy
    }
}

impl<T: Element> Drop for RawBuf<T> {
    fn drop(&mut self) {
        if needs_alloc::<T>(self.cap) {
            // SAFETY: `ptr` was allocated with exactly this layout and is
            // freed once; `T: Copy` means there are no element destructors.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), layout_for::<T>(self.cap)) }
        }
    }
}
