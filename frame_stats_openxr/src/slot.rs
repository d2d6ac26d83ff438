// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atomic storage for OpenXR function pointers.

use core::ffi::c_void;
use core::marker::PhantomData;
use core::mem;
use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use openxr_sys as xr;

/// Function pointer types that may live in an [`FnSlot`].
///
/// # Safety
///
/// Implementors must be non-nullable function pointer types with the same
/// size and representation as a data pointer.
pub(crate) unsafe trait FnPtr: Copy {}

// SAFETY: both are plain `unsafe extern "system" fn` pointer types.
unsafe impl FnPtr for xr::pfn::GetInstanceProcAddr {}
// SAFETY: as above.
unsafe impl FnPtr for xr::pfn::WaitFrame {}

/// One function pointer, empty or set, shared across threads.
///
/// Loads use `Acquire` and stores use `Release`, so a thread that sees a
/// pointer also sees whatever was written before it was published.
pub(crate) struct FnSlot<F: FnPtr> {
    ptr: AtomicPtr<c_void>,
    _marker: PhantomData<F>,
}

impl<F: FnPtr> core::fmt::Debug for FnSlot<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FnSlot")
            .field("ptr", &self.ptr.load(Ordering::Relaxed))
            .finish()
    }
}

impl<F: FnPtr> FnSlot<F> {
    const SIZE_MATCHES: () = assert!(
        mem::size_of::<F>() == mem::size_of::<*mut c_void>(),
        "function pointers must be pointer-sized"
    );

    pub(crate) const fn empty() -> Self {
        Self {
            ptr: AtomicPtr::new(ptr::null_mut()),
            _marker: PhantomData,
        }
    }

    pub(crate) fn load(&self) -> Option<F> {
        from_raw(self.ptr.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, f: Option<F>) {
        self.ptr.store(into_raw(f), Ordering::Release);
    }

    /// Stores `f` and returns what was there before.
    pub(crate) fn swap(&self, f: Option<F>) -> Option<F> {
        from_raw(self.ptr.swap(into_raw(f), Ordering::AcqRel))
    }

    pub(crate) fn is_set(&self) -> bool {
        !self.ptr.load(Ordering::Acquire).is_null()
    }
}

fn from_raw<F: FnPtr>(raw: *mut c_void) -> Option<F> {
    let () = FnSlot::<F>::SIZE_MATCHES;
    if raw.is_null() {
        return None;
    }
    // SAFETY: `raw` was produced by `into_raw` from an `F`, and `F` is a
    // pointer-sized function pointer (checked above).
    Some(unsafe { mem::transmute_copy::<*mut c_void, F>(&raw) })
}

fn into_raw<F: FnPtr>(f: Option<F>) -> *mut c_void {
    let () = FnSlot::<F>::SIZE_MATCHES;
    match f {
        // SAFETY: `F` is a pointer-sized function pointer (checked above).
        Some(f) => unsafe { mem::transmute_copy::<F, *mut c_void>(&f) },
        None => ptr::null_mut(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_runtime;

    #[test]
    fn empty_slot_loads_none() {
        let slot = FnSlot::<xr::pfn::WaitFrame>::empty();
        assert!(slot.load().is_none());
        assert!(!slot.is_set());
    }

    #[test]
    fn store_swap_and_clear() {
        let slot = FnSlot::<xr::pfn::WaitFrame>::empty();
        let f: xr::pfn::WaitFrame = fake_runtime::wait_frame;
        slot.store(Some(f));
        assert!(slot.is_set());
        let loaded = slot.load().expect("slot was just set");
        assert!(ptr::fn_addr_eq(loaded, f));

        let previous = slot.swap(None).expect("slot held a pointer");
        assert!(ptr::fn_addr_eq(previous, f));
        assert!(slot.load().is_none());
    }
}
