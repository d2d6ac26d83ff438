// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal OpenXR runtime for tests.
//!
//! Resolves `xrWaitFrame` and `xrBeginFrame`; everything else is
//! unsupported. The fake `xrWaitFrame` writes a predicted display time set
//! per thread, so tests running in parallel do not see each other's frames.

use core::cell::Cell;
use core::ffi::{CStr, c_char};
use core::mem;
use core::ptr;

use openxr_sys as xr;

thread_local! {
    static NEXT_DISPLAY_TIME: Cell<i64> = const { Cell::new(0) };
    static WAIT_RESULT: Cell<xr::Result> = const { Cell::new(xr::Result::SUCCESS) };
    static WAIT_CALLS: Cell<u32> = const { Cell::new(0) };
}

const DISPLAY_PERIOD_NANOS: i64 = 13_888_889;

/// Per-thread control over the fake runtime's behavior.
#[derive(Debug)]
pub(crate) struct FakeRuntime(());

impl FakeRuntime {
    /// Resets this thread's fake runtime state.
    pub(crate) fn new() -> Self {
        NEXT_DISPLAY_TIME.set(0);
        WAIT_RESULT.set(xr::Result::SUCCESS);
        WAIT_CALLS.set(0);
        Self(())
    }

    pub(crate) fn set_next_display_time(&self, nanos: i64) {
        NEXT_DISPLAY_TIME.set(nanos);
    }

    pub(crate) fn set_wait_result(&self, result: xr::Result) {
        WAIT_RESULT.set(result);
    }

    pub(crate) fn wait_calls(&self) -> u32 {
        WAIT_CALLS.get()
    }

    /// Resolves `name` directly, bypassing any hook.
    pub(crate) fn resolve(&self, name: &CStr) -> (xr::Result, Option<xr::pfn::VoidFunction>) {
        let mut out = None;
        let result = unsafe { get_instance_proc_addr(xr::Instance::NULL, name.as_ptr(), &raw mut out) };
        (result, out)
    }
}

pub(crate) unsafe extern "system" fn get_instance_proc_addr(
    _instance: xr::Instance,
    name: *const c_char,
    function: *mut Option<xr::pfn::VoidFunction>,
) -> xr::Result {
    if name.is_null() || function.is_null() {
        return xr::Result::ERROR_VALIDATION_FAILURE;
    }
    let name = unsafe { CStr::from_ptr(name) };
    let resolved = if name == c"xrWaitFrame" {
        let f: xr::pfn::WaitFrame = wait_frame;
        Some(unsafe { mem::transmute::<xr::pfn::WaitFrame, xr::pfn::VoidFunction>(f) })
    } else if name == c"xrBeginFrame" {
        let f: xr::pfn::BeginFrame = begin_frame;
        Some(unsafe { mem::transmute::<xr::pfn::BeginFrame, xr::pfn::VoidFunction>(f) })
    } else {
        None
    };
    unsafe { *function = resolved };
    if resolved.is_some() {
        xr::Result::SUCCESS
    } else {
        xr::Result::ERROR_FUNCTION_UNSUPPORTED
    }
}

/// A resolver for a runtime that exposes nothing.
pub(crate) unsafe extern "system" fn empty_get_instance_proc_addr(
    _instance: xr::Instance,
    _name: *const c_char,
    function: *mut Option<xr::pfn::VoidFunction>,
) -> xr::Result {
    if !function.is_null() {
        unsafe { *function = None };
    }
    xr::Result::ERROR_FUNCTION_UNSUPPORTED
}

pub(crate) unsafe extern "system" fn wait_frame(
    _session: xr::Session,
    _frame_wait_info: *const xr::FrameWaitInfo,
    frame_state: *mut xr::FrameState,
) -> xr::Result {
    WAIT_CALLS.set(WAIT_CALLS.get() + 1);
    let result = WAIT_RESULT.get();
    if result == xr::Result::SUCCESS && !frame_state.is_null() {
        unsafe {
            (*frame_state).predicted_display_time = xr::Time::from_nanos(NEXT_DISPLAY_TIME.get());
            (*frame_state).predicted_display_period = xr::Duration::from_nanos(DISPLAY_PERIOD_NANOS);
            (*frame_state).should_render = xr::TRUE;
        }
    }
    result
}

unsafe extern "system" fn begin_frame(
    _session: xr::Session,
    _frame_begin_info: *const xr::FrameBeginInfo,
) -> xr::Result {
    xr::Result::SUCCESS
}

pub(crate) fn frame_state() -> xr::FrameState {
    xr::FrameState {
        ty: xr::StructureType::FRAME_STATE,
        next: ptr::null_mut(),
        predicted_display_time: xr::Time::from_nanos(0),
        predicted_display_period: xr::Duration::from_nanos(0),
        should_render: xr::FALSE,
    }
}

pub(crate) fn frame_wait_info() -> xr::FrameWaitInfo {
    xr::FrameWaitInfo {
        ty: xr::StructureType::FRAME_WAIT_INFO,
        next: ptr::null(),
    }
}
