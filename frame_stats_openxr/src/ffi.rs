// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! C ABI exports.
//!
//! Nothing here reports an error to the caller: failures are logged and the
//! plugin falls back to forwarding, or the queries return zero.

use core::ffi::c_void;

use crate::plugin::{plugin, resolver_from_raw, resolver_into_raw};

/// Hooks the runtime's `xrGetInstanceProcAddr`.
///
/// Returns the resolver the host should hand to the OpenXR loader in place of
/// `original`. A null `original` is returned as-is.
///
/// # Safety
///
/// `original` must be null or a valid `PFN_xrGetInstanceProcAddr` that stays
/// callable for as long as the returned resolver is in use.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fm_hook_get_instance_proc_addr(original: *mut c_void) -> *mut c_void {
    resolver_into_raw(plugin().install(resolver_from_raw(original)))
}

/// Latest frame delivery interval in seconds; `0.0` before the first frame.
#[unsafe(no_mangle)]
pub extern "C" fn fm_get_last_frame_period_seconds() -> f64 {
    plugin().latch().period_seconds()
}

/// Latest predicted display time in seconds; `0.0` before the first frame.
#[unsafe(no_mangle)]
pub extern "C" fn fm_get_last_frame_time_seconds() -> f64 {
    plugin().latch().time_seconds()
}

/// Frame delivery rate in Hz derived from the latest period; `0.0` when the
/// period is zero.
#[unsafe(no_mangle)]
pub extern "C" fn fm_get_frame_delivery_rate() -> f64 {
    plugin().latch().sample().delivery_rate_hz()
}

/// Number of frames latched since the plugin was created.
#[unsafe(no_mangle)]
pub extern "C" fn fm_get_captured_frame_count() -> u64 {
    plugin().latch().frames_captured()
}

/// Whether the hook is installed and the real `xrWaitFrame` is cached.
#[unsafe(no_mangle)]
pub extern "C" fn fm_is_intercepting() -> bool {
    plugin().is_intercepting()
}

/// Called by the host when the plugin is loaded.
#[unsafe(no_mangle)]
pub extern "C" fn fm_plugin_create() {
    plugin().create();
}

/// Called by the host before the plugin is unloaded.
#[unsafe(no_mangle)]
pub extern "C" fn fm_plugin_destroy() {
    plugin().destroy();
}
