// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native OpenXR plugin exposing the XR compositor's frame delivery timing.
//!
//! A host engine loads `openxr_frame_stats` next to its OpenXR loader and
//! routes the runtime's `xrGetInstanceProcAddr` through
//! [`fm_hook_get_instance_proc_addr`](ffi::fm_hook_get_instance_proc_addr).
//! Every lookup is forwarded to the runtime except `xrWaitFrame`, which
//! resolves to a thunk that calls the real function and latches the
//! `predictedDisplayTime` it reports. The host reads the result with the
//! `fm_get_*` queries.
//!
//! ```text
//!   host ──► fm_hook_get_instance_proc_addr(original) ──► replacement
//!   loader ──► replacement("xrWaitFrame") ──► thunk
//!   app ──► thunk ──► real xrWaitFrame ──► LatchedState::capture()
//!   host ──► fm_get_last_frame_period_seconds() ──► LatchedState
//! ```
//!
//! **[`hook`]**: [`ProcAddrHook`](hook::ProcAddrHook): forwarding target,
//! cached `xrWaitFrame`, and the lookup/wait logic.
//!
//! **[`plugin`]**: The process-wide [`PluginState`](plugin::PluginState)
//! and the `extern "system"` functions the runtime calls.
//!
//! **[`ffi`]**: The C ABI exports.
//!
//! Logging goes through the `log` facade. `fm_plugin_create` installs
//! `env_logger`, filtered by the `OPENXR_FRAME_STATS_LOG` environment
//! variable (default `info`).
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Forwards hook and capture events to a
//!   sink installed with `PluginState::set_trace_sink`.

#![expect(unsafe_code, reason = "OpenXR interception is FFI through function pointers")]

pub mod ffi;
pub mod hook;
pub mod plugin;

mod logging;
mod slot;

#[cfg(test)]
mod fake_runtime;

pub use logging::LOG_ENV;
