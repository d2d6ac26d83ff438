// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for OpenXR frame delivery timing.
//!
//! `frame_stats_core` holds everything about frame timing that does not touch
//! the OpenXR ABI. It is `no_std` compatible (with `alloc`) so the native
//! plugin can carry it without pulling in more than it needs.
//!
//! # Architecture
//!
//! The native plugin intercepts the runtime's frame-wait call on the XR
//! frame thread; the host polls on its main thread:
//!
//! ```text
//!   xrWaitFrame thunk (frame thread)
//!       │  predicted display time
//!       ▼
//!   LatchedState::capture() ──► Capture ──► TraceSink (optional)
//!       │
//!       ▼  atomics + sequence counter
//!   LatchedState::snapshot() ◄── FrameTimingSource::poll() (main thread)
//!                                    │
//!                                    ▼
//!                              PacingTracker::observe()
//! ```
//!
//! **[`time`]**: `XrTime` / `XrDuration` nanosecond newtypes.
//!
//! **[`timing`]**: The capture rule: `period = max(0, t_k - t_{k-1})`, plus
//! [`CaptureConfig`](timing::CaptureConfig) for regression handling.
//!
//! **[`latch`]**: [`LatchedState`](latch::LatchedState), the lock-free
//! single-writer / many-reader store of the latest capture.
//!
//! **[`source`]**: The [`FrameTimingSource`](source::FrameTimingSource)
//! capability trait with intercepted and engine-clock implementations.
//!
//! **[`pacing`]**: Rolling pacing statistics for HUDs.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! hook and capture instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables the engine-clock timing source and
//!   source selection.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod latch;
pub mod pacing;
pub mod source;
pub mod time;
pub mod timing;
pub mod trace;
