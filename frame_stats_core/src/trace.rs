// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the interception layer.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! hook and the frame-wait thunk call as they work. All method bodies default
//! to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.

use crate::time::{XrDuration, XrTime};
use crate::timing::{Capture, CaptureKind};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What a hook install call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstallOutcome {
    /// First install; the replacement resolver is now forwarding.
    Installed,
    /// Install with the resolver already in place; nothing changed.
    Unchanged,
    /// Install with a different resolver; the cached entry point was dropped.
    Replaced,
    /// The host passed the replacement resolver back in; nothing changed.
    SelfInstall,
    /// The host passed a null resolver; nothing was installed.
    NullResolver,
}

/// What happened when the intercepted entry point was looked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryPointKind {
    /// The runtime resolved it through the replacement resolver.
    Cached,
    /// The thunk looked it up again after the cache was cleared.
    Refreshed,
    /// The runtime could not resolve it; carries the runtime's result code.
    Unresolved(i32),
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted on every hook install call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HookInstallEvent {
    /// What the call did.
    pub outcome: InstallOutcome,
}

/// Emitted when the intercepted entry point is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryPointEvent {
    /// Outcome of the lookup.
    pub kind: EntryPointKind,
}

/// Emitted after each latched frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameCaptureEvent {
    /// Capture counter since the last reset.
    pub frame_index: u64,
    /// Predicted display time of the frame.
    pub time: XrTime,
    /// Frame delivery interval that was latched.
    pub period: XrDuration,
    /// Relation to the previous capture.
    pub kind: CaptureKind,
}

impl From<&Capture> for FrameCaptureEvent {
    fn from(capture: &Capture) -> Self {
        Self {
            frame_index: capture.frame_index,
            time: capture.time,
            period: capture.period,
            kind: capture.kind,
        }
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the interception layer.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called on every hook install.
    fn on_hook_install(&mut self, e: &HookInstallEvent) {
        _ = e;
    }

    /// Called when the intercepted entry point is looked up.
    fn on_entry_point(&mut self, e: &EntryPointEvent) {
        _ = e;
    }

    /// Called after each latched frame.
    fn on_frame_capture(&mut self, e: &FrameCaptureEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`HookInstallEvent`].
    #[inline]
    pub fn hook_install(&mut self, e: &HookInstallEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_hook_install(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`EntryPointEvent`].
    #[inline]
    pub fn entry_point(&mut self, e: &EntryPointEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_entry_point(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameCaptureEvent`].
    #[inline]
    pub fn frame_capture(&mut self, e: &FrameCaptureEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_capture(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
