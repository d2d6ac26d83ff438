// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Times are
//! printed in seconds and periods in milliseconds.

use std::io::Write;

use frame_stats_core::timing::CaptureKind;
use frame_stats_core::trace::{
    EntryPointEvent, EntryPointKind, FrameCaptureEvent, HookInstallEvent, InstallOutcome,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
///
/// The default writer type is `Send`, so a boxed sink can be installed as the
/// plugin's trace sink.
pub struct PrettyPrintSink<W: Write = Box<dyn Write + Send>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn outcome_name(outcome: InstallOutcome) -> &'static str {
    match outcome {
        InstallOutcome::Installed => "installed",
        InstallOutcome::Unchanged => "unchanged",
        InstallOutcome::Replaced => "replaced",
        InstallOutcome::SelfInstall => "self-install",
        InstallOutcome::NullResolver => "null-resolver",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_hook_install(&mut self, e: &HookInstallEvent) {
        let _ = writeln!(self.writer, "[hook] {}", outcome_name(e.outcome));
    }

    fn on_entry_point(&mut self, e: &EntryPointEvent) {
        let _ = match e.kind {
            EntryPointKind::Cached => writeln!(self.writer, "[xrWaitFrame] cached"),
            EntryPointKind::Refreshed => writeln!(self.writer, "[xrWaitFrame] refreshed"),
            EntryPointKind::Unresolved(code) => {
                writeln!(self.writer, "[xrWaitFrame] UNRESOLVED result={code}")
            }
        };
    }

    fn on_frame_capture(&mut self, e: &FrameCaptureEvent) {
        let note = match e.kind {
            CaptureKind::First => " first",
            CaptureKind::Advance => "",
            CaptureKind::Regression => " REGRESSION",
        };
        let _ = writeln!(
            self.writer,
            "[frame] {} t={:.6}s period={:.3}ms{note}",
            e.frame_index,
            e.time.as_seconds(),
            e.period.as_seconds() * 1000.0,
        );
    }
}
