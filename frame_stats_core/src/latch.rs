// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lock-free latched frame-timing state.
//!
//! [`LatchedState`] holds the most recent [`Capture`] for concurrent readers.
//! It is written from the runtime's frame thread (inside the intercepted
//! frame-wait call) and read from the host's main thread once per host frame.
//!
//! # Synchronization
//!
//! Every field is an atomic. The writer stores fields with `Release` and the
//! per-field getters load with `Acquire`, so a reader always sees a value that
//! some capture actually produced, and every period ever stored is
//! non-negative.
//!
//! A sequence counter brackets each write (odd while a write is in progress).
//! [`LatchedState::snapshot`] uses it to read the time and period of the
//! *same* capture, retrying a bounded number of times and falling back to
//! per-field loads. Readers never block the writer.
//!
//! Writers serialize among themselves by moving the counter from even to odd
//! with a compare-exchange. The runtime already serializes frame-wait calls,
//! so in practice the only contention is [`reset`](LatchedState::reset)
//! racing a capture.

use core::hint::spin_loop;
use core::sync::atomic::{AtomicI64, AtomicU64, Ordering, fence};

use crate::time::{XrDuration, XrTime};
use crate::timing::{Capture, CaptureConfig, CaptureKind, FrameTimingSample};

/// Attempts made by [`LatchedState::snapshot`] before falling back to
/// per-field loads.
const SNAPSHOT_RETRIES: u32 = 64;

/// A consistent view of the latched state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct LatchSnapshot {
    /// Number of captures since construction or the last reset.
    pub frames_captured: u64,
    /// Latest predicted display time, or zero before the first capture.
    pub time: XrTime,
    /// Latest frame period, or zero before the first capture.
    pub period: XrDuration,
}

impl LatchSnapshot {
    /// Returns the snapshot as a seconds-valued sample.
    #[must_use]
    pub const fn sample(&self) -> FrameTimingSample {
        FrameTimingSample {
            predicted_display_time: self.time.as_seconds(),
            frame_period: self.period.as_seconds(),
        }
    }
}

/// The most recent frame-timing capture, readable from any thread.
#[derive(Debug)]
pub struct LatchedState {
    config: CaptureConfig,
    seq: AtomicU64,
    frames: AtomicU64,
    time_nanos: AtomicI64,
    period_nanos: AtomicI64,
}

impl Default for LatchedState {
    fn default() -> Self {
        Self::new(CaptureConfig::openxr())
    }
}

impl LatchedState {
    /// Creates an empty latch. Both queries return zero until the first
    /// capture.
    #[must_use]
    pub const fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            seq: AtomicU64::new(0),
            frames: AtomicU64::new(0),
            time_nanos: AtomicI64::new(0),
            period_nanos: AtomicI64::new(0),
        }
    }

    /// Returns the capture configuration.
    #[must_use]
    pub const fn config(&self) -> CaptureConfig {
        self.config
    }

    /// Latches a new predicted display time and returns the resulting
    /// [`Capture`].
    ///
    /// Exactly one update is made per call.
    pub fn capture(&self, time: XrTime) -> Capture {
        let seq = self.begin_write();

        let frames = self.frames.load(Ordering::Relaxed);
        let previous = (frames > 0).then(|| Capture {
            frame_index: frames - 1,
            time: XrTime(self.time_nanos.load(Ordering::Relaxed)),
            period: XrDuration(self.period_nanos.load(Ordering::Relaxed)),
            kind: CaptureKind::Advance,
        });
        let capture = self.config.next_capture(previous.as_ref(), time);
        debug_assert!(capture.period.as_nanos() >= 0, "period must not be negative");

        self.time_nanos.store(capture.time.as_nanos(), Ordering::Release);
        self.period_nanos
            .store(capture.period.as_nanos(), Ordering::Release);
        self.frames.store(frames.saturating_add(1), Ordering::Release);

        self.end_write(seq);
        capture
    }

    /// Returns the state to `(0, 0)` with no captures.
    pub fn reset(&self) {
        let seq = self.begin_write();
        self.time_nanos.store(0, Ordering::Release);
        self.period_nanos.store(0, Ordering::Release);
        self.frames.store(0, Ordering::Release);
        self.end_write(seq);
    }

    /// Latest frame period in seconds, or `0.0` before the first capture.
    #[must_use]
    pub fn period_seconds(&self) -> f64 {
        XrDuration(self.period_nanos.load(Ordering::Acquire)).as_seconds()
    }

    /// Latest predicted display time in seconds, or `0.0` before the first
    /// capture.
    #[must_use]
    pub fn time_seconds(&self) -> f64 {
        XrTime(self.time_nanos.load(Ordering::Acquire)).as_seconds()
    }

    /// Number of captures since construction or the last reset.
    #[must_use]
    pub fn frames_captured(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Reads time, period and capture count from the same capture.
    ///
    /// Retries while a write is in flight; after a bounded number of attempts
    /// it returns per-field loads instead of waiting.
    #[must_use]
    pub fn snapshot(&self) -> LatchSnapshot {
        for _ in 0..SNAPSHOT_RETRIES {
            let before = self.seq.load(Ordering::Acquire);
            if before & 1 == 0 {
                let snapshot = self.load_fields();
                fence(Ordering::Acquire);
                if self.seq.load(Ordering::Relaxed) == before {
                    return snapshot;
                }
            }
            spin_loop();
        }
        self.load_fields()
    }

    /// Latest capture as a seconds-valued sample, read consistently.
    #[must_use]
    pub fn sample(&self) -> FrameTimingSample {
        self.snapshot().sample()
    }

    fn load_fields(&self) -> LatchSnapshot {
        LatchSnapshot {
            frames_captured: self.frames.load(Ordering::Acquire),
            time: XrTime(self.time_nanos.load(Ordering::Acquire)),
            period: XrDuration(self.period_nanos.load(Ordering::Acquire)),
        }
    }

    /// Moves the sequence counter from even to odd. Returns the odd value.
    fn begin_write(&self) -> u64 {
        loop {
            let current = self.seq.load(Ordering::Relaxed);
            if current & 1 == 0
                && self
                    .seq
                    .compare_exchange_weak(
                        current,
                        current.wrapping_add(1),
                        Ordering::Acquire,
                        Ordering::Relaxed,
                    )
                    .is_ok()
            {
                fence(Ordering::Release);
                return current.wrapping_add(1);
            }
            spin_loop();
        }
    }

    fn end_write(&self, seq: u64) {
        self.seq.store(seq.wrapping_add(1), Ordering::Release);
    }
}
