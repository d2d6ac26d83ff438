// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-timing samples and the capture rule.
//!
//! This module defines the values that flow from the intercepted frame-wait
//! call to the query side:
//!
//! - [`CaptureConfig`]: how a new predicted display time turns into a period
//! - [`Capture`]: one latched observation, with its [`CaptureKind`]
//! - [`FrameTimingSample`]: the `(time, period)` pair readers see, in seconds
//!
//! # Capture rule
//!
//! For a sequence of predicted display times `t_1, t_2, …` the period after
//! capturing `t_k` is `max(0, t_k - t_{k-1})`, with `t_0 = t_1` so the first
//! capture yields a zero period. A decreasing time (session restart, runtime
//! clock reset) is a *regression*; [`RegressionPolicy`] decides whether it
//! clamps the period to zero or keeps the previous one.

use crate::time::{XrDuration, XrTime};

/// What to do with the period when the predicted display time goes backwards
/// or stalls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RegressionPolicy {
    /// Report a zero period for the regressing frame.
    #[default]
    ClampToZero,
    /// Keep reporting the last positive period.
    HoldPrevious,
}

/// Configuration for turning predicted display times into samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct CaptureConfig {
    /// Period handling on non-advancing time.
    pub regression: RegressionPolicy,
}

impl CaptureConfig {
    /// Default configuration: regressions clamp the period to zero.
    #[must_use]
    pub const fn openxr() -> Self {
        Self {
            regression: RegressionPolicy::ClampToZero,
        }
    }

    /// Configuration that keeps the last positive period across regressions
    /// and stalls.
    #[must_use]
    pub const fn hold_previous() -> Self {
        Self {
            regression: RegressionPolicy::HoldPrevious,
        }
    }

    /// Applies the capture rule to a new predicted display time.
    #[must_use]
    pub const fn next_capture(self, previous: Option<&Capture>, time: XrTime) -> Capture {
        let Some(previous) = previous else {
            return Capture {
                frame_index: 0,
                time,
                period: XrDuration::ZERO,
                kind: CaptureKind::First,
            };
        };

        let frame_index = previous.frame_index.saturating_add(1);
        match time.checked_duration_since(previous.time) {
            Some(period) => Capture {
                frame_index,
                time,
                period,
                kind: CaptureKind::Advance,
            },
            None => Capture {
                frame_index,
                time,
                period: match self.regression {
                    RegressionPolicy::ClampToZero => XrDuration::ZERO,
                    RegressionPolicy::HoldPrevious => previous.period,
                },
                kind: CaptureKind::Regression,
            },
        }
    }
}

/// How a capture relates to the one before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    /// No previous capture existed; the period is zero.
    First,
    /// Time moved forward; the period is the positive delta.
    Advance,
    /// Time stalled or moved backwards; see [`RegressionPolicy`].
    Regression,
}

/// One latched observation, in runtime units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Capture {
    /// Zero-based index of this capture since the last reset.
    pub frame_index: u64,
    /// Predicted display time reported by the runtime for the frame.
    pub time: XrTime,
    /// Frame delivery interval derived from the previous capture.
    pub period: XrDuration,
    /// Relation to the previous capture.
    pub kind: CaptureKind,
}

impl Capture {
    /// Returns the capture as a seconds-valued sample.
    #[must_use]
    pub const fn sample(&self) -> FrameTimingSample {
        FrameTimingSample {
            predicted_display_time: self.time.as_seconds(),
            frame_period: self.period.as_seconds(),
        }
    }
}

/// The `(time, period)` pair exposed to readers, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameTimingSample {
    /// Latest predicted display time (cumulative, runtime clock).
    pub predicted_display_time: f64,
    /// Latest frame delivery interval. Never negative.
    pub frame_period: f64,
}

impl FrameTimingSample {
    /// The sample reported before any frame has been captured.
    pub const ZERO: Self = Self {
        predicted_display_time: 0.0,
        frame_period: 0.0,
    };

    /// Frame delivery rate in Hz (`1 / period`), or zero when the period is
    /// zero.
    #[must_use]
    pub fn delivery_rate_hz(&self) -> f64 {
        if self.frame_period > 0.0 {
            1.0 / self.frame_period
        } else {
            0.0
        }
    }
}
