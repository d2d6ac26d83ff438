// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rolling frame pacing statistics for HUDs and logs.

use alloc::string::String;

use crate::timing::FrameTimingSample;

/// Aggregated report returned by [`PacingTracker::observe`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PacingReport {
    /// Delivery rate of the observed frame in Hz (`1 / period`).
    pub rate_hz: f64,
    /// Mean period over the window, in milliseconds.
    pub mean_period_ms: f64,
    /// Shortest period in the window, in milliseconds.
    pub min_period_ms: f64,
    /// Longest period in the window, in milliseconds.
    pub max_period_ms: f64,
    /// Mean absolute deviation from the window mean, in milliseconds.
    pub jitter_ms: f64,
    /// Total frames observed.
    pub total_frames: u64,
    /// Frames that reported a zero period (first capture or regression).
    pub zero_period_frames: u64,
}

/// Rolling tracker with a fixed-size window of frame periods.
///
/// Zero periods (the first capture and regressions) are counted but not
/// written into the window, so they do not drag the mean down.
#[derive(Debug)]
pub struct PacingTracker<const N: usize> {
    periods_ms: [f64; N],
    cursor: usize,
    filled: usize,
    total_frames: u64,
    zero_period_frames: u64,
}

impl<const N: usize> Default for PacingTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PacingTracker<N> {
    /// Creates an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            periods_ms: [0.0; N],
            cursor: 0,
            filled: 0,
            total_frames: 0,
            zero_period_frames: 0,
        }
    }

    /// Observes one polled sample and returns an updated report.
    #[must_use]
    pub fn observe(&mut self, sample: FrameTimingSample) -> PacingReport {
        self.total_frames = self.total_frames.saturating_add(1);

        let period_ms = sample.frame_period * 1000.0;
        if period_ms > 0.0 && N > 0 {
            self.periods_ms[self.cursor] = period_ms;
            self.cursor = (self.cursor + 1) % N;
            self.filled = (self.filled + 1).min(N);
        } else {
            self.zero_period_frames = self.zero_period_frames.saturating_add(1);
        }

        let window = &self.periods_ms[..self.filled];
        let (mean, min, max, jitter) = if window.is_empty() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let len = window.len() as f64;
            let mean = window.iter().sum::<f64>() / len;
            let min = window.iter().copied().fold(f64::INFINITY, f64::min);
            let max = window.iter().copied().fold(0.0, f64::max);
            let jitter = window.iter().map(|p| (p - mean).abs()).sum::<f64>() / len;
            (mean, min, max, jitter)
        };

        PacingReport {
            rate_hz: sample.delivery_rate_hz(),
            mean_period_ms: mean,
            min_period_ms: min,
            max_period_ms: max,
            jitter_ms: jitter,
            total_frames: self.total_frames,
            zero_period_frames: self.zero_period_frames,
        }
    }

    /// Returns the windowed periods oldest→newest, in milliseconds.
    ///
    /// Slots not yet filled read as zero and come first.
    #[must_use]
    pub fn periods_ms(&self) -> [f64; N] {
        let mut out = [0.0; N];
        let start = N - self.filled;
        let mut i = 0;
        while i < self.filled {
            let idx = (self.cursor + N - self.filled + i) % N;
            out[start + i] = self.periods_ms[idx];
            i += 1;
        }
        out
    }

    /// Returns an ASCII sparkline over [`periods_ms`](Self::periods_ms).
    #[must_use]
    pub fn sparkline_ascii(&self, min_ms: f64, max_ms: f64) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let span = max_ms - min_ms;
        let mut out = String::with_capacity(N);
        for v in self.periods_ms() {
            let t = if span > 0.0 {
                (v.clamp(min_ms, max_ms) - min_ms) / span
            } else {
                0.0
            };
            #[expect(
                clippy::cast_possible_truncation,
                reason = "index is clamped to ASCII level count"
            )]
            let level = (t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
            out.push(LEVELS[level.min(LEVELS.len() - 1)] as char);
        }
        out
    }
}
