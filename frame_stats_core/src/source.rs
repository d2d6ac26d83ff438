// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame timing sources for the host engine.
//!
//! A host polls one [`FrameTimingSource`] per rendered frame to obtain the
//! frame delivery interval and a cumulative frame time. Two implementations
//! exist:
//!
//! - [`LatchedSource`] reads a [`LatchedState`] fed by the intercepted
//!   frame-wait call. Its values follow the XR compositor's frame delivery.
//! - `EngineClockSource` (requires `std`) measures wall-clock time between
//!   polls, which is what a host's default delta-time does.
//!
//! `select_source` (requires `std`) picks one at startup from a
//! [`SourceCapability`].

use crate::latch::LatchedState;
use crate::timing::FrameTimingSample;

/// Where a source's timing comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimingOrigin {
    /// Predicted display times captured from the XR runtime.
    Intercepted,
    /// The host's own monotonic clock, sampled when polled.
    EngineClock,
}

/// What the current platform can provide, determined at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SourceCapability {
    /// The frame-wait hook is installed and the real entry point is cached.
    pub intercepting: bool,
}

/// A per-host-frame provider of frame delivery interval and time.
pub trait FrameTimingSource {
    /// Returns where this source's values come from.
    fn origin(&self) -> TimingOrigin;

    /// Returns the current sample. Call once per host frame.
    fn poll(&mut self) -> FrameTimingSample;
}

/// A [`FrameTimingSource`] backed by an intercepted [`LatchedState`].
#[derive(Clone, Copy, Debug)]
pub struct LatchedSource<'a> {
    latch: &'a LatchedState,
}

impl<'a> LatchedSource<'a> {
    /// Creates a source reading from `latch`.
    #[must_use]
    pub const fn new(latch: &'a LatchedState) -> Self {
        Self { latch }
    }
}

impl FrameTimingSource for LatchedSource<'_> {
    fn origin(&self) -> TimingOrigin {
        TimingOrigin::Intercepted
    }

    fn poll(&mut self) -> FrameTimingSample {
        self.latch.sample()
    }
}

#[cfg(feature = "std")]
pub use engine_clock::{EngineClockSource, select_source};

#[cfg(feature = "std")]
mod engine_clock {
    extern crate std;

    use alloc::boxed::Box;
    use std::time::Instant;

    use super::{FrameTimingSource, LatchedSource, SourceCapability, TimingOrigin};
    use crate::latch::LatchedState;
    use crate::timing::FrameTimingSample;

    /// A [`FrameTimingSource`] driven by the host's monotonic clock.
    ///
    /// The first poll returns a zero sample and starts the clock. Every later
    /// poll returns the time since the previous poll as the period and the
    /// time since the first poll as the cumulative time.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct EngineClockSource {
        start: Option<Instant>,
        last: Option<Instant>,
    }

    impl EngineClockSource {
        /// Creates a source that starts timing on its first poll.
        #[must_use]
        pub const fn new() -> Self {
            Self {
                start: None,
                last: None,
            }
        }

        /// Polls using an explicit `now` instead of reading the clock.
        pub fn poll_at(&mut self, now: Instant) -> FrameTimingSample {
            let (Some(start), Some(last)) = (self.start, self.last) else {
                self.start = Some(now);
                self.last = Some(now);
                return FrameTimingSample::ZERO;
            };
            self.last = Some(now);
            FrameTimingSample {
                predicted_display_time: now.saturating_duration_since(start).as_secs_f64(),
                frame_period: now.saturating_duration_since(last).as_secs_f64(),
            }
        }
    }

    impl FrameTimingSource for EngineClockSource {
        fn origin(&self) -> TimingOrigin {
            TimingOrigin::EngineClock
        }

        fn poll(&mut self) -> FrameTimingSample {
            self.poll_at(Instant::now())
        }
    }

    /// Picks the intercepted source when the hook is live, otherwise the
    /// engine clock.
    #[must_use]
    pub fn select_source(
        capability: SourceCapability,
        latch: &LatchedState,
    ) -> Box<dyn FrameTimingSource + Send + Sync + '_> {
        if capability.intercepting {
            Box::new(LatchedSource::new(latch))
        } else {
            Box::new(EngineClockSource::new())
        }
    }

}
