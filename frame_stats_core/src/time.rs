// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! OpenXR timebase values.
//!
//! [`XrTime`] is a point on the runtime's monotonic clock, expressed the way
//! OpenXR expresses `XrTime`: signed 64-bit nanoseconds. [`XrDuration`] is a
//! signed nanosecond span in the same unit.
//!
//! Conversions to seconds divide by `1e9` in `f64`, which keeps sub-microsecond
//! precision for any timestamp a headset will report in practice.

use core::fmt;
use core::ops::{Add, Sub};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// A runtime timestamp in nanoseconds (OpenXR `XrTime`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct XrTime(pub i64);

impl XrTime {
    /// The zero timestamp. OpenXR never reports it for a real frame.
    pub const ZERO: Self = Self(0);

    /// Creates a timestamp from raw nanoseconds.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Converts this timestamp to seconds.
    #[inline]
    #[must_use]
    pub const fn as_seconds(self) -> f64 {
        self.0 as f64 / NANOS_PER_SECOND
    }

    /// Creates a timestamp from seconds, rounding to the nearest nanosecond.
    ///
    /// Out-of-range and NaN inputs saturate the way `f64 as i64` does.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "saturating float-to-int conversion is the intended behavior"
    )]
    pub fn from_seconds(seconds: f64) -> Self {
        // Round half away from zero without `f64::round` (not in `core`).
        let scaled = seconds * NANOS_PER_SECOND;
        let rounded = if scaled >= 0.0 {
            scaled + 0.5
        } else {
            scaled - 0.5
        };
        Self(rounded as i64)
    }

    /// Returns the span from `earlier` to `self`, or zero if `earlier` is not
    /// strictly before `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> XrDuration {
        let delta = self.0.saturating_sub(earlier.0);
        if delta > 0 {
            XrDuration(delta)
        } else {
            XrDuration::ZERO
        }
    }

    /// Returns the span from `earlier` to `self` if it is strictly positive.
    #[inline]
    #[must_use]
    pub const fn checked_duration_since(self, earlier: Self) -> Option<XrDuration> {
        match self.0.checked_sub(earlier.0) {
            Some(delta) if delta > 0 => Some(XrDuration(delta)),
            _ => None,
        }
    }
}

impl Add<XrDuration> for XrTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: XrDuration) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub<XrDuration> for XrTime {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: XrDuration) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Debug for XrTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XrTime({}ns)", self.0)
    }
}

/// A span of runtime time in nanoseconds (OpenXR `XrDuration`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct XrDuration(pub i64);

impl XrDuration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Creates a duration from raw nanoseconds.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Converts this duration to seconds.
    #[inline]
    #[must_use]
    pub const fn as_seconds(self) -> f64 {
        self.0 as f64 / NANOS_PER_SECOND
    }

    /// Returns `true` if the duration is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for XrDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XrDuration({}ns)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_conversion_matches_nanosecond_timebase() {
        let t = XrTime::from_nanos(1_500_000_000);
        assert!((t.as_seconds() - 1.5).abs() < 1e-12, "1.5e9ns is 1.5s");
        assert_eq!(XrTime::from_seconds(1.5), t);
    }

    #[test]
    fn from_seconds_rounds_to_nearest_nanosecond() {
        assert_eq!(XrTime::from_seconds(0.0111), XrTime(11_100_000));
        assert_eq!(XrTime::from_seconds(0.0222), XrTime(22_200_000));
    }

    #[test]
    fn saturating_duration_is_zero_on_regression() {
        let a = XrTime(22_200_000);
        let b = XrTime(11_100_000);
        assert_eq!(a.saturating_duration_since(b), XrDuration(11_100_000));
        assert_eq!(b.saturating_duration_since(a), XrDuration::ZERO);
        assert_eq!(a.saturating_duration_since(a), XrDuration::ZERO);
    }

    #[test]
    fn checked_duration_rejects_non_positive_and_overflow() {
        assert_eq!(
            XrTime(200).checked_duration_since(XrTime(100)),
            Some(XrDuration(100))
        );
        assert_eq!(XrTime(100).checked_duration_since(XrTime(100)), None);
        assert_eq!(XrTime(100).checked_duration_since(XrTime(200)), None);
        assert_eq!(XrTime(i64::MAX).checked_duration_since(XrTime(-1)), None);
    }

    #[test]
    fn time_duration_ops() {
        let t = XrTime(1000);
        let d = XrDuration(200);
        assert_eq!(t + d, XrTime(1200));
        assert_eq!(t - d, XrTime(800));
        assert!((XrDuration(16_666_667).as_seconds() - 0.016_666_667).abs() < 1e-12);
    }
}
