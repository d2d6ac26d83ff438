// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use frame_stats_core::time::{XrDuration, XrTime};
use frame_stats_core::timing::CaptureKind;
use frame_stats_core::trace::{
    EntryPointEvent, EntryPointKind, FrameCaptureEvent, HookInstallEvent, InstallOutcome,
    TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_HOOK_INSTALL: u8 = 1;
const TAG_ENTRY_POINT: u8 = 2;
const TAG_FRAME_CAPTURE: u8 = 3;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
}

impl TraceSink for RecorderSink {
    fn on_hook_install(&mut self, e: &HookInstallEvent) {
        self.write_u8(TAG_HOOK_INSTALL);
        self.write_u8(match e.outcome {
            InstallOutcome::Installed => 0,
            InstallOutcome::Unchanged => 1,
            InstallOutcome::Replaced => 2,
            InstallOutcome::SelfInstall => 3,
            InstallOutcome::NullResolver => 4,
        });
    }

    fn on_entry_point(&mut self, e: &EntryPointEvent) {
        self.write_u8(TAG_ENTRY_POINT);
        let (kind, code) = match e.kind {
            EntryPointKind::Cached => (0, 0),
            EntryPointKind::Refreshed => (1, 0),
            EntryPointKind::Unresolved(code) => (2, code),
        };
        self.write_u8(kind);
        self.write_i32(code);
    }

    fn on_frame_capture(&mut self, e: &FrameCaptureEvent) {
        self.write_u8(TAG_FRAME_CAPTURE);
        self.write_u64(e.frame_index);
        self.write_i64(e.time.as_nanos());
        self.write_i64(e.period.as_nanos());
        self.write_u8(match e.kind {
            CaptureKind::First => 0,
            CaptureKind::Advance => 1,
            CaptureKind::Regression => 2,
        });
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`HookInstallEvent`].
    HookInstall(HookInstallEvent),
    /// An [`EntryPointEvent`].
    EntryPoint(EntryPointEvent),
    /// A [`FrameCaptureEvent`].
    FrameCapture(FrameCaptureEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_i64(&mut self) -> Option<i64> {
        self.take().map(i64::from_le_bytes)
    }

    fn decode_hook_install(&mut self) -> Option<RecordedEvent> {
        let outcome = match self.read_u8()? {
            0 => InstallOutcome::Installed,
            1 => InstallOutcome::Unchanged,
            2 => InstallOutcome::Replaced,
            3 => InstallOutcome::SelfInstall,
            4 => InstallOutcome::NullResolver,
            _ => return None,
        };
        Some(RecordedEvent::HookInstall(HookInstallEvent { outcome }))
    }

    fn decode_entry_point(&mut self) -> Option<RecordedEvent> {
        let kind = self.read_u8()?;
        let code = self.read_i32()?;
        let kind = match kind {
            0 => EntryPointKind::Cached,
            1 => EntryPointKind::Refreshed,
            2 => EntryPointKind::Unresolved(code),
            _ => return None,
        };
        Some(RecordedEvent::EntryPoint(EntryPointEvent { kind }))
    }

    fn decode_frame_capture(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let time = XrTime(self.read_i64()?);
        let period = XrDuration(self.read_i64()?);
        let kind = match self.read_u8()? {
            0 => CaptureKind::First,
            1 => CaptureKind::Advance,
            2 => CaptureKind::Regression,
            _ => return None,
        };
        Some(RecordedEvent::FrameCapture(FrameCaptureEvent {
            frame_index,
            time,
            period,
            kind,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_HOOK_INSTALL => self.decode_hook_install(),
            TAG_ENTRY_POINT => self.decode_entry_point(),
            TAG_FRAME_CAPTURE => self.decode_frame_capture(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> RecorderSink {
        let mut rec = RecorderSink::new();
        rec.on_hook_install(&HookInstallEvent {
            outcome: InstallOutcome::Installed,
        });
        rec.on_entry_point(&EntryPointEvent {
            kind: EntryPointKind::Cached,
        });
        rec.on_frame_capture(&FrameCaptureEvent {
            frame_index: 0,
            time: XrTime(1_000_000_000),
            period: XrDuration::ZERO,
            kind: CaptureKind::First,
        });
        rec.on_frame_capture(&FrameCaptureEvent {
            frame_index: 1,
            time: XrTime(1_011_100_000),
            period: XrDuration(11_100_000),
            kind: CaptureKind::Advance,
        });
        rec
    }

    #[test]
    fn decodes_a_session_in_order() {
        let events: Vec<_> = decode(session().as_bytes()).collect();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            RecordedEvent::HookInstall(HookInstallEvent {
                outcome: InstallOutcome::Installed
            })
        );
        assert_eq!(
            events[1],
            RecordedEvent::EntryPoint(EntryPointEvent {
                kind: EntryPointKind::Cached
            })
        );
        match &events[3] {
            RecordedEvent::FrameCapture(e) => {
                assert_eq!(e.frame_index, 1);
                assert_eq!(e.time, XrTime(1_011_100_000));
                assert_eq!(e.period, XrDuration(11_100_000));
                assert_eq!(e.kind, CaptureKind::Advance);
            }
            other => panic!("expected FrameCapture, got {other:?}"),
        }
    }

    #[test]
    fn unresolved_code_survives_negative_values() {
        let mut rec = RecorderSink::new();
        rec.on_entry_point(&EntryPointEvent {
            kind: EntryPointKind::Unresolved(-7),
        });
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            [RecordedEvent::EntryPoint(EntryPointEvent {
                kind: EntryPointKind::Unresolved(-7)
            })]
        );
    }

    #[test]
    fn truncated_buffer_stops_cleanly() {
        let bytes = session().into_bytes();
        // Cut the last frame capture in half.
        let events: Vec<_> = decode(&bytes[..bytes.len() - 5]).collect();
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn unknown_tag_stops_iteration() {
        let mut bytes = vec![0xff];
        bytes.extend_from_slice(session().as_bytes());
        assert_eq!(decode(&bytes).count(), 0);
    }

    #[test]
    fn empty_buffer() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
