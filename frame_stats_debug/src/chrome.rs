// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Frame captures become counter events on the runtime's timebase. Hook
//! events carry no timestamp of their own, so they are placed at the most
//! recent capture (or zero before the first one).
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use frame_stats_core::time::XrTime;
use frame_stats_core::trace::EntryPointKind;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut now_us = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::HookInstall(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "HookInstall",
                    "cat": "Hook",
                    "ts": now_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "outcome": format!("{:?}", e.outcome),
                    }
                }));
            }
            RecordedEvent::EntryPoint(e) => {
                let (kind, code) = match e.kind {
                    EntryPointKind::Cached => ("Cached", None),
                    EntryPointKind::Refreshed => ("Refreshed", None),
                    EntryPointKind::Unresolved(code) => ("Unresolved", Some(code)),
                };
                events.push(json!({
                    "ph": "i",
                    "name": "xrWaitFrame",
                    "cat": "Hook",
                    "ts": now_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "kind": kind,
                        "result": code,
                    }
                }));
            }
            RecordedEvent::FrameCapture(e) => {
                now_us = time_to_us(e.time);
                events.push(json!({
                    "ph": "C",
                    "name": "FramePeriod",
                    "cat": "Frame",
                    "ts": now_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "period_ms": e.period.as_seconds() * 1000.0,
                    }
                }));
                events.push(json!({
                    "ph": "C",
                    "name": "PredictedDisplayTime",
                    "cat": "Frame",
                    "ts": now_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "seconds": e.time.as_seconds(),
                    }
                }));
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.kind),
                    "cat": "Frame",
                    "ts": now_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn time_to_us(t: XrTime) -> f64 {
    t.as_nanos() as f64 / 1000.0
}
