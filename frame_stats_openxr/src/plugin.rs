// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-wide plugin state.
//!
//! The runtime calls the replacement resolver and the `xrWaitFrame` thunk
//! without any user data, so both reach the one [`PluginState`] through a
//! `static`. All fields are atomics (or a `Mutex` that the frame thread only
//! ever `try_lock`s), so every entry point is callable from any thread.

use core::ffi::{c_char, c_void};
use core::mem;

use frame_stats_core::latch::LatchedState;
use frame_stats_core::source::{FrameTimingSource, SourceCapability, select_source};
use frame_stats_core::timing::CaptureConfig;
use frame_stats_core::trace::{
    EntryPointEvent, FrameCaptureEvent, HookInstallEvent, InstallOutcome, Tracer,
};
use log::{info, warn};
use openxr_sys as xr;

use crate::hook::{HookError, ProcAddrHook};
use crate::logging;

#[cfg(feature = "trace")]
use frame_stats_core::trace::TraceSink;
#[cfg(feature = "trace")]
use std::sync::{Mutex, PoisonError};

static PLUGIN: PluginState = PluginState::new(CaptureConfig::openxr());

/// Returns the process-wide plugin state.
#[must_use]
pub fn plugin() -> &'static PluginState {
    &PLUGIN
}

/// Everything the plugin keeps between calls.
pub struct PluginState {
    hook: ProcAddrHook,
    latch: LatchedState,
    #[cfg(feature = "trace")]
    sink: Mutex<Option<Box<dyn TraceSink + Send>>>,
}

impl core::fmt::Debug for PluginState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PluginState")
            .field("hook", &self.hook)
            .field("latch", &self.latch)
            .finish_non_exhaustive()
    }
}

impl PluginState {
    const fn new(config: CaptureConfig) -> Self {
        Self {
            hook: ProcAddrHook::new(),
            latch: LatchedState::new(config),
            #[cfg(feature = "trace")]
            sink: Mutex::new(None),
        }
    }

    /// Brings the plugin up: starts logging and clears the latch.
    ///
    /// Safe to call more than once.
    pub fn create(&self) {
        logging::init();
        self.latch.reset();
        info!("openxr_frame_stats created");
    }

    /// Tears the plugin down: drops the cached `xrWaitFrame` and clears the
    /// latch. The forwarding resolver stays so late runtime calls still work.
    pub fn destroy(&self) {
        self.hook.detach();
        self.latch.reset();
        info!("openxr_frame_stats destroyed");
    }

    /// Installs the hook over `original` and returns the resolver to hand
    /// back to the host.
    ///
    /// A null `original` is returned unchanged.
    pub fn install(
        &self,
        original: Option<xr::pfn::GetInstanceProcAddr>,
    ) -> Option<xr::pfn::GetInstanceProcAddr> {
        let outcome = match self.hook.install(original, replacement_get_instance_proc_addr) {
            Ok(outcome) => outcome,
            Err(HookError::AlreadyHooked) => InstallOutcome::SelfInstall,
            Err(err @ HookError::NullResolver) => {
                warn!("{err}; hook not installed");
                self.trace(|t| {
                    t.hook_install(&HookInstallEvent {
                        outcome: InstallOutcome::NullResolver,
                    });
                });
                return original;
            }
            Err(err) => {
                warn!("{err}; hook not installed");
                return original;
            }
        };
        self.trace(|t| t.hook_install(&HookInstallEvent { outcome }));
        Some(replacement_get_instance_proc_addr)
    }

    /// Returns the latched frame timing.
    #[must_use]
    pub fn latch(&self) -> &LatchedState {
        &self.latch
    }

    /// Returns `true` if the hook is live and `xrWaitFrame` is cached.
    #[must_use]
    pub fn is_intercepting(&self) -> bool {
        self.hook.is_intercepting()
    }

    /// Returns what this process can provide right now.
    #[must_use]
    pub fn capability(&self) -> SourceCapability {
        SourceCapability {
            intercepting: self.is_intercepting(),
        }
    }

    /// Picks the frame timing source for the host: the latch when
    /// intercepting, otherwise the host's own clock.
    #[must_use]
    pub fn frame_timing_source(&self) -> Box<dyn FrameTimingSource + Send + Sync + '_> {
        select_source(self.capability(), &self.latch)
    }

    /// Replaces the trace sink, returning the previous one.
    ///
    /// Events raised while the sink is being replaced are dropped.
    #[cfg(feature = "trace")]
    pub fn set_trace_sink(
        &self,
        sink: Option<Box<dyn TraceSink + Send>>,
    ) -> Option<Box<dyn TraceSink + Send>> {
        let mut guard = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        mem::replace(&mut *guard, sink)
    }

    /// Runs `f` with a tracer over the current sink. Never blocks: if the
    /// sink is busy the tracer discards events.
    fn trace(&self, f: impl FnOnce(&mut Tracer<'_>)) {
        #[cfg(feature = "trace")]
        if let Ok(mut guard) = self.sink.try_lock()
            && let Some(sink) = guard.as_deref_mut()
        {
            f(&mut Tracer::new(sink));
            return;
        }
        f(&mut Tracer::none());
    }
}

/// The resolver handed back to the host in place of the runtime's.
unsafe extern "system" fn replacement_get_instance_proc_addr(
    instance: xr::Instance,
    name: *const c_char,
    function: *mut Option<xr::pfn::VoidFunction>,
) -> xr::Result {
    let plugin = plugin();
    // SAFETY: the runtime loader calls this under the xrGetInstanceProcAddr contract.
    let lookup = unsafe { plugin.hook.resolve(instance, name, function, wait_frame_thunk) };
    if let Some(kind) = lookup.entry_point {
        plugin.trace(|t| t.entry_point(&EntryPointEvent { kind }));
    }
    lookup.result
}

/// Stands in for `xrWaitFrame`.
unsafe extern "system" fn wait_frame_thunk(
    session: xr::Session,
    frame_wait_info: *const xr::FrameWaitInfo,
    frame_state: *mut xr::FrameState,
) -> xr::Result {
    let plugin = plugin();
    // SAFETY: the application calls this under the xrWaitFrame contract.
    let wait = unsafe {
        plugin.hook.wait_frame(
            &plugin.latch,
            session,
            frame_wait_info,
            frame_state,
            wait_frame_thunk,
        )
    };
    if wait.refreshed.is_some() || wait.capture.is_some() {
        plugin.trace(|t| {
            if let Some(kind) = wait.refreshed {
                t.entry_point(&EntryPointEvent { kind });
            }
            if let Some(capture) = &wait.capture {
                t.frame_capture(&FrameCaptureEvent::from(capture));
            }
        });
    }
    wait.result
}

/// Converts a raw resolver pointer from the C boundary.
pub(crate) fn resolver_from_raw(raw: *mut c_void) -> Option<xr::pfn::GetInstanceProcAddr> {
    // SAFETY: a nullable function pointer has the same layout as a data
    // pointer; null maps to `None`.
    unsafe { mem::transmute::<*mut c_void, Option<xr::pfn::GetInstanceProcAddr>>(raw) }
}

/// Converts a resolver back to a raw pointer for the C boundary.
pub(crate) fn resolver_into_raw(resolver: Option<xr::pfn::GetInstanceProcAddr>) -> *mut c_void {
    resolver.map_or(core::ptr::null_mut(), |f| f as *mut c_void)
}

/// Serializes tests that touch [`plugin()`].
#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
