// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `xrGetInstanceProcAddr` interception.
//!
//! [`ProcAddrHook`] owns two slots: the runtime's resolver that every lookup
//! is forwarded to, and the real `xrWaitFrame` that the thunk delegates to.
//! The replacement resolver and the thunk themselves are plain
//! `extern "system"` functions (see [`crate::plugin`]) that reach a hook
//! through process-wide state; everything in this module takes `&self` so
//! it can be exercised on a local hook as well.

use core::ffi::{CStr, c_char};
use core::fmt;
use core::mem;
use core::ptr;
use core::sync::atomic::{AtomicU64, Ordering};

use frame_stats_core::latch::LatchedState;
use frame_stats_core::time::XrTime;
use frame_stats_core::timing::{Capture, CaptureKind};
use frame_stats_core::trace::{EntryPointKind, InstallOutcome};
use log::{debug, info, warn};
use openxr_sys as xr;

use crate::slot::FnSlot;

/// Name of the one entry point that is intercepted.
pub const WAIT_FRAME: &CStr = c"xrWaitFrame";

/// Reasons a hook operation could not do what was asked.
///
/// None of these reach the host: the C boundary logs them and degrades to
/// forwarding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookError {
    /// The host passed a null `xrGetInstanceProcAddr`.
    NullResolver,
    /// The runtime could not resolve `xrWaitFrame`.
    TargetUnresolved(xr::Result),
    /// The host passed the replacement resolver back in as the original.
    AlreadyHooked,
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullResolver => f.write_str("original xrGetInstanceProcAddr is null"),
            Self::TargetUnresolved(code) => {
                write!(f, "runtime did not resolve xrWaitFrame ({code:?})")
            }
            Self::AlreadyHooked => f.write_str("resolver is already the replacement"),
        }
    }
}

impl core::error::Error for HookError {}

/// Result of forwarding one lookup through the replacement resolver.
#[derive(Clone, Copy, Debug)]
pub struct Lookup {
    /// What the original resolver returned; handed back to the caller as-is.
    pub result: xr::Result,
    /// Set when the lookup was for `xrWaitFrame`.
    pub entry_point: Option<EntryPointKind>,
}

/// Result of one call through the frame-wait thunk.
#[derive(Clone, Copy, Debug)]
pub struct FrameWait {
    /// What the real `xrWaitFrame` returned, or
    /// `XR_ERROR_FUNCTION_UNSUPPORTED` if it could not be found.
    pub result: xr::Result,
    /// Set when the thunk had to look the real function up again.
    pub refreshed: Option<EntryPointKind>,
    /// Set when a predicted display time was latched.
    pub capture: Option<Capture>,
}

/// Forwarding target and intercepted entry point for one loaded runtime.
#[derive(Debug)]
pub struct ProcAddrHook {
    next: FnSlot<xr::pfn::GetInstanceProcAddr>,
    wait_frame: FnSlot<xr::pfn::WaitFrame>,
    /// Last instance handle seen by the replacement resolver.
    instance: AtomicU64,
}

impl Default for ProcAddrHook {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcAddrHook {
    /// Creates a hook with nothing installed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: FnSlot::empty(),
            wait_frame: FnSlot::empty(),
            instance: AtomicU64::new(0),
        }
    }

    /// Points the hook at `original`.
    ///
    /// `replacement` is the resolver the caller hands back to the host; it
    /// is only used to detect a self-install. Installing the same original
    /// twice is a no-op. A different original replaces the forwarding target
    /// and drops the cached `xrWaitFrame`, which belonged to the old runtime.
    pub fn install(
        &self,
        original: Option<xr::pfn::GetInstanceProcAddr>,
        replacement: xr::pfn::GetInstanceProcAddr,
    ) -> Result<InstallOutcome, HookError> {
        let Some(original) = original else {
            return Err(HookError::NullResolver);
        };
        if ptr::fn_addr_eq(original, replacement) {
            return Err(HookError::AlreadyHooked);
        }

        match self.next.swap(Some(original)) {
            None => {
                info!("xrGetInstanceProcAddr hook installed");
                Ok(InstallOutcome::Installed)
            }
            Some(previous) if ptr::fn_addr_eq(previous, original) => Ok(InstallOutcome::Unchanged),
            Some(_) => {
                self.wait_frame.store(None);
                info!("xrGetInstanceProcAddr hook moved to a new runtime resolver");
                Ok(InstallOutcome::Replaced)
            }
        }
    }

    /// Drops the cached `xrWaitFrame`. The forwarding target stays, so
    /// lookups and late thunk calls keep working.
    pub fn detach(&self) {
        self.wait_frame.store(None);
    }

    /// Returns `true` if a resolver is installed and the real `xrWaitFrame`
    /// is cached.
    #[must_use]
    pub fn is_intercepting(&self) -> bool {
        self.next.is_set() && self.wait_frame.is_set()
    }

    /// Forwards a lookup to the original resolver, substituting `thunk` for
    /// `xrWaitFrame`.
    ///
    /// # Safety
    ///
    /// The arguments must satisfy the `xrGetInstanceProcAddr` contract:
    /// `name` is null or a NUL-terminated string, and `function` is null or
    /// valid for writes.
    pub unsafe fn resolve(
        &self,
        instance: xr::Instance,
        name: *const c_char,
        function: *mut Option<xr::pfn::VoidFunction>,
        thunk: xr::pfn::WaitFrame,
    ) -> Lookup {
        let Some(next) = self.next.load() else {
            return Lookup {
                result: xr::Result::ERROR_FUNCTION_UNSUPPORTED,
                entry_point: None,
            };
        };

        // SAFETY: arguments are forwarded unchanged under the caller's contract.
        let result = unsafe { next(instance, name, function) };

        // SAFETY: a non-null `name` is NUL-terminated per the caller's contract.
        if name.is_null() || unsafe { CStr::from_ptr(name) } != WAIT_FRAME {
            return Lookup {
                result,
                entry_point: None,
            };
        }

        // SAFETY: `function` is checked for null and the runtime just wrote it.
        let resolved = if function.is_null() {
            None
        } else {
            unsafe { *function }
        };
        let real = match resolved {
            Some(real) if result == xr::Result::SUCCESS => {
                // SAFETY: the runtime returned the address of xrWaitFrame.
                unsafe { mem::transmute::<xr::pfn::VoidFunction, xr::pfn::WaitFrame>(real) }
            }
            _ => {
                let code = if result == xr::Result::SUCCESS {
                    xr::Result::ERROR_FUNCTION_UNSUPPORTED
                } else {
                    result
                };
                warn!("{}; forwarding only", HookError::TargetUnresolved(code));
                return Lookup {
                    result,
                    entry_point: Some(EntryPointKind::Unresolved(code.into_raw())),
                };
            }
        };

        self.instance.store(instance.into_raw(), Ordering::Release);
        if !ptr::fn_addr_eq(real, thunk) {
            self.wait_frame.store(Some(real));
        }
        // SAFETY: checked non-null above; both are function pointers.
        unsafe {
            *function = Some(mem::transmute::<xr::pfn::WaitFrame, xr::pfn::VoidFunction>(thunk));
        }
        Lookup {
            result,
            entry_point: Some(EntryPointKind::Cached),
        }
    }

    /// Calls the real `xrWaitFrame` and latches the predicted display time
    /// it wrote.
    ///
    /// Latches only when the call returned `XR_SUCCESS` and `frame_state` is
    /// non-null. `thunk` is the caller's own address, used to refuse a
    /// refreshed lookup that resolves back to it.
    ///
    /// # Safety
    ///
    /// The arguments must satisfy the `xrWaitFrame` contract.
    pub unsafe fn wait_frame(
        &self,
        latch: &LatchedState,
        session: xr::Session,
        frame_wait_info: *const xr::FrameWaitInfo,
        frame_state: *mut xr::FrameState,
        thunk: xr::pfn::WaitFrame,
    ) -> FrameWait {
        let mut refreshed = None;
        let real = match self.wait_frame.load() {
            Some(real) => real,
            None => {
                let (found, kind) = self.refresh(thunk);
                refreshed = Some(kind);
                match found {
                    Some(real) => real,
                    None => {
                        return FrameWait {
                            result: xr::Result::ERROR_FUNCTION_UNSUPPORTED,
                            refreshed,
                            capture: None,
                        };
                    }
                }
            }
        };

        // SAFETY: arguments are forwarded unchanged under the caller's contract.
        let result = unsafe { real(session, frame_wait_info, frame_state) };
        if result != xr::Result::SUCCESS {
            return FrameWait {
                result,
                refreshed,
                capture: None,
            };
        }

        // SAFETY: the runtime filled `frame_state` on success; null is skipped.
        let capture = unsafe { frame_state.as_ref() }.map(|state| {
            let capture = latch.capture(XrTime::from_nanos(state.predicted_display_time.as_nanos()));
            if capture.kind == CaptureKind::Regression {
                debug!(
                    "predicted display time went backwards at frame {}; period is {:?}",
                    capture.frame_index, capture.period
                );
            }
            capture
        });
        FrameWait {
            result,
            refreshed,
            capture,
        }
    }

    /// Looks `xrWaitFrame` up again through the forwarding target using the
    /// last instance seen.
    fn refresh(&self, thunk: xr::pfn::WaitFrame) -> (Option<xr::pfn::WaitFrame>, EntryPointKind) {
        let Some(next) = self.next.load() else {
            return (
                None,
                EntryPointKind::Unresolved(xr::Result::ERROR_FUNCTION_UNSUPPORTED.into_raw()),
            );
        };
        let instance = xr::Instance::from_raw(self.instance.load(Ordering::Acquire));
        let mut out: Option<xr::pfn::VoidFunction> = None;
        // SAFETY: the name is a valid C string and `out` is a valid local.
        let result = unsafe { next(instance, WAIT_FRAME.as_ptr(), &raw mut out) };
        let real = match out {
            // SAFETY: the runtime returned the address of xrWaitFrame.
            Some(f) if result == xr::Result::SUCCESS => unsafe {
                mem::transmute::<xr::pfn::VoidFunction, xr::pfn::WaitFrame>(f)
            },
            _ => return (None, EntryPointKind::Unresolved(result.into_raw())),
        };
        if ptr::fn_addr_eq(real, thunk) {
            return (
                None,
                EntryPointKind::Unresolved(xr::Result::ERROR_FUNCTION_UNSUPPORTED.into_raw()),
            );
        }
        self.wait_frame.store(Some(real));
        warn!("xrWaitFrame was not cached; looked it up again");
        (Some(real), EntryPointKind::Refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_runtime::{self, FakeRuntime};
    use core::ffi::c_void;

    unsafe extern "system" fn marker_thunk(
        _session: xr::Session,
        _info: *const xr::FrameWaitInfo,
        _state: *mut xr::FrameState,
    ) -> xr::Result {
        xr::Result::ERROR_RUNTIME_FAILURE
    }

    unsafe extern "system" fn other_resolver(
        _instance: xr::Instance,
        _name: *const c_char,
        function: *mut Option<xr::pfn::VoidFunction>,
    ) -> xr::Result {
        if !function.is_null() {
            unsafe { *function = None };
        }
        xr::Result::ERROR_FUNCTION_UNSUPPORTED
    }

    fn installed() -> ProcAddrHook {
        let hook = ProcAddrHook::new();
        let outcome = hook
            .install(Some(fake_runtime::get_instance_proc_addr), other_resolver)
            .unwrap();
        assert_eq!(outcome, InstallOutcome::Installed);
        hook
    }

    fn resolve_name(hook: &ProcAddrHook, name: &CStr) -> (Lookup, Option<xr::pfn::VoidFunction>) {
        let mut out = None;
        let lookup = unsafe {
            hook.resolve(
                xr::Instance::from_raw(3),
                name.as_ptr(),
                &raw mut out,
                marker_thunk,
            )
        };
        (lookup, out)
    }

    fn addr(f: Option<xr::pfn::VoidFunction>) -> *const c_void {
        f.map_or(ptr::null(), |f| f as *const c_void)
    }

    #[test]
    fn null_resolver_is_rejected() {
        let hook = ProcAddrHook::new();
        assert_eq!(
            hook.install(None, fake_runtime::get_instance_proc_addr),
            Err(HookError::NullResolver)
        );
        assert!(!hook.is_intercepting());
    }

    #[test]
    fn self_install_changes_nothing() {
        let hook = installed();
        assert_eq!(
            hook.install(Some(other_resolver), other_resolver),
            Err(HookError::AlreadyHooked)
        );
        let (lookup, _) = resolve_name(&hook, WAIT_FRAME);
        assert_eq!(lookup.result, xr::Result::SUCCESS);
    }

    #[test]
    fn repeated_install_is_unchanged() {
        let hook = installed();
        let _ = resolve_name(&hook, WAIT_FRAME);
        assert!(hook.is_intercepting());
        assert_eq!(
            hook.install(Some(fake_runtime::get_instance_proc_addr), other_resolver),
            Ok(InstallOutcome::Unchanged)
        );
        assert!(hook.is_intercepting(), "same resolver keeps the cache");
    }

    #[test]
    fn new_resolver_drops_cached_entry_point() {
        let hook = installed();
        let _ = resolve_name(&hook, WAIT_FRAME);
        assert_eq!(
            hook.install(Some(fake_runtime::empty_get_instance_proc_addr), other_resolver),
            Ok(InstallOutcome::Replaced)
        );
        assert!(!hook.is_intercepting());
    }

    #[test]
    fn wait_frame_lookup_returns_thunk() {
        let hook = installed();
        let (lookup, out) = resolve_name(&hook, WAIT_FRAME);
        assert_eq!(lookup.result, xr::Result::SUCCESS);
        assert_eq!(lookup.entry_point, Some(EntryPointKind::Cached));
        let thunk: xr::pfn::WaitFrame = marker_thunk;
        assert_eq!(addr(out), thunk as *const c_void);
        assert!(hook.is_intercepting());
    }

    #[test]
    fn other_names_forward_verbatim() {
        let hook = installed();
        let runtime = FakeRuntime::new();

        let (lookup, out) = resolve_name(&hook, c"xrBeginFrame");
        let (direct_result, direct) = runtime.resolve(c"xrBeginFrame");
        assert_eq!(lookup.result, direct_result);
        assert_eq!(addr(out), addr(direct));
        assert!(lookup.entry_point.is_none());

        let (lookup, out) = resolve_name(&hook, c"xrNotAFunction");
        let (direct_result, direct) = runtime.resolve(c"xrNotAFunction");
        assert_eq!(lookup.result, direct_result);
        assert_eq!(lookup.result, xr::Result::ERROR_FUNCTION_UNSUPPORTED);
        assert!(out.is_none() && direct.is_none());
    }

    #[test]
    fn null_name_is_forwarded() {
        let hook = installed();
        let mut out = None;
        let lookup =
            unsafe { hook.resolve(xr::Instance::NULL, ptr::null(), &raw mut out, marker_thunk) };
        assert_eq!(lookup.result, xr::Result::ERROR_VALIDATION_FAILURE);
        assert!(lookup.entry_point.is_none());
    }

    #[test]
    fn unresolved_target_is_passed_through() {
        let hook = ProcAddrHook::new();
        hook.install(Some(fake_runtime::empty_get_instance_proc_addr), other_resolver)
            .unwrap();
        let (lookup, out) = resolve_name(&hook, WAIT_FRAME);
        assert_eq!(lookup.result, xr::Result::ERROR_FUNCTION_UNSUPPORTED);
        assert!(out.is_none());
        assert_eq!(
            lookup.entry_point,
            Some(EntryPointKind::Unresolved(
                xr::Result::ERROR_FUNCTION_UNSUPPORTED.into_raw()
            ))
        );
        assert!(!hook.is_intercepting());
    }

    #[test]
    fn thunk_is_never_cached_as_real() {
        let hook = installed();
        let mut out = None;
        // Resolve with the fake runtime's own xrWaitFrame posing as the thunk.
        let lookup = unsafe {
            hook.resolve(
                xr::Instance::from_raw(3),
                WAIT_FRAME.as_ptr(),
                &raw mut out,
                fake_runtime::wait_frame,
            )
        };
        assert_eq!(lookup.result, xr::Result::SUCCESS);
        assert!(!hook.is_intercepting());
    }

    #[test]
    fn wait_frame_latches_predicted_display_time() {
        let hook = installed();
        let _ = resolve_name(&hook, WAIT_FRAME);
        let latch = LatchedState::default();
        let runtime = FakeRuntime::new();

        let times = [1_000_000_000, 1_011_100_000, 1_022_200_000, 1_011_100_000];
        let mut periods = [0; 4];
        for (i, t) in times.into_iter().enumerate() {
            runtime.set_next_display_time(t);
            let mut state = fake_runtime::frame_state();
            let wait = unsafe {
                hook.wait_frame(
                    &latch,
                    xr::Session::from_raw(7),
                    &fake_runtime::frame_wait_info(),
                    &raw mut state,
                    marker_thunk,
                )
            };
            assert_eq!(wait.result, xr::Result::SUCCESS);
            assert!(wait.refreshed.is_none());
            assert_eq!(state.predicted_display_time.as_nanos(), t, "output untouched");
            periods[i] = wait.capture.unwrap().period.as_nanos();
        }
        assert_eq!(periods, [0, 11_100_000, 11_100_000, 0]);
        assert_eq!(latch.frames_captured(), 4);
        assert!((latch.time_seconds() - 1.0111).abs() < 1e-9);
        assert_eq!(runtime.wait_calls(), 4);
    }

    #[test]
    fn failing_delegate_latches_nothing() {
        let hook = installed();
        let _ = resolve_name(&hook, WAIT_FRAME);
        let latch = LatchedState::default();
        let runtime = FakeRuntime::new();
        runtime.set_wait_result(xr::Result::SESSION_LOSS_PENDING);

        let mut state = fake_runtime::frame_state();
        let wait = unsafe {
            hook.wait_frame(
                &latch,
                xr::Session::from_raw(7),
                &fake_runtime::frame_wait_info(),
                &raw mut state,
                marker_thunk,
            )
        };
        assert_eq!(wait.result, xr::Result::SESSION_LOSS_PENDING);
        assert!(wait.capture.is_none());
        assert_eq!(latch.frames_captured(), 0);
        assert_eq!(runtime.wait_calls(), 1);
    }

    #[test]
    fn null_frame_state_is_forwarded_without_capture() {
        let hook = installed();
        let _ = resolve_name(&hook, WAIT_FRAME);
        let latch = LatchedState::default();
        let wait = unsafe {
            hook.wait_frame(
                &latch,
                xr::Session::from_raw(7),
                &fake_runtime::frame_wait_info(),
                ptr::null_mut(),
                marker_thunk,
            )
        };
        assert_eq!(wait.result, xr::Result::SUCCESS);
        assert!(wait.capture.is_none());
        assert_eq!(latch.frames_captured(), 0);
    }

    #[test]
    fn detached_hook_looks_entry_point_up_again() {
        let hook = installed();
        let _ = resolve_name(&hook, WAIT_FRAME);
        hook.detach();
        assert!(!hook.is_intercepting());

        let latch = LatchedState::default();
        let runtime = FakeRuntime::new();
        runtime.set_next_display_time(2_000_000_000);
        let mut state = fake_runtime::frame_state();
        let wait = unsafe {
            hook.wait_frame(
                &latch,
                xr::Session::from_raw(7),
                &fake_runtime::frame_wait_info(),
                &raw mut state,
                marker_thunk,
            )
        };
        assert_eq!(wait.result, xr::Result::SUCCESS);
        assert_eq!(wait.refreshed, Some(EntryPointKind::Refreshed));
        assert_eq!(latch.frames_captured(), 1);
        assert!(hook.is_intercepting());
    }

    #[test]
    fn missing_entry_point_is_unsupported() {
        let hook = ProcAddrHook::new();
        let latch = LatchedState::default();
        let mut state = fake_runtime::frame_state();
        let wait = unsafe {
            hook.wait_frame(
                &latch,
                xr::Session::from_raw(7),
                &fake_runtime::frame_wait_info(),
                &raw mut state,
                marker_thunk,
            )
        };
        assert_eq!(wait.result, xr::Result::ERROR_FUNCTION_UNSUPPORTED);
        assert!(wait.capture.is_none());
        assert_eq!(latch.frames_captured(), 0);
    }

    #[test]
    fn hook_error_display() {
        assert_eq!(
            HookError::NullResolver.to_string(),
            "original xrGetInstanceProcAddr is null"
        );
        assert!(
            HookError::TargetUnresolved(xr::Result::ERROR_FUNCTION_UNSUPPORTED)
                .to_string()
                .starts_with("runtime did not resolve xrWaitFrame")
        );
    }
}
