// Copyright 2026 the Frame Stats Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logger setup for the loaded plugin.

use std::sync::Once;

use env_logger::{Builder, Env};

/// Environment variable holding an `env_logger` filter for this plugin.
pub const LOG_ENV: &str = "OPENXR_FRAME_STATS_LOG";

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger, once per process.
///
/// Reads [`LOG_ENV`] and falls back to `info`. If the host process already
/// installed a logger, that one is kept.
pub(crate) fn init() {
    INIT.call_once(|| {
        let installed = Builder::from_env(Env::new().filter_or(LOG_ENV, "info"))
            .format_target(false)
            .try_init()
            .is_ok();
        if installed {
            log::debug!("logging initialized");
        }
    });
}
