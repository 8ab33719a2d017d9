//! Render-session watcher
//!
//! Tracks which OS thread currently drives graphics submission and
//! keeps a profiling session open for it. Only spawned on platforms
//! whose performance monitor reports support.

use crate::renderer::{PerfMonitor, PlatformHost};
use oh_core::sync::CancelToken;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Interval between rendering-thread identity polls.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub(crate) fn run(
    cancel: CancelToken,
    platform: Arc<dyn PlatformHost>,
    perf: Arc<dyn PerfMonitor>,
) {
    watch(cancel, platform, perf, POLL_INTERVAL)
}

fn watch(
    cancel: CancelToken,
    platform: Arc<dyn PlatformHost>,
    perf: Arc<dyn PerfMonitor>,
    interval: Duration,
) {
    perf.enable();
    let mut thread_id = 0u64;

    loop {
        if cancel.wait_timeout(interval) {
            break;
        }

        let current = platform.rendering_thread_id();
        if current != thread_id {
            debug!(
                "Rendering thread changed ({} -> {}), closing profiling session",
                thread_id, current
            );
            perf.close_session();
        }
        thread_id = current;
        if thread_id != 0 {
            perf.open_session(thread_id);
        }
    }
}
