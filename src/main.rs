//! Oxidized-Horizon - emulation session host
//!
//! Headless entry point: brings a session up against the null core
//! backend, runs it briefly, and tears it down in order.

use anyhow::{Context, Result};
use oh_core::config::Config;
use oh_core::null::NullProvider;
use oh_host::{HostConfig, NullPerfMonitor, NullPlatform, NullRenderer, RenderHost, WindowHandle};
use oh_session::Session;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Oxidized-Horizon session host");

    let source = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: oxidized-horizon <content-path>")?;

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration ({}), using defaults", e);
        Config::default()
    });

    let session = Arc::new(RwLock::new(Session::new(Arc::new(NullProvider))));
    let host = RenderHost::new(
        Arc::new(NullRenderer),
        Arc::new(NullPlatform),
        Arc::new(NullPerfMonitor),
        HostConfig {
            session: config.session,
            graphics: config.graphics,
            driver: config.driver,
        },
    )
    .with_stats_callback(Arc::new(|stats| {
        tracing::info!(
            "fifo {:.2}, {:.1} fps, {:.2} ms frame time",
            stats.fifo_depth,
            stats.frame_rate,
            stats.frame_time
        );
    }));

    host.start(&session, &source, WindowHandle(1), 1280, 720)
        .context("failed to start the emulation session")?;

    std::thread::sleep(Duration::from_secs(2));

    host.signal_close();
    host.shutdown(&session);

    tracing::info!("Session finished in state '{}'", session.read().state());
    Ok(())
}
