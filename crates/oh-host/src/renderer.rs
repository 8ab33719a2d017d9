//! Graphics renderer and platform host seams
//!
//! The orchestrator drives the graphics backend through these traits.
//! The null implementations back headless runs and the test suite,
//! mirroring the null-backend approach of the graphics crates.

use crate::surface::{DriverHandle, SurfaceHandle, WindowHandle};
use oh_core::config::GraphicsConfig;
use oh_core::sync::CancelToken;
use std::path::Path;
use tracing::{debug, info};

/// Graphics renderer bound to the emulation core.
pub trait Renderer: Send + Sync {
    /// Initialize the graphics backend with user-selected options.
    fn initialize(&self, config: &GraphicsConfig) -> bool;

    /// Initialize the renderer against a resolved surface, the backend
    /// extensions the platform requires, and an optional alternate
    /// driver.
    fn bind(&self, extensions: &[String], surface: SurfaceHandle, driver: DriverHandle) -> bool;

    /// Rebind the presentation surface in place, without tearing the
    /// renderer down.
    fn set_surface(&self, surface: SurfaceHandle);

    /// Report the client viewport size.
    fn set_size(&self, width: u32, height: u32);

    /// Drive the guest execution loop until the token is cancelled.
    ///
    /// This is the only place the core's step function runs. Returning
    /// from this call means the backend has fully ceased submitting
    /// GPU work.
    fn run_loop(&self, cancel: &CancelToken);
}

/// Platform windowing and driver services.
pub trait PlatformHost: Send + Sync {
    fn resolve_native_surface(&self, window: WindowHandle) -> SurfaceHandle;

    /// Backend extensions the platform's surface type requires.
    fn required_backend_extensions(&self) -> Vec<String>;

    /// Load a staged alternate driver and return its handle.
    fn load_driver(
        &self,
        native_library_dir: &Path,
        staged_dir: &Path,
        driver_name: &str,
    ) -> DriverHandle;

    /// Identity of the OS thread currently submitting graphics work;
    /// zero when none is active.
    fn rendering_thread_id(&self) -> u64;
}

/// Fine-grained performance-session service, where the platform has one.
pub trait PerfMonitor: Send + Sync {
    /// Whether the platform supports render-session profiling at all.
    fn is_supported(&self) -> bool;

    fn enable(&self);

    fn open_session(&self, thread_id: u64);

    fn close_session(&self);
}

/// Renderer that draws nothing and parks the guest loop.
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn initialize(&self, config: &GraphicsConfig) -> bool {
        info!(
            "Null renderer initialized (shader cache {}, scale {})",
            config.shader_cache, config.resolution_scale
        );
        true
    }

    fn bind(&self, extensions: &[String], surface: SurfaceHandle, driver: DriverHandle) -> bool {
        info!(
            "Null renderer bound to surface {:?} ({} extensions, driver {:?})",
            surface,
            extensions.len(),
            driver
        );
        true
    }

    fn set_surface(&self, surface: SurfaceHandle) {
        debug!("Null renderer surface rebound to {:?}", surface);
    }

    fn set_size(&self, width: u32, height: u32) {
        debug!("Null renderer viewport {}x{}", width, height);
    }

    fn run_loop(&self, cancel: &CancelToken) {
        cancel.wait();
    }
}

/// Platform host with identity surface resolution and no driver loading.
pub struct NullPlatform;

impl PlatformHost for NullPlatform {
    fn resolve_native_surface(&self, window: WindowHandle) -> SurfaceHandle {
        SurfaceHandle(window.0)
    }

    fn required_backend_extensions(&self) -> Vec<String> {
        vec!["VK_KHR_surface".to_string()]
    }

    fn load_driver(
        &self,
        _native_library_dir: &Path,
        staged_dir: &Path,
        driver_name: &str,
    ) -> DriverHandle {
        debug!(
            "Null platform ignoring driver '{}' staged at '{}'",
            driver_name,
            staged_dir.display()
        );
        DriverHandle::DEFAULT
    }

    fn rendering_thread_id(&self) -> u64 {
        0
    }
}

/// Performance monitor for platforms without profiling sessions.
pub struct NullPerfMonitor;

impl PerfMonitor for NullPerfMonitor {
    fn is_supported(&self) -> bool {
        false
    }

    fn enable(&self) {}

    fn open_session(&self, _thread_id: u64) {}

    fn close_session(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_renderer_accepts_everything() {
        let renderer = NullRenderer;
        assert!(renderer.initialize(&GraphicsConfig::default()));
        assert!(renderer.bind(&[], SurfaceHandle(1), DriverHandle::DEFAULT));
    }

    #[test]
    fn test_null_renderer_run_loop_exits_on_cancel() {
        let renderer = NullRenderer;
        let cancel = CancelToken::new();
        cancel.cancel();
        renderer.run_loop(&cancel);
    }

    #[test]
    fn test_null_platform_surface_resolution_is_stable() {
        let platform = NullPlatform;
        assert_eq!(
            platform.resolve_native_surface(WindowHandle(7)),
            SurfaceHandle(7)
        );
        assert!(!platform.required_backend_extensions().is_empty());
    }
}
