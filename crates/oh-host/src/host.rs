//! Rendering host orchestrator
//!
//! Binds a platform surface to the emulation core's graphics backend
//! and runs the worker activities of a live session: the guest
//! execution loop, the input/statistics loop, and the render-session
//! watcher. Shutdown is ordered: the surface wake-up fires before the
//! GPU-done wait, and the native core is released only after the
//! renderer has confirmed a full stop.

use crate::driver;
use crate::renderer::{PerfMonitor, PlatformHost, Renderer};
use crate::surface::{DriverHandle, SurfaceBinding, WindowHandle};
use crate::watcher;
use oh_content::resolve;
use oh_core::config::{DriverConfig, GraphicsConfig, SessionConfig};
use oh_core::error::HostError;
use oh_core::state::SessionState;
use oh_core::stats::StatsCallback;
use oh_core::sync::{CancelToken, ResetEvent};
use oh_session::Session;
use parking_lot::{Mutex, RwLock};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, warn};

/// Interval between input polls.
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Input-loop iterations between statistics reports.
const STATS_REPORT_TICKS: u32 = 1000;

/// Orchestrator configuration.
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    pub session: SessionConfig,
    pub graphics: GraphicsConfig,
    pub driver: DriverConfig,
}

#[derive(Default)]
struct Workers {
    guest: Option<JoinHandle<()>>,
    input: Option<JoinHandle<()>>,
    watcher: Option<JoinHandle<()>>,
}

/// Rendering host for one emulation session.
pub struct RenderHost {
    renderer: Arc<dyn Renderer>,
    platform: Arc<dyn PlatformHost>,
    perf: Arc<dyn PerfMonitor>,
    config: HostConfig,
    stats_callback: Option<StatsCallback>,
    cancel: Mutex<CancelToken>,
    gpu_done: Arc<ResetEvent>,
    surface_event: Arc<ResetEvent>,
    binding: Mutex<Option<SurfaceBinding>>,
    started: AtomicBool,
    workers: Mutex<Workers>,
}

impl RenderHost {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        platform: Arc<dyn PlatformHost>,
        perf: Arc<dyn PerfMonitor>,
        config: HostConfig,
    ) -> Self {
        Self {
            renderer,
            platform,
            perf,
            config,
            stats_callback: None,
            cancel: Mutex::new(CancelToken::new()),
            gpu_done: Arc::new(ResetEvent::new(false)),
            surface_event: Arc::new(ResetEvent::new(false)),
            binding: Mutex::new(None),
            started: AtomicBool::new(false),
            workers: Mutex::new(Workers::default()),
        }
    }

    /// Attach the periodic statistics callback.
    pub fn with_stats_callback(mut self, callback: StatsCallback) -> Self {
        self.stats_callback = Some(callback);
        self
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Event fired whenever waiters on surface availability must wake,
    /// including at the start of shutdown.
    pub fn surface_event(&self) -> Arc<ResetEvent> {
        self.surface_event.clone()
    }

    /// Bring the session up on a platform surface and start the worker
    /// activities. Idempotent while already started.
    pub fn start(
        &self,
        session: &Arc<RwLock<Session>>,
        source: &Path,
        window: WindowHandle,
        width: u32,
        height: u32,
    ) -> Result<(), HostError> {
        if self.started.load(Ordering::Acquire) {
            return Ok(());
        }

        if !self.renderer.initialize(&self.config.graphics) {
            return Err(HostError::GraphicsInit);
        }

        let surface = self.platform.resolve_native_surface(window);
        let extensions = self.platform.required_backend_extensions();
        let driver_handle = self.stage_selected_driver()?;

        if !self.renderer.bind(&extensions, surface, driver_handle) {
            return Err(HostError::RendererBind);
        }

        {
            let mut session = session.write();
            if session.state() == SessionState::Uninitialized
                && !session.initialize(&self.config.session)
            {
                return Err(HostError::CoreUnavailable);
            }
            // a failing load has already rolled the session back
            if session.state() == SessionState::Initialized
                && !session.load_application(resolve(source))
            {
                return Err(HostError::LoadRejected);
            }
            if session.state() != SessionState::Loaded {
                return Err(HostError::CoreUnavailable);
            }
        }

        let (core, input) = {
            let session = session.read();
            (session.core(), session.input_manager())
        };
        let Some(core) = core else {
            return Err(HostError::CoreUnavailable);
        };

        if let Some(input) = &input {
            input.initialize(width, height);
        }

        self.renderer.set_size(width, height);

        let cancel = CancelToken::new();
        *self.cancel.lock() = cancel.clone();
        self.gpu_done.reset();
        self.surface_event.reset();
        *self.binding.lock() = Some(SurfaceBinding {
            window,
            surface,
            extensions,
            driver: driver_handle,
        });

        // input/statistics activity
        let input_handle = {
            let cancel = cancel.clone();
            let stats = self.stats_callback.clone();
            let input = input.clone();
            thread::Builder::new()
                .name("input-stats".to_string())
                .spawn(move || {
                    let mut ticks = 0u32;
                    while !cancel.is_cancelled() {
                        if let Some(input) = &input {
                            input.update();
                        }
                        thread::sleep(INPUT_POLL_INTERVAL);
                        ticks += 1;
                        if ticks >= STATS_REPORT_TICKS {
                            ticks = 0;
                            if let Some(report) = &stats {
                                report(core.perf_stats());
                            }
                        }
                    }
                })
                .map_err(HostError::WorkerSpawn)?
        };

        // render-session watcher, only where the platform has the API
        let watcher_handle = if self.perf.is_supported() {
            let cancel = cancel.clone();
            let platform = self.platform.clone();
            let perf = self.perf.clone();
            let spawned = thread::Builder::new()
                .name("render-watcher".to_string())
                .spawn(move || watcher::run(cancel, platform, perf));
            match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    self.abort_spawn(input_handle, None);
                    return Err(HostError::WorkerSpawn(e));
                }
            }
        } else {
            None
        };

        // guest execution activity
        let guest_handle = {
            let renderer = self.renderer.clone();
            let cancel = cancel.clone();
            let gpu_done = self.gpu_done.clone();
            let spawned = thread::Builder::new()
                .name("guest-exec".to_string())
                .spawn(move || {
                    renderer.run_loop(&cancel);
                    // no further GPU submissions once this fires
                    gpu_done.set();
                });
            match spawned {
                Ok(handle) => handle,
                Err(e) => {
                    self.abort_spawn(input_handle, watcher_handle);
                    return Err(HostError::WorkerSpawn(e));
                }
            }
        };

        {
            let mut workers = self.workers.lock();
            workers.guest = Some(guest_handle);
            workers.input = Some(input_handle);
            workers.watcher = watcher_handle;
        }

        session.write().mark_running();
        self.started.store(true, Ordering::Release);
        info!("Render host started at {}x{}", width, height);
        Ok(())
    }

    /// Stage and load the selected alternate driver, if any.
    fn stage_selected_driver(&self) -> Result<DriverHandle, HostError> {
        let DriverConfig {
            selected_driver,
            staging_dir,
            native_library_dir,
        } = &self.config.driver;

        let Some(selected) = selected_driver else {
            return Ok(DriverHandle::DEFAULT);
        };
        let Some(name) = driver::driver_file_name(selected) else {
            warn!(
                "Selected driver '{}' has no file name, using the system driver",
                selected.display()
            );
            return Ok(DriverHandle::DEFAULT);
        };

        let staged =
            driver::stage_driver(staging_dir, selected).map_err(HostError::DriverStaging)?;
        Ok(self
            .platform
            .load_driver(native_library_dir, &staged, &name))
    }

    /// Handle a surface geometry change while running.
    ///
    /// Rebinds the graphics surface in place when the underlying native
    /// window changed; the client size always reaches the input
    /// subsystem.
    pub fn surface_changed(
        &self,
        session: &Arc<RwLock<Session>>,
        window: WindowHandle,
        width: u32,
        height: u32,
    ) {
        if !self.started.load(Ordering::Acquire) {
            return;
        }

        let surface = self.platform.resolve_native_surface(window);
        {
            let mut binding = self.binding.lock();
            if let Some(binding) = binding.as_mut() {
                if binding.surface != surface {
                    info!("Native window changed, rebinding graphics surface in place");
                    self.renderer.set_surface(surface);
                    binding.window = window;
                    binding.surface = surface;
                }
            }
        }

        if let Some(input) = session.read().input_manager() {
            input.set_client_size(width, height);
        }
    }

    /// Request a cooperative stop of every worker activity.
    pub fn signal_close(&self) {
        self.cancel.lock().cancel();
    }

    /// Tear the session down in dependency order.
    ///
    /// Safe no-op beyond closing the session itself when rendering never
    /// started. Blocks until the renderer confirms a full stop; only then
    /// is the native core released.
    pub fn shutdown(&self, session: &Arc<RwLock<Session>>) {
        if !self.started.swap(false, Ordering::AcqRel) {
            session.write().close();
            return;
        }

        // input resources go away before the completion wait, so no new
        // input reaches a core that is being released
        session.write().begin_close();
        self.cancel.lock().cancel();

        // wake anything blocked on surface availability
        self.surface_event.set();

        self.gpu_done.wait();
        self.join_workers();
        self.gpu_done.reset();
        *self.binding.lock() = None;

        session.write().release_core();
        info!("Render host stopped");
    }

    fn abort_spawn(&self, input: JoinHandle<()>, watcher: Option<JoinHandle<()>>) {
        self.cancel.lock().cancel();
        if input.join().is_err() {
            warn!("Input activity panicked during aborted start");
        }
        if let Some(watcher) = watcher {
            if watcher.join().is_err() {
                warn!("Watcher activity panicked during aborted start");
            }
        }
    }

    fn join_workers(&self) {
        let handles = {
            let mut workers = self.workers.lock();
            [
                workers.guest.take(),
                workers.input.take(),
                workers.watcher.take(),
            ]
        };
        for handle in handles.into_iter().flatten() {
            if handle.join().is_err() {
                warn!("Worker activity panicked during shutdown");
            }
        }
    }
}
