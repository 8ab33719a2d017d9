//! Rendering host orchestration for the oxidized-horizon emulator
//!
//! Binds a platform surface to the emulation core's graphics backend,
//! stages alternate graphics drivers, and coordinates the worker
//! activities that drive a running session.

pub mod driver;
pub mod host;
pub mod renderer;
pub mod surface;
mod watcher;

pub use host::{HostConfig, RenderHost};
pub use renderer::{
    NullPerfMonitor, NullPlatform, NullRenderer, PerfMonitor, PlatformHost, Renderer,
};
pub use surface::{DriverHandle, SurfaceBinding, SurfaceHandle, WindowHandle};
