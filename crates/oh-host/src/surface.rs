//! Platform surface and driver handle types

/// Opaque handle to a platform window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandle(pub u64);

/// Opaque handle to a native rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHandle(pub u64);

/// Handle to a loaded alternate graphics driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverHandle(pub u64);

impl DriverHandle {
    /// The platform's default driver.
    pub const DEFAULT: DriverHandle = DriverHandle(0);

    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }
}

/// Live binding between a platform surface and the graphics backend.
///
/// Owned by the rendering host for the lifetime of the running session;
/// the surface is swapped in place when the underlying native window
/// changes.
#[derive(Debug)]
pub struct SurfaceBinding {
    pub window: WindowHandle,
    pub surface: SurfaceHandle,
    pub extensions: Vec<String>,
    pub driver: DriverHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_driver_handle() {
        assert!(DriverHandle::DEFAULT.is_default());
        assert!(!DriverHandle(42).is_default());
    }
}
