//! Boundary traits for the native emulation core and its subsystems
//!
//! The session layer consumes the emulation core as an opaque capability
//! set: a provider creates core handles, and the handle exposes the load
//! primitives plus its content and input managers. Concrete backends
//! implement these traits; the null backend in [`crate::null`] backs
//! headless runs and the test suites.

use crate::config::SessionConfig;
use crate::error::LoadResult;
use crate::stats::PerfStats;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Byte stream holding loadable content.
pub trait ContentStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> ContentStream for T {}

/// Owned content stream, consumed by a single load call.
pub type BoxedStream = Box<dyn ContentStream>;

/// Storage location of installed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageId {
    BuiltInSystem,
    BuiltInUser,
    SdCard,
}

/// Content entry type inside an installed title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Program,
    Data,
    Control,
}

/// Parsed system firmware version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub version_string: String,
}

impl SystemVersion {
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
            version_string: format!("{}.{}.{}", major, minor, micro),
        }
    }
}

impl std::fmt::Display for SystemVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.version_string)
    }
}

/// Creates native core handles.
///
/// Returns `None` when no device can be brought up; the session manager
/// surfaces that as a precondition failure, never a fault.
pub trait CoreProvider: Send + Sync {
    fn create_core(&self, config: &SessionConfig) -> Option<Arc<dyn EmulationCore>>;
}

/// Handle to a live native emulation core.
///
/// Exclusively owned by the session manager; worker activities hold
/// clones only while the session is alive. Dropping the last handle
/// tears the core down.
pub trait EmulationCore: Send + Sync {
    /// Load an extracted cart directory, optionally with an auxiliary
    /// storage file.
    fn load_cart(&self, path: &Path, storage_file: Option<&Path>) -> LoadResult;

    fn load_disk_image(&self, path: &Path) -> LoadResult;

    fn load_disk_image_stream(&self, image: BoxedStream, update: Option<BoxedStream>)
        -> LoadResult;

    fn load_content_archive(&self, path: &Path) -> LoadResult;

    fn load_package_archive(&self, path: &Path) -> LoadResult;

    fn load_package_archive_stream(
        &self,
        package: BoxedStream,
        update: Option<BoxedStream>,
    ) -> LoadResult;

    /// Load a homebrew program binary. The core validates the structure
    /// itself and reports [`crate::error::LoadError::Unsupported`] for a
    /// malformed binary.
    fn load_program(&self, path: &Path, allow_code_execution: bool, args: &str) -> LoadResult;

    fn load_program_stream(
        &self,
        program: BoxedStream,
        allow_code_execution: bool,
        args: &str,
    ) -> LoadResult;

    /// Remount the emulated filesystem.
    fn reload_file_system(&self);

    fn content_manager(&self) -> Option<Arc<dyn ContentManager>>;

    fn input_manager(&self) -> Option<Arc<dyn InputManager>>;

    /// Current throughput figures for the statistics report.
    fn perf_stats(&self) -> PerfStats;
}

/// Firmware and installed-content operations.
pub trait ContentManager: Send + Sync {
    /// Install a firmware package. No session state-machine effect.
    fn install_firmware(&self, package: &mut dyn Read, is_package: bool);

    /// Version of the currently installed firmware, if any.
    fn current_firmware_version(&self) -> Option<SystemVersion>;

    /// Verify a firmware package without installing it.
    fn verify_firmware_package(
        &self,
        package: &mut dyn Read,
        is_package: bool,
    ) -> Option<SystemVersion>;

    /// Path of an installed content entry, if present.
    fn installed_content_path(
        &self,
        program_id: u64,
        storage: StorageId,
        content: ContentType,
    ) -> Option<PathBuf>;
}

/// Input subsystem of a live core.
pub trait InputManager: Send + Sync {
    fn initialize(&self, width: u32, height: u32);

    /// Poll input state once.
    fn update(&self);

    fn set_client_size(&self, width: u32, height: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_version_display() {
        let version = SystemVersion::new(17, 0, 1);
        assert_eq!(format!("{}", version), "17.0.1");
        assert_eq!(version.version_string, "17.0.1");
    }
}
