//! Null core backend
//!
//! Headless stand-ins for the native emulation core, used by the demo
//! binary and the test suites. Every load succeeds, statistics read as
//! zero, and firmware installs are remembered in memory.

use crate::config::SessionConfig;
use crate::device::{
    BoxedStream, ContentManager, ContentType, CoreProvider, EmulationCore, InputManager,
    StorageId, SystemVersion,
};
use crate::error::LoadResult;
use crate::stats::PerfStats;
use parking_lot::Mutex;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Provider that always yields a [`NullCore`].
pub struct NullProvider;

impl CoreProvider for NullProvider {
    fn create_core(&self, config: &SessionConfig) -> Option<Arc<dyn EmulationCore>> {
        info!(
            "Creating null emulation core (language {:?}, region {:?}, docked {})",
            config.system_language, config.region, config.docked_mode
        );
        Some(Arc::new(NullCore::new()))
    }
}

/// Core handle that accepts every load and emulates nothing.
pub struct NullCore {
    content: Arc<NullContentManager>,
    input: Arc<NullInputManager>,
}

impl NullCore {
    pub fn new() -> Self {
        Self {
            content: Arc::new(NullContentManager::new()),
            input: Arc::new(NullInputManager::new()),
        }
    }
}

impl Default for NullCore {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulationCore for NullCore {
    fn load_cart(&self, path: &Path, storage_file: Option<&Path>) -> LoadResult {
        debug!(
            "Null core: cart load from {} (storage {:?})",
            path.display(),
            storage_file
        );
        Ok(())
    }

    fn load_disk_image(&self, path: &Path) -> LoadResult {
        debug!("Null core: disk image load from {}", path.display());
        Ok(())
    }

    fn load_disk_image_stream(
        &self,
        _image: BoxedStream,
        update: Option<BoxedStream>,
    ) -> LoadResult {
        debug!(
            "Null core: disk image load from stream (update: {})",
            update.is_some()
        );
        Ok(())
    }

    fn load_content_archive(&self, path: &Path) -> LoadResult {
        debug!("Null core: content archive load from {}", path.display());
        Ok(())
    }

    fn load_package_archive(&self, path: &Path) -> LoadResult {
        debug!("Null core: package archive load from {}", path.display());
        Ok(())
    }

    fn load_package_archive_stream(
        &self,
        _package: BoxedStream,
        update: Option<BoxedStream>,
    ) -> LoadResult {
        debug!(
            "Null core: package archive load from stream (update: {})",
            update.is_some()
        );
        Ok(())
    }

    fn load_program(&self, path: &Path, allow_code_execution: bool, args: &str) -> LoadResult {
        debug!(
            "Null core: program load from {} (exec {}, args {:?})",
            path.display(),
            allow_code_execution,
            args
        );
        Ok(())
    }

    fn load_program_stream(
        &self,
        _program: BoxedStream,
        allow_code_execution: bool,
        args: &str,
    ) -> LoadResult {
        debug!(
            "Null core: program load from stream (exec {}, args {:?})",
            allow_code_execution, args
        );
        Ok(())
    }

    fn reload_file_system(&self) {
        debug!("Null core: filesystem remount");
    }

    fn content_manager(&self) -> Option<Arc<dyn ContentManager>> {
        Some(self.content.clone())
    }

    fn input_manager(&self) -> Option<Arc<dyn InputManager>> {
        Some(self.input.clone())
    }

    fn perf_stats(&self) -> PerfStats {
        PerfStats::default()
    }
}

/// Content manager that keeps installed firmware in memory.
pub struct NullContentManager {
    installed: Mutex<Option<SystemVersion>>,
}

impl NullContentManager {
    pub fn new() -> Self {
        Self {
            installed: Mutex::new(None),
        }
    }
}

impl Default for NullContentManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentManager for NullContentManager {
    fn install_firmware(&self, _package: &mut dyn Read, is_package: bool) {
        let version = SystemVersion::new(1, 0, 0);
        info!(
            "Null content manager: installed firmware {} (package: {})",
            version, is_package
        );
        *self.installed.lock() = Some(version);
    }

    fn current_firmware_version(&self) -> Option<SystemVersion> {
        self.installed.lock().clone()
    }

    fn verify_firmware_package(
        &self,
        _package: &mut dyn Read,
        is_package: bool,
    ) -> Option<SystemVersion> {
        debug!(
            "Null content manager: verifying firmware package (package: {})",
            is_package
        );
        Some(SystemVersion::new(1, 0, 0))
    }

    fn installed_content_path(
        &self,
        _program_id: u64,
        _storage: StorageId,
        _content: ContentType,
    ) -> Option<PathBuf> {
        None
    }
}

/// Input manager that only remembers the reported client size.
pub struct NullInputManager {
    client_size: Mutex<(u32, u32)>,
}

impl NullInputManager {
    pub fn new() -> Self {
        Self {
            client_size: Mutex::new((0, 0)),
        }
    }

    pub fn client_size(&self) -> (u32, u32) {
        *self.client_size.lock()
    }
}

impl Default for NullInputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager for NullInputManager {
    fn initialize(&self, width: u32, height: u32) {
        info!("Null input manager initialized at {}x{}", width, height);
        *self.client_size.lock() = (width, height);
    }

    fn update(&self) {}

    fn set_client_size(&self, width: u32, height: u32) {
        *self.client_size.lock() = (width, height);
    }
}
