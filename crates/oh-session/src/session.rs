//! Session manager owning the native core handle
//!
//! Brings the native core up, dispatches classified content to the
//! matching load primitive, and tears the session down. Every failing
//! load branch disposes the whole session before returning: no branch
//! leaves a half-loaded core alive.

use oh_content::{resolve, ContentKind, ContentSource, SourceOrigin, StreamFormat};
use oh_core::config::SessionConfig;
use oh_core::device::{
    BoxedStream, ContentManager, ContentType, CoreProvider, EmulationCore, InputManager,
    StorageId, SystemVersion,
};
use oh_core::error::{LoadError, LoadResult};
use oh_core::state::SessionState;
use oh_core::sync::ResetEvent;
use std::io::Read;
use std::sync::Arc;
use tracing::{error, info, warn};

/// An emulation session.
///
/// Owned by the embedding application and passed explicitly to every
/// operation; there is no process-wide current session.
pub struct Session {
    provider: Arc<dyn CoreProvider>,
    core: Option<Arc<dyn EmulationCore>>,
    input: Option<Arc<dyn InputManager>>,
    state: SessionState,
    translation_gate: Arc<ResetEvent>,
}

impl Session {
    pub fn new(provider: Arc<dyn CoreProvider>) -> Self {
        Self {
            provider,
            core: None,
            input: None,
            state: SessionState::Uninitialized,
            translation_gate: Arc::new(ResetEvent::new(false)),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Borrowed handle to the live core, while the session is alive.
    pub fn core(&self) -> Option<Arc<dyn EmulationCore>> {
        self.core.clone()
    }

    pub fn input_manager(&self) -> Option<Arc<dyn InputManager>> {
        self.input.clone()
    }

    /// Gate cleared on every successful load so that translation caches
    /// revalidate for the new program.
    pub fn translation_gate(&self) -> Arc<ResetEvent> {
        self.translation_gate.clone()
    }

    /// Bring up the native core with the given configuration.
    ///
    /// Returns `false` when no device can be created or the session has
    /// already left `Uninitialized`. Never panics: callers may probe.
    pub fn initialize(&mut self, config: &SessionConfig) -> bool {
        if self.state != SessionState::Uninitialized {
            warn!("Ignoring initialize request in state '{}'", self.state);
            return false;
        }

        match self.provider.create_core(config) {
            Some(core) => {
                self.input = core.input_manager();
                self.core = Some(core);
                self.state = SessionState::Initialized;
                info!("Emulation core initialized");
                true
            }
            None => {
                info!("No emulation core available");
                false
            }
        }
    }

    /// Remount the emulated filesystem. No-op without a core.
    pub fn reload_file_system(&self) {
        if let Some(core) = &self.core {
            core.reload_file_system();
        }
    }

    /// Load an application, consuming the classified source.
    ///
    /// Any failure (including an `Unknown` classification) disposes the
    /// whole session and returns `false`; a fresh initialize is required
    /// before the next attempt.
    pub fn load_application(&mut self, source: ContentSource) -> bool {
        if !self.state.can_load() {
            warn!("Cannot load in state '{}'", self.state);
            return false;
        }
        let Some(core) = self.core.clone() else {
            warn!("Cannot load: no native core");
            return false;
        };

        if source.kind == ContentKind::Unknown {
            warn!(
                "Couldn't load '{}'. Please specify a valid cart directory or XCI/NCA/NSP/PFS0/NRO file.",
                source.path().map(|p| p.display().to_string()).unwrap_or_default()
            );
            self.dispose();
            return false;
        }

        let result = Self::dispatch(&*core, source);

        match result {
            Ok(()) => {
                // translation caches revalidate for the new program
                self.translation_gate.reset();
                self.state = SessionState::Loaded;
                info!("Application loaded");
                true
            }
            Err(LoadError::Unsupported) => {
                error!("The specified file is not supported");
                self.dispose();
                false
            }
            Err(e) => {
                warn!("Load failed: {}", e);
                self.dispose();
                false
            }
        }
    }

    /// Load an application from a caller-provided stream of a declared
    /// format.
    pub fn load_application_stream(
        &mut self,
        stream: BoxedStream,
        format: StreamFormat,
        update: Option<BoxedStream>,
    ) -> bool {
        self.load_application(ContentSource::from_stream(stream, format, update))
    }

    /// Launch an installed system applet by program id.
    ///
    /// Resolves the applet's program content in built-in system storage
    /// and loads it like any other source.
    pub fn launch_system_applet(&mut self, program_id: u64) -> bool {
        let Some(manager) = self.content_manager() else {
            return false;
        };
        let Some(path) = manager.installed_content_path(
            program_id,
            StorageId::BuiltInSystem,
            ContentType::Program,
        ) else {
            warn!("System applet {:#018x} is not installed", program_id);
            return false;
        };

        self.load_application(resolve(&path))
    }

    /// Route one classified source to the matching core primitive.
    fn dispatch(core: &dyn EmulationCore, source: ContentSource) -> LoadResult {
        match source.origin {
            SourceOrigin::Directory { path, storage } => {
                if let Some(storage) = storage {
                    info!("Loading as cart with auxiliary storage.");
                    core.load_cart(&path, Some(&storage))
                } else {
                    info!("Loading as cart WITHOUT auxiliary storage.");
                    core.load_cart(&path, None)
                }
            }
            SourceOrigin::Path { path } => match source.kind {
                ContentKind::DiskImage => {
                    info!("Loading as disk image.");
                    core.load_disk_image(&path)
                }
                ContentKind::ContentArchive => {
                    info!("Loading as content archive.");
                    core.load_content_archive(&path)
                }
                ContentKind::PackageArchive => {
                    info!("Loading as package archive.");
                    core.load_package_archive(&path)
                }
                ContentKind::HomebrewBinary => {
                    info!("Loading as homebrew.");
                    core.load_program(&path, true, "")
                }
                // kinds that never carry a bare path
                ContentKind::CartWithStorage
                | ContentKind::CartWithoutStorage
                | ContentKind::Unknown => {
                    warn!("Mismatched classification for '{}'", path.display());
                    Err(LoadError::Unsupported)
                }
            },
            SourceOrigin::Stream {
                data,
                update,
                declared,
            } => match declared {
                StreamFormat::DiskImage => {
                    info!("Loading as disk image from stream.");
                    core.load_disk_image_stream(data, update)
                }
                StreamFormat::PackageArchive => {
                    info!("Loading as package archive from stream.");
                    core.load_package_archive_stream(data, update)
                }
                StreamFormat::HomebrewBinary => {
                    info!("Loading as homebrew from stream.");
                    core.load_program_stream(data, true, "")
                }
            },
        }
    }

    /// Install a firmware package. No state-machine effect; no-op
    /// without a content manager.
    pub fn install_firmware(&self, package: &mut dyn Read, is_package: bool) {
        if let Some(manager) = self.content_manager() {
            manager.install_firmware(package, is_package);
        }
    }

    /// Version string of the installed firmware; empty when no device or
    /// no firmware exists. Never fails.
    pub fn installed_firmware_version(&self) -> String {
        self.content_manager()
            .and_then(|manager| manager.current_firmware_version())
            .map(|version| version.version_string)
            .unwrap_or_default()
    }

    /// Verify a firmware package. Absence of a content manager is not an
    /// error.
    pub fn verify_firmware(
        &self,
        package: &mut dyn Read,
        is_package: bool,
    ) -> Option<SystemVersion> {
        self.content_manager()?
            .verify_firmware_package(package, is_package)
    }

    fn content_manager(&self) -> Option<Arc<dyn ContentManager>> {
        self.core.as_ref()?.content_manager()
    }

    /// First half of the close protocol: enter `Stopping` and release
    /// input-management resources. The rendering host calls this before
    /// waiting on the GPU-done signal.
    pub fn begin_close(&mut self) {
        if !self.state.is_active() {
            return;
        }
        self.state = SessionState::Stopping;
        self.input = None;
        info!("Session stopping");
    }

    /// Second half of the close protocol: drop the native core handle
    /// and enter `Closed`. Safe no-op on closed or never-initialized
    /// sessions.
    pub fn release_core(&mut self) {
        if !self.state.is_active() {
            return;
        }
        self.dispose();
    }

    /// Close a session that never started rendering.
    pub fn close(&mut self) {
        if !self.state.is_active() {
            return;
        }
        self.begin_close();
        self.release_core();
    }

    /// Transition `Loaded` → `Running` once worker activities are up.
    pub fn mark_running(&mut self) {
        if self.state == SessionState::Loaded {
            self.state = SessionState::Running;
        }
    }

    /// Full rollback: drop every native resource and enter `Closed`.
    fn dispose(&mut self) {
        self.input = None;
        if self.core.take().is_some() {
            info!("Native core released");
        }
        self.state = SessionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oh_core::error::LoadError;
    use oh_core::stats::PerfStats;
    use parking_lot::Mutex;
    use std::fs::File;
    use std::path::{Path, PathBuf};
    use std::sync::Weak;
    use tempfile::tempdir;

    /// What the scripted core should do on the next load call.
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum LoadBehavior {
        Succeed,
        FailNative,
        FailUnsupported,
    }

    /// Core that records which primitives were invoked.
    struct ScriptedCore {
        behavior: LoadBehavior,
        calls: Mutex<Vec<&'static str>>,
        content: Option<Arc<ScriptedContentManager>>,
    }

    impl ScriptedCore {
        fn new(behavior: LoadBehavior) -> Self {
            Self {
                behavior,
                calls: Mutex::new(Vec::new()),
                content: Some(Arc::new(ScriptedContentManager::default())),
            }
        }

        fn record(&self, name: &'static str) -> LoadResult {
            self.calls.lock().push(name);
            match self.behavior {
                LoadBehavior::Succeed => Ok(()),
                LoadBehavior::FailNative => Err(LoadError::Native("load rejected".to_string())),
                LoadBehavior::FailUnsupported => Err(LoadError::Unsupported),
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }
    }

    impl EmulationCore for ScriptedCore {
        fn load_cart(&self, _path: &Path, storage_file: Option<&Path>) -> LoadResult {
            self.record(if storage_file.is_some() {
                "cart_with_storage"
            } else {
                "cart_without_storage"
            })
        }

        fn load_disk_image(&self, _path: &Path) -> LoadResult {
            self.record("disk_image")
        }

        fn load_disk_image_stream(
            &self,
            _image: BoxedStream,
            _update: Option<BoxedStream>,
        ) -> LoadResult {
            self.record("disk_image_stream")
        }

        fn load_content_archive(&self, _path: &Path) -> LoadResult {
            self.record("content_archive")
        }

        fn load_package_archive(&self, _path: &Path) -> LoadResult {
            self.record("package_archive")
        }

        fn load_package_archive_stream(
            &self,
            _package: BoxedStream,
            _update: Option<BoxedStream>,
        ) -> LoadResult {
            self.record("package_archive_stream")
        }

        fn load_program(
            &self,
            _path: &Path,
            _allow_code_execution: bool,
            _args: &str,
        ) -> LoadResult {
            self.record("program")
        }

        fn load_program_stream(
            &self,
            _program: BoxedStream,
            _allow_code_execution: bool,
            _args: &str,
        ) -> LoadResult {
            self.record("program_stream")
        }

        fn reload_file_system(&self) {
            self.calls.lock().push("reload_file_system");
        }

        fn content_manager(&self) -> Option<Arc<dyn ContentManager>> {
            self.content
                .clone()
                .map(|manager| manager as Arc<dyn ContentManager>)
        }

        fn input_manager(&self) -> Option<Arc<dyn InputManager>> {
            None
        }

        fn perf_stats(&self) -> PerfStats {
            PerfStats::default()
        }
    }

    #[derive(Default)]
    struct ScriptedContentManager {
        installed: Mutex<Option<SystemVersion>>,
        applet_path: Mutex<Option<PathBuf>>,
    }

    impl ContentManager for ScriptedContentManager {
        fn install_firmware(&self, _package: &mut dyn Read, _is_package: bool) {
            *self.installed.lock() = Some(SystemVersion::new(16, 1, 0));
        }

        fn current_firmware_version(&self) -> Option<SystemVersion> {
            self.installed.lock().clone()
        }

        fn verify_firmware_package(
            &self,
            _package: &mut dyn Read,
            _is_package: bool,
        ) -> Option<SystemVersion> {
            Some(SystemVersion::new(16, 1, 0))
        }

        fn installed_content_path(
            &self,
            _program_id: u64,
            _storage: StorageId,
            _content: ContentType,
        ) -> Option<PathBuf> {
            self.applet_path.lock().clone()
        }
    }

    struct ScriptedProvider {
        behavior: LoadBehavior,
        last_core: Mutex<Weak<ScriptedCore>>,
        available: bool,
    }

    impl ScriptedProvider {
        fn new(behavior: LoadBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                last_core: Mutex::new(Weak::new()),
                available: true,
            })
        }

        fn unavailable() -> Arc<Self> {
            Arc::new(Self {
                behavior: LoadBehavior::Succeed,
                last_core: Mutex::new(Weak::new()),
                available: false,
            })
        }

        fn last_core(&self) -> Option<Arc<ScriptedCore>> {
            self.last_core.lock().upgrade()
        }
    }

    impl CoreProvider for ScriptedProvider {
        fn create_core(&self, _config: &SessionConfig) -> Option<Arc<dyn EmulationCore>> {
            if !self.available {
                return None;
            }
            let core = Arc::new(ScriptedCore::new(self.behavior));
            *self.last_core.lock() = Arc::downgrade(&core);
            Some(core)
        }
    }

    fn initialized_session(provider: &Arc<ScriptedProvider>) -> Session {
        let mut session = Session::new(provider.clone());
        assert!(session.initialize(&SessionConfig::default()));
        session
    }

    #[test]
    fn test_initialize_without_device_returns_false() {
        let mut session = Session::new(ScriptedProvider::unavailable());
        assert!(!session.initialize(&SessionConfig::default()));
        assert_eq!(session.state(), SessionState::Uninitialized);
        // probing again is safe
        assert!(!session.initialize(&SessionConfig::default()));
    }

    #[test]
    fn test_initialize_success() {
        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let session = initialized_session(&provider);
        assert_eq!(session.state(), SessionState::Initialized);
        assert!(session.core().is_some());
    }

    #[test]
    fn test_load_package_archive_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.nsp");
        File::create(&path).unwrap();

        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let mut session = initialized_session(&provider);
        session.translation_gate().set();

        assert!(session.load_application(resolve(&path)));
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(
            provider.last_core().unwrap().calls(),
            vec!["package_archive"]
        );
        // gate cleared so translation caches revalidate
        assert!(!session.translation_gate().is_set());
    }

    #[test]
    fn test_load_routes_every_kind() {
        let dir = tempdir().unwrap();
        let cases = [
            ("game.xci", "disk_image"),
            ("title.nca", "content_archive"),
            ("title.pfs0", "package_archive"),
            ("demo.nro", "program"),
        ];

        for (name, expected) in cases {
            let path = dir.path().join(name);
            File::create(&path).unwrap();

            let provider = ScriptedProvider::new(LoadBehavior::Succeed);
            let mut session = initialized_session(&provider);
            assert!(session.load_application(resolve(&path)));
            assert_eq!(
                provider.last_core().unwrap().calls(),
                vec![expected],
                "routing {}",
                name
            );
        }
    }

    #[test]
    fn test_load_cart_directory_with_storage() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("data.istorage")).unwrap();

        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let mut session = initialized_session(&provider);
        assert!(session.load_application(resolve(dir.path())));
        assert_eq!(
            provider.last_core().unwrap().calls(),
            vec!["cart_with_storage"]
        );
    }

    #[test]
    fn test_unknown_source_never_reaches_the_core() {
        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let mut session = initialized_session(&provider);
        let core = provider.last_core().unwrap();

        assert!(!session.load_application(resolve(Path::new("/missing.file"))));
        assert_eq!(session.state(), SessionState::Closed);
        assert!(core.calls().is_empty());
    }

    #[test]
    fn test_native_failure_releases_the_core() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.nsp");
        File::create(&path).unwrap();

        let provider = ScriptedProvider::new(LoadBehavior::FailNative);
        let mut session = initialized_session(&provider);

        assert!(!session.load_application(resolve(&path)));
        assert_eq!(session.state(), SessionState::Closed);
        // the session held the only strong reference
        assert!(provider.last_core().is_none());

        // closing again afterwards is a no-op, not an error
        session.close();
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn test_unsupported_homebrew_is_reported_not_propagated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("random.bin");
        File::create(&path).unwrap();

        let provider = ScriptedProvider::new(LoadBehavior::FailUnsupported);
        let mut session = initialized_session(&provider);

        assert!(!session.load_application(resolve(&path)));
        assert_eq!(session.state(), SessionState::Closed);
        assert!(provider.last_core().is_none());
    }

    #[test]
    fn test_load_requires_active_state() {
        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let mut session = Session::new(provider.clone());

        let dir = tempdir().unwrap();
        let path = dir.path().join("game.nsp");
        File::create(&path).unwrap();

        // never initialized: precondition failure, no state change
        assert!(!session.load_application(resolve(&path)));
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_stream_load_routes_by_declared_format() {
        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let mut session = initialized_session(&provider);

        let stream: BoxedStream = Box::new(std::io::Cursor::new(vec![0u8; 8]));
        assert!(session.load_application_stream(stream, StreamFormat::PackageArchive, None));
        assert_eq!(
            provider.last_core().unwrap().calls(),
            vec!["package_archive_stream"]
        );
    }

    #[test]
    fn test_firmware_version_is_empty_without_device() {
        let session = Session::new(ScriptedProvider::unavailable());
        assert_eq!(session.installed_firmware_version(), "");
    }

    #[test]
    fn test_firmware_install_and_version() {
        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let session = initialized_session(&provider);
        assert_eq!(session.installed_firmware_version(), "");

        let mut package = std::io::Cursor::new(vec![0u8; 4]);
        session.install_firmware(&mut package, true);
        assert_eq!(session.installed_firmware_version(), "16.1.0");

        let mut package = std::io::Cursor::new(vec![0u8; 4]);
        let verified = session.verify_firmware(&mut package, false).unwrap();
        assert_eq!(verified.version_string, "16.1.0");
    }

    #[test]
    fn test_launch_system_applet_missing_content() {
        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let mut session = initialized_session(&provider);
        assert!(!session.launch_system_applet(0x0100_0000_0000_1009));
        // absence is a precondition failure, not a rollback
        assert_eq!(session.state(), SessionState::Initialized);
    }

    #[test]
    fn test_launch_system_applet_loads_installed_path() {
        let dir = tempdir().unwrap();
        let applet = dir.path().join("applet.nca");
        File::create(&applet).unwrap();

        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let mut session = initialized_session(&provider);
        let core = provider.last_core().unwrap();
        *core.content.as_ref().unwrap().applet_path.lock() = Some(applet);

        assert!(session.launch_system_applet(0x0100_0000_0000_1009));
        assert_eq!(core.calls(), vec!["content_archive"]);
    }

    #[test]
    fn test_reload_file_system_delegates() {
        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let session = initialized_session(&provider);
        session.reload_file_system();
        assert_eq!(
            provider.last_core().unwrap().calls(),
            vec!["reload_file_system"]
        );

        // no core: safe no-op
        let empty = Session::new(ScriptedProvider::unavailable());
        empty.reload_file_system();
    }

    #[test]
    fn test_close_protocol_ordering() {
        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let mut session = initialized_session(&provider);

        session.begin_close();
        assert_eq!(session.state(), SessionState::Stopping);
        // core still alive until the renderer confirms its stop
        assert!(session.core().is_some());

        session.release_core();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.core().is_none());
        assert!(provider.last_core().is_none());
    }

    #[test]
    fn test_close_is_a_safe_noop_when_never_initialized() {
        let mut session = Session::new(ScriptedProvider::unavailable());
        session.close();
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_closed_is_terminal() {
        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let mut session = initialized_session(&provider);
        session.close();
        assert_eq!(session.state(), SessionState::Closed);

        assert!(!session.initialize(&SessionConfig::default()));
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn test_mark_running() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.nsp");
        File::create(&path).unwrap();

        let provider = ScriptedProvider::new(LoadBehavior::Succeed);
        let mut session = initialized_session(&provider);
        assert!(session.load_application(resolve(&path)));

        session.mark_running();
        assert_eq!(session.state(), SessionState::Running);
    }
}
