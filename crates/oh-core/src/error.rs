//! Error types for the oxidized-horizon session layer

use thiserror::Error;

/// Failure modes of a native load primitive.
///
/// Callers branch on the variant instead of catching faults: an
/// unsupported layout is a user-facing condition, an i/o failure is
/// environmental, and a core rejection carries the core's own reason.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("the specified file is not supported")]
    Unsupported,

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("core rejected the content: {0}")]
    Native(String),
}

/// Result type for native load primitives.
pub type LoadResult = std::result::Result<(), LoadError>;

/// Rendering host start-up errors.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("graphics backend initialization failed")]
    GraphicsInit,

    #[error("renderer initialization failed")]
    RendererBind,

    #[error("driver staging failed: {0}")]
    DriverStaging(#[source] std::io::Error),

    #[error("no emulation core is available")]
    CoreUnavailable,

    #[error("application load was rejected")]
    LoadRejected,

    #[error("failed to spawn worker activity: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
