//! Core session types for the oxidized-horizon emulator
//!
//! This crate provides the foundational types, error handling,
//! configuration, and synchronization infrastructure for the
//! session lifecycle layer.

pub mod config;
pub mod device;
pub mod error;
pub mod null;
pub mod state;
pub mod stats;
pub mod sync;

pub use config::{Config, DriverConfig, GraphicsConfig, RegionCode, SessionConfig, SystemLanguage};
pub use device::{
    BoxedStream, ContentManager, ContentStream, ContentType, CoreProvider, EmulationCore,
    InputManager, StorageId, SystemVersion,
};
pub use error::{HostError, LoadError, LoadResult};
pub use state::SessionState;
pub use stats::{PerfStats, StatsCallback};
pub use sync::{CancelToken, ResetEvent};
