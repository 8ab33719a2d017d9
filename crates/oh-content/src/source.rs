//! Content source model
//!
//! A classified, single-use description of loadable content. Produced by
//! the resolver (or built from a caller-provided stream) and consumed
//! exactly once by the session manager's dispatch step.

use oh_core::device::BoxedStream;
use std::fmt;
use std::path::{Path, PathBuf};

/// Detected content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Extracted cart directory with an auxiliary storage file
    CartWithStorage,
    /// Extracted cart directory without auxiliary storage
    CartWithoutStorage,
    DiskImage,
    ContentArchive,
    PackageArchive,
    /// Optimistic classification; the core validates the structure
    HomebrewBinary,
    /// Terminal: the source is rejected without touching the core
    Unknown,
}

/// Declared format of a caller-provided stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFormat {
    DiskImage,
    PackageArchive,
    HomebrewBinary,
}

impl From<StreamFormat> for ContentKind {
    fn from(format: StreamFormat) -> Self {
        match format {
            StreamFormat::DiskImage => ContentKind::DiskImage,
            StreamFormat::PackageArchive => ContentKind::PackageArchive,
            StreamFormat::HomebrewBinary => ContentKind::HomebrewBinary,
        }
    }
}

/// Where the content bytes come from.
pub enum SourceOrigin {
    /// An extracted cart directory, optionally with an auxiliary storage file
    Directory {
        path: PathBuf,
        storage: Option<PathBuf>,
    },
    /// A filesystem path (a regular file, or a path that resolved to nothing)
    Path { path: PathBuf },
    /// A caller-provided stream with a declared format
    Stream {
        data: BoxedStream,
        update: Option<BoxedStream>,
        declared: StreamFormat,
    },
}

impl fmt::Debug for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory { path, storage } => f
                .debug_struct("Directory")
                .field("path", path)
                .field("storage", storage)
                .finish(),
            Self::Path { path } => f.debug_struct("Path").field("path", path).finish(),
            Self::Stream { update, declared, .. } => f
                .debug_struct("Stream")
                .field("update", &update.is_some())
                .field("declared", declared)
                .finish(),
        }
    }
}

/// A classified content source.
#[derive(Debug)]
pub struct ContentSource {
    pub origin: SourceOrigin,
    pub kind: ContentKind,
}

impl ContentSource {
    /// Terminal classification for a path that cannot be loaded.
    pub fn unknown(path: PathBuf) -> Self {
        Self {
            origin: SourceOrigin::Path { path },
            kind: ContentKind::Unknown,
        }
    }

    /// Build a source from a caller-provided stream of a declared format.
    pub fn from_stream(
        data: BoxedStream,
        declared: StreamFormat,
        update: Option<BoxedStream>,
    ) -> Self {
        Self {
            origin: SourceOrigin::Stream {
                data,
                update,
                declared,
            },
            kind: declared.into(),
        }
    }

    /// Filesystem path of the source, when it has one.
    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            SourceOrigin::Directory { path, .. } | SourceOrigin::Path { path } => Some(path),
            SourceOrigin::Stream { .. } => None,
        }
    }
}
