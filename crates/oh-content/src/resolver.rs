//! Filesystem content classification
//!
//! Maps a path to a [`ContentSource`] using the loading policy: cart
//! directories are probed for auxiliary storage, regular files are
//! classified by extension, and anything else is `Unknown`.

use crate::source::{ContentKind, ContentSource, SourceOrigin};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions recognized as auxiliary storage inside a cart directory,
/// in preference order.
const AUX_STORAGE_EXTENSIONS: [&str; 2] = ["istorage", "romfs"];

/// Classify a filesystem path into a content source.
///
/// Pure classification: no native core call, no file is opened. A path
/// that is neither a directory nor a regular file yields `Unknown`.
pub fn resolve(path: &Path) -> ContentSource {
    if path.is_dir() {
        resolve_directory(path)
    } else if path.is_file() {
        resolve_file(path)
    } else {
        warn!("Cannot resolve '{}': no such file or directory", path.display());
        ContentSource::unknown(path.to_path_buf())
    }
}

fn resolve_directory(path: &Path) -> ContentSource {
    let entries = match list_files(path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list cart directory '{}': {}", path.display(), e);
            return ContentSource::unknown(path.to_path_buf());
        }
    };

    for ext in AUX_STORAGE_EXTENSIONS {
        // entries are sorted, so the first match is deterministic
        if let Some(storage) = entries.iter().find(|p| has_extension(p, ext)) {
            debug!(
                "Cart directory '{}' has auxiliary storage '{}'",
                path.display(),
                storage.display()
            );
            return ContentSource {
                origin: SourceOrigin::Directory {
                    path: path.to_path_buf(),
                    storage: Some(storage.clone()),
                },
                kind: ContentKind::CartWithStorage,
            };
        }
    }

    ContentSource {
        origin: SourceOrigin::Directory {
            path: path.to_path_buf(),
            storage: None,
        },
        kind: ContentKind::CartWithoutStorage,
    }
}

fn resolve_file(path: &Path) -> ContentSource {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let kind = match extension.as_str() {
        "xci" => ContentKind::DiskImage,
        "nca" => ContentKind::ContentArchive,
        "nsp" | "pfs0" => ContentKind::PackageArchive,
        // unrecognized extensions are probed as homebrew by the core
        _ => ContentKind::HomebrewBinary,
    };

    ContentSource {
        origin: SourceOrigin::Path {
            path: path.to_path_buf(),
        },
        kind,
    }
}

/// Regular files of a directory, sorted by path.
fn list_files(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}
