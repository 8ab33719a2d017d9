//! Alternate graphics-driver staging
//!
//! A user-selected driver package is copied into a private staging
//! directory before it is loaded, so files from different driver
//! versions never collide. Any prior staged copy is replaced wholesale.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the staged copy under the staging root.
const STAGED_DIR_NAME: &str = "driver";

/// Stage a private copy of the driver package containing `driver`.
///
/// Deletes any previous staged copy, then flat-copies every file found
/// under the driver's parent directory into the staged tree. Returns
/// the staged directory.
pub fn stage_driver(staging_root: &Path, driver: &Path) -> io::Result<PathBuf> {
    let staged = staging_root.join(STAGED_DIR_NAME);

    if staged.exists() {
        fs::remove_dir_all(&staged)?;
    }
    fs::create_dir_all(&staged)?;

    let parent = driver.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("driver path '{}' has no parent directory", driver.display()),
        )
    })?;

    let copied = copy_tree_flat(parent, &staged)?;
    info!(
        "Staged driver package from '{}' ({} files)",
        parent.display(),
        copied
    );

    Ok(staged)
}

/// File name of the driver entry point inside the staged copy.
pub fn driver_file_name(driver: &Path) -> Option<String> {
    driver
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

/// Copy every file under `dir` (recursively) into `target`, flattened
/// to its file name.
fn copy_tree_flat(dir: &Path, target: &Path) -> io::Result<u32> {
    let mut copied = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            copied += copy_tree_flat(&path, target)?;
        } else if let Some(name) = path.file_name() {
            debug!("Staging driver file '{}'", path.display());
            fs::copy(&path, target.join(name))?;
            copied += 1;
        }
    }
    Ok(copied)
}
