//! Filesystem utilities

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

/// Ensure a directory exists, creating it if necessary
///
/// Returns true if the directory exists (either already existed or was created).
pub fn ensure_dir_exists(path: &Path) -> bool {
    if path.is_dir() {
        return true;
    }

    match fs::create_dir_all(path) {
        Ok(_) => {
            info!("Created directory: {}", path.display());
            true
        }
        Err(e) => {
            error!("Failed to create directory {}: {}", path.display(), e);
            false
        }
    }
}

/// List the regular files in `dir` whose name starts with `prefix` and ends with
/// `suffix`, sorted by name. A missing directory yields an empty list.
pub fn list_files_matching(
    dir: &Path,
    prefix: &str,
    suffix: &str,
) -> std::io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with(prefix) && name.ends_with(suffix) {
                files.push(entry.path());
            }
        }
    }
    files.sort();
    Ok(files)
}
