//! Reading schema sources and writing generated modules.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{config::SOURCE_EXTENSIONS, error::CompileError};

/// Reads the schema at `path` after checking that it is a file with a schema extension.
pub fn load_source(path: &Path) -> Result<String, CompileError> {
    if !path.exists() {
        return Err(CompileError::PathDoesntExist(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(CompileError::PathIsADirectoryNotAFile(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if !SOURCE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(CompileError::InvalidExtension {
            path: path.to_path_buf(),
            expected: SOURCE_EXTENSIONS.map(|e| format!(".{e}")).join(", "),
        });
    }

    info!("reading '{}'", path.display());
    Ok(fs::read_to_string(path)?)
}

/// Writes `content` to `dir/name`, replacing any existing file, and returns the path
/// written.
pub fn write_output(dir: &Path, name: &Path, content: &str) -> Result<PathBuf, CompileError> {
    if !dir.is_dir() {
        return Err(CompileError::DestinationDirectoryIsntValid(dir.to_path_buf()));
    }

    let path = dir.join(name);
    if path.exists() {
        warn!("'{}' already exists and will be overwritten", path.display());
    }
    fs::write(&path, content)?;
    Ok(path)
}
