use std::io::Write;
use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;

use super::OutputWriteError;

/// Write `contents` to `path` so that readers only ever see a complete file.
///
/// The bytes are staged in a temporary file in the destination directory
/// and renamed over `path`. On any failure the temporary file is removed and
/// an existing file at `path` is left untouched.
pub fn publish_atomically(path: &Path, contents: &[u8]) -> Result<u64, OutputWriteError> {
    let wrap = |source: std::io::Error| OutputWriteError {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(wrap)?;
    staged.write_all(contents).map_err(wrap)?;
    staged.as_file().sync_all().map_err(wrap)?;
    debug!("Staged {} bytes at {}", contents.len(), staged.path().display());

    staged.persist(path).map_err(|e| wrap(e.error))?;
    Ok(contents.len() as u64)
}
