use std::path::PathBuf;

/// An artifact could not be written to its destination
#[derive(Debug, thiserror::Error)]
#[error("Could not write {}: {source}", path.display())]
pub struct OutputWriteError {
    /// Destination path
    pub path: PathBuf,
    /// Underlying I/O error
    #[source]
    pub source: std::io::Error,
}
