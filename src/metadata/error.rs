/// Errors that can occur while resolving run metadata
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// I/O error reading the run file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// XML error inside an ODB dump
    #[error("ODB XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// The input is not a usable MIDAS run file
    #[error("{0} is not a valid MIDAS file")]
    InvalidRunFile(String),

    /// The run file carries no ODB dump
    #[error("No ODB dump found in {0}")]
    MissingOdb(String),

    /// A three-level ODB address did not resolve
    #[error("Error accessing odb element: {path} {dir} {key}")]
    ConfigAccess {
        /// Directory depth path, e.g. `./dir/dir`
        path: String,
        /// Directory name
        dir: String,
        /// Key name
        key: String,
    },

    /// An ODB value could not be converted to the expected type
    #[error("Invalid value {value:?} for odb key {dir}/{key}: {reason}")]
    InvalidValue {
        /// Directory name
        dir: String,
        /// Key name
        key: String,
        /// Raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}
