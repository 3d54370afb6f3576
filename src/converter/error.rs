use crate::cycle::CycleError;
use crate::eva::EvaError;
use crate::event::DecodeError;
use crate::frequency::FrequencyListError;
use crate::mdump::BankError;
use crate::metadata::MetadataError;
use crate::output::OutputWriteError;

/// Errors that abort a conversion before any artifact is written
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Run file or ODB problem
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Capture or bank extraction problem
    #[error(transparent)]
    Bank(#[from] BankError),

    /// Malformed event word
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Cycle integrity violation
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// Frequency list rejected under the strict policy
    #[error(transparent)]
    FrequencyList(#[from] FrequencyListError),

    /// EVA serialization problem
    #[error(transparent)]
    Eva(#[from] EvaError),
}

/// Why a single artifact was not written
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// The destination could not be written
    #[error(transparent)]
    Write(#[from] OutputWriteError),

    /// The artifact's content could not be rendered
    #[error("Invalid artifact content: {0}")]
    Content(#[from] DecodeError),
}
