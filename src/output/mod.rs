//! # Output Artifacts
//!
//! Each run produces up to four files next to each other, named after the
//! run file stem:
//!
//! | Artifact | Name | Written when |
//! |----------|------|--------------|
//! | EVA | `<stem>_eva.dat` | always |
//! | dump echo | `<stem>_dump.dat` | always |
//! | positions | `<stem>_pos.dat` | the capture has position words |
//! | anomalies | `<stem>_err.dat` | some words had an aliased type nibble |
//!
//! Every artifact is published atomically; a failure affects only that
//! artifact.

mod error;
mod paths;
mod publish;
mod text;

#[cfg(test)]
mod tests;

pub use error::OutputWriteError;
pub use paths::{ArtifactKind, OutputDirs, OutputPaths};
pub use publish::publish_atomically;
pub use text::{position_lines, token_lines};
