use std::ops::Range;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::{MetadataError, OdbTree};

const ODB_OPEN: &[u8] = b"<odb";
const ODB_CLOSE: &[u8] = b"</odb>";

/// A MIDAS run file with its begin-of-run and end-of-run ODB dumps
#[derive(Debug, Clone)]
pub struct RunFile {
    path: PathBuf,
    begin: OdbTree,
    end: OdbTree,
}

impl RunFile {
    /// Open a `.mid` run file and parse its ODB dumps
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let is_mid = path.extension().is_some_and(|ext| ext == "mid");
        if !path.is_file() || !is_mid {
            return Err(MetadataError::InvalidRunFile(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        info!("Read run file {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(path, &bytes)
    }

    /// Parse the ODB dumps out of raw run file bytes
    pub fn from_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<Self, MetadataError> {
        let path = path.as_ref().to_path_buf();
        let missing = || MetadataError::MissingOdb(path.display().to_string());

        let first = first_odb_span(bytes).ok_or_else(missing)?;
        let last = last_odb_span(bytes).ok_or_else(missing)?;
        debug!("Begin-of-run ODB at {:?}, end-of-run ODB at {:?}", first, last);

        let begin = OdbTree::parse(&bytes[first.clone()])?;
        let end = if last == first {
            begin.clone()
        } else {
            OdbTree::parse(&bytes[last])?
        };

        Ok(Self { path, begin, end })
    }

    /// Path the run was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ODB dump written at begin of run
    pub fn begin_odb(&self) -> &OdbTree {
        &self.begin
    }

    /// ODB dump written at end of run
    pub fn end_odb(&self) -> &OdbTree {
        &self.end
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// A dump without its closing tag runs to the end of the file.
fn first_odb_span(bytes: &[u8]) -> Option<Range<usize>> {
    let start = find(bytes, ODB_OPEN)?;
    let end = find(&bytes[start..], ODB_CLOSE)
        .map(|offset| start + offset + ODB_CLOSE.len())
        .unwrap_or(bytes.len());
    Some(start..end)
}

fn last_odb_span(bytes: &[u8]) -> Option<Range<usize>> {
    let start = rfind(bytes, ODB_OPEN)?;
    let end = rfind(&bytes[start..], ODB_CLOSE)
        .map(|offset| start + offset + ODB_CLOSE.len())
        .unwrap_or(bytes.len());
    Some(start..end)
}
