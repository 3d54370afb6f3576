use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Files produced for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// Binary EVA file
    Eva,
    /// Echo of the raw event words
    Dump,
    /// Detector positions
    Position,
    /// Words with an anomalous type nibble
    Errors,
}

impl ArtifactKind {
    /// Suffix appended to the run file stem
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Eva => "_eva.dat",
            ArtifactKind::Dump => "_dump.dat",
            ArtifactKind::Position => "_pos.dat",
            ArtifactKind::Errors => "_err.dat",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Eva => "eva",
            ArtifactKind::Dump => "dump",
            ArtifactKind::Position => "position",
            ArtifactKind::Errors => "error",
        };
        f.write_str(name)
    }
}

/// Destination directories, as given in the `[output]` config section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputDirs {
    /// Directory for every artifact without its own entry
    pub directory: Option<PathBuf>,
    /// Directory for the EVA file
    pub eva_dir: Option<PathBuf>,
    /// Directory for the dump echo
    pub dump_dir: Option<PathBuf>,
    /// Directory for the position file
    pub pos_dir: Option<PathBuf>,
    /// Directory for the anomaly echo
    pub err_dir: Option<PathBuf>,
}

impl OutputDirs {
    /// Directory used for `kind`, falling back to `run_dir`
    pub fn dir_for(&self, kind: ArtifactKind, run_dir: &Path) -> PathBuf {
        let specific = match kind {
            ArtifactKind::Eva => &self.eva_dir,
            ArtifactKind::Dump => &self.dump_dir,
            ArtifactKind::Position => &self.pos_dir,
            ArtifactKind::Errors => &self.err_dir,
        };
        specific
            .as_ref()
            .or(self.directory.as_ref())
            .cloned()
            .unwrap_or_else(|| run_dir.to_path_buf())
    }
}

/// Resolved artifact paths for one run file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    stem: String,
    eva: PathBuf,
    dump: PathBuf,
    position: PathBuf,
    errors: PathBuf,
}

impl OutputPaths {
    /// Derive paths from the run file name, e.g. `run/187070.mid` gives
    /// `187070_eva.dat`
    pub fn new(run_path: &Path, dirs: &OutputDirs) -> Self {
        let stem = run_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let run_dir = match run_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let path = |kind: ArtifactKind| {
            dirs.dir_for(kind, run_dir)
                .join(format!("{}{}", stem, kind.suffix()))
        };

        Self {
            eva: path(ArtifactKind::Eva),
            dump: path(ArtifactKind::Dump),
            position: path(ArtifactKind::Position),
            errors: path(ArtifactKind::Errors),
            stem,
        }
    }

    /// Run file stem
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Path of an artifact
    pub fn path(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Eva => &self.eva,
            ArtifactKind::Dump => &self.dump,
            ArtifactKind::Position => &self.position,
            ArtifactKind::Errors => &self.errors,
        }
    }
}
