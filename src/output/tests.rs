use std::path::{Path, PathBuf};

use tempfile::tempdir;

use super::*;

#[test]
fn test_paths_default_to_run_directory() {
    let paths = OutputPaths::new(Path::new("/data/mpet/187070.mid"), &OutputDirs::default());
    assert_eq!(paths.stem(), "187070");
    assert_eq!(
        paths.path(ArtifactKind::Eva),
        Path::new("/data/mpet/187070_eva.dat")
    );
    assert_eq!(
        paths.path(ArtifactKind::Errors),
        Path::new("/data/mpet/187070_err.dat")
    );

    let bare = OutputPaths::new(Path::new("run.mid"), &OutputDirs::default());
    assert_eq!(bare.path(ArtifactKind::Dump), Path::new("./run_dump.dat"));
}

#[test]
fn test_per_artifact_directories() {
    let dirs = OutputDirs {
        directory: Some(PathBuf::from("/out")),
        eva_dir: Some(PathBuf::from("/eva")),
        ..Default::default()
    };
    let paths = OutputPaths::new(Path::new("/data/run.mid"), &dirs);
    assert_eq!(paths.path(ArtifactKind::Eva), Path::new("/eva/run_eva.dat"));
    assert_eq!(
        paths.path(ArtifactKind::Position),
        Path::new("/out/run_pos.dat")
    );
}

#[test]
fn test_publish_atomically() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run_dump.dat");

    std::fs::write(&path, "old").unwrap();
    let written = publish_atomically(&path, b"0x80010000\n").unwrap();

    assert_eq!(written, 11);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "0x80010000\n");
    // Only the published file remains
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_publish_into_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("run_eva.dat");

    let err = publish_atomically(&path, b"data").unwrap_err();
    assert_eq!(err.path, path);
    assert!(!path.exists());
}

#[test]
fn test_text_renderers() {
    assert_eq!(token_lines(&["0x1", "0x2"]), "0x1\n0x2\n");
    assert_eq!(token_lines::<&str>(&[]), "");

    let positions = position_lines(&["0x00001a2b", "0x000000ff"]).unwrap();
    assert_eq!(positions, "26 43\n0 255\n");

    assert!(position_lines(&["0x0000zz2b"]).is_err());
}
