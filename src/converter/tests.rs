use std::path::PathBuf;

use tempfile::tempdir;

use super::*;
use crate::cycle::{BinningConfig, CycleError, GateFault};
use crate::eva::EvaFile;
use crate::event::DecodeError;
use crate::metadata::{MetadataError, RunFile};
use crate::output::ArtifactKind;

const ODB: &str = r#"<odb root="/">
  <dir name="Runinfo">
    <key name="Start time binary">1000</key>
    <key name="Stop time binary">1030</key>
  </dir>
  <dir name="Experiment">
    <dir name="Variables">
      <key name="Species">85Rb</key>
      <key name="Charge">1</key>
      <key name="MPETRFAmp">0.25</key>
      <key name="StartFreq (MHz)">1.0</key>
      <key name="EndFreq (MHz)">2.0</key>
    </dir>
  </dir>
  <dir name="Equipment">
    <dir name="TITAN_ACQ">
      <dir name="ppg cycle">
        <dir name="begin_ramp"><key name="loop count">3</key></dir>
        <dir name="begin_scan"><key name="loop count">3</key></dir>
        <dir name="pul_TDCGate"><key name="pulse width (ms)">0.1</key></dir>
        <dir name="transition_QUAD2"><key name="time offset (ms)">75</key></dir>
      </dir>
    </dir>
  </dir>
</odb>"#;

fn word(code: u8, counter: u16) -> String {
    format!("0x{:x}{:03x}0000", code, counter)
}

fn tof(ticks: u32) -> String {
    format!("0x{:08x}", ticks)
}

/// Gate open, one ion per TOF, gate close, for each counter
fn cycle_words(counters: &[u16], ion_ticks: &[u32]) -> Vec<String> {
    let mut words = Vec::new();
    for &counter in counters {
        words.extend([word(8, counter), tof(0)]);
        for &ticks in ion_ticks {
            words.extend([word(2, counter), tof(ticks)]);
        }
        words.extend([word(1, counter), tof(0)]);
    }
    words
}

fn capture(marker: &str, words: &[String]) -> String {
    format!(
        "Bank:{} Length: {}(I*1)/{}(I*4)\n   1-> {}\n",
        marker,
        words.len() * 4,
        words.len(),
        words.join(" ")
    )
}

fn run_file() -> RunFile {
    RunFile::from_bytes("run.mid", ODB.as_bytes()).unwrap()
}

fn write_run(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("187070.mid");
    std::fs::write(&path, ODB).unwrap();
    path
}

#[test]
fn test_prepare_builds_eva_in_memory() {
    let words = cycle_words(&[0, 1, 2], &[155, 255, 256]);
    let prepared = MidasConverter::new()
        .prepare(&run_file(), &capture("MPET", &words))
        .unwrap();

    assert_eq!(prepared.stats.cycles, 3);
    assert_eq!(prepared.stats.events, words.len() / 2);
    assert_eq!(prepared.stats.anomalies, 0);
    assert_eq!(prepared.stats.sparse_records, 3);
    assert!(prepared.positions.is_none());
    assert!(prepared.anomalies.is_none());

    let file = EvaFile::parse(&prepared.eva.bytes).unwrap();
    assert_eq!(file.records.len(), 3);
    // 1.55 us, then 2.55 and 2.56 us, with 0.1 us channels
    assert_eq!(file.records[0].bins, vec![(15, 1), (25, 2)]);
    assert_eq!(file.records[2].timestamp, 1020);
    assert_eq!(prepared.dump.lines().count(), words.len());
}

#[test]
fn test_prepared_conversion_can_be_cloned() {
    let words = cycle_words(&[0], &[42]);
    let text = format!(
        "{}{}",
        capture("MPET", &words),
        capture("MCPP", &["0x0000zz00".to_string()])
    );
    let prepared = MidasConverter::new().prepare(&run_file(), &text).unwrap();

    let copy = prepared.clone();
    assert_eq!(copy.eva.bytes, prepared.eva.bytes);
    assert_eq!(copy.stats, prepared.stats);
    assert!(matches!(
        copy.positions,
        Some(Err(DecodeError::MalformedPosition { .. }))
    ));
    assert_eq!(copy.positions, prepared.positions);
}

#[test]
fn test_integrity_error_aborts_without_artifacts() {
    let dir = tempdir().unwrap();
    let run_path = write_run(dir.path());

    let mut words = cycle_words(&[0], &[10]);
    words.extend([word(8, 5), tof(0), word(1, 7), tof(0)]);

    let err = MidasConverter::new()
        .convert(&run_path, &capture("MPET", &words))
        .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::Cycle(CycleError::GateMismatch {
            fault: GateFault::MissingGateOpen,
            cycle_index: 1,
        })
    ));

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "only the run file may exist");
}

#[test]
fn test_metadata_errors_come_before_decoding() {
    let run = RunFile::from_bytes("run.mid", b"<odb><dir name=\"Runinfo\"/></odb>").unwrap();
    let err = MidasConverter::new()
        .prepare(&run, "Bank:MPET Length: 8(I*1)\n 0xZZ 0xZZ")
        .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::Metadata(MetadataError::ConfigAccess { .. })
    ));
}

#[test]
fn test_convert_writes_all_artifacts() {
    let dir = tempdir().unwrap();
    let run_path = write_run(dir.path());

    let mut words = cycle_words(&[0, 1, 2], &[42]);
    // Aliased gate open for the second cycle
    let second_open = words.len() / 3;
    words[second_open] = format!("0xa{:03x}0000", 1);
    let text = format!(
        "{}{}",
        capture("MPET", &words),
        capture("MCPP", &["0x00001a2b".to_string()])
    );

    let outcome = MidasConverter::new().convert(&run_path, &text).unwrap();
    assert!(outcome.is_complete());
    assert_eq!(outcome.stats.cycles, 3);
    assert_eq!(outcome.stats.anomalies, 1);

    let eva = dir.path().join("187070_eva.dat");
    assert!(EvaFile::open(&eva).is_ok());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("187070_pos.dat")).unwrap(),
        "26 43\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("187070_err.dat")).unwrap(),
        "0xa0010000\n"
    );
    let dump = std::fs::read_to_string(dir.path().join("187070_dump.dat")).unwrap();
    assert_eq!(dump.lines().count(), words.len());
}

#[test]
fn test_optional_artifacts_are_skipped() {
    let dir = tempdir().unwrap();
    let run_path = write_run(dir.path());

    let outcome = MidasConverter::new()
        .convert(&run_path, &capture("MPET", &cycle_words(&[0], &[1])))
        .unwrap();

    assert!(matches!(
        outcome.artifact(ArtifactKind::Position).unwrap().status,
        ArtifactStatus::Skipped
    ));
    assert!(matches!(
        outcome.artifact(ArtifactKind::Errors).unwrap().status,
        ArtifactStatus::Skipped
    ));
    assert!(!dir.path().join("187070_pos.dat").exists());
}

#[test]
fn test_write_failures_are_isolated() {
    let dir = tempdir().unwrap();
    let run_path = write_run(dir.path());

    let mut config = ConversionConfig::default();
    config.output.eva_dir = Some(dir.path().join("does-not-exist"));
    let text = format!(
        "{}{}",
        capture("MPET", &cycle_words(&[0], &[1])),
        capture("MCPP", &["0x0000zz00".to_string()])
    );

    let outcome = MidasConverter::with_config(config)
        .convert(&run_path, &text)
        .unwrap();

    let failed: Vec<ArtifactKind> = outcome.failures().map(|a| a.kind).collect();
    assert_eq!(failed, vec![ArtifactKind::Eva, ArtifactKind::Position]);
    assert!(matches!(
        outcome.artifact(ArtifactKind::Dump).unwrap().status,
        ArtifactStatus::Written(_)
    ));
    assert!(dir.path().join("187070_dump.dat").exists());
}

#[test]
fn test_binning_and_zero_fill_flow_through() {
    let config = ConversionConfig {
        binning: BinningConfig::new(1.0, 4.0).unwrap(),
        eva: crate::eva::EvaConfig {
            dense_zero_fill: true,
        },
        ..Default::default()
    };
    // 0.5, 1.5 and 2.5 us fill 3 of 4 channels: dense
    let words = cycle_words(&[0], &[50, 150, 250, 900]);
    let prepared = MidasConverter::with_config(config)
        .prepare(&run_file(), &capture("MPET", &words))
        .unwrap();

    assert_eq!(prepared.stats.dense_records, 1);
    assert_eq!(prepared.stats.dropped_samples, 1);
    let file = EvaFile::parse(&prepared.eva.bytes).unwrap();
    assert_eq!(file.records[0].bins, vec![(0, 1), (1, 1), (2, 1), (3, 0)]);
}
