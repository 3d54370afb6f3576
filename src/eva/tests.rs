use byteorder::{ByteOrder, LittleEndian};

use super::*;
use crate::cycle::{BinningConfig, CycleHistogram};
use crate::metadata::ExperimentMetadata;

const EXPECTED_HEADER: &[u8] = b"\n\n[Mass]\n Mass=85Rb ,Charge= 1\n\n\
[Switch]\n NrCycles=-1\n\n\
[Excit]\n Mass=85Rb ,Charge= 1,Freq =500000.0, Amp= 0.25,Time=0.075\n\n\
[MCA]\n MCA=sim,TimePerChannel=0.1\xb5s,Channels= 1000,Pipse=   0\n\n\
[SCAN0]\n Dev=AFG, Fct=SetFrequency, Spec=,\n Start=1000000.0, Stop=2000000.0, Step=333333.333333, Unit=Hz\n\n\
[SCAN1]\n Dev=*, Fct=*, Spec=,\n Start=0.000000, Stop=0.000000,Step=1.000000, Unit=1\n\n\
*---------------here the binarypart begins---------------*\n";

fn metadata() -> ExperimentMetadata {
    ExperimentMetadata {
        mass: "85Rb".to_string(),
        charge: 1,
        amplitude_v: 0.25,
        start_freq_hz: 1_000_000.0,
        stop_freq_hz: 2_000_000.0,
        num_freq_steps: 3,
        num_cycles: 4,
        rf_time_s: 0.075,
        tdc_gate_width_us: 100.0,
        start_time: 100.0,
        end_time: 110.0,
        quad_freq_list: None,
    }
}

fn frequencies() -> Vec<f64> {
    vec![1_000_000.0, 1_500_000.0, 2_000_000.0]
}

fn histogram_with_occupancy(cycle_index: usize, occupancy: u16) -> CycleHistogram {
    CycleHistogram::from_hits(cycle_index, 0..occupancy)
}

fn encode(config: EvaConfig, histogram: &CycleHistogram) -> (RecordLayout, Vec<u8>) {
    let mut buf = Vec::new();
    let layout = EvaSerializer::new(config)
        .encode_record(&mut buf, histogram, 1000, 0.0)
        .unwrap();
    (layout, buf)
}

#[test]
fn test_layout_threshold() {
    assert_eq!(RecordLayout::choose(1000, 600), RecordLayout::Dense);
    assert_eq!(RecordLayout::choose(1000, 501), RecordLayout::Dense);
    assert_eq!(RecordLayout::choose(1000, 500), RecordLayout::Sparse);
    assert_eq!(RecordLayout::choose(1000, 10), RecordLayout::Sparse);
    assert_eq!(RecordLayout::choose(1000, 0), RecordLayout::Sparse);
    assert_eq!(RecordLayout::Dense.declared_length(1000, 600), 2004);
    assert_eq!(RecordLayout::Sparse.declared_length(1000, 10), 44);
}

#[test]
fn test_dense_record() {
    let histogram = histogram_with_occupancy(0, 600);

    let (layout, buf) = encode(EvaConfig::default(), &histogram);
    assert_eq!(layout, RecordLayout::Dense);
    assert_eq!(LittleEndian::read_i16(&buf[0..2]), 2004);
    // Counts for the occupied channels only
    assert_eq!(buf.len(), 2 + 4 + 600 * 2);
    assert_eq!(LittleEndian::read_i16(&buf[6..8]), 1);

    let (_, buf) = encode(EvaConfig { dense_zero_fill: true }, &histogram);
    assert_eq!(LittleEndian::read_i16(&buf[0..2]), 2004);
    assert_eq!(buf.len(), 2 + 2004);
    assert_eq!(LittleEndian::read_i16(&buf[buf.len() - 2..]), 0);
}

#[test]
fn test_sparse_record() {
    let histogram = CycleHistogram::from_hits(0, [900u16, 3, 3, 42, 7, 8, 9, 10, 11, 12, 13]);
    assert_eq!(histogram.occupancy(), 10);

    let (layout, buf) = encode(EvaConfig::default(), &histogram);
    assert_eq!(layout, RecordLayout::Sparse);
    assert_eq!(LittleEndian::read_i16(&buf[0..2]), 44);
    assert_eq!(buf.len(), 2 + 44);

    // Ascending channel order, (channel, count)
    assert_eq!(LittleEndian::read_i16(&buf[6..8]), 3);
    assert_eq!(LittleEndian::read_i16(&buf[8..10]), 2);
    assert_eq!(LittleEndian::read_i16(&buf[buf.len() - 4..buf.len() - 2]), 900);
}

#[test]
fn test_record_errors() {
    let serializer = EvaSerializer::default();
    let mut buf = Vec::new();

    let crowded = CycleHistogram::from_hits(2, std::iter::repeat(5u16).take(40_000));
    assert!(matches!(
        serializer.encode_record(&mut buf, &crowded, 1000, 0.0),
        Err(EvaError::CountOverflow { cycle_index: 2, channel: 5, count: 40_000 })
    ));

    let out_of_range = CycleHistogram::from_hits(1, [1000u16]);
    assert!(matches!(
        serializer.encode_record(&mut buf, &out_of_range, 1000, 0.0),
        Err(EvaError::ChannelOutOfRange { channel: 1000, .. })
    ));

    let histogram = CycleHistogram::from_hits(0, [1u16]);
    assert!(matches!(
        serializer.encode_record(&mut buf, &histogram, 1000, 3e9),
        Err(EvaError::TimestampOutOfRange { .. })
    ));
}

#[test]
fn test_header_text_is_exact() {
    let header = render_header(&metadata(), &BinningConfig::default());
    assert_eq!(header, EXPECTED_HEADER);
}

#[test]
fn test_header_is_latin1() {
    let metadata = ExperimentMetadata {
        mass: "\u{c5}Rb\u{2260}".to_string(),
        ..metadata()
    };
    let header = render_header(&metadata, &BinningConfig::default());

    let expected: &[u8] = b"Mass=\xc5Rb? ,Charge";
    assert!(header.windows(expected.len()).any(|w| w == expected));
    assert_eq!(header.iter().filter(|&&b| b == 0xb5).count(), 1);
    assert_eq!(EvaHeader::parse(&header).get("Mass", "Mass"), Some("\u{c5}Rb?"));
}

#[test]
fn test_offsets_are_back_patched() {
    let histograms = vec![histogram_with_occupancy(0, 3)];
    let artifact = EvaSerializer::default()
        .serialize(&metadata(), &BinningConfig::default(), &frequencies(), &histograms)
        .unwrap();
    let bytes = &artifact.bytes;

    let header_length = LittleEndian::read_i32(&bytes[0..4]) as usize;
    let data_start = LittleEndian::read_i32(&bytes[4..8]) as usize;

    assert_eq!(header_length, EXPECTED_HEADER.len());
    assert_eq!(&bytes[8..8 + header_length], EXPECTED_HEADER);

    let table = 8 + header_length;
    assert_eq!(LittleEndian::read_i32(&bytes[table..table + 4]), 3);
    assert_eq!(
        LittleEndian::read_f64(&bytes[table + 12..table + 20]),
        1_500_000.0
    );
    let sentinel = table + 4 + 3 * 8;
    assert_eq!(LittleEndian::read_i32(&bytes[sentinel..sentinel + 4]), 1);
    assert_eq!(LittleEndian::read_f64(&bytes[sentinel + 4..sentinel + 12]), 0.0);

    assert_eq!(data_start, sentinel + 12);
    assert_eq!(artifact.stats.data_start as usize, data_start);
    assert_eq!(artifact.stats.header_length as usize, header_length);
    assert_eq!(artifact.stats.bytes_written as usize, bytes.len());
    assert_eq!(bytes.len(), data_start + 2 + 3 * 4 + 4);
}

#[test]
fn test_cycle_timestamps_spread_over_run() {
    let histograms: Vec<_> = (0..4).map(|i| histogram_with_occupancy(i, 1)).collect();
    let artifact = EvaSerializer::default()
        .serialize(&metadata(), &BinningConfig::default(), &frequencies(), &histograms)
        .unwrap();

    let file = EvaFile::parse(&artifact.bytes).unwrap();
    let timestamps: Vec<i32> = file.records.iter().map(|r| r.timestamp).collect();
    // 100 + i * 10 / 4, truncated
    assert_eq!(timestamps, vec![100, 102, 105, 107]);
}

#[test]
fn test_no_histograms() {
    let artifact = EvaSerializer::default()
        .serialize(&metadata(), &BinningConfig::default(), &frequencies(), &[])
        .unwrap();
    assert_eq!(artifact.stats.records(), 0);
    assert_eq!(artifact.stats.data_start as usize, artifact.bytes.len());
}

#[test]
fn test_read_back_zero_filled_file() {
    let histograms = vec![
        histogram_with_occupancy(0, 800),
        CycleHistogram::from_hits(1, [5u16, 5, 17]),
    ];
    let artifact = EvaSerializer::new(EvaConfig { dense_zero_fill: true })
        .serialize(&metadata(), &BinningConfig::default(), &frequencies(), &histograms)
        .unwrap();
    assert_eq!(artifact.stats.dense_records, 1);
    assert_eq!(artifact.stats.sparse_records, 1);
    assert_eq!(artifact.stats.short_dense_records, 0);

    let file = EvaFile::parse(&artifact.bytes).unwrap();
    assert_eq!(file.header.channels(), Some(1000));
    assert_eq!(file.header.get("Mass", "Mass"), Some("85Rb"));
    assert_eq!(file.header.get("MCA", "TimePerChannel"), Some("0.1\u{b5}s"));
    assert_eq!(file.header.get("SCAN0", "Step"), Some("333333.333333"));
    assert_eq!(file.frequencies, frequencies());
    assert_eq!(file.sentinel_count, 1);
    assert_eq!(file.frequency_table_end, file.data_start as usize);

    assert_eq!(file.records.len(), 2);
    assert_eq!(file.records[0].layout, RecordLayout::Dense);
    assert_eq!(file.records[0].bins.len(), 1000);
    assert_eq!(file.records[0].total_hits(), 800);
    assert_eq!(file.records[1].layout, RecordLayout::Sparse);
    assert_eq!(file.records[1].bins, vec![(5, 2), (17, 1)]);
}

#[test]
fn test_sparse_record_with_dense_length_reads_as_sparse() {
    // With 4 channels, two occupied channels give a sparse record of
    // length 12, the same as the dense length.
    let binning = BinningConfig::new(1.0, 4.0).unwrap();
    let histograms = vec![CycleHistogram::from_hits(0, [1u16, 3])];
    let artifact = EvaSerializer::default()
        .serialize(&metadata(), &binning, &frequencies(), &histograms)
        .unwrap();

    let file = EvaFile::parse(&artifact.bytes).unwrap();
    assert_eq!(file.records[0].declared_length, 12);
    assert_eq!(file.records[0].layout, RecordLayout::Sparse);
    assert_eq!(file.records[0].bins, vec![(1, 1), (3, 1)]);
}

#[test]
fn test_reader_rejects_broken_files() {
    assert!(matches!(
        EvaFile::parse(&[1, 0, 0]),
        Err(EvaError::Truncated { offset: 0, .. })
    ));

    let mut bytes = vec![0u8; 8];
    LittleEndian::write_i32(&mut bytes[0..4], 1000);
    assert!(matches!(
        EvaFile::parse(&bytes),
        Err(EvaError::InvalidOffset { field: "header length", .. })
    ));

    let histograms = vec![histogram_with_occupancy(0, 3)];
    let artifact = EvaSerializer::default()
        .serialize(&metadata(), &BinningConfig::default(), &frequencies(), &histograms)
        .unwrap();
    let cut = &artifact.bytes[..artifact.bytes.len() - 2];
    assert!(matches!(
        EvaFile::parse(cut),
        Err(EvaError::InvalidRecord { index: 0, .. })
    ));
}

#[test]
fn test_header_parse() {
    let header = EvaHeader::parse(EXPECTED_HEADER);
    let names: Vec<&str> = header.sections().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, HEADER_SECTIONS);
    assert_eq!(header.get("Excit", "Freq"), Some("500000.0"));
    assert_eq!(header.get("SCAN0", "Dev"), Some("AFG"));
    assert_eq!(header.get("SCAN0", "Unit"), Some("Hz"));
    assert_eq!(header.get("Switch", "NrCycles"), Some("-1"));
}
