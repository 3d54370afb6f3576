use std::fmt::Write as _;

use super::header_float;
use crate::cycle::BinningConfig;
use crate::metadata::ExperimentMetadata;

/// Line closing the text header
pub const HEADER_TERMINATOR: &str =
    "*---------------here the binarypart begins---------------*\n";

/// Section names, in file order
pub const HEADER_SECTIONS: [&str; 6] = ["Mass", "Switch", "Excit", "MCA", "SCAN0", "SCAN1"];

/// Micro sign as written in `TimePerChannel` (ISO-8859-1 `0xB5`)
const MICRO_SIGN: char = '\u{b5}';

/// Render the text header for a run.
///
/// The result is ISO-8859-1: every byte is ASCII except the micro sign
/// after the channel width, and whatever the species label contains.
/// Characters outside ISO-8859-1 are written as `?`.
pub fn render_header(metadata: &ExperimentMetadata, binning: &BinningConfig) -> Vec<u8> {
    let mass = &metadata.mass;
    let charge = metadata.charge;

    let mut text = String::new();
    // Writing to a String cannot fail.
    let _ = write!(
        text,
        "\n\n[Mass]\n Mass={mass} ,Charge= {charge}\n\n\
         [Switch]\n NrCycles=-1\n\n\
         [Excit]\n Mass={mass} ,Charge= {charge},Freq ={freq}, Amp= {amp},Time={time}\n\n\
         [MCA]\n MCA=sim,TimePerChannel={width}{MICRO_SIGN}s,Channels= {channels},Pipse=   0\n\n\
         [SCAN0]\n Dev=AFG, Fct=SetFrequency, Spec=,\n \
         Start={start}, Stop={stop}, Step={step}, Unit=Hz\n\n\
         [SCAN1]\n Dev=*, Fct=*, Spec=,\n \
         Start=0.000000, Stop=0.000000,Step=1.000000, Unit=1\n\n\
         {HEADER_TERMINATOR}",
        freq = header_float(metadata.excitation_freq_hz()),
        amp = header_float(metadata.amplitude_v),
        time = header_float(metadata.rf_time_s),
        width = header_float(binning.bin_width_us()),
        channels = binning.num_channels(),
        start = header_float(metadata.start_freq_hz),
        stop = header_float(metadata.stop_freq_hz),
        step = header_float(metadata.scan_step_hz()),
    );

    encode_latin1(&text)
}

fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// One `[Section]` of a parsed header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSection {
    /// Name between the brackets
    pub name: String,
    /// `key=value` pairs in file order, both trimmed
    pub fields: Vec<(String, String)>,
}

impl HeaderSection {
    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parsed EVA text header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaHeader {
    sections: Vec<HeaderSection>,
}

impl EvaHeader {
    /// Parse header bytes (ISO-8859-1)
    pub fn parse(bytes: &[u8]) -> Self {
        let text: String = bytes.iter().map(|&b| char::from(b)).collect();
        let mut sections: Vec<HeaderSection> = Vec::new();

        for line in text.lines().map(str::trim) {
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                sections.push(HeaderSection {
                    name: name.to_string(),
                    fields: Vec::new(),
                });
                continue;
            }
            let Some(section) = sections.last_mut() else {
                continue;
            };
            for field in line.split(',') {
                if let Some((key, value)) = field.split_once('=') {
                    section
                        .fields
                        .push((key.trim().to_string(), value.trim().to_string()));
                }
            }
        }

        Self { sections }
    }

    /// All sections in file order
    pub fn sections(&self) -> &[HeaderSection] {
        &self.sections
    }

    /// Section by name
    pub fn section(&self, name: &str) -> Option<&HeaderSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Value of `key` in `section`
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Channel count from `[MCA]`
    pub fn channels(&self) -> Option<usize> {
        self.get("MCA", "Channels")?.parse().ok()
    }
}
