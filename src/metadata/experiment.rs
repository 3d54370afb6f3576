use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{MetadataError, OdbAddress, OdbTree, RunFile};

const SPECIES: OdbAddress<'static> = OdbAddress::new(2, "Variables", "Species");
const CHARGE: OdbAddress<'static> = OdbAddress::new(2, "Variables", "Charge");
const RF_AMPLITUDE: OdbAddress<'static> = OdbAddress::new(2, "Variables", "MPETRFAmp");
const START_FREQ_MHZ: OdbAddress<'static> = OdbAddress::new(2, "Variables", "StartFreq (MHz)");
const STOP_FREQ_MHZ: OdbAddress<'static> = OdbAddress::new(2, "Variables", "EndFreq (MHz)");
const QUAD_FREQ_LIST: OdbAddress<'static> = OdbAddress::new(2, "Variables", "Quad FreqList");
const FREQ_STEPS: OdbAddress<'static> = OdbAddress::new(4, "begin_ramp", "loop count");
const CYCLES: OdbAddress<'static> = OdbAddress::new(4, "begin_scan", "loop count");
const START_TIME: OdbAddress<'static> = OdbAddress::new(1, "Runinfo", "Start time binary");
const STOP_TIME: OdbAddress<'static> = OdbAddress::new(1, "Runinfo", "Stop time binary");
const TDC_GATE_MS: OdbAddress<'static> = OdbAddress::new(4, "pul_TDCGate", "pulse width (ms)");

/// RF transitions are `transition_QUAD2`, `transition_QUAD4`, ...
const RF_TRANSITION_PREFIX: &str = "transition_QUAD";
const RF_TRANSITION_KEY: &str = "time offset (ms)";

/// Scalar run parameters written to the EVA header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    /// Species label, e.g. `"85Rb"`
    pub mass: String,

    /// Charge state
    pub charge: i32,

    /// RF excitation amplitude (V)
    pub amplitude_v: f64,

    /// First frequency of the scan (Hz)
    pub start_freq_hz: f64,

    /// Last frequency of the scan (Hz)
    pub stop_freq_hz: f64,

    /// Number of excitation frequencies
    pub num_freq_steps: u32,

    /// Number of scan cycles the sequencer was programmed for
    pub num_cycles: u32,

    /// Total RF excitation time (s)
    pub rf_time_s: f64,

    /// TDC gate width (us)
    pub tdc_gate_width_us: f64,

    /// Run start (epoch seconds)
    pub start_time: f64,

    /// Run stop (epoch seconds)
    pub end_time: f64,

    /// Raw `Quad FreqList` value, when the run used one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quad_freq_list: Option<String>,
}

/// Caller-supplied values that replace the ODB lookups
///
/// A field that is set bypasses the corresponding ODB address entirely, so
/// runs with an incomplete ODB can still be converted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataOverrides {
    /// Species label
    pub mass: Option<String>,
    /// Charge state
    pub charge: Option<i32>,
    /// RF amplitude (V)
    pub amplitude_v: Option<f64>,
    /// Start frequency (Hz)
    pub start_freq_hz: Option<f64>,
    /// Stop frequency (Hz)
    pub stop_freq_hz: Option<f64>,
    /// Number of frequency steps
    pub num_freq_steps: Option<u32>,
    /// Number of scan cycles
    pub num_cycles: Option<u32>,
    /// RF excitation time (s)
    pub rf_time_s: Option<f64>,
    /// TDC gate width (us)
    pub tdc_gate_width_us: Option<f64>,
    /// Run start (epoch seconds)
    pub start_time: Option<f64>,
    /// Run stop (epoch seconds)
    pub end_time: Option<f64>,
}

impl MetadataOverrides {
    /// Fill unset fields from `other`, keeping values already set here
    pub fn or(self, other: MetadataOverrides) -> Self {
        Self {
            mass: self.mass.or(other.mass),
            charge: self.charge.or(other.charge),
            amplitude_v: self.amplitude_v.or(other.amplitude_v),
            start_freq_hz: self.start_freq_hz.or(other.start_freq_hz),
            stop_freq_hz: self.stop_freq_hz.or(other.stop_freq_hz),
            num_freq_steps: self.num_freq_steps.or(other.num_freq_steps),
            num_cycles: self.num_cycles.or(other.num_cycles),
            rf_time_s: self.rf_time_s.or(other.rf_time_s),
            tdc_gate_width_us: self.tdc_gate_width_us.or(other.tdc_gate_width_us),
            start_time: self.start_time.or(other.start_time),
            end_time: self.end_time.or(other.end_time),
        }
    }
}

impl ExperimentMetadata {
    /// Resolve every field from the run's ODB dumps, unless overridden.
    ///
    /// The first unresolvable address aborts with
    /// [`MetadataError::ConfigAccess`].
    pub fn resolve(run: &RunFile, overrides: &MetadataOverrides) -> Result<Self, MetadataError> {
        let begin = run.begin_odb();
        let end = run.end_odb();

        let mass = match &overrides.mass {
            Some(mass) => mass.clone(),
            None => begin.get(&SPECIES)?.trim().to_string(),
        };
        info!("Element = {}", mass);

        let charge = match overrides.charge {
            Some(charge) => charge,
            None => parse_charge(&CHARGE, begin.get(&CHARGE)?)?,
        };
        info!("Charge = {}", charge);

        let amplitude_v = resolve_float(begin, &RF_AMPLITUDE, overrides.amplitude_v, 1.0)?;
        info!("RF amplitude = {} Volts", amplitude_v);

        let start_freq_hz = resolve_float(end, &START_FREQ_MHZ, overrides.start_freq_hz, 1e6)?;
        info!("Start frequency = {} Hertz", start_freq_hz);

        let stop_freq_hz = resolve_float(end, &STOP_FREQ_MHZ, overrides.stop_freq_hz, 1e6)?;
        info!("Stop frequency = {} Hertz", stop_freq_hz);

        let num_freq_steps = resolve_count(end, &FREQ_STEPS, overrides.num_freq_steps)?;
        info!("Number of frequency steps = {}", num_freq_steps);

        let num_cycles = resolve_count(end, &CYCLES, overrides.num_cycles)?;
        debug!("Number of cycles = {}", num_cycles);

        let start_time = resolve_float(begin, &START_TIME, overrides.start_time, 1.0)?;
        info!("Start time = {}", start_time);

        let end_time = resolve_float(end, &STOP_TIME, overrides.end_time, 1.0)?;
        info!("End time = {}", end_time);

        let tdc_gate_width_us =
            resolve_float(begin, &TDC_GATE_MS, overrides.tdc_gate_width_us, 1000.0)?;
        info!("TDC Gate Width = {} us", tdc_gate_width_us);

        let rf_time_s = match overrides.rf_time_s {
            Some(seconds) => seconds,
            None => rf_time_from_transitions(begin)?,
        };
        info!("RF Time = {} s", rf_time_s);

        let quad_freq_list = end.lookup(&QUAD_FREQ_LIST).map(str::to_string);
        if let Some(list) = &quad_freq_list {
            debug!("Quad FreqList = {}", list);
        }

        Ok(Self {
            mass,
            charge,
            amplitude_v,
            start_freq_hz,
            stop_freq_hz,
            num_freq_steps,
            num_cycles,
            rf_time_s,
            tdc_gate_width_us,
            start_time,
            end_time,
            quad_freq_list,
        })
    }

    /// Excitation frequency written to `[Excit]`: half the scan range
    pub fn excitation_freq_hz(&self) -> f64 {
        (self.stop_freq_hz - self.start_freq_hz) / 2.0
    }

    /// Step written to `[SCAN0]`: scan range over the step count
    pub fn scan_step_hz(&self) -> f64 {
        (self.stop_freq_hz - self.start_freq_hz) / f64::from(self.num_freq_steps)
    }

    /// Run length in seconds
    pub fn duration_s(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Run start as a UTC timestamp
    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        epoch_to_datetime(self.start_time)
    }

    /// Run stop as a UTC timestamp
    pub fn end_datetime(&self) -> Option<DateTime<Utc>> {
        epoch_to_datetime(self.end_time)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, MetadataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn epoch_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

fn invalid(address: &OdbAddress<'_>, value: &str, reason: &str) -> MetadataError {
    MetadataError::InvalidValue {
        dir: address.dir.to_string(),
        key: address.key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_float(address: &OdbAddress<'_>, raw: &str) -> Result<f64, MetadataError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| invalid(address, raw, &e.to_string()))
}

/// Look up a float and apply the unit scale, unless an override is given
fn resolve_float(
    odb: &OdbTree,
    address: &OdbAddress<'_>,
    value: Option<f64>,
    scale: f64,
) -> Result<f64, MetadataError> {
    match value {
        Some(value) => Ok(value),
        None => Ok(parse_float(address, odb.get(address)?)? * scale),
    }
}

/// Loop counts are stored as integers but sometimes written as `21.0`
fn resolve_count(
    odb: &OdbTree,
    address: &OdbAddress<'_>,
    value: Option<u32>,
) -> Result<u32, MetadataError> {
    if let Some(value) = value {
        return Ok(value);
    }
    let raw = odb.get(address)?;
    let count = parse_float(address, raw)?;
    if count.fract() != 0.0 || count < 0.0 || count > f64::from(u32::MAX) {
        return Err(invalid(address, raw, "not a non-negative integer"));
    }
    Ok(count as u32)
}

/// Charge is a `;`-separated list; the first entry is used
fn parse_charge(address: &OdbAddress<'_>, raw: &str) -> Result<i32, MetadataError> {
    let first = raw.split(';').next().unwrap_or_default().trim();
    first
        .parse::<i32>()
        .map_err(|e| invalid(address, raw, &e.to_string()))
}

/// Sum the time offsets of `transition_QUAD2`, `transition_QUAD4`, ... until
/// one is missing, in seconds
fn rf_time_from_transitions(odb: &OdbTree) -> Result<f64, MetadataError> {
    let mut total_ms = 0.0;
    let mut transitions = 0;

    for number in (2..).step_by(2) {
        let dir = format!("{}{}", RF_TRANSITION_PREFIX, number);
        let address = OdbAddress::new(4, &dir, RF_TRANSITION_KEY);
        let Some(raw) = odb.lookup(&address) else {
            break;
        };
        total_ms += parse_float(&address, raw)?;
        transitions += 1;
    }

    debug!("Summed {} RF transitions", transitions);
    Ok(total_ms / 1000.0)
}
