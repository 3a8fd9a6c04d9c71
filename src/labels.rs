// Label tables for the coded WAVEDESC fields

use crate::error::{FormatError, Result};

const WAVE_SOURCES: [&str; 5] = ["Channel 1", "Channel 2", "Channel 3", "Channel 4", "Unknown"];

const VERTICAL_COUPLINGS: [&str; 5] = ["DC50", "GND", "DC1M", "GND", "AC1M"];

const BANDWIDTH_LIMITS: [&str; 2] = ["off", "on"];

const RECORD_TYPES: [&str; 10] = [
    "single_sweep",
    "interleaved",
    "histogram",
    "graph",
    "filter_coefficient",
    "complex",
    "extrema",
    "sequence_obsolete",
    "centered_RIS",
    "peak_detect",
];

const PROCESSING: [&str; 8] = [
    "No Processing",
    "FIR Filter",
    "interpolated",
    "sparsed",
    "autoscaled",
    "no_resulst",
    "rolling",
    "cumulative",
];

const TIME_BASE_UNITS: [&str; 6] = ["p", "n", "u", "m", "", "k"];
const TIME_BASE_MAGNITUDES: [u32; 9] = [1, 2, 5, 10, 20, 50, 100, 200, 500];
const TIME_BASE_TABLE_LEN: u16 = 48;
const TIME_BASE_EXTERNAL: u16 = 100;

fn lookup(table: &[&'static str], field: &'static str, code: u16) -> Result<&'static str> {
    table
        .get(code as usize)
        .copied()
        .ok_or(FormatError::UnknownEnumCode { field, code })
}

pub fn wave_source(code: u16) -> Result<&'static str> {
    lookup(&WAVE_SOURCES, "wave_source", code)
}

pub fn vertical_coupling(code: u16) -> Result<&'static str> {
    lookup(&VERTICAL_COUPLINGS, "vertical_coupling", code)
}

pub fn bandwidth_limit(code: u16) -> Result<&'static str> {
    lookup(&BANDWIDTH_LIMITS, "bandwidth_limit", code)
}

pub fn record_type(code: u16) -> Result<&'static str> {
    lookup(&RECORD_TYPES, "record_type", code)
}

pub fn processing(code: u16) -> Result<&'static str> {
    lookup(&PROCESSING, "processing", code)
}

/// Render a time-base code as a per-division string.
///
/// Codes 0..48 step through 1-2-5 decades from 1 ps/div to 5 ks/div, nine
/// codes per SI prefix. Code 100 means an external clock.
pub fn time_base(code: u16) -> Result<String> {
    if code < TIME_BASE_TABLE_LEN {
        let unit = TIME_BASE_UNITS[(code / 9) as usize];
        let magnitude = TIME_BASE_MAGNITUDES[(code % 9) as usize];
        Ok(format!("{} {}s/div", magnitude, unit))
    } else if code == TIME_BASE_EXTERNAL {
        Ok("EXTERNAL".to_string())
    } else {
        Err(FormatError::UnknownEnumCode {
            field: "time_base",
            code,
        })
    }
}

/// Trigger timestamp as stored in the descriptor.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TimestampFields {
    pub second: f64,
    pub minute: u8,
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl TimestampFields {
    pub fn format(&self) -> String {
        format!(
            "{}-{:02}-{:02} {:02}:{:02}:{:.2}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
