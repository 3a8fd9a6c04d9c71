// src/lib.rs
// LeCroy Reader Library - Public API

//! # LeCroy Reader
//!
//! A Rust library for reading LeCroy binary waveform traces (`.trc` files
//! carrying a `WAVEDESC` descriptor).
//!
//! ## Features
//!
//! - Locate and decode the WAVEDESC descriptor in either byte order
//! - Map coded fields (coupling, bandwidth limit, time base, ...) to labels
//! - Reconstruct calibrated time and voltage arrays from 8 or 16 bit samples
//! - Optionally reduce a trace to an evenly sampled subset
//! - Combine the channel files of one acquisition under a shared time axis
//!
//! ## Example
//!
//! ```no_run
//! use lecroy_reader::{ChannelSet, ScopeRecord};
//!
//! let record = ScopeRecord::load("C1Trace00000.trc", None).expect("Failed to load trace");
//! println!("{}", record.describe());
//! println!("First sample: {} V at {} s", record.voltage[0], record.time[0]);
//!
//! // All channels recorded next to C1Trace00000.trc, reduced to 1000 points
//! let set = ChannelSet::load_all("C1Trace00000.trc", Some(1000)).expect("Failed to load channels");
//! println!("{} channels", set.channel_count());
//! ```

mod descriptor;
mod error;
mod labels;
mod record;
mod source;
mod waveform;

#[cfg(test)]
mod test_support;

pub use descriptor::{
    decode, locate, CommType, DescriptorLabels, Endianness, EnumCodes, SectionLengths,
    WaveDescriptor, MARKER, MARKER_SEARCH_LEN,
};
pub use error::{FormatError, Result};
pub use labels::{
    bandwidth_limit, processing, record_type, time_base, vertical_coupling, wave_source,
    TimestampFields,
};
pub use record::{decode_trace, ChannelSet, ScopeRecord, BYTES_SOURCE};
pub use source::{discover_channels, read_trace, write_channel_csv, write_csv};
pub use waveform::{read_raw_samples, reconstruct, sparse_indices, DecodedWaveform};
