// Decoded scope records: single traces and multi-channel sets

use std::fmt;
use std::path::Path;

use log::debug;

use crate::descriptor::{self, WaveDescriptor};
use crate::error::{FormatError, Result};
use crate::source;
use crate::waveform::{self, DecodedWaveform};

/// Source label used for records decoded from an in-memory buffer.
pub const BYTES_SOURCE: &str = "None - from bytes data";

/// Run the full decode pipeline over one buffer.
pub fn decode_trace(buffer: &[u8], sparse: Option<usize>) -> Result<(WaveDescriptor, DecodedWaveform)> {
    let offset = descriptor::locate(buffer)?;
    let descriptor = descriptor::decode(buffer, offset)?;
    let wave = waveform::reconstruct(buffer, &descriptor)?.downsample(sparse);
    Ok((descriptor, wave))
}

/// One decoded LeCroy trace.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScopeRecord {
    pub source: String,
    pub descriptor: WaveDescriptor,
    pub time: Vec<f64>,
    pub voltage: Vec<f64>,
}

impl ScopeRecord {
    pub fn from_bytes(buffer: &[u8], sparse: Option<usize>) -> Result<Self> {
        Self::decode_labelled(BYTES_SOURCE, buffer, sparse)
    }

    /// Read and decode the trace file at `path`.
    pub fn load<P: AsRef<Path>>(path: P, sparse: Option<usize>) -> Result<Self> {
        let buffer = source::read_trace(&path)?;
        Self::decode_labelled(&path.as_ref().to_string_lossy(), &buffer, sparse)
    }

    fn decode_labelled(label: &str, buffer: &[u8], sparse: Option<usize>) -> Result<Self> {
        let (descriptor, wave) = decode_trace(buffer, sparse)?;
        Ok(ScopeRecord {
            source: label.to_string(),
            descriptor,
            time: wave.time,
            voltage: wave.voltage,
        })
    }

    /// Multi-line report of the descriptor metadata.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ScopeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, &self.source, &self.descriptor, self.descriptor.labels.wave_source)
    }
}

/// Several channels of one acquisition sharing a single time axis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChannelSet {
    pub source: String,
    pub descriptors: Vec<WaveDescriptor>,
    pub time: Vec<f64>,
    pub voltages: Vec<Vec<f64>>,
}

impl ChannelSet {
    /// Decode each buffer and check that all channels share one time base.
    pub fn from_buffers<B: AsRef<[u8]>>(
        label: &str,
        buffers: &[B],
        sparse: Option<usize>,
    ) -> Result<Self> {
        if buffers.is_empty() {
            return Err(FormatError::InvalidInput(
                "no channel buffers supplied".to_string(),
            ));
        }

        let mut descriptors: Vec<WaveDescriptor> = Vec::with_capacity(buffers.len());
        let mut voltages = Vec::with_capacity(buffers.len());
        let mut time = Vec::new();

        for (channel, buffer) in buffers.iter().enumerate() {
            let (descriptor, wave) = decode_trace(buffer.as_ref(), sparse)?;
            match descriptors.first() {
                Some(reference) => check_geometry(channel, reference, &descriptor)?,
                None => time = wave.time,
            }
            debug!(
                "Channel {} ({}) decoded, {} points",
                channel,
                descriptor.labels.wave_source,
                wave.voltage.len()
            );
            descriptors.push(descriptor);
            voltages.push(wave.voltage);
        }

        Ok(ChannelSet {
            source: label.to_string(),
            descriptors,
            time,
            voltages,
        })
    }

    /// Find the sibling channel files of `path` and decode them together.
    pub fn load_all<P: AsRef<Path>>(path: P, sparse: Option<usize>) -> Result<Self> {
        let files = source::discover_channels(&path)?;
        let buffers = files
            .iter()
            .map(source::read_trace)
            .collect::<Result<Vec<_>>>()?;
        Self::from_buffers(&path.as_ref().to_string_lossy(), &buffers, sparse)
    }

    pub fn channel_count(&self) -> usize {
        self.voltages.len()
    }

    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channels: Vec<&str> = self
            .descriptors
            .iter()
            .map(|d| d.labels.wave_source)
            .collect();
        match self.descriptors.first() {
            Some(first) => write_summary(f, &self.source, first, &channels.join(", ")),
            None => writeln!(f, "LeCroy Scope Data\nPath: {}", self.source),
        }
    }
}

fn check_geometry(channel: usize, reference: &WaveDescriptor, other: &WaveDescriptor) -> Result<()> {
    let mismatch = |what: &str, a: String, b: String| FormatError::ChannelMismatch {
        channel,
        reason: format!("{} is {} but the first channel has {}", what, b, a),
    };

    if reference.wave_array_count != other.wave_array_count {
        return Err(mismatch(
            "wave_array_count",
            reference.wave_array_count.to_string(),
            other.wave_array_count.to_string(),
        ));
    }
    if reference.horiz_interval.to_bits() != other.horiz_interval.to_bits() {
        return Err(mismatch(
            "horiz_interval",
            reference.horiz_interval.to_string(),
            other.horiz_interval.to_string(),
        ));
    }
    if reference.horiz_offset.to_bits() != other.horiz_offset.to_bits() {
        return Err(mismatch(
            "horiz_offset",
            reference.horiz_offset.to_string(),
            other.horiz_offset.to_string(),
        ));
    }
    Ok(())
}

fn write_summary(
    f: &mut fmt::Formatter<'_>,
    source: &str,
    desc: &WaveDescriptor,
    channel: &str,
) -> fmt::Result {
    writeln!(f, "LeCroy Scope Data")?;
    writeln!(f, "Path: {}", source)?;
    writeln!(f, "Endianness: {}", desc.endianness)?;
    writeln!(f, "Instrument: {}", desc.instrument_name)?;
    writeln!(f, "Instrument Number: {}", desc.instrument_number)?;
    writeln!(f, "Template Name: {}", desc.template_name)?;
    writeln!(f, "Channel: {}", channel)?;
    writeln!(f, "WaveArrayCount: {}", desc.wave_array_count)?;
    writeln!(f, "Vertical Coupling: {}", desc.labels.vertical_coupling)?;
    writeln!(f, "Bandwidth Limit: {}", desc.labels.bandwidth_limit)?;
    writeln!(f, "Record Type: {}", desc.labels.record_type)?;
    writeln!(f, "Processing: {}", desc.labels.processing)?;
    writeln!(f, "TimeBase: {}", desc.labels.time_base)?;
    writeln!(f, "TriggerTime: {}", desc.labels.trigger_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::EnumCodes;
    use crate::test_support::TraceBuilder;

    #[test]
    fn test_from_bytes() {
        let trace = TraceBuilder::new().samples_i8(&[1, 2, 3, 4]).build();
        let record = ScopeRecord::from_bytes(&trace, None).unwrap();

        assert_eq!(record.source, BYTES_SOURCE);
        assert_eq!(record.time.len(), 4);
        assert_eq!(record.voltage, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let trace = TraceBuilder::new()
            .gain_offset(0.1, 0.3)
            .horizontal(1e-6, 2.5e-3)
            .samples_i16(&[100, -100, 7])
            .build();
        let a = ScopeRecord::from_bytes(&trace, None).unwrap();
        let b = ScopeRecord::from_bytes(&trace, None).unwrap();
        assert_eq!(a, b);
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a.voltage), bits(&b.voltage));
        assert_eq!(bits(&a.time), bits(&b.time));
    }

    #[test]
    fn test_sparse_record() {
        let samples: Vec<i8> = (0..100).map(|i| i as i8).collect();
        let trace = TraceBuilder::new().samples_i8(&samples).build();
        let record = ScopeRecord::from_bytes(&trace, Some(8)).unwrap();

        assert_eq!(record.time.len(), 8);
        assert_eq!(record.voltage.len(), 8);
        assert_eq!(record.voltage[0], 0.0);
        assert_eq!(record.voltage[1], 12.0);
        assert_eq!(record.voltage[7], 84.0);
        assert_eq!(record.descriptor.wave_array_count, 100);
    }

    #[test]
    fn test_truncated_yields_no_record() {
        let trace = TraceBuilder::new().samples_i16(&[1, 2, 3]).build();
        let result = ScopeRecord::from_bytes(&trace[..trace.len() - 2], None);
        assert!(matches!(result, Err(FormatError::Truncated { .. })));
    }

    #[test]
    fn test_describe_layout() {
        let trace = TraceBuilder::new()
            .instrument("LECROYHDO6104", 4321)
            .codes(EnumCodes {
                record_type: 0,
                processing: 0,
                time_base: 20,
                vertical_coupling: 0,
                bandwidth_limit: 0,
                wave_source: 2,
            })
            .samples_i8(&[0; 4])
            .build();
        let record = ScopeRecord::from_bytes(&trace, None).unwrap();
        let text = record.describe();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "LeCroy Scope Data",
                "Path: None - from bytes data",
                "Endianness: little-endian",
                "Instrument: LECROYHDO6104",
                "Instrument Number: 4321",
                "Template Name: LECROY_2_3",
                "Channel: Channel 3",
                "WaveArrayCount: 4",
                "Vertical Coupling: DC50",
                "Bandwidth Limit: off",
                "Record Type: single_sweep",
                "Processing: No Processing",
                "TimeBase: 5 us/div",
                "TriggerTime: 2020-05-04 03:02:1.50",
            ]
        );
    }

    #[test]
    fn test_channel_set() {
        let c1 = TraceBuilder::new()
            .horizontal(0.5, 0.0)
            .samples_i8(&[1, 2, 3])
            .build();
        let c2 = TraceBuilder::new()
            .horizontal(0.5, 0.0)
            .codes(EnumCodes {
                wave_source: 1,
                ..EnumCodes::default()
            })
            .samples_i8(&[-1, -2, -3])
            .build();
        let set = ChannelSet::from_buffers("C1trace.trc", &[c1, c2], None).unwrap();

        assert_eq!(set.channel_count(), 2);
        assert_eq!(set.time, vec![0.0, 0.5, 1.0]);
        assert_eq!(set.voltages[0], vec![1.0, 2.0, 3.0]);
        assert_eq!(set.voltages[1], vec![-1.0, -2.0, -3.0]);
        assert!(set.describe().contains("Channel: Channel 1, Channel 2\n"));
    }

    #[test]
    fn test_channel_set_count_mismatch() {
        let c1 = TraceBuilder::new().samples_i8(&[1, 2, 3]).build();
        let c2 = TraceBuilder::new().samples_i8(&[1, 2, 3, 4]).build();
        let result = ChannelSet::from_buffers("set", &[c1, c2], None);
        assert!(matches!(
            result,
            Err(FormatError::ChannelMismatch { channel: 1, .. })
        ));
    }

    #[test]
    fn test_channel_set_interval_mismatch() {
        let c1 = TraceBuilder::new().horizontal(1.0, 0.0).samples_i8(&[1, 2]).build();
        let c2 = TraceBuilder::new().horizontal(2.0, 0.0).samples_i8(&[1, 2]).build();
        let result = ChannelSet::from_buffers("set", &[c1, c2], None);
        assert!(matches!(result, Err(FormatError::ChannelMismatch { .. })));
    }

    #[test]
    fn test_channel_set_offset_mismatch() {
        let c1 = TraceBuilder::new().horizontal(1.0, 0.0).samples_i8(&[1, 2]).build();
        let c2 = TraceBuilder::new().horizontal(1.0, -0.5).samples_i8(&[1, 2]).build();
        match ChannelSet::from_buffers("set", &[c1, c2], None) {
            Err(FormatError::ChannelMismatch { channel, reason }) => {
                assert_eq!(channel, 1);
                assert!(reason.starts_with("horiz_offset"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_channel_set_empty() {
        let buffers: Vec<Vec<u8>> = Vec::new();
        let result = ChannelSet::from_buffers("set", &buffers, None);
        assert!(matches!(result, Err(FormatError::InvalidInput(_))));
    }
}
