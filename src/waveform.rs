// Waveform reconstruction: raw ADC codes to calibrated time/voltage arrays

use log::debug;

use crate::descriptor::{CommType, WaveDescriptor};
use crate::error::{FormatError, Result};

/// Calibrated sample series of one trace.
#[derive(Default, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedWaveform {
    pub time: Vec<f64>,
    pub voltage: Vec<f64>,
}

impl DecodedWaveform {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Keep `sparse` evenly spaced points, starting at index 0.
    ///
    /// `None`, zero, or a target at or above the current length leaves the
    /// waveform untouched.
    pub fn downsample(self, sparse: Option<usize>) -> Self {
        match sparse_indices(self.len(), sparse) {
            Some(indices) => DecodedWaveform {
                time: indices.clone().map(|i| self.time[i]).collect(),
                voltage: indices.map(|i| self.voltage[i]).collect(),
            },
            None => self,
        }
    }
}

/// Indices kept when reducing `count` points to `sparse` points, or `None`
/// when no reduction applies.
pub fn sparse_indices(
    count: usize,
    sparse: Option<usize>,
) -> Option<impl Iterator<Item = usize> + Clone> {
    let target = sparse.filter(|&k| k > 0 && k < count)?;
    let step = count / target;
    Some((0..target).map(move |k| k * step))
}

/// Slice the raw sample payload out of the buffer and widen it to `i16`.
pub fn read_raw_samples(buffer: &[u8], descriptor: &WaveDescriptor) -> Result<Vec<i16>> {
    let len = descriptor.section_lengths.wave_array_byte_length as usize;
    let start = descriptor.payload_start().ok_or(FormatError::Truncated {
        offset: usize::MAX,
        len,
        available: buffer.len(),
    })?;
    let payload = start
        .checked_add(len)
        .and_then(|end| buffer.get(start..end))
        .ok_or(FormatError::Truncated {
            offset: start,
            len,
            available: buffer.len(),
        })?;

    let samples = match descriptor.comm_type {
        CommType::Int8 => payload.iter().map(|&b| b as i8 as i16).collect(),
        CommType::Int16 => payload
            .chunks_exact(2)
            .map(|pair| descriptor.endianness.i16_from([pair[0], pair[1]]))
            .collect(),
    };
    Ok(samples)
}

/// Build the time and voltage axes for a decoded descriptor.
pub fn reconstruct(buffer: &[u8], descriptor: &WaveDescriptor) -> Result<DecodedWaveform> {
    let raw = read_raw_samples(buffer, descriptor)?;

    let count = usize::try_from(descriptor.wave_array_count).map_err(|_| {
        FormatError::InvalidField {
            field: "wave_array_count",
            reason: format!("negative sample count {}", descriptor.wave_array_count),
        }
    })?;
    if raw.len() != count {
        return Err(FormatError::InvalidField {
            field: "wave_array_count",
            reason: format!(
                "descriptor declares {} samples but the wave array holds {}",
                count,
                raw.len()
            ),
        });
    }
    debug!(
        "Reconstructing {} {:?} samples from {} payload bytes",
        count, descriptor.comm_type, descriptor.section_lengths.wave_array_byte_length
    );

    let gain = descriptor.vertical_gain as f64;
    let offset = descriptor.vertical_offset as f64;
    let voltage = raw.iter().map(|&s| gain * s as f64 - offset).collect();

    let interval = descriptor.horiz_interval as f64;
    let time = (0..count)
        .map(|i| i as f64 * interval + descriptor.horiz_offset)
        .collect();

    Ok(DecodedWaveform { time, voltage })
}
