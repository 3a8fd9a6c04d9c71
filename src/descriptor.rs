// WAVEDESC descriptor locator and decoder
// Field offsets follow the LeCroy remote control manual (template LECROY_2_3)
// and are relative to the position of the "WAVEDESC" marker.

use std::fmt;

use log::debug;

use crate::error::{FormatError, Result};
use crate::labels::{self, TimestampFields};

pub const MARKER: &[u8; 8] = b"WAVEDESC";
pub const MARKER_SEARCH_LEN: usize = 50;

const TEMPLATE_NAME: usize = 16;
const COMM_TYPE: usize = 32;
const COMM_ORDER: usize = 34;
const WAVE_DESCRIPTOR: usize = 36;
const USER_TEXT: usize = 40;
const TRIGTIME_ARRAY: usize = 48;
const WAVE_ARRAY_1: usize = 60;
const INSTRUMENT_NAME: usize = 76;
const INSTRUMENT_NUMBER: usize = 92;
const WAVE_ARRAY_COUNT: usize = 116;
const VERTICAL_GAIN: usize = 156;
const VERTICAL_OFFSET: usize = 160;
const NOMINAL_BITS: usize = 172;
const HORIZ_INTERVAL: usize = 176;
const HORIZ_OFFSET: usize = 180;
const TRIGGER_TIME: usize = 296;
const RECORD_TYPE: usize = 316;
const PROCESSING_DONE: usize = 318;
const TIMEBASE: usize = 324;
const VERT_COUPLING: usize = 326;
const BANDWIDTH_LIMIT: usize = 334;
const WAVE_SOURCE: usize = 344;

const STRING_LEN: usize = 16;

/// Byte order of every multi-byte field after the comm-order flag.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Endianness {
    #[default]
    BigEndian,
    LittleEndian,
}

impl Endianness {
    fn from_comm_order(flag: u16) -> Self {
        if flag == 0 {
            Endianness::BigEndian
        } else {
            Endianness::LittleEndian
        }
    }

    pub(crate) fn i16_from(self, bytes: [u8; 2]) -> i16 {
        match self {
            Endianness::BigEndian => i16::from_be_bytes(bytes),
            Endianness::LittleEndian => i16::from_le_bytes(bytes),
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::BigEndian => write!(f, "big-endian"),
            Endianness::LittleEndian => write!(f, "little-endian"),
        }
    }
}

/// Width of the raw samples in the wave array.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CommType {
    #[default]
    Int8,
    Int16,
}

impl CommType {
    /// Zero selects byte samples; any other value selects 16 bit words.
    fn from_code(code: u16) -> Self {
        if code == 0 {
            CommType::Int8
        } else {
            CommType::Int16
        }
    }

    pub fn sample_width(self) -> usize {
        match self {
            CommType::Int8 => 1,
            CommType::Int16 => 2,
        }
    }
}

/// Byte lengths of the blocks that follow the marker.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SectionLengths {
    pub descriptor_length: u32,
    pub user_text_length: u32,
    pub trig_time_array_length: u32,
    pub wave_array_byte_length: u32,
}

/// Raw values of the coded fields.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnumCodes {
    pub record_type: u16,
    pub processing: u16,
    pub time_base: u16,
    pub vertical_coupling: u16,
    pub bandwidth_limit: u16,
    pub wave_source: u16,
}

/// Labels resolved from [`EnumCodes`] and the trigger timestamp.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DescriptorLabels {
    pub wave_source: &'static str,
    pub vertical_coupling: &'static str,
    pub bandwidth_limit: &'static str,
    pub record_type: &'static str,
    pub processing: &'static str,
    pub time_base: String,
    pub trigger_time: String,
}

impl DescriptorLabels {
    fn resolve(codes: &EnumCodes, trigger_time: &TimestampFields) -> Result<Self> {
        Ok(DescriptorLabels {
            wave_source: labels::wave_source(codes.wave_source)?,
            vertical_coupling: labels::vertical_coupling(codes.vertical_coupling)?,
            bandwidth_limit: labels::bandwidth_limit(codes.bandwidth_limit)?,
            record_type: labels::record_type(codes.record_type)?,
            processing: labels::processing(codes.processing)?,
            time_base: labels::time_base(codes.time_base)?,
            trigger_time: trigger_time.format(),
        })
    }
}

/// Decoded WAVEDESC block.
#[derive(Default, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WaveDescriptor {
    pub descriptor_offset: u32,
    pub endianness: Endianness,
    pub template_name: String,
    pub comm_type: CommType,
    pub section_lengths: SectionLengths,
    pub instrument_name: String,
    pub instrument_number: i32,
    pub wave_array_count: i32,
    pub vertical_gain: f32,
    pub vertical_offset: f32,
    pub nominal_bits: u16,
    pub horiz_interval: f32,
    pub horiz_offset: f64,
    pub trigger_time: TimestampFields,
    pub codes: EnumCodes,
    pub labels: DescriptorLabels,
}

impl WaveDescriptor {
    /// Absolute offset of the first raw sample.
    pub fn payload_start(&self) -> Option<usize> {
        let lengths = &self.section_lengths;
        (self.descriptor_offset as usize)
            .checked_add(lengths.descriptor_length as usize)?
            .checked_add(lengths.user_text_length as usize)?
            .checked_add(lengths.trig_time_array_length as usize)
    }
}

/// Find the byte offset of the WAVEDESC marker.
///
/// Only the first [`MARKER_SEARCH_LEN`] bytes are searched, and a buffer
/// shorter than that is rejected outright.
pub fn locate(buffer: &[u8]) -> Result<u32> {
    let head = buffer
        .get(..MARKER_SEARCH_LEN)
        .ok_or(FormatError::MarkerNotFound)?;

    head.windows(MARKER.len())
        .position(|window| window == MARKER)
        .map(|pos| pos as u32)
        .ok_or(FormatError::MarkerNotFound)
}

struct FieldReader<'a> {
    buf: &'a [u8],
    base: usize,
    endianness: Endianness,
}

macro_rules! read_number {
    ($name:ident, $ty:ty) => {
        fn $name(&self, pos: usize) -> Result<$ty> {
            let raw = self.bytes(pos)?;
            Ok(match self.endianness {
                Endianness::BigEndian => <$ty>::from_be_bytes(raw),
                Endianness::LittleEndian => <$ty>::from_le_bytes(raw),
            })
        }
    };
}

impl FieldReader<'_> {
    fn bytes<const N: usize>(&self, pos: usize) -> Result<[u8; N]> {
        let start = self.base + pos;
        self.buf
            .get(start..start + N)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(FormatError::Truncated {
                offset: start,
                len: N,
                available: self.buf.len(),
            })
    }

    read_number!(read_u16, u16);
    read_number!(read_u32, u32);
    read_number!(read_i32, i32);
    read_number!(read_f32, f32);
    read_number!(read_f64, f64);

    fn read_u8(&self, pos: usize) -> Result<u8> {
        let [byte] = self.bytes::<1>(pos)?;
        Ok(byte)
    }

    fn read_string(&self, pos: usize) -> Result<String> {
        let raw = self.bytes::<STRING_LEN>(pos)?;
        let text: String = raw
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
            .collect();
        Ok(text.trim_end_matches(['\0', ' ']).to_string())
    }

    fn read_timestamp(&self, pos: usize) -> Result<TimestampFields> {
        Ok(TimestampFields {
            second: self.read_f64(pos)?,
            minute: self.read_u8(pos + 8)?,
            hour: self.read_u8(pos + 9)?,
            day: self.read_u8(pos + 10)?,
            month: self.read_u8(pos + 11)?,
            year: self.read_u16(pos + 12)?,
        })
    }
}

/// Decode the descriptor that starts at `descriptor_offset`.
pub fn decode(buffer: &[u8], descriptor_offset: u32) -> Result<WaveDescriptor> {
    let mut reader = FieldReader {
        buf: buffer,
        base: descriptor_offset as usize,
        endianness: Endianness::LittleEndian,
    };
    let endianness = Endianness::from_comm_order(reader.read_u16(COMM_ORDER)?);
    reader.endianness = endianness;

    let section_lengths = SectionLengths {
        descriptor_length: reader.read_u32(WAVE_DESCRIPTOR)?,
        user_text_length: reader.read_u32(USER_TEXT)?,
        trig_time_array_length: reader.read_u32(TRIGTIME_ARRAY)?,
        wave_array_byte_length: reader.read_u32(WAVE_ARRAY_1)?,
    };
    debug!(
        "WAVEDESC at offset {}, {}, sections {:?}",
        descriptor_offset, endianness, section_lengths
    );

    let trigger_time = reader.read_timestamp(TRIGGER_TIME)?;
    let codes = EnumCodes {
        record_type: reader.read_u16(RECORD_TYPE)?,
        processing: reader.read_u16(PROCESSING_DONE)?,
        time_base: reader.read_u16(TIMEBASE)?,
        vertical_coupling: reader.read_u16(VERT_COUPLING)?,
        bandwidth_limit: reader.read_u16(BANDWIDTH_LIMIT)?,
        wave_source: reader.read_u16(WAVE_SOURCE)?,
    };
    let labels = DescriptorLabels::resolve(&codes, &trigger_time)?;

    Ok(WaveDescriptor {
        descriptor_offset,
        endianness,
        template_name: reader.read_string(TEMPLATE_NAME)?,
        comm_type: CommType::from_code(reader.read_u16(COMM_TYPE)?),
        section_lengths,
        instrument_name: reader.read_string(INSTRUMENT_NAME)?,
        instrument_number: reader.read_i32(INSTRUMENT_NUMBER)?,
        wave_array_count: reader.read_i32(WAVE_ARRAY_COUNT)?,
        vertical_gain: reader.read_f32(VERTICAL_GAIN)?,
        vertical_offset: reader.read_f32(VERTICAL_OFFSET)?,
        nominal_bits: reader.read_u16(NOMINAL_BITS)?,
        horiz_interval: reader.read_f32(HORIZ_INTERVAL)?,
        horiz_offset: reader.read_f64(HORIZ_OFFSET)?,
        trigger_time,
        codes,
        labels,
    })
}
