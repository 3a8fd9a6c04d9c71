// Synthetic trace builder for unit tests

use crate::descriptor::EnumCodes;
use crate::labels::TimestampFields;

const DESCRIPTOR_LEN: usize = 346;

enum Payload {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
}

pub struct TraceBuilder {
    prefix: usize,
    big_endian: bool,
    instrument_name: String,
    instrument_number: i32,
    gain: f32,
    offset: f32,
    interval: f32,
    horiz_offset: f64,
    codes: EnumCodes,
    trigger_time: TimestampFields,
    user_text: Vec<u8>,
    trig_time_array: usize,
    wave_array_count: Option<i32>,
    payload: Payload,
}

impl TraceBuilder {
    pub fn new() -> Self {
        TraceBuilder {
            prefix: 0,
            big_endian: false,
            instrument_name: "LECROYWR104MXi".to_string(),
            instrument_number: 0,
            gain: 1.0,
            offset: 0.0,
            interval: 1.0,
            horiz_offset: 0.0,
            codes: EnumCodes::default(),
            trigger_time: TimestampFields {
                second: 1.5,
                minute: 2,
                hour: 3,
                day: 4,
                month: 5,
                year: 2020,
            },
            user_text: Vec::new(),
            trig_time_array: 0,
            wave_array_count: None,
            payload: Payload::Int16(Vec::new()),
        }
    }

    pub fn prefix(mut self, len: usize) -> Self {
        self.prefix = len;
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn instrument(mut self, name: &str, number: i32) -> Self {
        self.instrument_name = name.to_string();
        self.instrument_number = number;
        self
    }

    pub fn gain_offset(mut self, gain: f32, offset: f32) -> Self {
        self.gain = gain;
        self.offset = offset;
        self
    }

    pub fn horizontal(mut self, interval: f32, offset: f64) -> Self {
        self.interval = interval;
        self.horiz_offset = offset;
        self
    }

    pub fn codes(mut self, codes: EnumCodes) -> Self {
        self.codes = codes;
        self
    }

    pub fn trigger_time(mut self, ts: TimestampFields) -> Self {
        self.trigger_time = ts;
        self
    }

    pub fn user_text(mut self, text: &[u8]) -> Self {
        self.user_text = text.to_vec();
        self
    }

    pub fn trig_time_array(mut self, len: usize) -> Self {
        self.trig_time_array = len;
        self
    }

    pub fn wave_array_count(mut self, count: i32) -> Self {
        self.wave_array_count = Some(count);
        self
    }

    pub fn samples_i8(mut self, samples: &[i8]) -> Self {
        self.payload = Payload::Int8(samples.to_vec());
        self
    }

    pub fn samples_i16(mut self, samples: &[i16]) -> Self {
        self.payload = Payload::Int16(samples.to_vec());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let (comm_type, count, payload): (u16, usize, Vec<u8>) = match &self.payload {
            Payload::Int8(s) => (0, s.len(), s.iter().map(|&v| v as u8).collect()),
            Payload::Int16(s) => (
                1,
                s.len(),
                s.iter()
                    .flat_map(|&v| if self.big_endian { v.to_be_bytes() } else { v.to_le_bytes() })
                    .collect(),
            ),
        };
        let count = self.wave_array_count.unwrap_or(count as i32);

        let mut buf = vec![0u8; self.prefix + DESCRIPTOR_LEN];
        buf[self.prefix..self.prefix + 8].copy_from_slice(b"WAVEDESC");
        buf[self.prefix + 16..self.prefix + 26].copy_from_slice(b"LECROY_2_3");

        let name = self.instrument_name.as_bytes();
        buf[self.prefix + 76..self.prefix + 76 + name.len()].copy_from_slice(name);

        let prefix = self.prefix;
        let big_endian = self.big_endian;
        macro_rules! field {
            ($pos:expr, $value:expr) => {{
                let v = $value;
                let bytes = if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
                buf[prefix + $pos..prefix + $pos + bytes.len()].copy_from_slice(&bytes);
            }};
        }

        field!(32, comm_type);
        field!(34, if self.big_endian { 0u16 } else { 1u16 });
        field!(36, DESCRIPTOR_LEN as u32);
        field!(40, self.user_text.len() as u32);
        field!(48, self.trig_time_array as u32);
        field!(60, payload.len() as u32);
        field!(92, self.instrument_number);
        field!(116, count);
        field!(156, self.gain);
        field!(160, self.offset);
        field!(172, 8u16);
        field!(176, self.interval);
        field!(180, self.horiz_offset);
        field!(296, self.trigger_time.second);
        field!(304, self.trigger_time.minute);
        field!(305, self.trigger_time.hour);
        field!(306, self.trigger_time.day);
        field!(307, self.trigger_time.month);
        field!(308, self.trigger_time.year);
        field!(316, self.codes.record_type);
        field!(318, self.codes.processing);
        field!(324, self.codes.time_base);
        field!(326, self.codes.vertical_coupling);
        field!(334, self.codes.bandwidth_limit);
        field!(344, self.codes.wave_source);

        buf.extend_from_slice(&self.user_text);
        buf.extend(std::iter::repeat(0u8).take(self.trig_time_array));
        buf.extend_from_slice(&payload);
        buf
    }
}
