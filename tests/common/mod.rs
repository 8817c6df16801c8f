//! Synthetic log construction shared by the integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

const HEAD: [u8; 2] = [0xA3, 0x95];
const FORMAT_TYPE: u8 = 0x80;

pub const ATT: u8 = 131;
pub const GPS: u8 = 132;
pub const TIME: u8 = 133;
pub const MSG: u8 = 134;

fn padded(text: &str, len: usize) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(len, 0);
    bytes
}

fn field_size(c: char) -> usize {
    match c {
        'b' | 'B' | 'M' => 1,
        'h' | 'H' | 'c' | 'C' => 2,
        'i' | 'I' | 'f' | 'e' | 'E' | 'L' | 'n' => 4,
        'q' | 'Q' | 'd' => 8,
        'N' => 16,
        'Z' => 64,
        other => panic!("unsupported format char {other}"),
    }
}

/// Builds a binary log message by message
#[derive(Default)]
pub struct LogBuilder {
    data: Vec<u8>,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, type_id: u8, name: &str, format: &str, labels: &str) -> Self {
        let length = 3 + format.chars().map(field_size).sum::<usize>();
        self.data.extend(HEAD);
        self.data.extend([FORMAT_TYPE, type_id, length as u8]);
        self.data.extend(padded(name, 4));
        self.data.extend(padded(format, 16));
        self.data.extend(padded(labels, 64));
        self
    }

    pub fn message(mut self, type_id: u8, payload: &[u8]) -> Self {
        self.data.extend(HEAD);
        self.data.push(type_id);
        self.data.extend_from_slice(payload);
        self
    }

    pub fn att(self, time_ms: u32, roll: f32, pitch: f32) -> Self {
        let mut payload = time_ms.to_le_bytes().to_vec();
        payload.extend(roll.to_le_bytes());
        payload.extend(pitch.to_le_bytes());
        self.message(ATT, &payload)
    }

    pub fn gps(self, time_ms: u32, week: u16, lat: f64, lng: f64, alt: f32) -> Self {
        let mut payload = time_ms.to_le_bytes().to_vec();
        payload.extend(week.to_le_bytes());
        payload.extend(lat.to_le_bytes());
        payload.extend(lng.to_le_bytes());
        payload.extend(alt.to_le_bytes());
        self.message(GPS, &payload)
    }

    pub fn time(self, start_time: u64) -> Self {
        self.message(TIME, &start_time.to_le_bytes())
    }

    pub fn text(self, message: &str) -> Self {
        self.message(MSG, &padded(message, 64))
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }

    pub fn write_to(self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.data).expect("Failed to write log file");
        path
    }
}

pub fn with_att_format(builder: LogBuilder) -> LogBuilder {
    builder.format(ATT, "ATT", "Iff", "TimeMS,Roll,Pitch")
}

pub fn with_gps_format(builder: LogBuilder) -> LogBuilder {
    builder.format(GPS, "GPS", "IHddf", "TimeMS,Week,Lat,Lng,Alt")
}

/// Attitude and GPS records, one row each
pub fn flight_log() -> LogBuilder {
    with_gps_format(with_att_format(LogBuilder::new()))
        .att(1000, 0.5, 0.25)
        .gps(3_600_000, 2000, 47.6, -122.3, 10.0)
        .att(1020, -0.5, 0.75)
        .gps(3_600_200, 2000, 47.61, -122.31, 10.5)
}

/// Log with a TIME message that groups records into time slices
pub fn time_sliced_log() -> LogBuilder {
    with_gps_format(with_att_format(LogBuilder::new()))
        .format(TIME, "TIME", "Q", "StartTime")
        .time(100)
        .att(1000, 0.5, 0.25)
        .gps(3_600_000, 2000, 47.6, -122.3, 10.0)
        .time(200)
        .att(1020, -0.5, 0.75)
}
