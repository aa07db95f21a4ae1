//! Decoding of the bit-packed radio payload sent by each node.
//!
//! Sensor fields are packed back to back in [`Sensor::ALL`] order, least
//! significant bit first, bytes little-endian. Only the sensors of the
//! node's kind are present; trailing bits of the last byte are unused.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{Node, NodeKind, Sensor};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("unsupported node kind: {0}")]
    UnsupportedKind(u8),

    #[error("unexpected payload length: got {got} bytes, expected {expected}")]
    Length { got: usize, expected: usize },
}

impl NodeKind {
    /// Number of payload bytes a node of this kind sends.
    pub fn payload_len(self) -> usize {
        self.sensors()
            .iter()
            .map(|s| s.bits())
            .sum::<usize>()
            .div_ceil(8)
    }
}

impl Node {
    pub fn expected_payload_len(&self) -> usize {
        self.kind.payload_len()
    }

    /// Decode `data` into this node's readings and stamp `updated_at`.
    ///
    /// Readings are left untouched when the kind is unknown or the length
    /// does not match.
    pub fn apply_payload(&mut self, data: &[u8], now: DateTime<Utc>) -> Result<(), PayloadError> {
        if !self.kind.is_supported() {
            return Err(PayloadError::UnsupportedKind(self.kind.into()));
        }

        let expected = self.expected_payload_len();
        if data.len() != expected {
            return Err(PayloadError::Length {
                got: data.len(),
                expected,
            });
        }

        for (sensor, raw) in unpack(self.sensors(), data) {
            self.set_raw(sensor, raw);
        }
        self.updated_at = now;

        Ok(())
    }

    fn set_raw(&mut self, sensor: Sensor, raw: u64) {
        match sensor {
            Sensor::Temperature => self.temperature = Some(temperature(raw)),
            Sensor::Humidity => self.humidity = Some(raw as u8),
            Sensor::Light => self.light = Some(light(raw)),
            Sensor::Motion => self.motion = Some(raw != 0),
            Sensor::LowBattery => self.low_battery = Some(raw != 0),
            Sensor::Vcc => self.vcc = Some(raw as u16),
        }
    }
}

/// Split `data` into one raw value per sensor. `data` must hold at least as
/// many bits as `sensors` need.
fn unpack(sensors: &[Sensor], data: &[u8]) -> Vec<(Sensor, u64)> {
    let mut pos = 0;

    sensors
        .iter()
        .map(|&sensor| {
            let width = sensor.bits();
            let value = (0..width)
                .filter(|i| {
                    let bit = pos + i;
                    (data[bit / 8] >> (bit % 8)) & 1 == 1
                })
                .fold(0u64, |acc, i| acc | (1 << i));
            pos += width;
            (sensor, value)
        })
        .collect()
}

/// Signed tenths of a degree on 10 bits.
fn temperature(raw: u64) -> f64 {
    let mut tenths = raw as i64;
    if tenths > 512 {
        tenths -= 1024;
    }
    tenths as f64 / 10.0
}

/// 0..255 scaled to a percentage.
fn light(raw: u64) -> u8 {
    ((raw * 100) / 255) as u8
}
