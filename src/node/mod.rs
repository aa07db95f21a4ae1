mod payload;
mod schema;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use payload::PayloadError;
pub use schema::{AttrType, Attribute};

// ---------------------------------------------------------------------------
// Sensor
// ---------------------------------------------------------------------------

/// A reading a node can carry, in payload packing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sensor {
    Temperature,
    Humidity,
    Light,
    Motion,
    LowBattery,
    Vcc,
}

impl Sensor {
    pub const ALL: [Sensor; 6] = [
        Sensor::Temperature,
        Sensor::Humidity,
        Sensor::Light,
        Sensor::Motion,
        Sensor::LowBattery,
        Sensor::Vcc,
    ];

    /// Width of this sensor's field in a radio payload.
    ///
    /// | Sensor      | Bits | Range                  |
    /// |-------------|------|------------------------|
    /// | Temperature | 10   | -51.2..+51.2 °C (0.1)  |
    /// | Humidity    | 7    | 0..100 %               |
    /// | Light       | 8    | 0..255 (scaled to %)   |
    /// | Motion      | 1    |                        |
    /// | LowBattery  | 1    |                        |
    /// | Vcc         | 12   | 0..4095 mV             |
    pub const fn bits(self) -> usize {
        match self {
            Sensor::Temperature => 10,
            Sensor::Humidity => 7,
            Sensor::Light => 8,
            Sensor::Motion => 1,
            Sensor::LowBattery => 1,
            Sensor::Vcc => 12,
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sensor::Temperature => "temperature",
            Sensor::Humidity => "humidity",
            Sensor::Light => "light",
            Sensor::Motion => "motion",
            Sensor::LowBattery => "lowbat",
            Sensor::Vcc => "vcc",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// Device category, sent by every node in the low 7 bits of its kind byte.
///
/// Serialised as the raw integer so unknown kinds survive a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum NodeKind {
    /// JeeNode room board: temperature, humidity, light, motion.
    JeeNodeThlm,
    /// JeeNode room board without PIR: temperature, humidity, light.
    JeeNodeThl,
    /// TinyTX: temperature.
    TinyTxT,
    /// TinyTX: temperature, humidity.
    TinyTxTh,
    /// TinyTX: temperature, light.
    TinyTxTl,
    Unknown(u8),
}

impl NodeKind {
    /// Sensors carried by this kind, in payload order. Empty for unknown kinds.
    pub fn sensors(self) -> &'static [Sensor] {
        use Sensor::*;

        match self {
            NodeKind::JeeNodeThlm => &[Temperature, Humidity, Light, Motion, LowBattery],
            NodeKind::JeeNodeThl => &[Temperature, Humidity, Light, LowBattery],
            NodeKind::TinyTxT => &[Temperature, Vcc],
            NodeKind::TinyTxTh => &[Temperature, Humidity, Vcc],
            NodeKind::TinyTxTl => &[Temperature, Light, Vcc],
            NodeKind::Unknown(_) => &[],
        }
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, NodeKind::Unknown(_))
    }
}

impl From<u8> for NodeKind {
    fn from(raw: u8) -> Self {
        match raw {
            1 => NodeKind::JeeNodeThlm,
            2 => NodeKind::JeeNodeThl,
            3 => NodeKind::TinyTxT,
            4 => NodeKind::TinyTxTh,
            5 => NodeKind::TinyTxTl,
            other => NodeKind::Unknown(other),
        }
    }
}

impl From<NodeKind> for u8 {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::JeeNodeThlm => 1,
            NodeKind::JeeNodeThl => 2,
            NodeKind::TinyTxT => 3,
            NodeKind::TinyTxTh => 4,
            NodeKind::TinyTxTl => 5,
            NodeKind::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::JeeNodeThlm => f.write_str("jeenode_thlm"),
            NodeKind::JeeNodeThl => f.write_str("jeenode_thl"),
            NodeKind::TinyTxT => f.write_str("tinytx_t"),
            NodeKind::TinyTxTh => f.write_str("tinytx_th"),
            NodeKind::TinyTxTl => f.write_str("tinytx_tl"),
            NodeKind::Unknown(raw) => write!(f, "unknown({raw})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A sensor node and its most recent readings.
///
/// Readings are `None` until the node reports them, and stay `None` for
/// sensors its kind does not carry. Absent readings are left out of the JSON
/// form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: u8,
    pub kind: NodeKind,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domoticz_idx: Option<String>,
    /// Degrees Celsius, 0.1 resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Relative humidity percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,
    /// Ambient light percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_battery: Option<bool>,
    /// Supply voltage in millivolts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcc: Option<u16>,
}

impl Node {
    pub fn new(id: u8, kind: NodeKind, now: DateTime<Utc>) -> Self {
        Self {
            id,
            kind,
            updated_at: now,
            name: String::new(),
            domoticz_idx: None,
            temperature: None,
            humidity: None,
            light: None,
            motion: None,
            low_battery: None,
            vcc: None,
        }
    }

    /// Name for log lines; `"Unnamed"` until one is configured.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unnamed"
        } else {
            &self.name
        }
    }

    pub fn sensors(&self) -> &'static [Sensor] {
        self.kind.sensors()
    }

    /// Sensors this node's kind does not carry, in canonical order.
    pub fn absent_sensors(&self) -> Vec<Sensor> {
        Sensor::ALL
            .into_iter()
            .filter(|s| !self.has_sensor(*s))
            .collect()
    }

    pub fn has_sensor(&self, sensor: Sensor) -> bool {
        self.sensors().contains(&sensor)
    }

    pub fn reset_readings(&mut self) {
        self.temperature = None;
        self.humidity = None;
        self.light = None;
        self.motion = None;
        self.low_battery = None;
        self.vcc = None;
    }

    /// Current value of `sensor` as display text, `None` if never reported.
    pub fn reading_text(&self, sensor: Sensor) -> Option<String> {
        match sensor {
            Sensor::Temperature => self.temperature.map(|v| v.to_string()),
            Sensor::Humidity => self.humidity.map(|v| v.to_string()),
            Sensor::Light => self.light.map(|v| v.to_string()),
            Sensor::Motion => self.motion.map(|v| v.to_string()),
            Sensor::LowBattery => self.low_battery.map(|v| v.to_string()),
            Sensor::Vcc => self.vcc.map(|v| v.to_string()),
        }
    }

    /// One-line summary of the node's readings, e.g.
    /// `temperature: 21.3 | humidity: 74 | light: 61 | motion: true | lowbat: false`.
    pub fn text_data(&self) -> String {
        self.sensors()
            .iter()
            .map(|sensor| {
                let value = self.reading_text(*sensor).unwrap_or_else(|| "-".to_owned());
                format!("{sensor}: {value}")
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn node(kind: NodeKind) -> Node {
        Node::new(2, kind, Utc.with_ymd_and_hms(2021, 3, 15, 0, 0, 0).unwrap())
    }

    #[test]
    fn kind_from_and_into_raw() {
        for raw in 0..=10u8 {
            assert_eq!(u8::from(NodeKind::from(raw)), raw);
        }
        assert_eq!(NodeKind::from(1u8), NodeKind::JeeNodeThlm);
        assert_eq!(NodeKind::from(5u8), NodeKind::TinyTxTl);
        assert_eq!(NodeKind::from(9u8), NodeKind::Unknown(9));
        assert!(!NodeKind::from(0u8).is_supported());
    }

    #[test]
    fn sensors_per_kind() {
        use Sensor::*;

        assert_eq!(
            node(NodeKind::JeeNodeThlm).sensors(),
            &[Temperature, Humidity, Light, Motion, LowBattery]
        );
        assert_eq!(
            node(NodeKind::JeeNodeThl).sensors(),
            &[Temperature, Humidity, Light, LowBattery]
        );
        assert_eq!(node(NodeKind::TinyTxT).sensors(), &[Temperature, Vcc]);
        assert_eq!(node(NodeKind::TinyTxTh).sensors(), &[Temperature, Humidity, Vcc]);
        assert_eq!(node(NodeKind::TinyTxTl).sensors(), &[Temperature, Light, Vcc]);
        assert!(node(NodeKind::Unknown(42)).sensors().is_empty());
    }

    #[test]
    fn absent_sensors_complement_present_ones() {
        use Sensor::*;

        assert_eq!(node(NodeKind::JeeNodeThlm).absent_sensors(), vec![Vcc]);
        assert_eq!(node(NodeKind::JeeNodeThl).absent_sensors(), vec![Motion, Vcc]);
        assert_eq!(
            node(NodeKind::TinyTxT).absent_sensors(),
            vec![Humidity, Light, Motion, LowBattery]
        );
    }

    #[test]
    fn has_sensor() {
        let n = node(NodeKind::TinyTxTl);
        assert!(n.has_sensor(Sensor::Temperature));
        assert!(n.has_sensor(Sensor::Light));
        assert!(n.has_sensor(Sensor::Vcc));
        assert!(!n.has_sensor(Sensor::Humidity));
        assert!(!n.has_sensor(Sensor::Motion));
        assert!(!n.has_sensor(Sensor::LowBattery));
    }

    #[test]
    fn text_data_lists_the_kinds_sensors() {
        let mut n = node(NodeKind::JeeNodeThlm);
        n.temperature = Some(21.3);
        n.humidity = Some(74);
        n.light = Some(61);
        n.motion = Some(true);
        n.low_battery = Some(false);
        assert_eq!(
            n.text_data(),
            "temperature: 21.3 | humidity: 74 | light: 61 | motion: true | lowbat: false"
        );

        let mut n = node(NodeKind::TinyTxT);
        n.temperature = Some(21.3);
        n.vcc = Some(3142);
        assert_eq!(n.text_data(), "temperature: 21.3 | vcc: 3142");
    }

    #[test]
    fn text_data_marks_missing_readings() {
        assert_eq!(node(NodeKind::TinyTxT).text_data(), "temperature: - | vcc: -");
        assert_eq!(node(NodeKind::Unknown(9)).text_data(), "");
    }

    #[test]
    fn reset_readings_clears_everything() {
        let mut n = node(NodeKind::TinyTxT);
        n.temperature = Some(19.5);
        n.vcc = Some(3000);
        n.reset_readings();
        assert_eq!(n.temperature, None);
        assert_eq!(n.vcc, None);
    }

    #[test]
    fn display_name_falls_back() {
        let mut n = node(NodeKind::TinyTxT);
        assert_eq!(n.display_name(), "Unnamed");
        n.name = "Garage".to_owned();
        assert_eq!(n.display_name(), "Garage");
    }

    #[test]
    fn json_omits_absent_readings() {
        let mut n = node(NodeKind::TinyTxT);
        n.temperature = Some(27.4);
        n.vcc = Some(3164);

        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 2,
                "kind": 3,
                "updated_at": "2021-03-15T00:00:00Z",
                "name": "",
                "temperature": 27.4,
                "vcc": 3164,
            })
        );

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, n);
    }
}
