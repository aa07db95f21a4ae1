use std::collections::HashMap;

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// NodePreset
// ---------------------------------------------------------------------------

/// Name and Domoticz index given to a node before it is first heard from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePreset {
    pub name: String,
    pub domoticz_idx: Option<String>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Receiver device path, capture file, or `-` for stdin.
    pub input: String,
    /// Line speed of the receiver's serial port.
    pub serial_baud: u32,
    /// Empty disables pushing to Domoticz.
    pub domoticz_host: String,
    pub domoticz_port: u16,
    /// Domoticz hardware id used to create devices for nodes without an idx.
    pub domoticz_hardware_id: String,
    /// Format: `"id:name[:domoticz_idx],..."` (e.g. `"2:Living room:12,3:Garage"`).
    pub nodes: HashMap<u8, NodePreset>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            input: optional("JEEGO_INPUT", "/dev/ttyUSB0"),
            serial_baud: optional("JEEGO_SERIAL_BAUD", "57600")
                .parse()
                .context("JEEGO_SERIAL_BAUD must be a valid baud rate")?,
            domoticz_host: optional("DOMOTICZ_HOST", ""),
            domoticz_port: optional("DOMOTICZ_PORT", "8080")
                .parse()
                .context("DOMOTICZ_PORT must be a valid port number")?,
            domoticz_hardware_id: optional("DOMOTICZ_HARDWARE_ID", ""),
            nodes: parse_nodes(&optional("JEEGO_NODES", ""))?,
        })
    }
}

/// Parse `"id:name[:domoticz_idx],..."` into presets keyed by node id.
fn parse_nodes(raw: &str) -> Result<HashMap<u8, NodePreset>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let id = parts.next().unwrap_or_default().trim();
            let name = parts.next().with_context(|| {
                format!("JEEGO_NODES entry must be 'id:name[:domoticz_idx]', got: {entry:?}")
            })?;
            let id = id
                .parse::<u8>()
                .with_context(|| format!("invalid node id in JEEGO_NODES entry {entry:?}"))?;
            let domoticz_idx = parts
                .next()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned);

            Ok((
                id,
                NodePreset {
                    name: name.trim().to_owned(),
                    domoticz_idx,
                },
            ))
        })
        .collect()
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
