//! Pushes node readings to a Domoticz home-automation server.

pub mod models;

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::{
    config::Config,
    node::{Node, Sensor},
};

use self::models::CommandResponse;

/// Base of the device id (`did`) for nodes pushed by hardware id.
pub const DEVICE_ID_BASE: u32 = 2000;

/// Domoticz device types (`dtype`).
const TYPE_TEMP: u8 = 0x50;
const TYPE_HUM: u8 = 0x51;
const TYPE_TEMP_HUM: u8 = 0x52;

#[derive(Debug, Clone)]
pub struct DomoticzClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    /// `None` when no host is configured.
    base_url: Option<String>,
    hardware_id: String,
}

impl DomoticzClient {
    pub fn new(config: &Config) -> Self {
        let base_url = (!config.domoticz_host.is_empty())
            .then(|| format!("http://{}:{}", config.domoticz_host, config.domoticz_port));

        Self {
            inner: Arc::new(Inner {
                http: Client::new(),
                base_url,
                hardware_id: config.domoticz_hardware_id.clone(),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.base_url.is_some()
    }

    /// Device-update URL for `node`, or `None` if there is nothing to push.
    pub fn update_url(&self, node: &Node) -> Option<String> {
        let base_url = self.inner.base_url.as_deref()?;
        let params = update_params(node, &self.inner.hardware_id)?;
        Some(format!(
            "{base_url}/json.htm?type=command&param=udevice&{params}"
        ))
    }

    /// Send `node`'s temperature and humidity to Domoticz.
    ///
    /// Does nothing when Domoticz is disabled or the node is not pushable.
    pub async fn push(&self, node: &Node) -> Result<()> {
        let Some(url) = self.update_url(node) else {
            return Ok(());
        };
        debug!(node_id = node.id, url = %url, "Pushing to Domoticz");

        let bytes = self
            .inner
            .http
            .get(&url)
            .send()
            .await
            .context("Domoticz udevice request failed")?
            .error_for_status()
            .context("Domoticz udevice endpoint returned error status")?
            .bytes()
            .await
            .context("Failed to read Domoticz response body")?;

        debug!(node_id = node.id, response = %String::from_utf8_lossy(&bytes), "Domoticz response");

        serde_json::from_slice::<CommandResponse>(&bytes)
            .context("Failed to deserialize Domoticz response")?
            .into_result()
            .context("Domoticz udevice call failed")
    }
}

/// Query parameters updating `node`'s Domoticz device.
///
/// Nodes with a `domoticz_idx` update that device. Others are addressed by
/// `hardware_id` and a device id derived from the node id, which lets
/// Domoticz create the device on first push. Returns `None` when the node has
/// neither an idx nor a hardware id to go by, or carries no temperature or
/// humidity sensor.
///
/// `svalue` is `<temp>;<hum>;<status>` with absent sensors left out:
///
/// ```text
/// idx=12&nvalue=0&svalue=21.3;74;0
/// hid=1&did=2004&dunit=1&dtype=80&dsubtype=1&nvalue=0&svalue=27.4;0
/// ```
pub fn update_params(node: &Node, hardware_id: &str) -> Option<String> {
    let has_temp = node.has_sensor(Sensor::Temperature);
    let has_hum = node.has_sensor(Sensor::Humidity);

    if !has_temp && !has_hum {
        return None;
    }

    let mut params = match node.domoticz_idx.as_deref().filter(|idx| !idx.is_empty()) {
        Some(idx) => format!("idx={idx}&nvalue=0&svalue="),
        None if !hardware_id.is_empty() => {
            let dtype = match (has_temp, has_hum) {
                (true, true) => TYPE_TEMP_HUM,
                (false, true) => TYPE_HUM,
                _ => TYPE_TEMP,
            };
            format!(
                "hid={hardware_id}&did={}&dunit=1&dtype={dtype}&dsubtype=1&nvalue=0&svalue=",
                DEVICE_ID_BASE + u32::from(node.id)
            )
        }
        None => return None,
    };

    if has_temp {
        params.push_str(&format!("{:.1};", node.temperature.unwrap_or_default()));
    }
    if has_hum {
        params.push_str(&format!("{};", node.humidity.unwrap_or_default()));
    }
    params.push('0');

    Some(params)
}
