use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    display::{format_absolute, DateFormatOptions},
    domoticz::DomoticzClient,
    node::Node,
    reader::{self, LineSource},
    registry::NodeRegistry,
    rf12demo::Packet,
};

/// Lines buffered between the reader task and the gateway.
const LINE_BUFFER: usize = 64;

/// Turns receiver lines into node updates.
pub struct Gateway {
    registry: NodeRegistry,
    domoticz: DomoticzClient,
}

impl Gateway {
    pub fn new(registry: NodeRegistry, domoticz: DomoticzClient) -> Self {
        Self { registry, domoticz }
    }

    /// Read `source` on its own task and handle its lines until it ends.
    ///
    /// Fails with the reader's error when the source could not be opened or
    /// read.
    pub async fn serve(self, source: LineSource) -> Result<()> {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        let reader = tokio::spawn(reader::read_lines(source, tx));

        self.run(rx).await;

        reader.await.context("Line reader task failed")?
    }

    /// Consume lines until the sender side closes.
    pub async fn run(self, mut lines: mpsc::Receiver<String>) {
        info!("Gateway started");

        while let Some(line) = lines.recv().await {
            if let Err(e) = self.handle_line(&line).await {
                debug!(line = %line, error = %e, "Ignoring line");
            }
        }

        info!("Line source closed; gateway stopping");
    }

    /// Parses one receiver line, registers the sending node if it is new,
    /// decodes the payload into its readings, stores the result and pushes
    /// it to Domoticz in the background.
    ///
    /// Returns the node's new state, or `None` for a blank line. Lines that
    /// are not packets are returned as errors; payload errors are logged and
    /// the node is stored with its previous readings.
    pub async fn handle_line(&self, line: &str) -> Result<Option<Node>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let packet: Packet = line.parse().context("Failed to parse receiver line")?;
        let now = Utc::now();

        let (mut node, inserted) = self
            .registry
            .get_or_insert(packet.node_id, packet.kind, now)
            .await;

        if inserted {
            info!(node_id = node.id, name = %node.display_name(), kind = %node.kind, "New node added");
        } else if node.kind != packet.kind {
            warn!(
                node_id = node.id,
                name = %node.display_name(),
                from = %node.kind,
                to = %packet.kind,
                "Node changed kind; resetting readings"
            );
            node.kind = packet.kind;
            node.reset_readings();
        }

        let decoded = node.apply_payload(&packet.payload, now);
        if let Err(e) = &decoded {
            warn!(node_id = node.id, name = %node.display_name(), error = %e, "Failed to decode payload");
        }

        self.registry.upsert(node.clone()).await;

        debug!(
            node_id = node.id,
            name = %node.display_name(),
            updated_at = %format_absolute(&node.updated_at, &DateFormatOptions::default()),
            "{}",
            node.text_data()
        );

        if decoded.is_ok() && self.domoticz.is_enabled() {
            let domoticz = self.domoticz.clone();
            let pushed = node.clone();
            tokio::spawn(async move {
                if let Err(e) = domoticz.push(&pushed).await {
                    warn!(node_id = pushed.id, error = %e, "Failed to push to Domoticz");
                }
            });
        }

        Ok(Some(node))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{
        config::{Config, NodePreset},
        node::NodeKind,
    };

    fn gateway(registry: NodeRegistry) -> Gateway {
        let config = Config {
            input: "-".to_owned(),
            serial_baud: 57600,
            domoticz_host: String::new(),
            domoticz_port: 8080,
            domoticz_hardware_id: String::new(),
            nodes: HashMap::new(),
        };
        Gateway::new(registry, DomoticzClient::new(&config))
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let registry = NodeRegistry::new();
        let gw = gateway(registry.clone());

        assert!(gw.handle_line("  \r\n").await.unwrap().is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn garbage_is_an_error_and_changes_nothing() {
        let registry = NodeRegistry::new();
        let gw = gateway(registry.clone());

        assert!(gw.handle_line("[RF12demo.12] A i1 g212 @ 868 MHz").await.is_err());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn first_packet_registers_and_decodes() {
        let registry = NodeRegistry::new();
        let gw = gateway(registry.clone());

        let node = gw.handle_line("OK 2 1 213 40 57 3").await.unwrap().unwrap();
        assert_eq!(node.kind, NodeKind::JeeNodeThlm);
        assert_eq!(node.temperature, Some(21.3));
        assert_eq!(node.motion, Some(true));

        assert_eq!(registry.get(2).await, Some(node));
    }

    #[tokio::test]
    async fn later_packets_update_the_same_node() {
        let presets = HashMap::from([(
            4,
            NodePreset {
                name: "Cellar".to_owned(),
                domoticz_idx: None,
            },
        )]);
        let registry = NodeRegistry::with_presets(presets);
        let gw = gateway(registry.clone());

        gw.handle_line("OK 4 3 18 113 49").await.unwrap();
        let node = gw.handle_line("OK 4 3 213 0 0").await.unwrap().unwrap();

        assert_eq!(node.name, "Cellar");
        assert_eq!(node.temperature, Some(21.3));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn bad_payload_keeps_the_node() {
        let registry = NodeRegistry::new();
        let gw = gateway(registry.clone());

        let node = gw.handle_line("OK 2 1 213 40").await.unwrap().unwrap();
        assert_eq!(node.temperature, None);
        assert!(registry.get(2).await.is_some());
    }

    #[tokio::test]
    async fn kind_change_resets_readings() {
        let registry = NodeRegistry::new();
        let gw = gateway(registry.clone());

        gw.handle_line("OK 2 1 213 40 57 3").await.unwrap();
        let node = gw.handle_line("OK 2 3 18 113 49").await.unwrap().unwrap();

        assert_eq!(node.kind, NodeKind::TinyTxT);
        assert_eq!(node.temperature, Some(27.4));
        assert_eq!(node.vcc, Some(3164));
        assert_eq!(node.humidity, None);
        assert_eq!(node.motion, None);
    }

    #[tokio::test]
    async fn serve_fails_when_the_source_cannot_be_read() {
        let gw = gateway(NodeRegistry::new());
        let source = LineSource::new("/nonexistent/rf12.log", 57600);

        let err = gw.serve(source).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rf12.log"));
    }

    #[tokio::test]
    async fn run_drains_the_channel() {
        let registry = NodeRegistry::new();
        let gw = gateway(registry.clone());
        let (tx, rx) = mpsc::channel(8);

        tx.send("OK 2 1 213 40 57 3".to_owned()).await.unwrap();
        tx.send("garbage".to_owned()).await.unwrap();
        tx.send("OK 3 3 18 113 49".to_owned()).await.unwrap();
        drop(tx);

        gw.run(rx).await;

        let ids: Vec<u8> = registry.all().await.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
