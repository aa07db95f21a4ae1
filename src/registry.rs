use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    config::NodePreset,
    node::{Node, NodeKind},
};

/// In-memory store of the latest known state of every node, keyed by node id.
///
/// Cheap to clone; clones share the same map.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    inner: Arc<RwLock<HashMap<u8, Node>>>,
    presets: Arc<HashMap<u8, NodePreset>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that names nodes from `presets` when they are first seen.
    pub fn with_presets(presets: HashMap<u8, NodePreset>) -> Self {
        Self {
            inner: Arc::default(),
            presets: Arc::new(presets),
        }
    }

    /// Return the node with `id`, inserting a new one of `kind` if unknown.
    /// The flag is `true` when the node was inserted.
    pub async fn get_or_insert(&self, id: u8, kind: NodeKind, now: DateTime<Utc>) -> (Node, bool) {
        let mut guard = self.inner.write().await;

        if let Some(node) = guard.get(&id) {
            return (node.clone(), false);
        }

        let mut node = Node::new(id, kind, now);
        if let Some(preset) = self.presets.get(&id) {
            node.name = preset.name.clone();
            node.domoticz_idx = preset.domoticz_idx.clone();
        }
        guard.insert(id, node.clone());

        (node, true)
    }

    /// Overwrite the stored state for `node.id`.
    pub async fn upsert(&self, node: Node) {
        self.inner.write().await.insert(node.id, node);
    }

    /// Set the display name of a known node and return its new state.
    pub async fn rename(&self, id: u8, name: &str) -> Option<Node> {
        let mut guard = self.inner.write().await;
        let node = guard.get_mut(&id)?;
        node.name = name.trim().to_owned();
        Some(node.clone())
    }

    pub async fn get(&self, id: u8) -> Option<Node> {
        self.inner.read().await.get(&id).cloned()
    }

    /// Snapshot of every node, ordered by id.
    pub async fn all(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = self.inner.read().await.values().cloned().collect();
        nodes.sort_by_key(|n| n.id);
        nodes
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 15, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn empty_registry_returns_nothing() {
        let registry = NodeRegistry::new();
        assert!(registry.all().await.is_empty());
        assert!(registry.is_empty().await);
        assert!(registry.get(2).await.is_none());
    }

    #[tokio::test]
    async fn get_or_insert_inserts_once() {
        let registry = NodeRegistry::new();

        let (node, inserted) = registry.get_or_insert(2, NodeKind::JeeNodeThlm, now()).await;
        assert!(inserted);
        assert_eq!(node.id, 2);
        assert_eq!(node.kind, NodeKind::JeeNodeThlm);

        let (_, inserted) = registry.get_or_insert(2, NodeKind::JeeNodeThlm, now()).await;
        assert!(!inserted);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn presets_name_new_nodes() {
        let presets = HashMap::from([(
            3,
            NodePreset {
                name: "Garage".to_owned(),
                domoticz_idx: Some("7".to_owned()),
            },
        )]);
        let registry = NodeRegistry::with_presets(presets);

        let (node, _) = registry.get_or_insert(3, NodeKind::TinyTxT, now()).await;
        assert_eq!(node.name, "Garage");
        assert_eq!(node.domoticz_idx.as_deref(), Some("7"));

        let (node, _) = registry.get_or_insert(4, NodeKind::TinyTxT, now()).await;
        assert_eq!(node.name, "");
        assert_eq!(node.domoticz_idx, None);
    }

    #[tokio::test]
    async fn upsert_overwrites_previous_state() {
        let registry = NodeRegistry::new();
        let (mut node, _) = registry.get_or_insert(2, NodeKind::TinyTxT, now()).await;

        node.temperature = Some(19.5);
        registry.upsert(node).await;

        assert_eq!(registry.get(2).await.unwrap().temperature, Some(19.5));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn rename_only_touches_known_nodes() {
        let registry = NodeRegistry::new();
        registry.get_or_insert(2, NodeKind::TinyTxT, now()).await;

        let node = registry.rename(2, " Attic ").await.unwrap();
        assert_eq!(node.name, "Attic");
        assert_eq!(registry.get(2).await.unwrap().display_name(), "Attic");

        assert!(registry.rename(7, "Nowhere").await.is_none());
        assert!(registry.get(7).await.is_none());
    }

    #[tokio::test]
    async fn all_is_sorted_by_id() {
        let registry = NodeRegistry::new();
        for id in [9, 2, 5] {
            registry.get_or_insert(id, NodeKind::TinyTxT, now()).await;
        }

        let ids: Vec<u8> = registry.all().await.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let registry = NodeRegistry::new();
        let clone = registry.clone();

        registry.get_or_insert(2, NodeKind::TinyTxT, now()).await;

        assert!(clone.get(2).await.is_some());
    }
}
