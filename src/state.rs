use std::collections::{BTreeMap, HashMap};

use crate::graph::{ConnectorId, Direction, NodeId};
use crate::hit_test::{find_connector_at, SimpleConnectorGeometry};
use crate::path::CubicBezier;

/// Rectangle of a rendered node in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Connector center relative to the node that displays it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StoredConnector {
    pub node: NodeId,
    pub rel_x: f32,
    pub rel_y: f32,
}

/// Spatial state reported by the presentation layer: node rectangles and
/// connector offsets.
///
/// Connector positions are kept relative to their node so that moving a node
/// moves its connectors without the layer having to report them again.
/// Connectors of trigger rows are reported against the parent node.
#[derive(Debug, Default, Clone)]
pub struct GeometryCache {
    pub node_rects: HashMap<NodeId, NodeRect>,
    /// Ordered by id so hit-testing is deterministic.
    pub connector_offsets: BTreeMap<ConnectorId, StoredConnector>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard handler for node rect reports
    pub fn handle_node_rect_report(&mut self, node: NodeId, x: f32, y: f32, width: f32, height: f32) {
        self.node_rects.insert(
            node,
            NodeRect {
                x,
                y,
                width,
                height,
            },
        );
    }

    /// Standard handler for connector position reports
    pub fn handle_connector_report(&mut self, connector: ConnectorId, node: NodeId, rel_x: f32, rel_y: f32) {
        self.connector_offsets
            .insert(connector, StoredConnector { node, rel_x, rel_y });
    }

    /// Move a node's origin, keeping its size.
    ///
    /// Has no effect until the node has reported a rect.
    pub fn move_node(&mut self, node: NodeId, x: f32, y: f32) {
        if let Some(rect) = self.node_rects.get_mut(&node) {
            rect.x = x;
            rect.y = y;
        }
    }

    /// Forget a node and every connector reported against it.
    pub fn remove_node(&mut self, node: NodeId) {
        self.node_rects.remove(&node);
        self.connector_offsets.retain(|_, c| c.node != node);
    }

    pub fn remove_connector(&mut self, connector: ConnectorId) {
        self.connector_offsets.remove(&connector);
    }

    pub fn node_rect(&self, node: NodeId) -> Option<NodeRect> {
        self.node_rects.get(&node).copied()
    }

    /// Topmost node whose rect contains `(x, y)`; later nodes draw on top.
    pub fn node_at(&self, x: f32, y: f32) -> Option<NodeId> {
        self.node_rects
            .iter()
            .filter(|(_, r)| x >= r.x && x <= r.x + r.width && y >= r.y && y <= r.y + r.height)
            .map(|(id, _)| *id)
            .max()
    }

    /// Absolute center of a connector, if both it and its node have reported.
    pub fn connector_center(&self, connector: ConnectorId) -> Option<(f32, f32)> {
        let stored = self.connector_offsets.get(&connector)?;
        let rect = self.node_rects.get(&stored.node)?;
        Some((rect.x + stored.rel_x, rect.y + stored.rel_y))
    }

    /// Iterator over absolute connector positions for hit testing
    pub fn absolute_connectors(&self) -> impl Iterator<Item = SimpleConnectorGeometry> + '_ {
        self.connector_offsets.keys().filter_map(move |&id| {
            let (x, y) = self.connector_center(id)?;
            Some(SimpleConnectorGeometry { id, x, y })
        })
    }

    /// Connector whose handle contains `(x, y)`.
    pub fn find_connector_at(&self, x: f32, y: f32, hit_radius: f32) -> Option<ConnectorId> {
        find_connector_at(x, y, self.absolute_connectors(), hit_radius)
    }

    /// Curve for an edge from `source` (an output) to `target`.
    ///
    /// `None` while either endpoint is missing geometry.
    pub fn compute_edge_curve(
        &self,
        source: ConnectorId,
        target: ConnectorId,
        rigidity: f32,
    ) -> Option<CubicBezier> {
        let start = self.connector_center(source)?;
        let end = self.connector_center(target)?;
        Some(CubicBezier::route(start, end, Direction::Output, rigidity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_cache() -> GeometryCache {
        let mut cache = GeometryCache::new();

        // Node 1 at (0, 0) with size 100x50
        cache.handle_node_rect_report(NodeId(1), 0.0, 0.0, 100.0, 50.0);
        // Node 2 at (200, 100) with size 100x50
        cache.handle_node_rect_report(NodeId(2), 200.0, 100.0, 100.0, 50.0);

        // Output on node 1 at relative (100, 25) -> absolute (100, 25)
        cache.handle_connector_report(ConnectorId(11), NodeId(1), 100.0, 25.0);
        // Input on node 2 at relative (0, 25) -> absolute (200, 125)
        cache.handle_connector_report(ConnectorId(21), NodeId(2), 0.0, 25.0);

        cache
    }

    #[test]
    fn test_connector_center_is_absolute() {
        let cache = setup_test_cache();
        assert_eq!(cache.connector_center(ConnectorId(11)), Some((100.0, 25.0)));
        assert_eq!(cache.connector_center(ConnectorId(21)), Some((200.0, 125.0)));
        assert_eq!(cache.connector_center(ConnectorId(99)), None);
    }

    #[test]
    fn test_report_overwrites_existing() {
        let mut cache = setup_test_cache();
        cache.handle_connector_report(ConnectorId(11), NodeId(1), 90.0, 30.0);
        assert_eq!(cache.connector_center(ConnectorId(11)), Some((90.0, 30.0)));
    }

    #[test]
    fn test_orphan_connector_has_no_center() {
        let mut cache = setup_test_cache();
        cache.handle_connector_report(ConnectorId(99), NodeId(9), 5.0, 5.0);
        assert_eq!(cache.connector_center(ConnectorId(99)), None);
        assert_eq!(cache.absolute_connectors().count(), 2);
    }

    #[test]
    fn test_move_node_moves_its_connectors() {
        let mut cache = setup_test_cache();
        cache.move_node(NodeId(1), 50.0, 10.0);
        assert_eq!(cache.connector_center(ConnectorId(11)), Some((150.0, 35.0)));
        assert_eq!(cache.node_rect(NodeId(1)).map(|r| r.width), Some(100.0));

        // Unknown node is ignored
        cache.move_node(NodeId(9), 1.0, 1.0);
        assert!(cache.node_rect(NodeId(9)).is_none());
    }

    #[test]
    fn test_remove_node_drops_connectors() {
        let mut cache = setup_test_cache();
        cache.remove_node(NodeId(1));
        assert!(cache.node_rect(NodeId(1)).is_none());
        assert!(!cache.connector_offsets.contains_key(&ConnectorId(11)));
        assert!(cache.connector_offsets.contains_key(&ConnectorId(21)));
    }

    #[test]
    fn test_find_connector_at() {
        let cache = setup_test_cache();
        assert_eq!(cache.find_connector_at(103.0, 27.0, 8.0), Some(ConnectorId(11)));
        assert_eq!(cache.find_connector_at(150.0, 75.0, 8.0), None);
    }

    #[test]
    fn test_node_at_prefers_topmost() {
        let mut cache = setup_test_cache();
        cache.handle_node_rect_report(NodeId(3), 50.0, 10.0, 100.0, 50.0);
        assert_eq!(cache.node_at(10.0, 10.0), Some(NodeId(1)));
        assert_eq!(cache.node_at(60.0, 20.0), Some(NodeId(3)));
        assert_eq!(cache.node_at(500.0, 500.0), None);
    }

    #[test]
    fn test_compute_edge_curve() {
        let cache = setup_test_cache();
        let curve = cache
            .compute_edge_curve(ConnectorId(11), ConnectorId(21), 60.0)
            .unwrap();
        assert_eq!(curve.p0, (100.0, 25.0));
        assert_eq!(curve.p1, (160.0, 25.0));
        assert_eq!(curve.p2, (140.0, 125.0));
        assert_eq!(curve.p3, (200.0, 125.0));

        assert!(cache
            .compute_edge_curve(ConnectorId(11), ConnectorId(99), 60.0)
            .is_none());
    }
}
