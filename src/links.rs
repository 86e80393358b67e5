//! Edge routing and rendering support.
//!
//! [`CurveRouter`] recomputes the cached curve of every edge from the current
//! connector geometry. [`EdgePathSync`] mirrors those curves into a Slint
//! `VecModel` so the UI can draw them.
//!
//! # Example
//!
//! ```ignore
//! let router = CurveRouter::new(config.curve_rigidity);
//! router.refresh_all(&mut graph, &cache);
//!
//! let model = Rc::new(VecModel::<EdgePath>::default());
//! let mut sync = EdgePathSync::new();
//! sync.bind_model(model.clone(), |id, path, color| EdgePath { id, path, color });
//! sync.sync(&graph, &registry);
//! window.set_edge_paths(ModelRc::from(model));
//! ```

use crate::graph::{Direction, EdgeId, GraphModel};
use crate::path::CubicBezier;
use crate::registry::ConnectorRegistry;
use crate::state::GeometryCache;
use slint::{Color, Model, SharedString, VecModel};
use std::rc::Rc;

/// Computes edge curves from connector centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveRouter {
    rigidity: f32,
}

impl CurveRouter {
    pub fn new(rigidity: f32) -> Self {
        Self { rigidity }
    }

    pub fn rigidity(&self) -> f32 {
        self.rigidity
    }

    /// Recompute the cached curve of every edge.
    ///
    /// Edges whose endpoints have no geometry yet get `None`. Calling this
    /// twice without a geometry change yields identical curves.
    /// Returns the number of edges that were routed.
    pub fn refresh_all(&self, graph: &mut GraphModel, cache: &GeometryCache) -> usize {
        let mut routed = 0;
        for edge in graph.edges_mut() {
            edge.path = cache.compute_edge_curve(edge.source, edge.target, self.rigidity);
            if edge.path.is_some() {
                routed += 1;
            } else {
                log::trace!("Edge {} has no geometry yet", edge.id);
            }
        }
        routed
    }

    /// Curve following the pointer while an edge is being drawn.
    pub fn provisional(&self, origin: (f32, f32), origin_direction: Direction, pointer: (f32, f32)) -> CubicBezier {
        CubicBezier::route(origin, pointer, origin_direction, self.rigidity)
    }
}

/// One rendered edge as handed to the UI.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgePathData {
    pub id: EdgeId,
    pub path_commands: String,
    pub color: Color,
}

/// Rows for every routed edge, colored by the source connector's type.
pub fn edge_paths(graph: &GraphModel, registry: &ConnectorRegistry) -> Vec<EdgePathData> {
    graph
        .edges()
        .filter_map(|edge| {
            let curve = edge.path?;
            let type_id = graph.connector(edge.source).map(|c| c.type_id.as_str())?;
            Some(EdgePathData {
                id: edge.id,
                path_commands: curve.to_svg_path(),
                color: registry.color(type_id),
            })
        })
        .collect()
}

/// Internal trait for auto-syncing to Slint models.
trait ModelSyncer {
    fn sync(&self, paths: &[EdgePathData]);
}

/// Concrete implementation of ModelSyncer for a specific row type.
struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<P, F> ModelSyncer for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(i32, SharedString, Color) -> P,
{
    fn sync(&self, paths: &[EdgePathData]) {
        // Update existing rows or add new ones
        for (i, path) in paths.iter().enumerate() {
            let item = (self.constructor)(
                path.id.0,
                SharedString::from(path.path_commands.as_str()),
                path.color,
            );
            if i < self.model.row_count() {
                self.model.set_row_data(i, item);
            } else {
                self.model.push(item);
            }
        }
        // Remove excess rows
        while self.model.row_count() > paths.len() {
            self.model.remove(self.model.row_count() - 1);
        }
    }
}

/// Mirrors routed edges into a bound Slint model.
#[derive(Default)]
pub struct EdgePathSync {
    syncer: Option<Box<dyn ModelSyncer>>,
}

impl EdgePathSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to a Slint model.
    ///
    /// `constructor` builds a row from (edge id, SVG path commands, color).
    pub fn bind_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(i32, SharedString, Color) -> P + 'static,
    {
        self.syncer = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    /// Push the current edge paths into the bound model, if any.
    pub fn sync(&self, graph: &GraphModel, registry: &ConnectorRegistry) {
        if let Some(syncer) = &self.syncer {
            syncer.sync(&edge_paths(graph, registry));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, NodeDefinition};
    use crate::graph::NodeId;
    use crate::registry::{fallback_color, ConnectorStyle};

    /// Source at (0, 0) with output at (100, 25); tool at (300, 100) with input at (0, 25).
    fn setup() -> (GraphModel, GeometryCache, EdgeId) {
        let mut graph = GraphModel::new();
        let a = graph
            .create_node(Category::DataSources, &NodeDefinition::with_connectors("A", &[], &["data"]), 0.0, 0.0)
            .unwrap();
        let b = graph
            .create_node(Category::Tools, &NodeDefinition::with_connectors("B", &["data"], &[]), 300.0, 100.0)
            .unwrap();
        let out = graph.node(a).unwrap().outputs[0];
        let inp = graph.node(b).unwrap().inputs[0];
        let edge = graph.try_connect(out, inp).unwrap();

        let mut cache = GeometryCache::new();
        cache.handle_node_rect_report(a, 0.0, 0.0, 100.0, 50.0);
        cache.handle_node_rect_report(b, 300.0, 100.0, 100.0, 50.0);
        cache.handle_connector_report(out, a, 100.0, 25.0);
        cache.handle_connector_report(inp, b, 0.0, 25.0);
        (graph, cache, edge)
    }

    #[test]
    fn test_refresh_all_routes_edges() {
        let (mut graph, cache, edge) = setup();
        assert!(graph.edge(edge).unwrap().path.is_none());

        let routed = CurveRouter::new(60.0).refresh_all(&mut graph, &cache);
        assert_eq!(routed, 1);
        assert_eq!(
            graph.edge(edge).unwrap().svg_path(),
            "M 100 25 C 160 25 240 125 300 125"
        );
    }

    #[test]
    fn test_refresh_all_is_idempotent() {
        let (mut graph, cache, edge) = setup();
        let router = CurveRouter::new(60.0);
        router.refresh_all(&mut graph, &cache);
        let first = graph.edge(edge).unwrap().path;
        router.refresh_all(&mut graph, &cache);
        assert_eq!(graph.edge(edge).unwrap().path, first);
    }

    #[test]
    fn test_refresh_all_without_geometry() {
        let (mut graph, mut cache, edge) = setup();
        cache.remove_node(NodeId(1));
        let routed = CurveRouter::new(60.0).refresh_all(&mut graph, &cache);
        assert_eq!(routed, 0);
        assert_eq!(graph.edge(edge).unwrap().svg_path(), "");
    }

    #[test]
    fn test_provisional_follows_pointer() {
        let router = CurveRouter::new(60.0);
        let curve = router.provisional((300.0, 125.0), Direction::Input, (150.0, 40.0));
        assert_eq!(curve.p1, (240.0, 125.0));
        assert_eq!(curve.p3, (150.0, 40.0));
    }

    #[test]
    fn test_edge_paths_colored_by_source_type() {
        let (mut graph, cache, edge) = setup();
        CurveRouter::new(60.0).refresh_all(&mut graph, &cache);

        let empty = ConnectorRegistry::new();
        let rows = edge_paths(&graph, &empty);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, edge);
        assert_eq!(rows[0].color, fallback_color());

        let mut registry = ConnectorRegistry::new();
        registry.register(
            "data",
            ConnectorStyle {
                display_label: "Data".into(),
                color: Color::from_rgb_u8(79, 195, 247),
            },
        );
        assert_eq!(edge_paths(&graph, &registry)[0].color, Color::from_rgb_u8(79, 195, 247));
    }

    #[test]
    fn test_sync_updates_bound_model() {
        let (mut graph, cache, edge) = setup();
        CurveRouter::new(60.0).refresh_all(&mut graph, &cache);
        let registry = ConnectorRegistry::new();

        let model = Rc::new(VecModel::<(i32, SharedString, Color)>::default());
        let mut sync = EdgePathSync::new();
        sync.sync(&graph, &registry);
        assert_eq!(model.row_count(), 0);
        sync.bind_model(model.clone(), |id, path, color| (id, path, color));

        sync.sync(&graph, &registry);
        assert_eq!(model.row_count(), 1);
        let (id, path, _) = model.row_data(0).unwrap();
        assert_eq!(id, edge.0);
        assert!(path.starts_with("M 100 25 C"));

        graph.remove_edge(edge);
        sync.sync(&graph, &registry);
        assert_eq!(model.row_count(), 0);
    }
}
