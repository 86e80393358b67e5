//! Pointer-driven interaction controller.
//!
//! [`InteractionController`] owns the graph, the geometry cache and the drag
//! state, and turns raw pointer events into graph mutations and path
//! refreshes. It is cheap to clone; clones share all state, so one can be
//! moved into each UI callback.
//!
//! # Example
//!
//! ```ignore
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = InteractionController::new(EditorConfig::default(), registry);
//!
//!     window.on_node_rect_changed(ctrl.node_rect_callback());
//!     window.on_connector_position_changed(ctrl.connector_position_callback());
//!
//!     window.on_pointer_down({
//!         let ctrl = ctrl.clone();
//!         move |x, y| { ctrl.pointer_down_at((x, y)); }
//!     });
//!     window.on_pointer_move({
//!         let ctrl = ctrl.clone();
//!         move |x, y| ctrl.pointer_move((x, y))
//!     });
//!     window.on_pointer_up({
//!         let ctrl = ctrl.clone();
//!         move |x, y| { ctrl.pointer_up((x, y)); }
//!     });
//!
//!     window.run().unwrap();
//! }
//! ```

use crate::catalog::{parse_drop_payload, Catalog, Category, NodeDefinition, ParamValue};
use crate::config::EditorConfig;
use crate::error::{GraphError, Rejection};
use crate::graph::{
    ConnectorId, Direction, EdgeId, GraphEvent, GraphModel, NodeId, ParamOwner, TriggerRowId,
};
use crate::hit_test::{find_edge_at, find_snap_target, is_compatible, SimpleEdgeGeometry};
use crate::links::{CurveRouter, EdgePathSync};
use crate::path::CubicBezier;
use crate::registry::ConnectorRegistry;
use crate::state::GeometryCache;
use slint::{Color, SharedString, VecModel};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Vertical distance between the pointer and the edge popup anchor.
pub const POPUP_OFFSET: f32 = 12.0;

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The body of a node, away from its connectors and form fields.
    NodeBody(NodeId),
    /// An input widget inside a node; never starts a drag.
    FormField(NodeId),
    /// A connector or its visual handle.
    Connector(ConnectorId),
    /// Empty canvas.
    Canvas,
}

/// Drag state. Only one drag is active at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    DraggingNode {
        node: NodeId,
        /// Pointer position minus node origin at pointer-down.
        offset: (f32, f32),
    },
    DrawingEdge {
        origin: ConnectorId,
        snap: Option<ConnectorId>,
        provisional: Option<CubicBezier>,
    },
}

impl InteractionState {
    fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "Idle",
            InteractionState::DraggingNode { .. } => "DraggingNode",
            InteractionState::DrawingEdge { .. } => "DrawingEdge",
        }
    }
}

/// Hover popup shown over an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePopup {
    pub edge: EdgeId,
    /// Display label of the edge's connector type.
    pub label: String,
    /// Top-left of the popup, just below the pointer.
    pub anchor: (f32, f32),
}

type Listener = Box<dyn Fn(&GraphEvent)>;

/// Drives node placement, node dragging and edge drawing.
///
/// Graph events produced by any operation are delivered to subscribers
/// registered with [`on_graph_event`](Self::on_graph_event) after the
/// operation has completed, so a subscriber may read the graph freely.
#[derive(Clone)]
pub struct InteractionController {
    graph: Rc<RefCell<GraphModel>>,
    cache: Rc<RefCell<GeometryCache>>,
    registry: Rc<RefCell<ConnectorRegistry>>,
    config: Rc<EditorConfig>,
    router: CurveRouter,
    state: Rc<RefCell<InteractionState>>,
    snapping: Rc<RefCell<BTreeSet<ConnectorId>>>,
    popup: Rc<RefCell<Option<EdgePopup>>>,
    listeners: Rc<RefCell<Vec<Listener>>>,
    edge_paths: Rc<RefCell<EdgePathSync>>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(EditorConfig::default(), ConnectorRegistry::new())
    }
}

impl InteractionController {
    pub fn new(config: EditorConfig, registry: ConnectorRegistry) -> Self {
        Self {
            graph: Rc::new(RefCell::new(GraphModel::from_config(&config))),
            cache: Rc::new(RefCell::new(GeometryCache::new())),
            registry: Rc::new(RefCell::new(registry)),
            router: CurveRouter::new(config.curve_rigidity),
            config: Rc::new(config),
            state: Rc::new(RefCell::new(InteractionState::Idle)),
            snapping: Rc::new(RefCell::new(BTreeSet::new())),
            popup: Rc::new(RefCell::new(None)),
            listeners: Rc::new(RefCell::new(Vec::new())),
            edge_paths: Rc::new(RefCell::new(EdgePathSync::new())),
        }
    }

    // === Accessors ===

    pub fn graph(&self) -> Rc<RefCell<GraphModel>> {
        self.graph.clone()
    }

    /// Shared layout cache. Report layout through
    /// [`handle_node_rect`](Self::handle_node_rect) and
    /// [`handle_connector_position`](Self::handle_connector_position) so that
    /// edge paths follow; direct writes need a [`refresh_paths`](Self::refresh_paths).
    pub fn cache(&self) -> Rc<RefCell<GeometryCache>> {
        self.cache.clone()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> Rc<RefCell<ConnectorRegistry>> {
        self.registry.clone()
    }

    /// Snapshot of the current drag state.
    pub fn state(&self) -> InteractionState {
        self.state.borrow().clone()
    }

    pub fn is_idle(&self) -> bool {
        matches!(*self.state.borrow(), InteractionState::Idle)
    }

    /// Whether a connector currently shows the transient "snapping" marker.
    pub fn is_snapping(&self, connector: ConnectorId) -> bool {
        self.snapping.borrow().contains(&connector)
    }

    /// Connectors currently showing the "snapping" marker, in id order.
    pub fn snapping_markers(&self) -> Vec<ConnectorId> {
        self.snapping.borrow().iter().copied().collect()
    }

    /// SVG path of the curve following the pointer, while an edge is drawn.
    pub fn provisional_path(&self) -> Option<String> {
        match &*self.state.borrow() {
            InteractionState::DrawingEdge {
                provisional: Some(curve),
                ..
            } => Some(curve.to_svg_path()),
            _ => None,
        }
    }

    pub fn popup(&self) -> Option<EdgePopup> {
        self.popup.borrow().clone()
    }

    // === Subscriptions ===

    /// Subscribe to graph events.
    ///
    /// Subscribers must not subscribe further listeners from inside the callback.
    pub fn on_graph_event(&self, listener: impl Fn(&GraphEvent) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Mirror edge paths into a Slint model after every refresh.
    ///
    /// `constructor` builds a row from (edge id, SVG path commands, color).
    pub fn bind_edge_paths<P, F>(&self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(i32, SharedString, Color) -> P + 'static,
    {
        self.edge_paths.borrow_mut().bind_model(model, constructor);
        self.sync_edge_paths();
    }

    fn dispatch(&self) {
        let events = self.graph.borrow_mut().drain_events();
        if events.is_empty() {
            return;
        }
        let listeners = self.listeners.borrow();
        for event in &events {
            for listener in listeners.iter() {
                listener(event);
            }
        }
    }

    fn set_state(&self, next: InteractionState) {
        let mut state = self.state.borrow_mut();
        if state.name() != next.name() {
            log::debug!("Interaction: {} -> {}", state.name(), next.name());
        }
        *state = next;
    }

    // === Graph operations ===

    /// Create a node at `(x, y)`.
    pub fn create_node(
        &self,
        category: Category,
        definition: &NodeDefinition,
        x: f32,
        y: f32,
    ) -> Result<NodeId, GraphError> {
        let result = self.graph.borrow_mut().create_node(category, definition, x, y);
        self.dispatch();
        result
    }

    /// Handle a toolbox drop carrying a `tab::Display Text` payload.
    ///
    /// Returns `Ok(None)` if the payload does not name a catalog entry.
    pub fn drop_catalog_item(
        &self,
        catalog: &Catalog,
        payload: &str,
        pos: (f32, f32),
    ) -> Result<Option<NodeId>, GraphError> {
        let Some((category, name)) = parse_drop_payload(payload) else {
            log::warn!("Ignoring drop with unrecognized payload '{}'", payload);
            return Ok(None);
        };
        let Some(definition) = catalog.find(category, name) else {
            log::warn!("No {} entry named '{}'", category, name);
            return Ok(None);
        };
        self.create_node(category, definition, pos.0, pos.1).map(Some)
    }

    pub fn add_trigger_row(&self, node: NodeId) -> Result<TriggerRowId, GraphError> {
        let result = self.graph.borrow_mut().add_trigger_row(node);
        self.dispatch();
        result
    }

    pub fn set_parameter(
        &self,
        owner: ParamOwner,
        index: usize,
        value: ParamValue,
    ) -> Result<(), GraphError> {
        let result = self.graph.borrow_mut().set_parameter(owner, index, value);
        self.dispatch();
        result
    }

    /// Connect two connectors directly, bypassing pointer interaction.
    pub fn connect(&self, a: ConnectorId, b: ConnectorId) -> Result<EdgeId, Rejection> {
        let result = self.graph.borrow_mut().try_connect(a, b);
        self.dispatch();
        if result.is_ok() {
            self.refresh_paths();
        }
        result
    }

    /// Node delete button.
    pub fn delete_node(&self, node: NodeId) -> Result<(), GraphError> {
        self.graph.borrow_mut().remove_node(node)?;
        self.cache.borrow_mut().remove_node(node);
        self.after_removal();
        Ok(())
    }

    /// Trigger row delete button.
    pub fn delete_trigger_row(&self, row: TriggerRowId) -> Result<(), GraphError> {
        let output = self.graph.borrow().trigger_row(row).map(|r| r.output);
        self.graph.borrow_mut().remove_trigger_row(row)?;
        if let Some(output) = output {
            self.cache.borrow_mut().remove_connector(output);
        }
        self.after_removal();
        Ok(())
    }

    /// Remove one edge. Returns `false` if it did not exist.
    pub fn delete_edge(&self, edge: EdgeId) -> bool {
        let removed = self.graph.borrow_mut().remove_edge(edge);
        if removed {
            self.after_removal();
        }
        removed
    }

    fn after_removal(&self) {
        let stale_popup = {
            let graph = self.graph.borrow();
            self.popup
                .borrow()
                .as_ref()
                .is_some_and(|p| graph.edge(p.edge).is_none())
        };
        if stale_popup {
            *self.popup.borrow_mut() = None;
        }

        let drag_lost = {
            let graph = self.graph.borrow();
            match &*self.state.borrow() {
                InteractionState::Idle => false,
                InteractionState::DraggingNode { node, .. } => graph.node(*node).is_none(),
                InteractionState::DrawingEdge { origin, .. } => graph.connector(*origin).is_none(),
            }
        };
        if drag_lost {
            log::debug!("Drag target was removed, cancelling drag");
            self.cancel_drag();
        }

        self.dispatch();
        self.refresh_paths();
    }

    // === Paths ===

    /// Recompute every edge path and push them to the bound model.
    pub fn refresh_paths(&self) {
        {
            let cache = self.cache.borrow();
            self.router.refresh_all(&mut self.graph.borrow_mut(), &cache);
        }
        self.sync_edge_paths();
    }

    fn sync_edge_paths(&self) {
        self.edge_paths
            .borrow()
            .sync(&self.graph.borrow(), &self.registry.borrow());
    }

    // === Layout reports ===

    /// Handle node-rect-changed.
    pub fn handle_node_rect(&self, node: NodeId, x: f32, y: f32, width: f32, height: f32) {
        self.cache
            .borrow_mut()
            .handle_node_rect_report(node, x, y, width, height);
        self.refresh_paths();
    }

    /// Handle connector-position-changed. Offsets are relative to `node`.
    pub fn handle_connector_position(&self, connector: ConnectorId, node: NodeId, rel_x: f32, rel_y: f32) {
        self.cache
            .borrow_mut()
            .handle_connector_report(connector, node, rel_x, rel_y);
        self.refresh_paths();
    }

    /// A node changed size (e.g. a trigger row was added or text wrapped).
    pub fn node_resized(&self, node: NodeId, width: f32, height: f32) {
        if let Some(rect) = self.cache.borrow_mut().node_rects.get_mut(&node) {
            rect.width = width;
            rect.height = height;
        }
        self.refresh_paths();
    }

    /// The canvas changed size.
    pub fn canvas_resized(&self, width: f32, height: f32) {
        log::trace!("Canvas resized to {}x{}", width, height);
        self.refresh_paths();
    }

    /// Callback for `node-rect-changed`: `(node_id, x, y, width, height)`.
    pub fn node_rect_callback(&self) -> impl Fn(i32, f32, f32, f32, f32) + Clone {
        let ctrl = self.clone();
        move |id, x, y, w, h| ctrl.handle_node_rect(NodeId(id), x, y, w, h)
    }

    /// Callback for `connector-position-changed`: `(connector_id, node_id, rel_x, rel_y)`.
    pub fn connector_position_callback(&self) -> impl Fn(i32, i32, f32, f32) + Clone {
        let ctrl = self.clone();
        move |connector, node, x, y| {
            ctrl.handle_connector_position(ConnectorId(connector), NodeId(node), x, y)
        }
    }

    // === Pointer state machine ===

    /// Resolve what lies under `pos`: a connector handle, then a node body,
    /// then the canvas.
    pub fn target_at(&self, pos: (f32, f32)) -> PointerTarget {
        let cache = self.cache.borrow();
        if let Some(c) = cache.find_connector_at(pos.0, pos.1, self.config.connector_hit_radius) {
            return PointerTarget::Connector(c);
        }
        match cache.node_at(pos.0, pos.1) {
            Some(node) => PointerTarget::NodeBody(node),
            None => PointerTarget::Canvas,
        }
    }

    /// Pointer-down at a canvas position, resolved with [`target_at`](Self::target_at).
    pub fn pointer_down_at(&self, pos: (f32, f32)) -> bool {
        self.pointer_down(self.target_at(pos), pos)
    }

    /// Pointer-down on `target`. Returns `true` if a drag started.
    pub fn pointer_down(&self, target: PointerTarget, pos: (f32, f32)) -> bool {
        if !self.is_idle() {
            return false;
        }
        match target {
            PointerTarget::NodeBody(node) => {
                let origin = self.graph.borrow().node(node).map(|n| (n.x, n.y));
                let Some((x, y)) = origin else {
                    return false;
                };
                self.set_state(InteractionState::DraggingNode {
                    node,
                    offset: (pos.0 - x, pos.1 - y),
                });
                true
            }
            PointerTarget::Connector(origin) => {
                let direction = self.graph.borrow().connector(origin).map(|c| c.direction);
                let Some(direction) = direction else {
                    return false;
                };
                if direction == Direction::Input {
                    self.snapping.borrow_mut().insert(origin);
                }
                self.set_state(InteractionState::DrawingEdge {
                    origin,
                    snap: None,
                    provisional: None,
                });
                true
            }
            PointerTarget::FormField(_) | PointerTarget::Canvas => false,
        }
    }

    /// Pointer-move. Never mutates the graph's edge set.
    pub fn pointer_move(&self, pos: (f32, f32)) {
        let state = self.state();
        match state {
            InteractionState::Idle => {}
            InteractionState::DraggingNode { node, offset } => {
                let (x, y) = (pos.0 - offset.0, pos.1 - offset.1);
                if self.graph.borrow_mut().move_node(node, x, y).is_err() {
                    self.cancel_drag();
                    return;
                }
                self.cache.borrow_mut().move_node(node, x, y);
                self.refresh_paths();
            }
            InteractionState::DrawingEdge { origin, .. } => self.update_edge_drag(origin, pos),
        }
    }

    fn update_edge_drag(&self, origin: ConnectorId, pos: (f32, f32)) {
        let graph = self.graph.borrow();
        let cache = self.cache.borrow();
        let Some(origin_connector) = graph.connector(origin) else {
            return;
        };

        let candidates = graph
            .connectors()
            .filter_map(|c| cache.connector_center(c.id).map(|center| (c, center)));
        let snap = find_snap_target(pos, origin_connector, candidates, self.config.snap_threshold);
        log::trace!("Snap at ({}, {}): {:?}", pos.0, pos.1, snap);

        let end = snap.and_then(|s| cache.connector_center(s)).unwrap_or(pos);
        let provisional = cache
            .connector_center(origin)
            .map(|start| self.router.provisional(start, origin_connector.direction, end));

        {
            let mut markers = self.snapping.borrow_mut();
            markers.clear();
            if origin_connector.direction == Direction::Input {
                markers.insert(origin);
            }
            if let Some(s) = snap {
                if graph.connector(s).is_some_and(|c| c.direction == Direction::Input) {
                    markers.insert(s);
                }
            }
        }

        *self.state.borrow_mut() = InteractionState::DrawingEdge {
            origin,
            snap,
            provisional,
        };
    }

    /// Pointer-up. Returns the edge created by an edge drag, if any.
    pub fn pointer_up(&self, pos: (f32, f32)) -> Option<EdgeId> {
        match self.state() {
            InteractionState::Idle => None,
            InteractionState::DraggingNode { .. } => {
                self.set_state(InteractionState::Idle);
                self.refresh_paths();
                None
            }
            InteractionState::DrawingEdge { origin, snap, .. } => {
                let target = snap.or_else(|| self.compatible_connector_at(origin, pos));
                self.snapping.borrow_mut().clear();
                self.set_state(InteractionState::Idle);

                let target = target?;
                let pair = self.graph.borrow().normalize_direction(origin, target);
                let (source, target) = pair.unwrap_or((origin, target));
                let result = self.connect(source, target);
                if let Err(reason) = &result {
                    log::debug!("Edge drag discarded: {}", reason);
                }
                result.ok()
            }
        }
    }

    fn compatible_connector_at(&self, origin: ConnectorId, pos: (f32, f32)) -> Option<ConnectorId> {
        let under = self.cache.borrow().find_connector_at(
            pos.0,
            pos.1,
            self.config.connector_hit_radius,
        )?;
        let graph = self.graph.borrow();
        let compatible = is_compatible(graph.connector(origin)?, graph.connector(under)?);
        compatible.then_some(under)
    }

    /// Abandon the current drag without touching the graph.
    pub fn cancel_drag(&self) {
        self.snapping.borrow_mut().clear();
        self.set_state(InteractionState::Idle);
    }

    // === Edge hover popup ===

    /// Pointer hover over the canvas. Updates and returns the edge popup.
    pub fn hover(&self, pos: (f32, f32)) -> Option<EdgePopup> {
        let popup = {
            let graph = self.graph.borrow();
            let edges = graph.edges().filter_map(|e| {
                e.path.map(|curve| SimpleEdgeGeometry { id: e.id, curve })
            });
            find_edge_at(
                pos.0,
                pos.1,
                edges,
                self.config.edge_hover_distance,
                self.config.hit_samples,
            )
            .and_then(|id| {
                let edge = graph.edge(id)?;
                let type_id = &graph.connector(edge.source)?.type_id;
                Some(EdgePopup {
                    edge: id,
                    label: self.registry.borrow().lookup(type_id).display_label,
                    anchor: (pos.0, pos.1 + POPUP_OFFSET),
                })
            })
        };
        *self.popup.borrow_mut() = popup.clone();
        popup
    }

    pub fn clear_hover(&self) {
        *self.popup.borrow_mut() = None;
    }

    /// The popup's delete button. Returns `false` if no edge is hovered.
    pub fn delete_hovered_edge(&self) -> bool {
        let Some(popup) = self.popup.borrow_mut().take() else {
            return false;
        };
        self.delete_edge(popup.edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A at (0, 0) with output at (100, 25); B at (300, 0) with input at (0, 25).
    fn setup() -> (InteractionController, ConnectorId, ConnectorId) {
        let ctrl = InteractionController::default();
        let a = ctrl
            .create_node(
                Category::DataSources,
                &NodeDefinition::with_connectors("A", &[], &["data"]),
                0.0,
                0.0,
            )
            .unwrap();
        let b = ctrl
            .create_node(
                Category::Tools,
                &NodeDefinition::with_connectors("B", &["data"], &[]),
                300.0,
                0.0,
            )
            .unwrap();
        let (out, inp) = {
            let graph = ctrl.graph();
            let graph = graph.borrow();
            (graph.node(a).unwrap().outputs[0], graph.node(b).unwrap().inputs[0])
        };
        ctrl.handle_node_rect(a, 0.0, 0.0, 100.0, 50.0);
        ctrl.handle_node_rect(b, 300.0, 0.0, 100.0, 50.0);
        ctrl.handle_connector_position(out, a, 100.0, 25.0);
        ctrl.handle_connector_position(inp, b, 0.0, 25.0);
        (ctrl, out, inp)
    }

    #[test]
    fn test_pointer_down_dispatch() {
        let (ctrl, out, _) = setup();
        assert!(!ctrl.pointer_down(PointerTarget::Canvas, (500.0, 500.0)));
        assert!(!ctrl.pointer_down(PointerTarget::FormField(NodeId(1)), (10.0, 10.0)));
        assert!(ctrl.is_idle());

        assert_eq!(ctrl.target_at((101.0, 26.0)), PointerTarget::Connector(out));
        assert_eq!(ctrl.target_at((50.0, 25.0)), PointerTarget::NodeBody(NodeId(1)));
        assert_eq!(ctrl.target_at((200.0, 200.0)), PointerTarget::Canvas);
    }

    #[test]
    fn test_only_one_drag_at_a_time() {
        let (ctrl, out, _) = setup();
        assert!(ctrl.pointer_down(PointerTarget::Connector(out), (100.0, 25.0)));
        assert!(!ctrl.pointer_down(PointerTarget::NodeBody(NodeId(1)), (50.0, 25.0)));
        assert!(matches!(ctrl.state(), InteractionState::DrawingEdge { .. }));
    }

    #[test]
    fn test_node_drag_moves_node_and_refreshes() {
        let (ctrl, out, inp) = setup();
        ctrl.connect(out, inp).unwrap();

        assert!(ctrl.pointer_down_at((50.0, 20.0)));
        assert_eq!(
            ctrl.state(),
            InteractionState::DraggingNode {
                node: NodeId(1),
                offset: (50.0, 20.0)
            }
        );
        ctrl.pointer_move((70.0, 60.0));

        let graph = ctrl.graph();
        let node = graph.borrow().node(NodeId(1)).cloned().unwrap();
        assert_eq!((node.x, node.y), (20.0, 40.0));
        assert_eq!(ctrl.cache().borrow().connector_center(out), Some((120.0, 65.0)));
        let path = graph.borrow().edges().next().unwrap().svg_path();
        assert!(path.starts_with("M 120 65 C"));

        assert_eq!(ctrl.pointer_up((70.0, 60.0)), None);
        assert!(ctrl.is_idle());
    }

    #[test]
    fn test_snap_commits_edge() {
        let (ctrl, out, inp) = setup();
        ctrl.pointer_down(PointerTarget::Connector(out), (100.0, 25.0));
        ctrl.pointer_move((290.0, 30.0));

        match ctrl.state() {
            InteractionState::DrawingEdge { snap, provisional, .. } => {
                assert_eq!(snap, Some(inp));
                assert_eq!(provisional.unwrap().p3, (300.0, 25.0));
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert!(ctrl.is_snapping(inp));
        assert!(!ctrl.is_snapping(out));

        let edge = ctrl.pointer_up((290.0, 30.0)).unwrap();
        let graph = ctrl.graph();
        let graph = graph.borrow();
        assert_eq!(graph.edge(edge).unwrap().source, out);
        assert!(graph.connector(inp).unwrap().connected);
        assert!(ctrl.snapping_markers().is_empty());
        assert!(ctrl.provisional_path().is_none());
    }

    #[test]
    fn test_drag_from_input_marks_origin_and_normalizes() {
        let (ctrl, out, inp) = setup();
        ctrl.pointer_down(PointerTarget::Connector(inp), (300.0, 25.0));
        assert!(ctrl.is_snapping(inp));

        ctrl.pointer_move((105.0, 25.0));
        assert!(ctrl.is_snapping(inp));
        let provisional = ctrl.provisional_path().unwrap();
        assert!(provisional.starts_with("M 300 25 C 240 25"));

        let edge = ctrl.pointer_up((105.0, 25.0)).unwrap();
        let graph = ctrl.graph();
        let e = graph.borrow().edge(edge).cloned().unwrap();
        assert_eq!((e.source, e.target), (out, inp));
        assert!(!ctrl.is_snapping(inp));
    }

    #[test]
    fn test_release_far_away_cancels() {
        let (ctrl, out, _) = setup();
        ctrl.pointer_down(PointerTarget::Connector(out), (100.0, 25.0));
        ctrl.pointer_move((200.0, 200.0));
        assert!(ctrl.provisional_path().is_some());

        assert_eq!(ctrl.pointer_up((200.0, 200.0)), None);
        assert_eq!(ctrl.graph().borrow().edge_count(), 0);
        assert!(ctrl.provisional_path().is_none());
        assert!(ctrl.is_idle());
    }

    #[test]
    fn test_release_on_handle_without_move_connects() {
        let (ctrl, out, inp) = setup();
        ctrl.pointer_down(PointerTarget::Connector(out), (100.0, 25.0));
        // No pointer-move: falls back to the connector under the release point
        let edge = ctrl.pointer_up((302.0, 27.0));
        assert!(edge.is_some());
        assert!(ctrl.graph().borrow().connector(inp).unwrap().connected);
    }

    #[test]
    fn test_rejected_commit_emits_event() {
        let (ctrl, out, _) = setup();
        let rejected = Rc::new(RefCell::new(Vec::new()));
        ctrl.on_graph_event({
            let rejected = rejected.clone();
            move |e| {
                if let GraphEvent::EdgeRejected(reason) = e {
                    rejected.borrow_mut().push(reason.clone());
                }
            }
        });

        let edge = ctrl.connect(out, out);
        assert_eq!(edge, Err(Rejection::SelfConnection));
        assert_eq!(*rejected.borrow(), vec![Rejection::SelfConnection]);
    }

    #[test]
    fn test_hover_and_delete_edge() {
        let (ctrl, out, inp) = setup();
        let edge = ctrl.connect(out, inp).unwrap();

        assert!(ctrl.hover((10.0, 300.0)).is_none());
        let popup = ctrl.hover((200.0, 27.0)).unwrap();
        assert_eq!(popup.edge, edge);
        assert_eq!(popup.label, "data");
        assert_eq!(popup.anchor, (200.0, 39.0));

        assert!(ctrl.delete_hovered_edge());
        assert!(ctrl.popup().is_none());
        assert!(!ctrl.graph().borrow().connector(inp).unwrap().connected);
        assert!(!ctrl.delete_hovered_edge());
    }

    #[test]
    fn test_delete_node_during_drag_cancels() {
        let (ctrl, out, _) = setup();
        ctrl.pointer_down(PointerTarget::Connector(out), (100.0, 25.0));
        ctrl.delete_node(NodeId(1)).unwrap();
        assert!(ctrl.is_idle());
        assert!(ctrl.cache().borrow().connector_center(out).is_none());
    }

    #[test]
    fn test_drop_catalog_item() {
        let (ctrl, _, _) = setup();
        let mut catalog = Catalog::new();
        catalog.insert(
            Category::Tools,
            NodeDefinition::with_connectors("Web Search", &["text"], &["data"]),
        );

        let node = ctrl
            .drop_catalog_item(&catalog, "tools::Web Search", (40.0, 80.0))
            .unwrap()
            .unwrap();
        let graph = ctrl.graph();
        let n = graph.borrow().node(node).cloned().unwrap();
        assert_eq!((n.x, n.y), (40.0, 80.0));
        assert_eq!(n.category, Category::Tools);

        assert_eq!(ctrl.drop_catalog_item(&catalog, "tools::Missing", (0.0, 0.0)), Ok(None));
        assert_eq!(ctrl.drop_catalog_item(&catalog, "garbage", (0.0, 0.0)), Ok(None));
    }

    #[test]
    fn test_bound_model_follows_edges() {
        let (ctrl, out, inp) = setup();
        let model = Rc::new(VecModel::<(i32, SharedString, Color)>::default());
        ctrl.bind_edge_paths(model.clone(), |id, path, color| (id, path, color));

        let edge = ctrl.connect(out, inp).unwrap();
        assert_eq!(slint::Model::row_count(&*model), 1);

        ctrl.delete_edge(edge);
        assert_eq!(slint::Model::row_count(&*model), 0);
    }
}
