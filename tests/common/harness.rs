//! Test harness for a two-node workflow.
//!
//! Node A (data source) sits at (100, 100) with one "data" output; node B
//! (tool) sits at (400, 200) with one "data" input. Both are 150x100 and all
//! geometry is reported the way a rendered UI would report it: inputs on the
//! left edge, outputs and trigger rows on the right edge.

#![allow(dead_code)]

use super::EventTracker;
use slint_workflow_editor::{
    Category, ConnectorId, EdgeId, EditorConfig, InteractionController, NodeDefinition, NodeId,
    TriggerRowId,
};

pub const NODE_WIDTH: f32 = 150.0;
pub const NODE_HEIGHT: f32 = 100.0;

pub struct WorkflowHarness {
    pub ctrl: InteractionController,
    pub events: EventTracker,
    pub a: NodeId,
    pub b: NodeId,
    pub a_out: ConnectorId,
    pub b_in: ConnectorId,
}

impl WorkflowHarness {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let ctrl = InteractionController::new(config, Default::default());
        let events = EventTracker::new();
        ctrl.on_graph_event({
            let events = events.events.clone();
            move |e| events.borrow_mut().push(e.clone())
        });

        let a = place_node(
            &ctrl,
            Category::DataSources,
            &NodeDefinition::with_connectors("CSV Reader", &[], &["data"]),
            100.0,
            100.0,
        );
        let b = place_node(
            &ctrl,
            Category::Tools,
            &NodeDefinition::with_connectors("Web Search", &["data"], &[]),
            400.0,
            200.0,
        );
        let (a_out, b_in) = {
            let graph = ctrl.graph();
            let graph = graph.borrow();
            (graph.node(a).unwrap().outputs[0], graph.node(b).unwrap().inputs[0])
        };

        Self {
            ctrl,
            events,
            a,
            b,
            a_out,
            b_in,
        }
    }

    /// Create a node and report its layout.
    pub fn add_node(&self, category: Category, definition: &NodeDefinition, x: f32, y: f32) -> NodeId {
        place_node(&self.ctrl, category, definition, x, y)
    }

    /// Add a trigger row and report its connector on the parent's right edge.
    pub fn add_trigger_row(&self, node: NodeId) -> TriggerRowId {
        let row = self.ctrl.add_trigger_row(node).unwrap();
        let (output, index) = {
            let graph = self.ctrl.graph();
            let graph = graph.borrow();
            let n = graph.node(node).unwrap();
            (graph.trigger_row(row).unwrap().output, n.trigger_rows.len() - 1)
        };
        self.ctrl
            .handle_connector_position(output, node, NODE_WIDTH, 80.0 + 15.0 * index as f32);
        row
    }

    // === Queries ===

    pub fn connector_pos(&self, connector: ConnectorId) -> (f32, f32) {
        self.ctrl
            .cache()
            .borrow()
            .connector_center(connector)
            .unwrap()
    }

    pub fn edge_count(&self) -> usize {
        self.ctrl.graph().borrow().edge_count()
    }

    pub fn is_connected(&self, connector: ConnectorId) -> bool {
        self.ctrl
            .graph()
            .borrow()
            .connector(connector)
            .map(|c| c.connected)
            .unwrap_or(false)
    }

    pub fn edge_path(&self, edge: EdgeId) -> String {
        self.ctrl.graph().borrow().edge(edge).unwrap().svg_path()
    }

    pub fn invariants_hold(&self) -> bool {
        let problems = self.ctrl.graph().borrow().check_invariants();
        problems.is_empty()
    }

    // === Pointer helpers ===

    /// Press at `from`, move to `to`, release at `to`.
    pub fn drag(&self, from: (f32, f32), to: (f32, f32)) -> Option<EdgeId> {
        self.ctrl.pointer_down_at(from);
        self.ctrl.pointer_move(to);
        self.ctrl.pointer_up(to)
    }

    /// Draw an edge from `connector`'s handle to `to`.
    pub fn drag_from(&self, connector: ConnectorId, to: (f32, f32)) -> Option<EdgeId> {
        self.drag(self.connector_pos(connector), to)
    }
}

impl Default for WorkflowHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn place_node(
    ctrl: &InteractionController,
    category: Category,
    definition: &NodeDefinition,
    x: f32,
    y: f32,
) -> NodeId {
    let node = ctrl.create_node(category, definition, x, y).unwrap();
    ctrl.handle_node_rect(node, x, y, NODE_WIDTH, NODE_HEIGHT);

    let (inputs, outputs) = {
        let graph = ctrl.graph();
        let graph = graph.borrow();
        let n = graph.node(node).unwrap();
        (n.inputs.clone(), n.outputs.clone())
    };
    for (i, c) in inputs.iter().enumerate() {
        ctrl.handle_connector_position(*c, node, 0.0, 50.0 + 20.0 * i as f32);
    }
    for (i, c) in outputs.iter().enumerate() {
        ctrl.handle_connector_position(*c, node, NODE_WIDTH, 50.0 + 20.0 * i as f32);
    }
    node
}
