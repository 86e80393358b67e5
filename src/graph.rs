use crate::catalog::{Category, NodeDefinition, ParamValue, TRIGGER_TYPE};
use crate::config::EditorConfig;
use crate::error::{GraphError, Rejection};
use crate::path::CubicBezier;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub i32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a node on the canvas.
    NodeId
);
id_type!(
    /// Identifier of an input or output connector.
    ConnectorId
);
id_type!(
    /// Identifier of an edge.
    EdgeId
);
id_type!(
    /// Identifier of a trigger row instance.
    TriggerRowId
);

/// Which way data flows through a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Input => Direction::Output,
            Direction::Output => Direction::Input,
        }
    }
}

/// What a connector is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorOwner {
    Node(NodeId),
    TriggerRow { node: NodeId, row: TriggerRowId },
}

impl ConnectorOwner {
    /// The node on the canvas that displays this connector.
    pub fn node(&self) -> NodeId {
        match *self {
            ConnectorOwner::Node(node) => node,
            ConnectorOwner::TriggerRow { node, .. } => node,
        }
    }
}

/// Addresses the parameter list of a node or of a trigger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamOwner {
    Node(NodeId),
    TriggerRow(TriggerRowId),
}

impl fmt::Display for ParamOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamOwner::Node(id) => write!(f, "node {}", id),
            ParamOwner::TriggerRow(id) => write!(f, "trigger row {}", id),
        }
    }
}

/// A typed attachment point.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub id: ConnectorId,
    pub owner: ConnectorOwner,
    pub direction: Direction,
    pub type_id: String,
    /// Only meaningful for inputs: true iff at least one edge terminates here.
    pub connected: bool,
}

/// An instance of a node's trigger template.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRow {
    pub id: TriggerRowId,
    pub node: NodeId,
    pub params: Vec<ParamValue>,
    pub output: ConnectorId,
}

/// A node placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub category: Category,
    pub definition: NodeDefinition,
    pub inputs: Vec<ConnectorId>,
    pub outputs: Vec<ConnectorId>,
    pub trigger_rows: Vec<TriggerRowId>,
    pub params: Vec<ParamValue>,
    pub x: f32,
    pub y: f32,
}

/// A directed link from an output connector to an input connector.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: ConnectorId,
    pub target: ConnectorId,
    /// Last routed curve; `None` until both endpoints have reported geometry.
    pub path: Option<CubicBezier>,
}

impl Edge {
    /// SVG path commands of the cached curve (empty if not routed yet).
    pub fn svg_path(&self) -> String {
        self.path.map(|p| p.to_svg_path()).unwrap_or_default()
    }

    pub fn touches(&self, connector: ConnectorId) -> bool {
        self.source == connector || self.target == connector
    }
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    NodeCreated(NodeId),
    NodeRemoved(NodeId),
    TriggerRowAdded { node: NodeId, row: TriggerRowId },
    TriggerRowRemoved { node: NodeId, row: TriggerRowId },
    EdgeCreated(EdgeId),
    EdgeRemoved(EdgeId),
    EdgeRejected(Rejection),
    ParameterChanged { owner: ParamOwner, index: usize },
}

// ============================================================================
// Connection Validation Framework
// ============================================================================

/// Result of connection validation with optional rejection reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Connection is allowed
    Valid,
    /// Connection is refused with a reason
    Invalid(Rejection),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Combine two results (AND logic): returns first error if any
    pub fn and(self, other: ValidationResult) -> ValidationResult {
        match self {
            ValidationResult::Valid => other,
            invalid => invalid,
        }
    }

    pub fn into_result(self) -> Result<(), Rejection> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(reason) => Err(reason),
        }
    }
}

/// A rule deciding whether `source` may be connected to `target`.
///
/// Validators receive the pair already ordered so that `source` is the one
/// that would be the edge's output end (when directions differ at all).
///
/// # Example
///
/// ```ignore
/// struct NoTriggersIntoTools;
///
/// impl ConnectionValidator for NoTriggersIntoTools {
///     fn validate(&self, source: &Connector, target: &Connector, graph: &GraphModel) -> ValidationResult {
///         let tool = graph.node(target.owner.node()).map(|n| n.category) == Some(Category::Tools);
///         if source.type_id == "trigger" && tool {
///             ValidationResult::Invalid(Rejection::Custom("tools cannot be triggered".into()))
///         } else {
///             ValidationResult::Valid
///         }
///     }
/// }
/// ```
pub trait ConnectionValidator {
    fn validate(&self, source: &Connector, target: &Connector, graph: &GraphModel)
        -> ValidationResult;
}

/// The structural rules every edge must satisfy:
/// 1. Connectors must be on different nodes
/// 2. One must be an input, the other an output
/// 3. Type ids must match exactly
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicValidator;

impl ConnectionValidator for BasicValidator {
    fn validate(
        &self,
        source: &Connector,
        target: &Connector,
        _graph: &GraphModel,
    ) -> ValidationResult {
        if source.id == target.id || source.owner.node() == target.owner.node() {
            return ValidationResult::Invalid(Rejection::SelfConnection);
        }
        if source.direction == target.direction {
            return ValidationResult::Invalid(Rejection::DirectionMismatch);
        }
        if source.type_id != target.type_id {
            return ValidationResult::Invalid(Rejection::TypeMismatch {
                source_type: source.type_id.clone(),
                target_type: target.type_id.clone(),
            });
        }
        ValidationResult::Valid
    }
}

/// Caps the number of edges terminating at a single input.
#[derive(Clone, Copy, Debug)]
pub struct FanInValidator {
    pub max: usize,
}

impl ConnectionValidator for FanInValidator {
    fn validate(
        &self,
        _source: &Connector,
        target: &Connector,
        graph: &GraphModel,
    ) -> ValidationResult {
        if graph.incoming_count(target.id) >= self.max {
            ValidationResult::Invalid(Rejection::FanInLimit {
                connector: target.id,
                max: self.max,
            })
        } else {
            ValidationResult::Valid
        }
    }
}

/// Refuses a second edge between the same output and input.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDuplicatesValidator;

impl ConnectionValidator for NoDuplicatesValidator {
    fn validate(
        &self,
        source: &Connector,
        target: &Connector,
        graph: &GraphModel,
    ) -> ValidationResult {
        let duplicate = graph
            .edges()
            .any(|e| e.source == source.id && e.target == target.id);
        if duplicate {
            ValidationResult::Invalid(Rejection::DuplicateEdge)
        } else {
            ValidationResult::Valid
        }
    }
}

/// Runs validators in order and returns the first rejection.
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<Box<dyn ConnectionValidator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<V: ConnectionValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn push(&mut self, validator: Box<dyn ConnectionValidator>) {
        self.validators.push(validator);
    }
}

impl ConnectionValidator for CompositeValidator {
    fn validate(
        &self,
        source: &Connector,
        target: &Connector,
        graph: &GraphModel,
    ) -> ValidationResult {
        for v in &self.validators {
            let result = v.validate(source, target, graph);
            if !result.is_valid() {
                return result;
            }
        }
        ValidationResult::Valid
    }
}

// ============================================================================
// Graph Model
// ============================================================================

/// Authoritative store of nodes, connectors and edges.
///
/// All collections are ordered by id, and ids come from one counter that is
/// never rewound, so enumeration order equals creation order.
///
/// Every mutating operation either applies completely or returns an error
/// without touching the model. Mutations queue [`GraphEvent`]s which the
/// owner collects with [`drain_events`](Self::drain_events).
pub struct GraphModel {
    nodes: BTreeMap<NodeId, Node>,
    connectors: BTreeMap<ConnectorId, Connector>,
    trigger_rows: BTreeMap<TriggerRowId, TriggerRow>,
    edges: BTreeMap<EdgeId, Edge>,
    next_id: i32,
    validator: CompositeValidator,
    events: Vec<GraphEvent>,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GraphModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphModel")
            .field("nodes", &self.nodes.len())
            .field("connectors", &self.connectors.len())
            .field("trigger_rows", &self.trigger_rows.len())
            .field("edges", &self.edges.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl GraphModel {
    /// Model with unlimited fan-in and duplicates allowed.
    pub fn new() -> Self {
        Self::with_validator(CompositeValidator::new().add(BasicValidator))
    }

    /// Model whose connection policy follows `config`.
    pub fn from_config(config: &EditorConfig) -> Self {
        let mut validator = CompositeValidator::new().add(BasicValidator);
        if let Some(max) = config.max_incoming_edges {
            validator = validator.add(FanInValidator { max });
        }
        if !config.allow_duplicate_edges {
            validator = validator.add(NoDuplicatesValidator);
        }
        Self::with_validator(validator)
    }

    /// Model with a caller-supplied validator chain.
    ///
    /// The chain should normally start with [`BasicValidator`]; without it
    /// the direction and type rules are not enforced.
    pub fn with_validator(validator: CompositeValidator) -> Self {
        Self {
            nodes: BTreeMap::new(),
            connectors: BTreeMap::new(),
            trigger_rows: BTreeMap::new(),
            edges: BTreeMap::new(),
            next_id: 1,
            validator,
            events: Vec::new(),
        }
    }

    /// Append a validator to the chain.
    pub fn add_validator<V: ConnectionValidator + 'static>(&mut self, validator: V) {
        self.validator.push(Box::new(validator));
    }

    /// Whether `count` more ids can be handed out without wrapping.
    fn has_ids(&self, count: usize) -> bool {
        i32::try_from(count)
            .ok()
            .and_then(|count| self.next_id.checked_add(count))
            .is_some()
    }

    /// Callers check [`has_ids`](Self::has_ids) first.
    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id = id.saturating_add(1);
        id
    }

    fn new_connector(&mut self, owner: ConnectorOwner, direction: Direction, type_id: &str) -> ConnectorId {
        let id = ConnectorId(self.allocate_id());
        self.connectors.insert(
            id,
            Connector {
                id,
                owner,
                direction,
                type_id: type_id.to_string(),
                connected: false,
            },
        );
        id
    }

    // === Queries ===

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(&id)
    }

    pub fn trigger_row(&self, id: TriggerRowId) -> Option<&TriggerRow> {
        self.trigger_rows.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// All connectors in creation order.
    pub fn connectors(&self) -> impl Iterator<Item = &Connector> + '_ {
        self.connectors.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    pub(crate) fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> + '_ {
        self.edges.values_mut()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges terminating at `connector`.
    pub fn incoming_count(&self, connector: ConnectorId) -> usize {
        self.edges.values().filter(|e| e.target == connector).count()
    }

    /// Edges that start or end at `connector`.
    pub fn edges_at(&self, connector: ConnectorId) -> Vec<EdgeId> {
        self.edges
            .values()
            .filter(|e| e.touches(connector))
            .map(|e| e.id)
            .collect()
    }

    /// Every connector displayed by a node, including its trigger rows.
    pub fn node_connectors(&self, node: NodeId) -> Vec<ConnectorId> {
        let Some(n) = self.nodes.get(&node) else {
            return Vec::new();
        };
        let rows = n
            .trigger_rows
            .iter()
            .filter_map(|r| self.trigger_rows.get(r))
            .map(|r| r.output);
        n.inputs
            .iter()
            .chain(n.outputs.iter())
            .copied()
            .chain(rows)
            .collect()
    }

    /// Edges attached to any connector of `node` (trigger rows included).
    pub fn edges_connected_to_node(&self, node: NodeId) -> Vec<EdgeId> {
        self.edges
            .values()
            .filter(|e| {
                let start = self.connectors.get(&e.source).map(|c| c.owner.node());
                let end = self.connectors.get(&e.target).map(|c| c.owner.node());
                start == Some(node) || end == Some(node)
            })
            .map(|e| e.id)
            .collect()
    }

    /// Order two connectors as (output, input).
    ///
    /// Returns `None` if either connector is unknown. When both have the same
    /// direction the order is left unchanged.
    pub fn normalize_direction(&self, a: ConnectorId, b: ConnectorId) -> Option<(ConnectorId, ConnectorId)> {
        let ca = self.connectors.get(&a)?;
        self.connectors.get(&b)?;
        if ca.direction == Direction::Input {
            Some((b, a))
        } else {
            Some((a, b))
        }
    }

    /// Whether `try_connect(a, b)` would currently succeed.
    pub fn can_connect(&self, a: ConnectorId, b: ConnectorId) -> Result<(), Rejection> {
        let (source, target) = self
            .normalize_direction(a, b)
            .ok_or_else(|| Rejection::UnknownConnector(if self.connectors.contains_key(&a) { b } else { a }))?;
        let (source, target) = (&self.connectors[&source], &self.connectors[&target]);
        self.validator.validate(source, target, self).into_result()
    }

    // === Mutations ===

    /// Instantiate a node from a catalog definition at `(x, y)`.
    pub fn create_node(
        &mut self,
        category: Category,
        definition: &NodeDefinition,
        x: f32,
        y: f32,
    ) -> Result<NodeId, GraphError> {
        definition.validate()?;
        if !self.has_ids(1 + definition.inputs.len() + definition.outputs.len()) {
            return Err(GraphError::IdsExhausted);
        }

        let id = NodeId(self.allocate_id());
        let owner = ConnectorOwner::Node(id);
        let inputs = definition
            .inputs
            .iter()
            .map(|t| self.new_connector(owner, Direction::Input, t))
            .collect();
        let outputs = definition
            .outputs
            .iter()
            .map(|t| self.new_connector(owner, Direction::Output, t))
            .collect();

        self.nodes.insert(
            id,
            Node {
                id,
                category,
                definition: definition.clone(),
                inputs,
                outputs,
                trigger_rows: Vec::new(),
                params: definition.parameters.iter().map(|p| p.default_value()).collect(),
                x,
                y,
            },
        );
        log::debug!("Created {} node {} '{}'", category, id, definition.display_text);
        self.events.push(GraphEvent::NodeCreated(id));
        Ok(id)
    }

    /// Append a trigger row to a node whose definition declares a trigger template.
    pub fn add_trigger_row(&mut self, node: NodeId) -> Result<TriggerRowId, GraphError> {
        let template = self
            .nodes
            .get(&node)
            .ok_or(GraphError::UnknownNode(node))?
            .definition
            .trigger
            .clone()
            .ok_or(GraphError::NoTriggerTemplate(node))?;
        if !self.has_ids(2) {
            return Err(GraphError::IdsExhausted);
        }

        let row = TriggerRowId(self.allocate_id());
        let output = self.new_connector(
            ConnectorOwner::TriggerRow { node, row },
            Direction::Output,
            TRIGGER_TYPE,
        );
        self.trigger_rows.insert(
            row,
            TriggerRow {
                id: row,
                node,
                params: template.parameters.iter().map(|p| p.default_value()).collect(),
                output,
            },
        );
        if let Some(n) = self.nodes.get_mut(&node) {
            n.trigger_rows.push(row);
        }
        log::debug!("Added trigger row {} to node {}", row, node);
        self.events.push(GraphEvent::TriggerRowAdded { node, row });
        Ok(row)
    }

    /// Create an edge between two connectors.
    ///
    /// The pair may be given in either order; the edge always runs from the
    /// output to the input. On rejection nothing changes and an
    /// [`GraphEvent::EdgeRejected`] is queued.
    pub fn try_connect(&mut self, a: ConnectorId, b: ConnectorId) -> Result<EdgeId, Rejection> {
        let checked = self.can_connect(a, b).and_then(|()| {
            if self.has_ids(1) {
                Ok(())
            } else {
                Err(Rejection::IdsExhausted)
            }
        });
        if let Err(reason) = checked {
            log::debug!("Rejected edge {} -> {}: {}", a, b, reason);
            self.events.push(GraphEvent::EdgeRejected(reason.clone()));
            return Err(reason);
        }
        let Some((source, target)) = self.normalize_direction(a, b) else {
            // can_connect already covered unknown connectors
            return Err(Rejection::UnknownConnector(a));
        };

        let id = EdgeId(self.allocate_id());
        self.edges.insert(
            id,
            Edge {
                id,
                source,
                target,
                path: None,
            },
        );
        if let Some(input) = self.connectors.get_mut(&target) {
            input.connected = true;
        }
        log::debug!("Created edge {}: {} -> {}", id, source, target);
        self.events.push(GraphEvent::EdgeCreated(id));
        Ok(id)
    }

    /// Remove an edge. Returns `false` if it did not exist.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let Some(edge) = self.edges.remove(&id) else {
            return false;
        };
        self.refresh_connected_flag(edge.target);
        log::debug!("Removed edge {}", id);
        self.events.push(GraphEvent::EdgeRemoved(id));
        true
    }

    /// Remove a node together with its trigger rows, connectors and every
    /// edge attached to any of them.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::UnknownNode(id));
        }
        let owned: HashSet<ConnectorId> = self.node_connectors(id).into_iter().collect();
        self.detach(&owned);

        if let Some(node) = self.nodes.remove(&id) {
            for row in node.trigger_rows {
                self.trigger_rows.remove(&row);
                self.events.push(GraphEvent::TriggerRowRemoved { node: id, row });
            }
        }
        log::debug!("Removed node {} ({} connectors)", id, owned.len());
        self.events.push(GraphEvent::NodeRemoved(id));
        Ok(())
    }

    /// Remove a trigger row, its output connector and the edges attached to it.
    pub fn remove_trigger_row(&mut self, row: TriggerRowId) -> Result<(), GraphError> {
        let (node, output) = match self.trigger_rows.get(&row) {
            Some(r) => (r.node, r.output),
            None => return Err(GraphError::UnknownTriggerRow(row)),
        };
        self.detach(&HashSet::from([output]));
        self.trigger_rows.remove(&row);
        if let Some(n) = self.nodes.get_mut(&node) {
            n.trigger_rows.retain(|r| *r != row);
        }
        log::debug!("Removed trigger row {} from node {}", row, node);
        self.events.push(GraphEvent::TriggerRowRemoved { node, row });
        Ok(())
    }

    /// Drop every edge touching `owned`, then the connectors themselves.
    ///
    /// Edges go first so no edge ever refers to a removed connector.
    fn detach(&mut self, owned: &HashSet<ConnectorId>) {
        let doomed: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| owned.contains(&e.source) || owned.contains(&e.target))
            .map(|e| e.id)
            .collect();
        for id in doomed {
            self.remove_edge(id);
        }
        for c in owned {
            self.connectors.remove(c);
        }
    }

    fn refresh_connected_flag(&mut self, connector: ConnectorId) {
        let connected = self.edges.values().any(|e| e.target == connector);
        if let Some(c) = self.connectors.get_mut(&connector) {
            if c.direction == Direction::Input {
                c.connected = connected;
            }
        }
    }

    /// Move a node's origin to `(x, y)`.
    pub fn move_node(&mut self, id: NodeId, x: f32, y: f32) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    /// Parameter values of a node or trigger row.
    pub fn parameters(&self, owner: ParamOwner) -> Option<&[ParamValue]> {
        match owner {
            ParamOwner::Node(id) => self.nodes.get(&id).map(|n| n.params.as_slice()),
            ParamOwner::TriggerRow(id) => self.trigger_rows.get(&id).map(|r| r.params.as_slice()),
        }
    }

    /// Update one parameter, checked against its descriptor.
    pub fn set_parameter(
        &mut self,
        owner: ParamOwner,
        index: usize,
        value: ParamValue,
    ) -> Result<(), GraphError> {
        let (descriptor, slot) = match owner {
            ParamOwner::Node(id) => {
                let node = self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))?;
                (node.definition.parameters.get(index), node.params.get_mut(index))
            }
            ParamOwner::TriggerRow(id) => {
                let row = self
                    .trigger_rows
                    .get_mut(&id)
                    .ok_or(GraphError::UnknownTriggerRow(id))?;
                let node = self.nodes.get(&row.node).ok_or(GraphError::UnknownNode(row.node))?;
                let template = node.definition.trigger.as_ref();
                (
                    template.and_then(|t| t.parameters.get(index)),
                    row.params.get_mut(index),
                )
            }
        };
        let (Some(descriptor), Some(slot)) = (descriptor, slot) else {
            return Err(GraphError::UnknownParameter { owner, index });
        };
        *slot = descriptor
            .coerce(value)
            .map_err(|message| GraphError::InvalidParameterValue {
                name: descriptor.display_text.clone(),
                message,
            })?;
        self.events.push(GraphEvent::ParameterChanged { owner, index });
        Ok(())
    }

    /// Take the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    /// Describe every broken invariant; empty when the model is consistent.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for e in self.edges.values() {
            match (self.connectors.get(&e.source), self.connectors.get(&e.target)) {
                (Some(s), Some(t)) => {
                    if s.direction != Direction::Output || t.direction != Direction::Input {
                        problems.push(format!("edge {} does not run output -> input", e.id));
                    }
                    if s.type_id != t.type_id {
                        problems.push(format!("edge {} joins different types", e.id));
                    }
                    if s.owner.node() == t.owner.node() {
                        problems.push(format!("edge {} loops on node {}", e.id, s.owner.node()));
                    }
                }
                _ => problems.push(format!("edge {} references a missing connector", e.id)),
            }
        }
        for c in self.connectors.values() {
            if c.direction == Direction::Input {
                let expected = self.incoming_count(c.id) > 0;
                if c.connected != expected {
                    problems.push(format!(
                        "connector {} connected={} but has {} incoming edges",
                        c.id,
                        c.connected,
                        self.incoming_count(c.id)
                    ));
                }
            }
            let owner_exists = match c.owner {
                ConnectorOwner::Node(n) => self.nodes.contains_key(&n),
                ConnectorOwner::TriggerRow { row, .. } => self.trigger_rows.contains_key(&row),
            };
            if !owner_exists {
                problems.push(format!("connector {} has no owner", c.id));
            }
        }
        problems
    }
}
