//! # Slint Workflow Editor
//!
//! Connection graph engine for visual workflow editors built with Slint.
//! Users drop typed nodes onto a canvas and draw edges between compatible
//! connectors; this crate keeps the graph consistent and the edges glued to
//! their connectors while things move.
//!
//! ## Overview
//!
//! - [`ConnectorRegistry`] - Connector type id → label and color
//! - [`Catalog`] - Node definitions loaded from JSON, grouped by category
//! - [`GraphModel`] - Nodes, connectors, trigger rows and edges, with
//!   validated connections and cascading deletes
//! - [`GeometryCache`] - Layout reported by the UI
//! - [`find_snap_target`] - Nearest compatible connector within a threshold
//! - [`CurveRouter`] - Bezier routing of every edge
//! - [`InteractionController`] - Pointer-driven state machine tying it all together
//!
//! ## Quick Start
//!
//! ```ignore
//! use slint_workflow_editor::{Category, EditorConfig, InteractionController, NodeDefinition};
//!
//! let ctrl = InteractionController::new(EditorConfig::default(), registry);
//! let node = ctrl.create_node(
//!     Category::Tools,
//!     &NodeDefinition::with_connectors("Search", &["data"], &["data"]),
//!     120.0,
//!     80.0,
//! )?;
//! ctrl.on_graph_event(|event| log::info!("{:?}", event));
//! ```
//!
//! Logging goes through the [`log`] facade; install any logger to see it.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod graph;
pub mod links;
pub mod path;
pub mod registry;
pub mod state;

pub use catalog::{
    parse_drop_payload, Catalog, Category, NodeDefinition, ParamDescriptor, ParamKind, ParamValue,
    TriggerTemplate, TRIGGER_TYPE,
};
pub use config::EditorConfig;
pub use controller::{EdgePopup, InteractionController, InteractionState, PointerTarget};
pub use error::{CatalogError, ConfigError, GraphError, Rejection};
pub use graph::{
    Connector, ConnectorId, ConnectorOwner, Direction, Edge, EdgeId, GraphEvent, GraphModel, Node,
    NodeId, ParamOwner, TriggerRow, TriggerRowId,
    // Connection validation framework
    BasicValidator, CompositeValidator, ConnectionValidator, FanInValidator,
    NoDuplicatesValidator, ValidationResult,
};
pub use hit_test::{
    find_connector_at, find_edge_at, find_snap_target, is_compatible, ConnectorGeometry,
    EdgeGeometry, SimpleConnectorGeometry, SimpleEdgeGeometry,
};
pub use links::{edge_paths, CurveRouter, EdgePathData, EdgePathSync};
pub use path::{distance_to_bezier, CubicBezier};
pub use registry::{fallback_color, parse_hex_color, ConnectorRegistry, ConnectorStyle};
pub use state::{GeometryCache, NodeRect, StoredConnector};
