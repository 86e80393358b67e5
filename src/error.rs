//! Error taxonomy for the connection graph engine.
//!
//! Nothing here is fatal. Catalog and configuration errors are reported to the
//! caller while loading, [`GraphError`] is returned by model operations that
//! leave the model untouched, and [`Rejection`] explains why an edge commit was
//! refused.

use crate::graph::ConnectorId;
use thiserror::Error;

/// Reasons an attempted edge was refused by [`GraphModel::try_connect`].
///
/// [`GraphModel::try_connect`]: crate::graph::GraphModel::try_connect
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Both connectors are inputs, or both are outputs.
    #[error("Must connect an output to an input")]
    DirectionMismatch,
    /// The connector type ids differ.
    #[error("Type mismatch: '{source_type}' cannot feed '{target_type}'")]
    TypeMismatch {
        source_type: String,
        target_type: String,
    },
    /// Both connectors belong to the same node (or are the same connector).
    #[error("Cannot connect a node to itself")]
    SelfConnection,
    /// A connector id does not exist in the model.
    #[error("Connector {0} not found")]
    UnknownConnector(ConnectorId),
    /// The target input already has the configured maximum of incoming edges.
    #[error("Connector {connector} has reached max {max} incoming edges")]
    FanInLimit { connector: ConnectorId, max: usize },
    /// An identical edge already exists and duplicates are disabled.
    #[error("Edge already exists")]
    DuplicateEdge,
    /// The model has handed out every available id.
    #[error("No ids left for a new edge")]
    IdsExhausted,
    /// Refused by an application-supplied validator.
    #[error("{0}")]
    Custom(String),
}

/// Errors returned by [`GraphModel`](crate::graph::GraphModel) operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Invalid node definition: {0}")]
    InvalidDefinition(String),

    #[error("Node {0} not found")]
    UnknownNode(crate::graph::NodeId),

    #[error("Trigger row {0} not found")]
    UnknownTriggerRow(crate::graph::TriggerRowId),

    #[error("Node {0} has no trigger template")]
    NoTriggerTemplate(crate::graph::NodeId),

    #[error("Parameter {index} does not exist on {owner}")]
    UnknownParameter {
        owner: crate::graph::ParamOwner,
        index: usize,
    },

    #[error("Invalid value for parameter '{name}': {message}")]
    InvalidParameterValue { name: String, message: String },

    #[error("No ids left for new graph elements")]
    IdsExhausted,
}

/// Errors raised while loading catalog or connector registry input.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON array of entries")]
    NotAnArray,

    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
}

/// Errors raised while loading an [`EditorConfig`](crate::config::EditorConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}
