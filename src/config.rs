//! Editor configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) yields
//! a working configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for routing, snapping and connection policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EditorConfig {
    /// Horizontal control point offset of every edge curve (default: 60.0).
    pub curve_rigidity: f32,
    /// Maximum pointer distance for snapping to a compatible connector (default: 15.0).
    pub snap_threshold: f32,
    /// Radius of a connector's visual handle (default: 8.0).
    pub connector_hit_radius: f32,
    /// Maximum pointer distance from a curve for edge hover (default: 6.0).
    pub edge_hover_distance: f32,
    /// Number of curve samples for edge hover hit-testing (default: 20).
    pub hit_samples: usize,
    /// Cap on edges terminating at one input. `None` means unlimited fan-in.
    pub max_incoming_edges: Option<usize>,
    /// Whether the same output→input pair may be connected more than once.
    pub allow_duplicate_edges: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            curve_rigidity: 60.0,
            snap_threshold: 15.0,
            connector_hit_radius: 8.0,
            edge_hover_distance: 6.0,
            hit_samples: 20,
            max_incoming_edges: None,
            allow_duplicate_edges: true,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON text and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        log::debug!("Loaded editor config from {}", path.as_ref().display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("curve-rigidity", self.curve_rigidity),
            ("snap-threshold", self.snap_threshold),
            ("connector-hit-radius", self.connector_hit_radius),
            ("edge-hover-distance", self.edge_hover_distance),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    message: format!("expected a non-negative number, found {}", value),
                });
            }
        }
        if self.max_incoming_edges == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max-incoming-edges",
                message: "must be at least 1 (omit it for unlimited fan-in)".into(),
            });
        }
        Ok(())
    }
}
