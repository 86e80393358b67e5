//! Connector type registry.
//!
//! Maps a connector type id (e.g. `"data"`, `"trigger"`) to its display label and
//! color. Unknown ids never fail: they resolve to a neutral gray and use the id
//! itself as label.

use crate::error::CatalogError;
use serde::Deserialize;
use slint::Color;
use std::collections::HashMap;

/// Color used for connectors whose type id is not registered (`#888888`).
pub fn fallback_color() -> Color {
    Color::from_rgb_u8(0x88, 0x88, 0x88)
}

/// Display metadata for one connector type.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectorStyle {
    pub display_label: String,
    pub color: Color,
}

/// Raw registry record as it appears in the connection types JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorTypeDef {
    pub id: String,
    #[serde(rename = "displayText", alias = "display-text", alias = "label", default)]
    pub display_text: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Static lookup table from connector type id to [`ConnectorStyle`].
#[derive(Clone, Debug, Default)]
pub struct ConnectorRegistry {
    types: HashMap<String, ConnectorStyle>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a connector type.
    pub fn register(&mut self, type_id: impl Into<String>, style: ConnectorStyle) {
        self.types.insert(type_id.into(), style);
    }

    /// Look up a type id, falling back to a neutral style for unknown ids.
    pub fn lookup(&self, type_id: &str) -> ConnectorStyle {
        self.types.get(type_id).cloned().unwrap_or_else(|| ConnectorStyle {
            display_label: type_id.to_string(),
            color: fallback_color(),
        })
    }

    /// Shorthand for `lookup(type_id).color`.
    pub fn color(&self, type_id: &str) -> Color {
        self.types
            .get(type_id)
            .map(|s| s.color)
            .unwrap_or_else(fallback_color)
    }

    /// Register every record in `defs`.
    ///
    /// A missing label defaults to the id; a missing or unparsable color falls
    /// back to [`fallback_color`].
    pub fn extend<I>(&mut self, defs: I)
    where
        I: IntoIterator<Item = ConnectorTypeDef>,
    {
        for def in defs {
            let color = match def.color.as_deref() {
                Some(text) => parse_hex_color(text).unwrap_or_else(|| {
                    log::warn!("Connector type '{}' has invalid color '{}'", def.id, text);
                    fallback_color()
                }),
                None => fallback_color(),
            };
            let display_label = def.display_text.unwrap_or_else(|| def.id.clone());
            self.register(def.id, ConnectorStyle { display_label, color });
        }
    }

    /// Build a registry from a JSON array of `{id, displayText, color}` records.
    ///
    /// Records that do not deserialize (e.g. missing `id`) are skipped.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let entries = value.as_array().ok_or(CatalogError::NotAnArray)?;

        let mut registry = Self::new();
        registry.extend(entries.iter().filter_map(|entry| {
            match ConnectorTypeDef::deserialize(entry) {
                Ok(def) => Some(def),
                Err(e) => {
                    log::warn!("Skipping malformed connector type {}: {}", entry, e);
                    None
                }
            }
        }));
        Ok(registry)
    }
}

/// Parse `#rgb` or `#rrggbb` into a [`Color`].
pub fn parse_hex_color(text: &str) -> Option<Color> {
    let hex = text.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                channels[i] = v * 16 + v;
            }
            Some(Color::from_rgb_u8(channels[0], channels[1], channels[2]))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::from_rgb_u8(r, g, b))
        }
        _ => None,
    }
}
