//! Node catalog input.
//!
//! The toolbox offers node types grouped into four categories. Each entry lists
//! its input/output connector type ids, its parameters and an optional trigger
//! template. The catalog is a static import: it is parsed once and only read
//! afterwards.

use crate::error::{CatalogError, GraphError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Connector type id reserved for trigger row outputs.
pub const TRIGGER_TYPE: &str = "trigger";

/// Toolbox category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    DataSources,
    Agents,
    Tools,
    Utilities,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::DataSources,
        Category::Agents,
        Category::Tools,
        Category::Utilities,
    ];

    /// The toolbox tab id (`"data-sources"`, `"agents"`, ...).
    pub fn tab_id(self) -> &'static str {
        match self {
            Category::DataSources => "data-sources",
            Category::Agents => "agents",
            Category::Tools => "tools",
            Category::Utilities => "utilities",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tab_id())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    /// Accepts tab ids as well as the singular names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data-sources" | "data-source" => Ok(Category::DataSources),
            "agents" | "agent" => Ok(Category::Agents),
            "tools" | "tool" => Ok(Category::Tools),
            "utilities" | "utility" => Ok(Category::Utilities),
            other => Err(CatalogError::UnknownCategory(other.to_string())),
        }
    }
}

/// Kind of a node parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ParamKind {
    /// Single-line text.
    #[default]
    #[serde(rename = "string")]
    Text,
    #[serde(rename = "textfield")]
    MultilineText,
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "dropdown")]
    Choice,
    /// Any kind this crate does not know; handled like [`ParamKind::Text`].
    #[serde(other)]
    Unknown,
}

/// Current value of one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Choice(String),
}

/// Declaration of a node or trigger parameter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParamDescriptor {
    #[serde(rename = "type", default)]
    pub kind: ParamKind,
    #[serde(rename = "displayText", alias = "display-text", default)]
    pub display_text: String,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    #[serde(default)]
    pub options: Vec<String>,
}

impl ParamDescriptor {
    /// Value a freshly created node starts with.
    pub fn default_value(&self) -> ParamValue {
        match self.kind {
            ParamKind::Text | ParamKind::MultilineText | ParamKind::Unknown => {
                ParamValue::Text(self.default.as_ref().map(value_to_text).unwrap_or_default())
            }
            ParamKind::Integer => {
                let raw = self
                    .default
                    .as_ref()
                    .and_then(|v| v.as_i64().or_else(|| v.as_str()?.trim().parse().ok()))
                    .unwrap_or(0);
                ParamValue::Integer(self.clamp(raw))
            }
            ParamKind::Boolean => {
                ParamValue::Boolean(self.default.as_ref().map(is_truthy).unwrap_or(false))
            }
            ParamKind::Choice => {
                let declared = self.default.as_ref().and_then(Value::as_str);
                let selected = declared
                    .filter(|d| self.options.iter().any(|o| o == d))
                    .map(str::to_string)
                    .or_else(|| self.options.first().cloned())
                    .unwrap_or_default();
                ParamValue::Choice(selected)
            }
        }
    }

    /// Check `value` against this descriptor, clamping integers into range.
    pub fn coerce(&self, value: ParamValue) -> Result<ParamValue, String> {
        match (self.kind, value) {
            (ParamKind::Text | ParamKind::MultilineText | ParamKind::Unknown, ParamValue::Text(s)) => {
                Ok(ParamValue::Text(s))
            }
            (ParamKind::Integer, ParamValue::Integer(v)) => Ok(ParamValue::Integer(self.clamp(v))),
            (ParamKind::Boolean, ParamValue::Boolean(b)) => Ok(ParamValue::Boolean(b)),
            (ParamKind::Choice, ParamValue::Choice(c)) => {
                if self.options.iter().any(|o| *o == c) {
                    Ok(ParamValue::Choice(c))
                } else {
                    Err(format!("'{}' is not one of {:?}", c, self.options))
                }
            }
            (kind, other) => Err(format!("{:?} does not fit a {:?} parameter", other, kind)),
        }
    }

    fn clamp(&self, v: i64) -> i64 {
        let v = self.min.map_or(v, |min| v.max(min));
        self.max.map_or(v, |max| v.min(max))
    }

    fn validate(&self) -> Result<(), GraphError> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(GraphError::InvalidDefinition(format!(
                    "parameter '{}' has min {} greater than max {}",
                    self.display_text, min, max
                )));
            }
        }
        Ok(())
    }
}

fn value_to_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Template for the repeatable trigger rows of a node.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TriggerTemplate {
    #[serde(default)]
    pub parameters: Vec<ParamDescriptor>,
}

/// One catalog entry: everything needed to instantiate a node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNodeDefinition")]
pub struct NodeDefinition {
    pub display_text: String,
    pub icon: Option<String>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub parameters: Vec<ParamDescriptor>,
    pub trigger: Option<TriggerTemplate>,
}

impl NodeDefinition {
    /// A definition with only connectors, mostly useful for tests and demos.
    pub fn with_connectors(
        display_text: impl Into<String>,
        inputs: &[&str],
        outputs: &[&str],
    ) -> Self {
        Self {
            display_text: display_text.into(),
            icon: None,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            parameters: Vec::new(),
            trigger: None,
        }
    }

    /// Builder-style setter for the trigger template.
    pub fn with_trigger(mut self, trigger: TriggerTemplate) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Builder-style setter for the parameter list.
    pub fn with_parameters(mut self, parameters: Vec<ParamDescriptor>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Structural checks performed before a node is instantiated.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.display_text.trim().is_empty() {
            return Err(GraphError::InvalidDefinition("empty display text".into()));
        }
        for type_id in self.inputs.iter().chain(&self.outputs) {
            if type_id.trim().is_empty() {
                return Err(GraphError::InvalidDefinition(format!(
                    "'{}' declares a connector with an empty type id",
                    self.display_text
                )));
            }
        }
        let trigger_params = self.trigger.iter().flat_map(|t| t.parameters.iter());
        for param in self.parameters.iter().chain(trigger_params) {
            param.validate()?;
        }
        Ok(())
    }
}

/// Wire shape of a catalog entry. The display text has historically been
/// spelled three different ways.
#[derive(Deserialize)]
struct RawNodeDefinition {
    #[serde(rename = "displayText", default)]
    display_text: Option<String>,
    #[serde(rename = "display-text", default)]
    display_text_dashed: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(default)]
    outputs: Vec<String>,
    #[serde(default)]
    parameters: Vec<ParamDescriptor>,
    #[serde(default)]
    trigger: Option<TriggerTemplate>,
}

impl TryFrom<RawNodeDefinition> for NodeDefinition {
    type Error = String;

    fn try_from(raw: RawNodeDefinition) -> Result<Self, Self::Error> {
        let display_text = raw
            .display_text
            .or(raw.display_text_dashed)
            .or(raw.name)
            .ok_or_else(|| "missing displayText".to_string())?;
        Ok(Self {
            display_text,
            icon: raw.icon,
            inputs: raw.inputs,
            outputs: raw.outputs,
            parameters: raw.parameters,
            trigger: raw.trigger,
        })
    }
}

/// All node definitions, grouped by category.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<Category, Vec<NodeDefinition>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of entries into `category`.
    ///
    /// Entries that fail to deserialize are skipped; the rest are appended.
    /// Returns the number of entries added.
    pub fn load_category(&mut self, category: Category, json: &str) -> Result<usize, CatalogError> {
        let value: Value = serde_json::from_str(json)?;
        let items = value.as_array().ok_or(CatalogError::NotAnArray)?;

        let list = self.entries.entry(category).or_default();
        let before = list.len();
        for item in items {
            match NodeDefinition::deserialize(item) {
                Ok(def) => list.push(def),
                Err(e) => log::warn!("Skipping malformed {} entry: {}", category, e),
            }
        }
        let added = list.len() - before;
        log::debug!("Loaded {} {} definitions", added, category);
        Ok(added)
    }

    /// Add a single definition.
    pub fn insert(&mut self, category: Category, definition: NodeDefinition) {
        self.entries.entry(category).or_default().push(definition);
    }

    /// Definitions of one category, in file order.
    pub fn entries(&self, category: Category) -> &[NodeDefinition] {
        self.entries.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find a definition by its display text.
    pub fn find(&self, category: Category, display_text: &str) -> Option<&NodeDefinition> {
        self.entries(category)
            .iter()
            .find(|d| d.display_text == display_text)
    }
}

/// Decode a toolbox drag payload of the form `"<tab>::<display text>"`.
pub fn parse_drop_payload(payload: &str) -> Option<(Category, &str)> {
    let (tab, display_text) = payload.split_once("::")?;
    let category = tab.parse().ok()?;
    Some((category, display_text))
}
