use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Supported prop types for component definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropKind {
    String,
    Number,
    Boolean,
    Color,
    Object,
}

/// A concrete prop value supplied at insertion time (or as a schema default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Boolean(bool),
    Number(f64),
    String(String),
    Json(serde_json::Value),
}

impl PropValue {
    /// Stringify for template substitution. Objects are JSON-stringified.
    pub fn render(&self) -> String {
        match self {
            PropValue::String(s) => s.clone(),
            PropValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            PropValue::Boolean(b) => b.to_string(),
            PropValue::Json(v) => v.to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// True when the value satisfies the declared kind outright.
    pub fn matches_kind(&self, kind: PropKind) -> bool {
        matches!(
            (self, kind),
            (PropValue::String(_), PropKind::String)
                | (PropValue::String(_), PropKind::Color)
                | (PropValue::Number(_), PropKind::Number)
                | (PropValue::Boolean(_), PropKind::Boolean)
                | (PropValue::Json(_), PropKind::Object)
        )
    }
}

/// A declared prop: name, type, requiredness, default, validation bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropSpec {
    pub name: String,
    pub kind: PropKind,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<PropValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regex the rendered value must match, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl PropSpec {
    pub fn required(name: &str, kind: PropKind) -> Self {
        PropSpec {
            name: name.to_string(),
            kind,
            required: true,
            default: None,
            min: None,
            max: None,
            pattern: None,
        }
    }

    pub fn optional(name: &str, kind: PropKind, default: PropValue) -> Self {
        PropSpec {
            name: name.to_string(),
            kind,
            required: false,
            default: Some(default),
            min: None,
            max: None,
            pattern: None,
        }
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }
}

/// A named variant: partial prop overrides plus a style fragment appended
/// after the base styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSpec {
    pub name: String,
    #[serde(default)]
    pub prop_overrides: BTreeMap<String, PropValue>,
    #[serde(default)]
    pub style: String,
}

/// Style fragments for a definition. Base always applies; the responsive
/// and dark-mode fragments are emitted verbatim after it when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleSheet {
    pub base: String,
    pub responsive: String,
    pub dark_mode: String,
}

/// HTML/script templates with `{{prop}}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub html: String,
    pub js: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefinitionMeta {
    pub category: String,
    pub tags: Vec<String>,
    pub dependencies: Vec<String>,
}

/// Static catalog entry describing a reusable UI fragment. Immutable after
/// registration; owned solely by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub props: Vec<PropSpec>,
    #[serde(default)]
    pub variants: Vec<VariantSpec>,
    #[serde(default)]
    pub styles: StyleSheet,
    #[serde(default)]
    pub template: Template,
    #[serde(default)]
    pub meta: DefinitionMeta,
}

impl ComponentDefinition {
    pub fn prop(&self, name: &str) -> Option<&PropSpec> {
        self.props.iter().find(|p| p.name == name)
    }

    pub fn variant(&self, name: &str) -> Option<&VariantSpec> {
        self.variants.iter().find(|v| v.name == name)
    }
}
