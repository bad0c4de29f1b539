use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::definition::PropValue;
use crate::instance::Point;

/// Positional strategy for placing a new instance relative to its anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Append,
    Prepend,
    Before,
    After,
    /// Insert at the last known pointer location; degrades to append when
    /// no pointer context exists.
    Cursor,
}

/// One insertion request, as supplied by the host collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInsertionOptions {
    pub component_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default)]
    pub props: BTreeMap<String, PropValue>,
    #[serde(default)]
    pub placement: Placement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_selector: Option<String>,
    #[serde(default)]
    pub replace_existing: bool,
    #[serde(default)]
    pub preserve_styles: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insertion_point: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl ComponentInsertionOptions {
    pub fn new(component_id: &str) -> Self {
        ComponentInsertionOptions {
            component_id: component_id.to_string(),
            variant: None,
            props: BTreeMap::new(),
            placement: Placement::Append,
            target_selector: None,
            replace_existing: false,
            preserve_styles: false,
            insertion_point: None,
            z_index: None,
            group_id: None,
        }
    }

    pub fn with_prop(mut self, name: &str, value: PropValue) -> Self {
        self.props.insert(name.to_string(), value);
        self
    }

    pub fn with_variant(mut self, variant: &str) -> Self {
        self.variant = Some(variant.to_string());
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_target(mut self, selector: &str) -> Self {
        self.target_selector = Some(selector.to_string());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.insertion_point = Some(Point::new(x, y));
        self
    }
}

/// Partial update applied to an existing instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<BTreeMap<String, PropValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl InstanceUpdates {
    pub fn position(position: Point) -> Self {
        InstanceUpdates {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn props(props: BTreeMap<String, PropValue>) -> Self {
        InstanceUpdates {
            props: Some(props),
            ..Default::default()
        }
    }
}
