use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::codegen::GeneratedCode;
use crate::definition::PropValue;

/// 2-D position in document coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Axis-aligned rectangle for area queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// The authoritative instance-id → instance map, owned by the host
/// controller and lent to the engine for each operation.
pub type LiveInstanceMap = std::collections::BTreeMap<String, LiveComponentInstance>;

/// Mint a unique instance id: component id, millisecond timestamp, and a
/// random suffix so two inserts in the same millisecond stay distinct.
pub fn new_instance_id(component_id: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        component_id,
        Utc::now().timestamp_millis(),
        &suffix[..6]
    )
}

/// Mint a group id for `group()` calls that do not supply one.
pub fn new_group_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("group-{}", &suffix[..8])
}

fn default_visible() -> bool {
    true
}

/// One concrete placement of a component definition in the document.
/// The host controller owns the authoritative map of these; the renderer
/// holds only a disposable DOM projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveComponentInstance {
    pub instance_id: String,
    pub component_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default)]
    pub props: BTreeMap<String, PropValue>,
    #[serde(default)]
    pub code: GeneratedCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Free-form runtime state reported by the renderer (e.g. measured size).
    #[serde(default)]
    pub state: BTreeMap<String, serde_json::Value>,
}

impl LiveComponentInstance {
    pub fn new(component_id: &str) -> Self {
        LiveComponentInstance {
            instance_id: new_instance_id(component_id),
            component_id: component_id.to_string(),
            variant: None,
            props: BTreeMap::new(),
            code: GeneratedCode::default(),
            position: None,
            z_index: None,
            group_id: None,
            visible: true,
            locked: false,
            state: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_ids_are_unique() {
        let a = new_instance_id("button");
        let b = new_instance_id("button");
        assert_ne!(a, b);
        assert!(a.starts_with("button-"));
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(50.0, 50.0)));
        assert!(!r.contains(Point::new(51.0, 0.0)));
    }

    #[test]
    fn test_instance_serializes_camel_case() {
        let inst = LiveComponentInstance::new("card");
        let json = serde_json::to_value(&inst).unwrap();
        assert!(json.get("instanceId").is_some());
        assert!(json.get("componentId").is_some());
        // Unset optionals are omitted entirely.
        assert!(json.get("position").is_none());
    }
}
