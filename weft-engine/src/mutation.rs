use serde::{Deserialize, Serialize};

use crate::instance::{LiveComponentInstance, Point};
use crate::options::Placement;

/// Marker class stamped on every wrapper element so the interaction
/// runtime can recognize engine-managed nodes.
pub const MARKER_CLASS: &str = "wf-live-component";

/// Id of the style tag owning an instance's generated CSS.
pub fn style_id(instance_id: &str) -> String {
    format!("style-{}", instance_id)
}

/// Id of the script tag owning an instance's generated behavior.
pub fn script_id(instance_id: &str) -> String {
    format!("script-{}", instance_id)
}

/// One renderer-executable instruction. The set is consumed only by the
/// renderer runtime; it is not a stable external contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MutationOp {
    /// Create the wrapper element and place it relative to its anchor.
    CreateWrapper {
        instance_id: String,
        marker_class: String,
        html: String,
        placement: Placement,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_selector: Option<String>,
        #[serde(default)]
        replace_existing: bool,
        /// With `replace_existing`, keep the anchor's existing style tags.
        #[serde(default)]
        preserve_styles: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<Point>,
        #[serde(skip_serializing_if = "Option::is_none")]
        z_index: Option<i32>,
    },
    AttachStyle {
        style_id: String,
        css: String,
    },
    AttachScript {
        script_id: String,
        js: String,
    },
    RemoveNode {
        instance_id: String,
    },
    RemoveStyle {
        style_id: String,
    },
    RemoveScript {
        script_id: String,
    },
    /// Replace the wrapper's inner markup in place (prop updates).
    ReplaceHtml {
        instance_id: String,
        html: String,
    },
    ReplaceStyle {
        style_id: String,
        css: String,
    },
    /// Positional-only update; markup is untouched.
    SetPosition {
        instance_id: String,
        position: Point,
        #[serde(skip_serializing_if = "Option::is_none")]
        z_index: Option<i32>,
    },
}

/// Ordered mutation instructions for one engine operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationScript {
    pub instance_id: String,
    pub ops: Vec<MutationOp>,
}

impl MutationScript {
    pub fn new(instance_id: &str) -> Self {
        MutationScript {
            instance_id: instance_id.to_string(),
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: MutationOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Ops that take an instance (and its tags) out of the document.
pub fn removal_script(instance_id: &str) -> MutationScript {
    let mut script = MutationScript::new(instance_id);
    script.push(MutationOp::RemoveNode {
        instance_id: instance_id.to_string(),
    });
    script.push(MutationOp::RemoveStyle {
        style_id: style_id(instance_id),
    });
    script.push(MutationOp::RemoveScript {
        script_id: script_id(instance_id),
    });
    script
}

/// Ops that re-create an instance from a history snapshot, keeping its
/// original id. Used when undoing a remove or redoing an insert.
pub fn restore_script(instance: &LiveComponentInstance) -> MutationScript {
    let mut script = MutationScript::new(&instance.instance_id);
    script.push(MutationOp::CreateWrapper {
        instance_id: instance.instance_id.clone(),
        marker_class: MARKER_CLASS.to_string(),
        html: instance.code.html.clone(),
        placement: Placement::Append,
        target_selector: None,
        replace_existing: false,
        preserve_styles: false,
        position: instance.position,
        z_index: instance.z_index,
    });
    script.push(MutationOp::AttachStyle {
        style_id: style_id(&instance.instance_id),
        css: instance.code.css.clone(),
    });
    if !instance.code.js.is_empty() {
        script.push(MutationOp::AttachScript {
            script_id: script_id(&instance.instance_id),
            js: instance.code.js.clone(),
        });
    }
    script
}

/// Ops that rewrite an instance's markup and styles in place from a
/// snapshot, without re-injecting behavior scripts.
pub fn rewrite_script(instance: &LiveComponentInstance) -> MutationScript {
    let mut script = MutationScript::new(&instance.instance_id);
    script.push(MutationOp::ReplaceHtml {
        instance_id: instance.instance_id.clone(),
        html: instance.code.html.clone(),
    });
    script.push(MutationOp::ReplaceStyle {
        style_id: style_id(&instance.instance_id),
        css: instance.code.css.clone(),
    });
    if let Some(position) = instance.position {
        script.push(MutationOp::SetPosition {
            instance_id: instance.instance_id.clone(),
            position,
            z_index: instance.z_index,
        });
    }
    script
}

/// Positional-only op set.
pub fn position_script(
    instance_id: &str,
    position: Point,
    z_index: Option<i32>,
) -> MutationScript {
    let mut script = MutationScript::new(instance_id);
    script.push(MutationOp::SetPosition {
        instance_id: instance_id.to_string(),
        position,
        z_index,
    });
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_script_targets_all_scoped_tags() {
        let script = removal_script("button-1-abc");
        assert_eq!(script.ops.len(), 3);
        assert!(matches!(&script.ops[1], MutationOp::RemoveStyle { style_id } if style_id == "style-button-1-abc"));
    }

    #[test]
    fn test_restore_script_keeps_instance_id() {
        let instance = LiveComponentInstance::new("card");
        let script = restore_script(&instance);
        assert_eq!(script.instance_id, instance.instance_id);
        assert!(matches!(&script.ops[0], MutationOp::CreateWrapper { instance_id, .. } if *instance_id == instance.instance_id));
    }

    #[test]
    fn test_scoped_tag_ids() {
        assert_eq!(style_id("button-1-abc"), "style-button-1-abc");
        assert_eq!(script_id("button-1-abc"), "script-button-1-abc");
    }

    #[test]
    fn test_ops_serialize_tagged() {
        let op = MutationOp::RemoveNode {
            instance_id: "x".to_string(),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "remove_node");
        assert_eq!(json["instance_id"], "x");
    }
}
