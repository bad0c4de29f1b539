//! Host↔renderer wire protocol.
//!
//! Everything crossing the sandbox boundary is a JSON envelope carrying a
//! protocol version and the sender's renderer identity. The host drops
//! messages whose version or sender does not match, so two previews on
//! one page cannot cross-talk and a stale renderer cannot silently feed a
//! newer host.

use serde::{Deserialize, Serialize};

use weft_engine::{MutationScript, Point};

use crate::error::{PreviewError, PreviewResult};

/// Bumped whenever the envelope or event payloads change shape.
pub const PROTOCOL_VERSION: u32 = 1;

/// Direction of a layer-move request from the floating toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerDirection {
    Forward,
    Backward,
}

/// Structural events reported by the interaction runtime inside the
/// sandbox. The two ack events drive the render-cycle state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RendererEvent {
    ElementSelected {
        #[serde(skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        outer_markup: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<Point>,
    },
    ElementDoubleClicked {
        #[serde(skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        outer_markup: Option<String>,
    },
    ComponentSelected {
        instance_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<Point>,
    },
    ComponentDoubleClicked {
        instance_id: String,
    },
    ComponentMoved {
        instance_id: String,
        position: Point,
    },
    ComponentResized {
        instance_id: String,
        width: f64,
        height: f64,
    },
    ComponentEditRequested {
        instance_id: String,
    },
    ComponentDuplicateRequested {
        instance_id: String,
    },
    ComponentDeleteRequested {
        instance_id: String,
    },
    ComponentLayerMoveRequested {
        instance_id: String,
        direction: LayerDirection,
    },
    ContentResized {
        width: f64,
        height: f64,
    },
    /// Keyboard shortcuts inside the sandbox cannot act on host state
    /// themselves; they surface as requests.
    UndoRequested,
    RedoRequested,
    SaveRequested,
    DocumentLoaded,
    RuntimeReady,
}

/// The envelope every renderer message travels in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub sender: String,
    #[serde(flatten)]
    pub event: RendererEvent,
}

impl Envelope {
    pub fn new(sender: &str, event: RendererEvent) -> Self {
        Envelope {
            version: PROTOCOL_VERSION,
            sender: sender.to_string(),
            event,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Decode a raw renderer message, enforcing version and sender identity.
pub fn decode_event(raw: &str, expected_sender: &str) -> PreviewResult<RendererEvent> {
    let envelope: Envelope = serde_json::from_str(raw).map_err(|e| PreviewError::Decode {
        message: e.to_string(),
    })?;
    if envelope.version != PROTOCOL_VERSION {
        return Err(PreviewError::VersionMismatch {
            expected: PROTOCOL_VERSION,
            got: envelope.version,
        });
    }
    if envelope.sender != expected_sender {
        return Err(PreviewError::UnknownSender {
            sender: envelope.sender,
        });
    }
    Ok(envelope.event)
}

/// Instructions the host sends into the sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostMessage {
    /// Replace the whole document (full re-render).
    LoadDocument { document: String },
    /// Apply an incremental mutation script.
    ApplyMutations { script: MutationScript },
    /// Highlight an instance (e.g. selection made from the host UI).
    SelectComponent { instance_id: String },
    ClearSelection,
}

impl HostMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Structured events the controller emits to the host collaborator
/// (chat/selection UI). Not part of the sandbox wire protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostNotification {
    ComponentInserted {
        instance_id: String,
    },
    ComponentRemoved {
        instance_id: String,
    },
    ComponentUpdated {
        instance_id: String,
    },
    ComponentSelected {
        instance_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<Point>,
    },
    ElementSelected {
        #[serde(skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        outer_markup: Option<String>,
    },
    EditRequested {
        instance_id: String,
    },
    ContentResized {
        width: f64,
        height: f64,
    },
    SaveRequested,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_round_trip() {
        let envelope = Envelope::new(
            "renderer-1",
            RendererEvent::ComponentMoved {
                instance_id: "button-1".to_string(),
                position: Point::new(10.0, 20.0),
            },
        );
        let json = envelope.to_json();
        assert!(json.contains("\"COMPONENT_MOVED\""));

        let event = decode_event(&json, "renderer-1").unwrap();
        assert_eq!(event, envelope.event);
    }

    #[test]
    fn test_decode_rejects_foreign_sender() {
        let envelope = Envelope::new("renderer-a", RendererEvent::RuntimeReady);
        let err = decode_event(&envelope.to_json(), "renderer-b").unwrap_err();
        assert!(matches!(err, PreviewError::UnknownSender { .. }));
    }

    #[test]
    fn test_decode_rejects_version_mismatch() {
        let mut envelope = Envelope::new("renderer-a", RendererEvent::RuntimeReady);
        envelope.version = 99;
        let json = serde_json::to_string(&envelope).unwrap();
        let err = decode_event(&json, "renderer-a").unwrap_err();
        assert!(matches!(err, PreviewError::VersionMismatch { got: 99, .. }));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_event("not json", "r"),
            Err(PreviewError::Decode { .. })
        ));
    }
}
