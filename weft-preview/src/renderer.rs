//! Host-side handle for one sandboxed renderer.
//!
//! The renderer itself runs in an isolated surface (iframe/webview); this
//! handle owns its identity, tracks the render-cycle state machine, and
//! queues the messages the host wants executed inside the sandbox. The
//! DOM over there is a disposable projection; nothing here is read back
//! as authoritative state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use weft_engine::MutationScript;

use crate::error::PreviewResult;
use crate::protocol::{decode_event, HostMessage, RendererEvent};

/// One render cycle: Idle until content exists, Generating once a
/// document has been dispatched, Loaded when the sandbox parsed it,
/// Interactive when the runtime reported ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPhase {
    #[default]
    Idle,
    Generating,
    Loaded,
    Interactive,
}

#[derive(Debug)]
pub struct SandboxRenderer {
    id: String,
    phase: RenderPhase,
    document: Option<String>,
    outbound: Vec<HostMessage>,
}

impl Default for SandboxRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxRenderer {
    pub fn new() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        SandboxRenderer {
            id: format!("renderer-{}", &suffix[..8]),
            phase: RenderPhase::Idle,
            document: None,
            outbound: Vec::new(),
        }
    }

    /// The sender identity embedded in the runtime script; inbound
    /// messages must carry it back.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    pub fn is_interactive(&self) -> bool {
        self.phase == RenderPhase::Interactive
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Dispatch a full document; the cycle restarts at Generating until
    /// the sandbox acks it.
    pub fn load_document(&mut self, document: String) {
        self.phase = RenderPhase::Generating;
        self.document = Some(document.clone());
        self.outbound.push(HostMessage::LoadDocument { document });
    }

    /// Queue an incremental mutation script.
    pub fn apply_mutations(&mut self, script: MutationScript) {
        self.outbound.push(HostMessage::ApplyMutations { script });
    }

    pub fn select_component(&mut self, instance_id: &str) {
        self.outbound.push(HostMessage::SelectComponent {
            instance_id: instance_id.to_string(),
        });
    }

    pub fn clear_selection(&mut self) {
        self.outbound.push(HostMessage::ClearSelection);
    }

    /// Decode an inbound raw message, enforcing this renderer's identity.
    pub fn decode(&self, raw: &str) -> PreviewResult<RendererEvent> {
        decode_event(raw, &self.id)
    }

    /// Advance the phase machine on ack events; everything else leaves
    /// the phase alone.
    pub fn observe(&mut self, event: &RendererEvent) {
        match event {
            RendererEvent::DocumentLoaded => {
                if self.phase == RenderPhase::Generating {
                    self.phase = RenderPhase::Loaded;
                }
            }
            RendererEvent::RuntimeReady => {
                self.phase = RenderPhase::Interactive;
            }
            _ => {}
        }
    }

    /// Drain the queued host→renderer messages for transport.
    pub fn take_outbound(&mut self) -> Vec<HostMessage> {
        std::mem::take(&mut self.outbound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Envelope;

    #[test]
    fn test_phase_walk() {
        let mut renderer = SandboxRenderer::new();
        assert_eq!(renderer.phase(), RenderPhase::Idle);

        renderer.load_document("<!DOCTYPE html>".to_string());
        assert_eq!(renderer.phase(), RenderPhase::Generating);

        renderer.observe(&RendererEvent::DocumentLoaded);
        assert_eq!(renderer.phase(), RenderPhase::Loaded);

        renderer.observe(&RendererEvent::RuntimeReady);
        assert!(renderer.is_interactive());
    }

    #[test]
    fn test_stale_loaded_ack_is_ignored() {
        let mut renderer = SandboxRenderer::new();
        renderer.observe(&RendererEvent::DocumentLoaded);
        assert_eq!(renderer.phase(), RenderPhase::Idle);
    }

    #[test]
    fn test_decode_checks_own_identity() {
        let renderer = SandboxRenderer::new();
        let ok = Envelope::new(renderer.id(), RendererEvent::RuntimeReady).to_json();
        assert!(renderer.decode(&ok).is_ok());

        let foreign = Envelope::new("renderer-other", RendererEvent::RuntimeReady).to_json();
        assert!(renderer.decode(&foreign).is_err());
    }

    #[test]
    fn test_outbound_drains_once() {
        let mut renderer = SandboxRenderer::new();
        renderer.load_document("doc".to_string());
        renderer.clear_selection();
        assert_eq!(renderer.take_outbound().len(), 2);
        assert!(renderer.take_outbound().is_empty());
    }
}
