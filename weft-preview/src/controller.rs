//! Host preview controller: the single source of truth.
//!
//! Owns the document triple, the token set, the live-instance map, and
//! the insertion context, and bridges engine output into renderer
//! messages. Every mutator follows one shape: call the engine, merge the
//! result into the authoritative map, and forward the mutation script
//! only while the preview view is active — the map stays correct even
//! when the renderer is not mounted, and a later view switch re-renders
//! everything from it.

use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use weft_engine::{
    position_script, removal_script, restore_script, rewrite_script, ComponentInsertionOptions,
    DesignTokenSet, EngineConfig, HistoryChange, Insertion, InsertionEngine,
    InsertionHistoryEntry, InstanceUpdates, LiveInstanceMap, Placement, Point,
};

use crate::debounce::{DebounceGate, RenderTicket};
use crate::document::{build_document, DocumentSource};
use crate::error::PreviewResult;
use crate::protocol::{HostMessage, HostNotification, LayerDirection, RendererEvent};
use crate::renderer::SandboxRenderer;
use crate::runtime::RuntimeOptions;

/// What the surrounding application is currently showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Preview,
    Source,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Select,
    Drag,
    Resize,
}

/// Current interaction state: mode, snapping toggles, and the last known
/// pointer location (feeds cursor-placement inserts).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsertionContext {
    pub mode: InteractionMode,
    pub snap_to_grid: Option<bool>,
    pub snap_to_edges: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_pointer: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewConfig {
    pub debounce_ms: u64,
    pub runtime: RuntimeOptions,
    pub engine: EngineConfig,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            debounce_ms: 300,
            runtime: RuntimeOptions::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl PreviewConfig {
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug)]
pub struct PreviewController {
    config: PreviewConfig,
    source: DocumentSource,
    tokens: DesignTokenSet,
    engine: InsertionEngine,
    live: LiveInstanceMap,
    context: InsertionContext,
    view: ViewMode,
    renderer: SandboxRenderer,
    gate: DebounceGate,
    notifications: Vec<HostNotification>,
    selected: Option<String>,
}

impl PreviewController {
    pub fn new(registry: weft_engine::ComponentRegistry) -> Self {
        Self::with_config(registry, PreviewConfig::default())
    }

    pub fn with_config(registry: weft_engine::ComponentRegistry, config: PreviewConfig) -> Self {
        let gate = DebounceGate::new(config.debounce_delay());
        let engine = InsertionEngine::with_config(registry, config.engine.clone());
        PreviewController {
            config,
            source: DocumentSource::default(),
            tokens: DesignTokenSet::default(),
            engine,
            live: LiveInstanceMap::new(),
            context: InsertionContext::default(),
            view: ViewMode::Preview,
            renderer: SandboxRenderer::new(),
            gate,
            notifications: Vec::new(),
            selected: None,
        }
    }

    // --- accessors ---

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    pub fn tokens(&self) -> &DesignTokenSet {
        &self.tokens
    }

    pub fn live_instances(&self) -> &LiveInstanceMap {
        &self.live
    }

    pub fn engine(&self) -> &InsertionEngine {
        &self.engine
    }

    pub fn context(&self) -> &InsertionContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut InsertionContext {
        &mut self.context
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    pub fn renderer(&self) -> &SandboxRenderer {
        &self.renderer
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    // --- content & rendering ---

    /// Replace the document triple; re-render after the quiet period.
    pub fn set_source(&mut self, source: DocumentSource) -> RenderTicket {
        self.source = source;
        self.gate.schedule()
    }

    /// Replace the token set wholesale; re-render after the quiet period.
    pub fn set_tokens(&mut self, tokens: DesignTokenSet) -> RenderTicket {
        self.tokens = tokens;
        self.gate.schedule()
    }

    /// Switching into preview re-renders everything from the
    /// authoritative map — incremental scripts may have been skipped
    /// while the source view was up.
    pub fn set_view_mode(&mut self, view: ViewMode) {
        let entering_preview = view == ViewMode::Preview && self.view != ViewMode::Preview;
        self.view = view;
        if entering_preview {
            self.render_now();
        }
    }

    /// Present a debounce ticket; only the newest one triggers the
    /// actual render, and only while the preview is showing.
    pub fn commit_render(&mut self, ticket: RenderTicket) -> bool {
        if !self.gate.is_current(ticket) {
            return false;
        }
        if self.view == ViewMode::Preview {
            self.render_now();
        }
        true
    }

    pub fn debounce_delay(&self) -> Duration {
        self.gate.delay()
    }

    /// Build and dispatch the full document immediately.
    pub fn render_now(&mut self) {
        let mut runtime = self.config.runtime.clone();
        if let Some(grid) = self.context.snap_to_grid {
            runtime.snap_to_grid = grid;
        }
        if let Some(edges) = self.context.snap_to_edges {
            runtime.edge_snapping = edges;
        }
        let document = build_document(
            &self.source,
            &self.tokens,
            &self.live,
            self.renderer.id(),
            &runtime,
        );
        self.renderer.load_document(document);
    }

    /// Drain queued host→renderer messages for transport into the sandbox.
    pub fn take_renderer_messages(&mut self) -> Vec<HostMessage> {
        self.renderer.take_outbound()
    }

    /// Drain structured events for the host collaborator.
    pub fn take_notifications(&mut self) -> Vec<HostNotification> {
        std::mem::take(&mut self.notifications)
    }

    // --- component mutators ---

    pub fn insert_component(
        &mut self,
        options: &ComponentInsertionOptions,
    ) -> PreviewResult<Insertion> {
        let mut options = options.clone();
        // Cursor placement picks up the last pointer the renderer reported.
        if options.placement == Placement::Cursor && options.insertion_point.is_none() {
            options.insertion_point = self.context.last_pointer;
        }

        let insertion = self.engine.insert(&options, &self.tokens, &mut self.live)?;
        self.forward(insertion.script.clone());
        self.notifications.push(HostNotification::ComponentInserted {
            instance_id: insertion.instance_id.clone(),
        });
        Ok(insertion)
    }

    pub fn remove_component(&mut self, instance_id: &str) -> PreviewResult<()> {
        let script = self.engine.remove(instance_id, &mut self.live)?;
        if self.selected.as_deref() == Some(instance_id) {
            self.selected = None;
        }
        self.forward(script);
        self.notifications.push(HostNotification::ComponentRemoved {
            instance_id: instance_id.to_string(),
        });
        Ok(())
    }

    pub fn update_component(
        &mut self,
        instance_id: &str,
        updates: &InstanceUpdates,
    ) -> PreviewResult<()> {
        let update = self
            .engine
            .update(instance_id, updates, &self.tokens, &mut self.live)?;
        self.forward(update.script);
        self.notifications.push(HostNotification::ComponentUpdated {
            instance_id: instance_id.to_string(),
        });
        Ok(())
    }

    pub fn move_component(&mut self, instance_id: &str, position: Point) -> PreviewResult<()> {
        self.update_component(instance_id, &InstanceUpdates::position(position))
    }

    pub fn duplicate_component(&mut self, instance_id: &str) -> PreviewResult<String> {
        let insertion = self
            .engine
            .duplicate(instance_id, &self.tokens, &mut self.live)?;
        self.forward(insertion.script);
        self.notifications.push(HostNotification::ComponentInserted {
            instance_id: insertion.instance_id.clone(),
        });
        Ok(insertion.instance_id)
    }

    pub fn group_components(
        &mut self,
        instance_ids: &[String],
        group_id: Option<String>,
    ) -> PreviewResult<String> {
        Ok(self.engine.group(instance_ids, group_id, &mut self.live)?)
    }

    pub fn ungroup_components(&mut self, group_id: &str) -> PreviewResult<usize> {
        Ok(self.engine.ungroup(group_id, &mut self.live)?)
    }

    // --- undo / redo ---

    /// Step the history back and translate the entry into the inverse
    /// operation. Missing targets are tolerated: history may reference
    /// instances removed through other means.
    pub fn undo_component_action(&mut self) -> Option<InsertionHistoryEntry> {
        let entry = self.engine.undo()?;
        match &entry.change {
            HistoryChange::Insert { instance } => {
                if self.live.remove(&instance.instance_id).is_some() {
                    self.forward(removal_script(&instance.instance_id));
                    self.notifications.push(HostNotification::ComponentRemoved {
                        instance_id: instance.instance_id.clone(),
                    });
                }
            }
            HistoryChange::Remove { instance } => {
                self.live
                    .insert(instance.instance_id.clone(), instance.clone());
                self.forward(restore_script(instance));
                self.notifications.push(HostNotification::ComponentInserted {
                    instance_id: instance.instance_id.clone(),
                });
            }
            HistoryChange::Modify { before, .. } => {
                if self.live.contains_key(&before.instance_id) {
                    self.live
                        .insert(before.instance_id.clone(), before.clone());
                    self.forward(rewrite_script(before));
                    self.notifications.push(HostNotification::ComponentUpdated {
                        instance_id: before.instance_id.clone(),
                    });
                }
            }
            HistoryChange::Move { before, .. } => {
                if let Some(instance) = self.live.get_mut(&entry.instance_id) {
                    instance.position = *before;
                    let z_index = instance.z_index;
                    if let Some(position) = *before {
                        self.forward(position_script(&entry.instance_id, position, z_index));
                    }
                }
            }
        }
        Some(entry)
    }

    /// Step the history forward and re-apply the entry's new-state side.
    pub fn redo_component_action(&mut self) -> Option<InsertionHistoryEntry> {
        let entry = self.engine.redo()?;
        match &entry.change {
            HistoryChange::Insert { instance } => {
                self.live
                    .insert(instance.instance_id.clone(), instance.clone());
                self.forward(restore_script(instance));
                self.notifications.push(HostNotification::ComponentInserted {
                    instance_id: instance.instance_id.clone(),
                });
            }
            HistoryChange::Remove { instance } => {
                if self.live.remove(&instance.instance_id).is_some() {
                    self.forward(removal_script(&instance.instance_id));
                    self.notifications.push(HostNotification::ComponentRemoved {
                        instance_id: instance.instance_id.clone(),
                    });
                }
            }
            HistoryChange::Modify { after, .. } => {
                if self.live.contains_key(&after.instance_id) {
                    self.live.insert(after.instance_id.clone(), after.clone());
                    self.forward(rewrite_script(after));
                    self.notifications.push(HostNotification::ComponentUpdated {
                        instance_id: after.instance_id.clone(),
                    });
                }
            }
            HistoryChange::Move { after, .. } => {
                if let Some(instance) = self.live.get_mut(&entry.instance_id) {
                    instance.position = Some(*after);
                    let z_index = instance.z_index;
                    self.forward(position_script(&entry.instance_id, *after, z_index));
                }
            }
        }
        Some(entry)
    }

    // --- renderer events ---

    /// Decode and react to one raw renderer message. Foreign senders,
    /// version mismatches, and malformed payloads are logged and dropped;
    /// messages referencing state that has already moved on are tolerated
    /// because the map here is the truth, not the renderer's DOM.
    pub fn handle_renderer_event(&mut self, raw: &str) -> Option<RendererEvent> {
        let event = match self.renderer.decode(raw) {
            Ok(event) => event,
            Err(err) => {
                warn!("dropping renderer message: {}", err);
                return None;
            }
        };
        self.renderer.observe(&event);

        match &event {
            RendererEvent::ComponentSelected {
                instance_id,
                position,
            } => {
                if let Some(instance) = self.live.get(instance_id) {
                    self.selected = Some(instance_id.clone());
                    self.context.last_pointer = (*position).or(instance.position);
                    // Position re-derived from our own map when we have one.
                    let reported = instance.position.or(*position);
                    self.notifications.push(HostNotification::ComponentSelected {
                        instance_id: instance_id.clone(),
                        position: reported,
                    });
                }
            }
            RendererEvent::ElementSelected {
                selector,
                outer_markup,
                position,
            } => {
                self.selected = None;
                self.context.last_pointer = *position;
                self.notifications.push(HostNotification::ElementSelected {
                    selector: selector.clone(),
                    outer_markup: outer_markup.clone(),
                });
            }
            RendererEvent::ElementDoubleClicked {
                selector,
                outer_markup,
            } => {
                self.notifications.push(HostNotification::ElementSelected {
                    selector: selector.clone(),
                    outer_markup: outer_markup.clone(),
                });
            }
            RendererEvent::ComponentDoubleClicked { instance_id }
            | RendererEvent::ComponentEditRequested { instance_id } => {
                if self.live.contains_key(instance_id) {
                    self.notifications.push(HostNotification::EditRequested {
                        instance_id: instance_id.clone(),
                    });
                }
            }
            RendererEvent::ComponentMoved {
                instance_id,
                position,
            } => {
                // The renderer already shows the move; record it in the
                // map and the history without echoing a script back.
                if self.live.contains_key(instance_id) {
                    if let Err(err) =
                        self.engine
                            .move_to(instance_id, *position, &self.tokens, &mut self.live)
                    {
                        warn!("move from renderer rejected: {}", err);
                    } else {
                        self.notifications.push(HostNotification::ComponentUpdated {
                            instance_id: instance_id.clone(),
                        });
                    }
                }
            }
            RendererEvent::ComponentResized {
                instance_id,
                width,
                height,
            } => {
                // Measured size is runtime state, not an engine mutation.
                if let Some(instance) = self.live.get_mut(instance_id) {
                    instance
                        .state
                        .insert("width".to_string(), serde_json::json!(width));
                    instance
                        .state
                        .insert("height".to_string(), serde_json::json!(height));
                    self.notifications.push(HostNotification::ComponentUpdated {
                        instance_id: instance_id.clone(),
                    });
                }
            }
            RendererEvent::ComponentDuplicateRequested { instance_id } => {
                if let Err(err) = self.duplicate_component(instance_id) {
                    warn!("duplicate from renderer rejected: {}", err);
                }
            }
            RendererEvent::ComponentDeleteRequested { instance_id } => {
                if let Err(err) = self.remove_component(instance_id) {
                    warn!("delete from renderer rejected: {}", err);
                }
            }
            RendererEvent::ComponentLayerMoveRequested {
                instance_id,
                direction,
            } => {
                if let Some(current) = self.live.get(instance_id).map(|i| i.z_index.unwrap_or(0)) {
                    let next = match direction {
                        LayerDirection::Forward => current + 1,
                        LayerDirection::Backward => current - 1,
                    };
                    let updates = InstanceUpdates {
                        z_index: Some(next),
                        ..InstanceUpdates::default()
                    };
                    if let Err(err) = self.update_component(instance_id, &updates) {
                        warn!("layer move from renderer rejected: {}", err);
                    }
                }
            }
            RendererEvent::ContentResized { width, height } => {
                self.notifications.push(HostNotification::ContentResized {
                    width: *width,
                    height: *height,
                });
            }
            RendererEvent::UndoRequested => {
                self.undo_component_action();
            }
            RendererEvent::RedoRequested => {
                self.redo_component_action();
            }
            RendererEvent::SaveRequested => {
                self.notifications.push(HostNotification::SaveRequested);
            }
            RendererEvent::DocumentLoaded | RendererEvent::RuntimeReady => {}
        }

        Some(event)
    }

    /// Forward a mutation script only while the preview view is showing.
    fn forward(&mut self, script: weft_engine::MutationScript) {
        if self.view == ViewMode::Preview && !script.is_empty() {
            self.renderer.apply_mutations(script);
        }
    }
}
