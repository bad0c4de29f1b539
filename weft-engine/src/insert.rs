use serde::{Deserialize, Serialize};

use crate::codegen::{effective_props, generate};
use crate::error::{EngineError, EngineResult};
use crate::history::{
    HistoryChange, InsertionHistory, InsertionHistoryEntry, DEFAULT_HISTORY_CAPACITY,
};
use crate::instance::{
    new_group_id, new_instance_id, LiveComponentInstance, LiveInstanceMap, Point, Rect,
};
use crate::mutation::{script_id, style_id, MutationOp, MutationScript, MARKER_CLASS};
use crate::options::{ComponentInsertionOptions, InstanceUpdates, Placement};
use crate::registry::ComponentRegistry;
use crate::tokens::DesignTokenSet;
use crate::validate::{validate, ValidationReport};

/// Tunables for the engine. Serde-deserializable so hosts can load it
/// alongside their own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub history_capacity: usize,
    /// Offset applied to duplicated instances so they do not overlap.
    pub duplicate_offset: f64,
    /// Hit-test radius for `component_at_position`.
    pub hit_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            duplicate_offset: 20.0,
            hit_tolerance: 50.0,
        }
    }
}

/// Result of a successful insert.
#[derive(Debug, Clone)]
pub struct Insertion {
    pub instance_id: String,
    pub script: MutationScript,
    pub instance: LiveComponentInstance,
}

/// Result of a successful update.
#[derive(Debug, Clone)]
pub struct Update {
    pub script: MutationScript,
    pub instance: LiveComponentInstance,
}

/// Turns insertion intents into validated document mutations and owns the
/// linear undo/redo history. One engine per preview session; the host
/// controller constructs and owns it (never a process-wide singleton).
#[derive(Debug, Clone)]
pub struct InsertionEngine {
    registry: ComponentRegistry,
    history: InsertionHistory,
    config: EngineConfig,
}

impl InsertionEngine {
    pub fn new(registry: ComponentRegistry) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: ComponentRegistry, config: EngineConfig) -> Self {
        InsertionEngine {
            registry,
            history: InsertionHistory::with_capacity(config.history_capacity),
            config,
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &InsertionHistory {
        &self.history
    }

    /// Drop all history, e.g. when the host replaces the whole document.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Validate an insertion request without touching any state.
    pub fn validate(
        &self,
        options: &ComponentInsertionOptions,
        live: &LiveInstanceMap,
    ) -> ValidationReport {
        validate(&self.registry, options, live)
    }

    /// Insert a new component instance. Validation failures abort before
    /// any mutation; on success the live map gains the instance and an
    /// `insert` entry lands on the history stack.
    pub fn insert(
        &mut self,
        options: &ComponentInsertionOptions,
        tokens: &DesignTokenSet,
        live: &mut LiveInstanceMap,
    ) -> EngineResult<Insertion> {
        let report = self.validate(options, live);
        if !report.is_valid {
            return Err(EngineError::ValidationFailed {
                component_id: options.component_id.clone(),
                report,
            });
        }

        let definition = self.registry.get(&options.component_id)?;
        let props = effective_props(definition, &options.props, options.variant.as_deref());
        let code = generate(
            &self.registry,
            &options.component_id,
            &props,
            options.variant.as_deref(),
            tokens,
        )?;

        let instance = LiveComponentInstance {
            instance_id: new_instance_id(&options.component_id),
            component_id: options.component_id.clone(),
            variant: options.variant.clone(),
            props,
            code: code.clone(),
            position: options.insertion_point,
            z_index: options.z_index,
            group_id: options.group_id.clone(),
            visible: true,
            locked: false,
            state: Default::default(),
        };

        let script = build_insert_script(&instance, options, &code);

        let entry = InsertionHistoryEntry::new(
            &instance.component_id,
            &instance.instance_id,
            HistoryChange::Insert {
                instance: instance.clone(),
            },
        );

        // Map mutation and history append happen together, after every
        // fallible step has succeeded.
        live.insert(instance.instance_id.clone(), instance.clone());
        self.history.push(entry);

        Ok(Insertion {
            instance_id: instance.instance_id.clone(),
            script,
            instance,
        })
    }

    /// Remove an instance, capturing the full prior state as the undo
    /// payload.
    pub fn remove(
        &mut self,
        instance_id: &str,
        live: &mut LiveInstanceMap,
    ) -> EngineResult<MutationScript> {
        let instance = live
            .get(instance_id)
            .cloned()
            .ok_or_else(|| EngineError::InstanceNotFound {
                instance_id: instance_id.to_string(),
            })?;

        let script = crate::mutation::removal_script(instance_id);

        let component_id = instance.component_id.clone();
        let entry = InsertionHistoryEntry::new(
            &component_id,
            instance_id,
            HistoryChange::Remove { instance },
        );

        live.remove(instance_id);
        self.history.push(entry);

        Ok(script)
    }

    /// Merge updates into an instance. Prop changes regenerate code and
    /// replace markup/styles in place (behavior scripts are not
    /// re-injected); a position-only change emits a positional style
    /// update without touching markup and records a `move` entry.
    pub fn update(
        &mut self,
        instance_id: &str,
        updates: &InstanceUpdates,
        tokens: &DesignTokenSet,
        live: &mut LiveInstanceMap,
    ) -> EngineResult<Update> {
        let before = live
            .get(instance_id)
            .cloned()
            .ok_or_else(|| EngineError::InstanceNotFound {
                instance_id: instance_id.to_string(),
            })?;

        let mut after = before.clone();
        let mut script = MutationScript::new(instance_id);

        let props_changed = updates.props.is_some() || updates.variant.is_some();
        if let Some(props) = &updates.props {
            for (k, v) in props {
                after.props.insert(k.clone(), v.clone());
            }
        }
        if let Some(variant) = &updates.variant {
            after.variant = Some(variant.clone());
        }

        if props_changed {
            let code = generate(
                &self.registry,
                &after.component_id,
                &after.props,
                after.variant.as_deref(),
                tokens,
            )?;
            after.code = code.clone();
            script.push(MutationOp::ReplaceHtml {
                instance_id: instance_id.to_string(),
                html: code.html,
            });
            script.push(MutationOp::ReplaceStyle {
                style_id: style_id(instance_id),
                css: code.css,
            });
        }

        if let Some(z) = updates.z_index {
            after.z_index = Some(z);
        }
        if let Some(position) = updates.position {
            after.position = Some(position);
        }
        if updates.position.is_some() || updates.z_index.is_some() {
            // A z-order change still needs the positional restyle, as long
            // as the instance has a position to restate.
            if let Some(position) = after.position {
                script.push(MutationOp::SetPosition {
                    instance_id: instance_id.to_string(),
                    position,
                    z_index: after.z_index,
                });
            }
        }
        if let Some(visible) = updates.visible {
            after.visible = visible;
        }
        if let Some(locked) = updates.locked {
            after.locked = locked;
        }

        let position_only = updates.position.is_some()
            && !props_changed
            && updates.z_index.is_none()
            && updates.visible.is_none()
            && updates.locked.is_none();

        let change = if position_only {
            HistoryChange::Move {
                before: before.position,
                // position_only guarantees the field is set
                after: updates.position.unwrap_or_default(),
            }
        } else {
            HistoryChange::Modify {
                before: before.clone(),
                after: after.clone(),
            }
        };
        let entry = InsertionHistoryEntry::new(&after.component_id, instance_id, change);

        live.insert(instance_id.to_string(), after.clone());
        self.history.push(entry);

        Ok(Update {
            script,
            instance: after,
        })
    }

    /// Sugar over `update` restricted to the position field.
    pub fn move_to(
        &mut self,
        instance_id: &str,
        position: Point,
        tokens: &DesignTokenSet,
        live: &mut LiveInstanceMap,
    ) -> EngineResult<Update> {
        self.update(instance_id, &InstanceUpdates::position(position), tokens, live)
    }

    /// Insert a copy of an existing instance, offset so the two do not
    /// overlap exactly.
    pub fn duplicate(
        &mut self,
        instance_id: &str,
        tokens: &DesignTokenSet,
        live: &mut LiveInstanceMap,
    ) -> EngineResult<Insertion> {
        let source = live
            .get(instance_id)
            .cloned()
            .ok_or_else(|| EngineError::InstanceNotFound {
                instance_id: instance_id.to_string(),
            })?;

        let offset = self.config.duplicate_offset;
        let mut options = ComponentInsertionOptions::new(&source.component_id);
        options.variant = source.variant.clone();
        options.props = source.props.clone();
        options.z_index = source.z_index;
        options.insertion_point = Some(
            source
                .position
                .map(|p| p.offset(offset, offset))
                .unwrap_or(Point::new(offset, offset)),
        );

        self.insert(&options, tokens, live)
    }

    /// Step the history pointer back, returning the entry to revert.
    /// Translating the entry into concrete remove/insert/update calls is
    /// the host controller's job.
    pub fn undo(&mut self) -> Option<InsertionHistoryEntry> {
        self.history.undo()
    }

    /// Step the history pointer forward, returning the entry to re-apply.
    pub fn redo(&mut self) -> Option<InsertionHistoryEntry> {
        self.history.redo()
    }

    /// Hit test against each instance's recorded position. Uses a fixed
    /// radius rather than rendered bounds (instances self-report only a
    /// point at this layer); the closest match wins.
    pub fn component_at_position<'a>(
        &self,
        x: f64,
        y: f64,
        live: &'a LiveInstanceMap,
    ) -> Option<&'a LiveComponentInstance> {
        let tolerance = self.config.hit_tolerance;
        live.values()
            .filter_map(|inst| {
                let p = inst.position?;
                let (dx, dy) = ((p.x - x).abs(), (p.y - y).abs());
                (dx <= tolerance && dy <= tolerance).then(|| (dx + dy, inst))
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, inst)| inst)
    }

    /// All instances whose recorded position falls inside the rectangle.
    pub fn components_in_area<'a>(
        &self,
        area: Rect,
        live: &'a LiveInstanceMap,
    ) -> Vec<&'a LiveComponentInstance> {
        live.values()
            .filter(|inst| inst.position.is_some_and(|p| area.contains(p)))
            .collect()
    }

    /// Stamp a shared group id on each named instance, minting one when
    /// none is supplied. Membership carries no cascading behavior here.
    pub fn group(
        &mut self,
        instance_ids: &[String],
        group_id: Option<String>,
        live: &mut LiveInstanceMap,
    ) -> EngineResult<String> {
        for id in instance_ids {
            if !live.contains_key(id) {
                return Err(EngineError::InstanceNotFound {
                    instance_id: id.clone(),
                });
            }
        }
        let group_id = group_id.unwrap_or_else(new_group_id);
        for id in instance_ids {
            if let Some(inst) = live.get_mut(id) {
                inst.group_id = Some(group_id.clone());
            }
        }
        Ok(group_id)
    }

    /// Clear the group id from every member. Unknown groups are an error;
    /// an empty group cannot be observed here because membership lives on
    /// the instances themselves.
    pub fn ungroup(&mut self, group_id: &str, live: &mut LiveInstanceMap) -> EngineResult<usize> {
        let mut cleared = 0;
        for inst in live.values_mut() {
            if inst.group_id.as_deref() == Some(group_id) {
                inst.group_id = None;
                cleared += 1;
            }
        }
        if cleared == 0 {
            return Err(EngineError::GroupNotFound {
                group_id: group_id.to_string(),
            });
        }
        Ok(cleared)
    }
}

fn build_insert_script(
    instance: &LiveComponentInstance,
    options: &ComponentInsertionOptions,
    code: &crate::codegen::GeneratedCode,
) -> MutationScript {
    // Cursor placement without pointer context degrades to append.
    let placement = if options.placement == Placement::Cursor && options.insertion_point.is_none() {
        Placement::Append
    } else {
        options.placement
    };

    let mut script = MutationScript::new(&instance.instance_id);
    script.push(MutationOp::CreateWrapper {
        instance_id: instance.instance_id.clone(),
        marker_class: MARKER_CLASS.to_string(),
        html: code.html.clone(),
        placement,
        target_selector: options.target_selector.clone(),
        replace_existing: options.replace_existing,
        preserve_styles: options.preserve_styles,
        position: instance.position,
        z_index: instance.z_index,
    });
    script.push(MutationOp::AttachStyle {
        style_id: style_id(&instance.instance_id),
        css: code.css.clone(),
    });
    if !code.js.is_empty() {
        script.push(MutationOp::AttachScript {
            script_id: script_id(&instance.instance_id),
            js: code.js.clone(),
        });
    }
    script
}
