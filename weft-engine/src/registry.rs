use std::collections::BTreeMap;

use crate::definition::ComponentDefinition;
use crate::error::{EngineError, EngineResult};

/// In-memory catalog of component definitions. Read-mostly after startup;
/// owned by the preview session and passed to the engine, never a global.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    definitions: BTreeMap<String, ComponentDefinition>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Idempotent by id; last write wins.
    pub fn register(&mut self, definition: ComponentDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &str) -> EngineResult<&ComponentDefinition> {
        self.definitions
            .get(id)
            .ok_or_else(|| EngineError::ComponentNotFound {
                component_id: id.to_string(),
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Case-insensitive linear scan over name, description, and tags.
    /// Fine at catalog sizes of low hundreds.
    pub fn search(&self, query: &str) -> Vec<&ComponentDefinition> {
        let needle = query.to_lowercase();
        self.definitions
            .values()
            .filter(|d| {
                d.name.to_lowercase().contains(&needle)
                    || d.description.to_lowercase().contains(&needle)
                    || d.meta.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&ComponentDefinition> {
        self.definitions
            .values()
            .filter(|d| d.meta.category == category)
            .collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
