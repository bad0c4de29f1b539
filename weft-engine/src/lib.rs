//! # weft-engine
//!
//! Core of the weft live-preview system: design-token resolution,
//! component registry and code generation, and the insertion engine that
//! turns insert/move/resize/remove/group intents into renderer mutation
//! scripts with validation and a reversible history stack.
//!
//! Everything here is synchronous and side-effect free outside the
//! structures a caller passes in: the host controller owns the live
//! instance map and lends it to the engine per operation, so several
//! independent preview sessions can coexist without shared state.
//!
//! ## Example
//! ```
//! use weft_engine::{
//!     builtin_registry, ComponentInsertionOptions, DesignTokenSet, InsertionEngine,
//!     LiveInstanceMap, PropValue,
//! };
//!
//! let mut engine = InsertionEngine::new(builtin_registry());
//! let tokens = DesignTokenSet::default();
//! let mut live = LiveInstanceMap::new();
//!
//! let options = ComponentInsertionOptions::new("button")
//!     .with_prop("children", PropValue::String("Save".into()));
//! let insertion = engine.insert(&options, &tokens, &mut live).unwrap();
//! assert!(live.contains_key(&insertion.instance_id));
//! ```

pub mod catalog;
pub mod codegen;
pub mod definition;
pub mod error;
pub mod history;
pub mod insert;
pub mod instance;
pub mod mutation;
pub mod options;
pub mod registry;
pub mod tokens;
pub mod validate;

// --- Core types ---
pub use catalog::{builtin_catalog, builtin_registry, BUILTIN_COMPONENTS};
pub use codegen::{escape_html, generate, GeneratedCode};
pub use definition::{
    ComponentDefinition, DefinitionMeta, PropKind, PropSpec, PropValue, StyleSheet, Template,
    VariantSpec,
};
pub use error::{EngineError, EngineResult};
pub use history::{HistoryChange, InsertionHistory, InsertionHistoryEntry};
pub use insert::{EngineConfig, Insertion, InsertionEngine, Update};
pub use instance::{LiveComponentInstance, LiveInstanceMap, Point, Rect};
pub use mutation::{
    position_script, removal_script, restore_script, rewrite_script, script_id, style_id,
    MutationOp, MutationScript, MARKER_CLASS,
};
pub use options::{ComponentInsertionOptions, InstanceUpdates, Placement};
pub use registry::ComponentRegistry;
pub use tokens::{DesignTokenSet, ThemeMode, Typography};
pub use validate::ValidationReport;
