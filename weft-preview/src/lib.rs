//! # weft-preview
//!
//! The stateful half of weft: the host preview controller that owns the
//! canonical document state, the sandboxed renderer handle with its
//! render-cycle state machine, the versioned host↔renderer message
//! protocol, debounced re-rendering, and a concurrent session store.
//!
//! The controller is the single source of truth. The renderer's DOM is a
//! disposable projection of it: mutation scripts flow in, structural
//! events flow back out, and any message that disagrees with the
//! controller's own map loses.
//!
//! ## Example
//! ```
//! use weft_engine::{builtin_registry, ComponentInsertionOptions, PropValue};
//! use weft_preview::{DocumentSource, PreviewController};
//!
//! let mut controller = PreviewController::new(builtin_registry());
//! let ticket = controller.set_source(DocumentSource::new("<main></main>", "", ""));
//! controller.commit_render(ticket);
//!
//! let options = ComponentInsertionOptions::new("button")
//!     .with_prop("children", PropValue::String("Save".into()));
//! let inserted = controller.insert_component(&options).unwrap();
//! assert!(controller.live_instances().contains_key(&inserted.instance_id));
//! ```

pub mod controller;
pub mod debounce;
pub mod document;
pub mod error;
pub mod protocol;
pub mod renderer;
pub mod runtime;
pub mod session;

pub use controller::{
    InsertionContext, InteractionMode, PreviewConfig, PreviewController, ViewMode,
};
pub use debounce::{DebounceGate, RenderTicket};
pub use document::{build_document, DocumentSource, BASE_STYLES};
pub use error::{PreviewError, PreviewResult};
pub use protocol::{
    decode_event, Envelope, HostMessage, HostNotification, LayerDirection, RendererEvent,
    PROTOCOL_VERSION,
};
pub use renderer::{RenderPhase, SandboxRenderer};
pub use runtime::{interaction_runtime, RuntimeOptions, RUNTIME_STYLES};
pub use session::SessionStore;
