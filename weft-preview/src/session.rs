//! Concurrent store for independent preview sessions.
//!
//! Each session is one controller with its own registry, engine, history,
//! and renderer identity, so previews never cross-contaminate. DashMap
//! entry guards serialize all mutation of a session's map and history;
//! the debounce sleep happens with no guard held.

use dashmap::DashMap;
use uuid::Uuid;

use weft_engine::ComponentRegistry;

use crate::controller::{PreviewConfig, PreviewController};
use crate::debounce::{DebounceGate, RenderTicket};
use crate::error::{PreviewError, PreviewResult};

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, PreviewController>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with its own controller; returns the session id.
    pub fn create(&self, registry: ComponentRegistry) -> String {
        self.create_with_config(registry, PreviewConfig::default())
    }

    pub fn create_with_config(
        &self,
        registry: ComponentRegistry,
        config: PreviewConfig,
    ) -> String {
        let id = format!("session-{}", &Uuid::new_v4().simple().to_string()[..8]);
        self.sessions
            .insert(id.clone(), PreviewController::with_config(registry, config));
        id
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Run a closure against one session's controller under its entry
    /// guard. Never hold the guard across an await point.
    pub fn with<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut PreviewController) -> R,
    ) -> PreviewResult<R> {
        let mut entry =
            self.sessions
                .get_mut(session_id)
                .ok_or_else(|| PreviewError::SessionNotFound {
                    session_id: session_id.to_string(),
                })?;
        Ok(f(entry.value_mut()))
    }

    /// Sleep out the session's quiet period, then commit the ticket.
    /// Returns whether a render actually happened (a newer change
    /// supersedes the ticket and wins instead).
    pub async fn debounced_commit(
        &self,
        session_id: &str,
        ticket: RenderTicket,
    ) -> PreviewResult<bool> {
        let delay = self.with(session_id, |c| c.debounce_delay())?;
        DebounceGate::wait(delay).await;
        self.with(session_id, |c| c.commit_render(ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_engine::builtin_registry;

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.create(builtin_registry());
        let b = store.create(builtin_registry());
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);

        let renderer_a = store.with(&a, |c| c.renderer().id().to_string()).unwrap();
        let renderer_b = store.with(&b, |c| c.renderer().id().to_string()).unwrap();
        assert_ne!(renderer_a, renderer_b);
    }

    #[test]
    fn test_unknown_session() {
        let store = SessionStore::new();
        assert!(matches!(
            store.with("session-missing", |_| ()),
            Err(PreviewError::SessionNotFound { .. })
        ));
        assert!(!store.remove("session-missing"));
    }
}
