//! Owner of live widget instances.
//!
//! Hosts that manage several inputs at once (one per compose box, say) keep
//! them here and address them by `SessionId`. Creating and destroying an
//! instance is explicit; there is no global state.

use std::collections::HashMap;

use crate::autocomplete::{AutoCompleter, SimpleAutoCompleter};
use crate::error::{MentionsError, Result};
use crate::input::{MentionsInput, MentionsInputBuilder};
use crate::platform::TextSurface;

/// Opaque handle for a registered widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Widgets keyed by session.
pub struct MentionsRegistry<S, A = SimpleAutoCompleter> {
    next_id: u64,
    sessions: HashMap<SessionId, MentionsInput<S, A>>,
}

impl<S, A> Default for MentionsRegistry<S, A> {
    fn default() -> Self {
        Self {
            next_id: 0,
            sessions: HashMap::new(),
        }
    }
}

impl<S: TextSurface, A: AutoCompleter> MentionsRegistry<S, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a widget and register it.
    pub fn create(&mut self, builder: MentionsInputBuilder<S, A>) -> Result<SessionId> {
        let input = builder.build()?;
        Ok(self.insert(input))
    }

    /// Register an already built widget.
    pub fn insert(&mut self, input: MentionsInput<S, A>) -> SessionId {
        self.next_id += 1;
        let id = SessionId(self.next_id);
        self.sessions.insert(id, input);
        tracing::debug!(target: "mentions::input", session = %id, "session created");
        id
    }

    pub fn get(&self, id: SessionId) -> Option<&MentionsInput<S, A>> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut MentionsInput<S, A>> {
        self.sessions.get_mut(&id)
    }

    /// Like `get_mut`, but an unknown id is an error.
    pub fn session_mut(&mut self, id: SessionId) -> Result<&mut MentionsInput<S, A>> {
        self.sessions
            .get_mut(&id)
            .ok_or(MentionsError::UnknownSession(id))
    }

    /// Remove a widget, handing it back to the caller.
    pub fn destroy(&mut self, id: SessionId) -> Result<MentionsInput<S, A>> {
        let input = self
            .sessions
            .remove(&id)
            .ok_or(MentionsError::UnknownSession(id))?;
        tracing::debug!(target: "mentions::input", session = %id, "session destroyed");
        Ok(input)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.sessions.keys().copied()
    }
}
