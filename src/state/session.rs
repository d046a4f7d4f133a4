use std::collections::HashMap;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::dao::models::QuestionEntity;
use crate::state::state_machine::{SessionPhase, SessionStateMachine};

/// Identifier of one realtime connection (socket), assigned at upgrade time.
pub type ConnectionId = Uuid;

/// A connected player of the current session.
///
/// Created on join, dropped on disconnect or session end. The cursor starts
/// unset; the first `requestNextQuestion` moves it to question 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Display name, unique case-insensitively within the session.
    pub name: String,
    /// Branch declared on join.
    pub branch: String,
    /// Year declared on join.
    pub year: String,
    /// Running signed score.
    pub score: i64,
    /// Index of the question currently served to this participant.
    pub cursor: Option<usize>,
    /// Answers given so far, `None` marking a client-reported timeout.
    pub answers: HashMap<Uuid, Option<u32>>,
}

impl Participant {
    /// Create a fresh participant with no score, cursor, or answers.
    pub fn new(name: String, branch: String, year: String) -> Self {
        Self {
            name,
            branch,
            year,
            score: 0,
            cursor: None,
            answers: HashMap::new(),
        }
    }
}

/// Data of the session occupying the global slot (Waiting or Active).
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Host that started the session.
    pub owner_id: Uuid,
    /// Quiz the session is running.
    pub quiz_id: Uuid,
    /// Quiz display name, echoed in broadcasts.
    pub quiz_name: String,
    /// Join code participants must supply while waiting.
    pub join_code: String,
    /// Read-only question snapshot loaded at start time.
    pub questions: Vec<QuestionEntity>,
    /// Connected participants in join order, keyed by connection.
    pub participants: IndexMap<ConnectionId, Participant>,
}

impl SessionContext {
    /// Whether `name` collides case-insensitively with an existing participant.
    pub fn name_taken(&self, name: &str) -> bool {
        self.participants
            .values()
            .any(|participant| participant.name.eq_ignore_ascii_case(name))
    }

}

/// The single, explicitly owned session slot shared by every handler.
///
/// Handlers take the slot lock for their whole body, which reproduces the
/// run-to-completion dispatch the scoring protocol assumes: no handler ever
/// observes a half-applied mutation.
#[derive(Debug, Default)]
pub struct SessionSlot {
    /// Phase machine guarding the single-active-session invariant.
    pub machine: SessionStateMachine,
    /// Session data; `Some` only while the phase is Waiting or Active.
    pub context: Option<SessionContext>,
}

impl SessionSlot {
    /// Create an empty slot in the finished (idle) phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase of the slot.
    pub fn phase(&self) -> SessionPhase {
        self.machine.phase()
    }

    /// Quiz name of the occupying session, if any.
    pub fn quiz_name(&self) -> Option<&str> {
        self.context.as_ref().map(|ctx| ctx.quiz_name.as_str())
    }

    /// Number of connected participants.
    pub fn participant_count(&self) -> usize {
        self.context
            .as_ref()
            .map_or(0, |ctx| ctx.participants.len())
    }

    /// Drop the session data, leaving the phase as is.
    pub fn clear_context(&mut self) {
        self.context = None;
    }
}
