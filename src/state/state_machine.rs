use thiserror::Error;

/// High-level phases a quiz session can be in.
///
/// `Finished` doubles as the idle state: no owner, no join code, nothing to
/// resume. At most one session occupies `Waiting` or `Active` process-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session is running; the slot is free for the next `start`.
    Finished,
    /// A lobby is open and participants may join with the code.
    Waiting,
    /// Questions are being served; each participant paces independently.
    Active,
}

/// Events that can be applied to the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A host opens a lobby for one of its quizzes.
    OpenLobby,
    /// The owning host promotes the lobby to live gameplay.
    Launch,
    /// The owning host terminates the session from the lobby or mid-game.
    Finish,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: SessionPhase,
    /// The event that cannot be applied from this phase.
    pub event: SessionEvent,
}

/// The single global session phase machine.
///
/// Callers mutate it only while holding the session slot lock, so a plain
/// validate-then-apply step is race free.
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    phase: SessionPhase,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Finished,
        }
    }
}

impl SessionStateMachine {
    /// Create a new state machine initialised in the finished (idle) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Validate and apply an event, returning the phase it moved to.
    pub fn apply(&mut self, event: SessionEvent) -> Result<SessionPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        Ok(next)
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: SessionEvent) -> Result<SessionPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (SessionPhase::Finished, SessionEvent::OpenLobby) => SessionPhase::Waiting,
            (SessionPhase::Waiting, SessionEvent::Launch) => SessionPhase::Active,
            (SessionPhase::Waiting, SessionEvent::Finish) => SessionPhase::Finished,
            (SessionPhase::Active, SessionEvent::Finish) => SessionPhase::Finished,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_finished() {
        let sm = SessionStateMachine::new();
        assert_eq!(sm.phase(), SessionPhase::Finished);
    }

    #[test]
    fn full_happy_path_through_session() {
        let mut sm = SessionStateMachine::new();

        assert_eq!(sm.apply(SessionEvent::OpenLobby), Ok(SessionPhase::Waiting));
        assert_eq!(sm.apply(SessionEvent::Launch), Ok(SessionPhase::Active));
        assert_eq!(sm.apply(SessionEvent::Finish), Ok(SessionPhase::Finished));
    }

    #[test]
    fn lobby_can_be_finished_without_launching() {
        let mut sm = SessionStateMachine::new();
        sm.apply(SessionEvent::OpenLobby).unwrap();
        assert_eq!(sm.apply(SessionEvent::Finish), Ok(SessionPhase::Finished));
    }

    #[test]
    fn second_lobby_is_rejected_while_one_is_open() {
        let mut sm = SessionStateMachine::new();
        sm.apply(SessionEvent::OpenLobby).unwrap();

        let err = sm.apply(SessionEvent::OpenLobby).unwrap_err();
        assert_eq!(err.from, SessionPhase::Waiting);
        assert_eq!(err.event, SessionEvent::OpenLobby);
        // Failed transition leaves the phase untouched.
        assert_eq!(sm.phase(), SessionPhase::Waiting);
    }

    #[test]
    fn launch_requires_a_waiting_lobby() {
        let mut sm = SessionStateMachine::new();
        let err = sm.apply(SessionEvent::Launch).unwrap_err();
        assert_eq!(err.from, SessionPhase::Finished);
        assert_eq!(sm.phase(), SessionPhase::Finished);

        sm.apply(SessionEvent::OpenLobby).unwrap();
        sm.apply(SessionEvent::Launch).unwrap();
        // A second launch mid-game is invalid too.
        assert!(sm.apply(SessionEvent::Launch).is_err());
        assert_eq!(sm.phase(), SessionPhase::Active);
    }

    #[test]
    fn finish_requires_an_open_session() {
        let mut sm = SessionStateMachine::new();
        let err = sm.apply(SessionEvent::Finish).unwrap_err();
        assert_eq!(err.from, SessionPhase::Finished);
        assert_eq!(err.event, SessionEvent::Finish);
    }
}
