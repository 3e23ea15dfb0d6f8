use thiserror::Error;

/// Errors raised when an event cannot be applied to an entity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateMachineError {
    #[error("Invalid transition from {from} on event {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Guard failed: {0}")]
    GuardFailed(String),

    #[error("Invalid state in storage: {0}")]
    InvalidStoredState(String),
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;

pub(crate) fn invalid_transition(from: impl ToString, event: &str) -> StateMachineError {
    StateMachineError::InvalidTransition {
        from: from.to_string(),
        event: event.to_string(),
    }
}

pub(crate) fn guard_failed(reason: impl Into<String>) -> StateMachineError {
    StateMachineError::GuardFailed(reason.into())
}
