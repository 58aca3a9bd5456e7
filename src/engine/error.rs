use thiserror::Error;

use crate::models::TicketStatus;

/// Failure taxonomy for engine operations. Every variant carries a
/// human-readable explanation; rendering is the caller's concern.
///
/// A failed operation never partially applies: the engine hands back a new
/// ticket on success and leaves the input untouched on error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required field is missing or malformed (e.g. empty rejection reason).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The actor lacks the role required for this transition.
    #[error("{actor} is not authorized to {action} this ticket")]
    Unauthorized { actor: String, action: String },

    /// The action is not legal from the ticket's current state.
    #[error("cannot {action} a ticket in status '{status}'")]
    InvalidTransition {
        action: String,
        status: TicketStatus,
    },

    /// An unknown ticket, issue, or user id was referenced.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// Reference data is inconsistent (e.g. a dangling assignee id). The
    /// assignee selector degrades gracefully instead of raising this; it is
    /// reserved for places where no sensible fallback exists.
    #[error("configuration defect: {0}")]
    ConfigurationDefect(String),
}

impl EngineError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn unauthorized(actor: impl Into<String>, action: impl Into<String>) -> Self {
        EngineError::Unauthorized {
            actor: actor.into(),
            action: action.into(),
        }
    }

    pub fn invalid_transition(action: impl Into<String>, status: TicketStatus) -> Self {
        EngineError::InvalidTransition {
            action: action.into(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_human_readable() {
        let err = EngineError::invalid_transition("resolve", TicketStatus::Closed);
        assert_eq!(
            err.to_string(),
            "cannot resolve a ticket in status 'closed'"
        );

        let err = EngineError::unauthorized("Charlie Requester", "start work on");
        assert_eq!(
            err.to_string(),
            "Charlie Requester is not authorized to start work on this ticket"
        );

        let err = EngineError::not_found("ticket", "TKT-9999");
        assert_eq!(err.to_string(), "ticket 'TKT-9999' not found");

        let err = EngineError::Validation("rejection reason is required".into());
        assert_eq!(
            err.to_string(),
            "validation failed: rejection reason is required"
        );
    }
}
