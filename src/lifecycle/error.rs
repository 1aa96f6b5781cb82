//! Error types for status parsing and transitions.

use thiserror::Error;

use super::{Action, DocumentKind};

/// A status string from the backend that is not part of a document kind's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} status '{raw}'")]
pub struct StatusParseError {
    pub kind: DocumentKind,
    pub raw: String,
}

/// An action that the current status does not permit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: cannot {action} a document in status '{from}'")]
pub struct TransitionError {
    pub kind: DocumentKind,
    pub action: Action,
    pub from: &'static str,
}
