//! Error types shared by the orchestrator and its collaborators.
//!
//! Every collaborator boundary reports failures as a [`CollaboratorError`].
//! The orchestrator wraps the ones it cannot recover from in a [`TurnError`]
//! tagged with the stage of the turn that failed.

use std::fmt;

use thiserror::Error;

/// The collaborator that produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collaborator {
    ContextStore,
    ModelClient,
    ToolRegistry,
    WebSearch,
    SubAgent,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collaborator::ContextStore => "context store",
            Collaborator::ModelClient => "model client",
            Collaborator::ToolRegistry => "tool registry",
            Collaborator::WebSearch => "web search",
            Collaborator::SubAgent => "sub-agent launcher",
        };
        f.write_str(name)
    }
}

/// A failure reported across a collaborator boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CollaboratorError {
    #[error("{collaborator} unavailable: {reason}")]
    Unavailable {
        collaborator: Collaborator,
        reason: String,
    },

    #[error("tool not registered: {0}")]
    UnregisteredTool(String),
}

impl CollaboratorError {
    /// Shorthand for an [`CollaboratorError::Unavailable`] error.
    pub fn unavailable(collaborator: Collaborator, reason: impl Into<String>) -> Self {
        CollaboratorError::Unavailable {
            collaborator,
            reason: reason.into(),
        }
    }

    /// The collaborator this error came from.
    pub fn collaborator(&self) -> Collaborator {
        match self {
            CollaboratorError::Unavailable { collaborator, .. } => *collaborator,
            CollaboratorError::UnregisteredTool(_) => Collaborator::ToolRegistry,
        }
    }
}

/// Result alias for collaborator calls.
pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// The step of a turn at which it was aborted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnStage {
    ContextLookup,
    ModelCall,
}

impl fmt::Display for TurnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnStage::ContextLookup => f.write_str("context lookup"),
            TurnStage::ModelCall => f.write_str("model call"),
        }
    }
}

/// A turn that could not produce a model response.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{stage} failed: {source}")]
pub struct TurnError {
    pub stage: TurnStage,
    #[source]
    pub source: CollaboratorError,
}

impl TurnError {
    pub fn new(stage: TurnStage, source: CollaboratorError) -> Self {
        Self { stage, source }
    }
}
