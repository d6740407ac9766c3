//! Switchboard core: shared types, error taxonomy, configuration, and helpers.
//!
//! - **config**: JSON config schema, loader, env var overrides
//! - **error**: collaborator and turn error types
//! - **types**: chat completion wire types used by the HTTP model client
//! - **utils**: data paths, timestamps, string helpers

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::{Collaborator, CollaboratorError, CollaboratorResult, TurnError, TurnStage};
