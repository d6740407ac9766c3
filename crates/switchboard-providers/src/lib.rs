//! Language model clients for Switchboard.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`]: the prompt → response boundary the orchestrator consumes
//! - [`http_provider::HttpProvider`]: OpenAI-compatible `/chat/completions` client
//! - [`echo::EchoProvider`]: offline model that echoes its prompt

pub mod echo;
pub mod http_provider;
pub mod traits;

pub use echo::EchoProvider;
pub use http_provider::HttpProvider;
pub use traits::{LlmProvider, LlmRequestConfig};
