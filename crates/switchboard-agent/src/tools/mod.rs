//! Tools the orchestrator can route a model response through.

pub mod base;
pub mod calculator;
pub mod registry;

pub use base::Tool;
pub use calculator::{CalculatorTool, CALCULATOR_RESULT};
pub use registry::{ToolRegistry, TOOL_NOT_FOUND};
