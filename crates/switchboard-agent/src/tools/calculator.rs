//! Calculator tool.
//!
//! Selected when a model response mentions "calculate". It does not parse an
//! expression out of the response: it ignores its input and always answers
//! with [`CALCULATOR_RESULT`].

use async_trait::async_trait;
use tracing::debug;

use super::base::Tool;

/// The calculator's fixed answer.
pub const CALCULATOR_RESULT: &str = "The result of the calculation is 42.";

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Answers calculation requests with a fixed result."
    }

    fn trigger(&self) -> Option<&str> {
        Some("calculate")
    }

    async fn execute(&self, input: &str) -> anyhow::Result<String> {
        debug!(input_len = input.len(), "calculator invoked");
        Ok(CALCULATOR_RESULT.to_string())
    }
}
