//! Tool trait: the interface every registered tool implements.

use async_trait::async_trait;

/// A capability that turns the model's response text into a result string.
///
/// The registry picks a tool by matching its [`Tool::trigger`] against the
/// model response, then calls [`Tool::execute`] with that response as input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique identifier (e.g. `"calculator"`).
    fn name(&self) -> &str;

    /// Human-readable description, shown by `switchboard status`.
    fn description(&self) -> &str;

    /// Phrase that selects this tool when it appears in a model response.
    ///
    /// Tools without a trigger can only be invoked by name.
    fn trigger(&self) -> Option<&str> {
        None
    }

    /// Run the tool. Errors are converted to a result string by the registry.
    async fn execute(&self, input: &str) -> anyhow::Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    #[async_trait]
    impl Tool for Silent {
        fn name(&self) -> &str {
            "silent"
        }
        fn description(&self) -> &str {
            "Returns nothing"
        }
        async fn execute(&self, _input: &str) -> anyhow::Result<String> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_trigger_defaults_to_none() {
        let tool = Silent;
        assert!(tool.trigger().is_none());
        assert_eq!(tool.execute("anything").await.unwrap(), "");
    }
}
