//! Tool trait definition

use async_trait::async_trait;
use market_core::Result;
use serde_json::Value;

/// Trait for tools an orchestrator can execute
///
/// Each tool provides a name, a description, and a JSON schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// # Arguments
    ///
    /// * `params` - Tool input as JSON value. Tools may accept looser shapes than
    ///   their schema advertises (a bare string, for example).
    ///
    /// # Returns
    ///
    /// Tool output as JSON value
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "query": { "type": "string" }
    ///     },
    ///     "required": ["query"]
    /// });
    /// assert_eq!(schema["required"][0], "query");
    /// ```
    fn input_schema(&self) -> Value;
}
