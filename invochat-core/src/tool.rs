use thiserror::Error;

use crate::Value;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    ExecutionFailed(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A callable tool advertised to the model.
///
/// `invoke` receives the raw JSON argument text from the model's tool call and
/// is responsible for parsing it into a typed argument struct. Failures are
/// returned, never panicked; the orchestrator turns them into `{error: ...}`
/// tool messages so the conversation can continue.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> Value;
    async fn invoke(&self, arguments: &str) -> Result<Value, ToolError>;
}
