mod error;
mod llm;
mod store;
mod tool;
mod value;

pub use error::InvochatError;
pub use llm::{LlmRequest, LlmResponse, Message, Role, ToolCall, ToolCallingLlm, ToolSpec};
pub use store::{ObjectStore, ObjectStoreError, StoredObject};
pub use tool::{Tool, ToolError};
pub use value::Value;
