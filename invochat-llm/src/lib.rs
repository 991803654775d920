mod openai_compatible;

pub use invochat_core::{LlmRequest, LlmResponse, Message, Role, ToolCall, ToolCallingLlm, ToolSpec};
pub use openai_compatible::{OpenAiCompatibleBuilder, OpenAiCompatibleClient};
