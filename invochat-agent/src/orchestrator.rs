use invochat_core::{InvochatError, LlmRequest, Message, ToolCallingLlm, ToolSpec, Value};
use serde_json::json;

use crate::consent::{EmailDraft, CONSENT_TOOL_NAME};
use crate::prompt::system_prompt;
use crate::registry::ToolRegistry;

const MAX_TURNS: usize = 14;
const TEMPERATURE: f32 = 0.1;

pub const EXHAUSTED_FALLBACK: &str = "The agent could not complete your request within the \
                                      allowed steps. Please try rephrasing your request.";

/// What one call to [`AgentOrchestrator::chat`] produced.
///
/// `history` is always the inbound history, returned unchanged; the client
/// owns the transcript and appends the visible turns itself. Tool traffic
/// from this call is never persisted.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentOutcome {
    Answer {
        answer: String,
        history: Vec<Message>,
    },
    /// The model asked to send an email; the draft goes back to the user for
    /// approval before anything is sent.
    ConsentRequired {
        draft: EmailDraft,
        history: Vec<Message>,
        original_query: String,
    },
}

/// Bounded tool-calling loop around a chat-completions model.
pub struct AgentOrchestrator<L> {
    llm: L,
    model: String,
    registry: ToolRegistry,
}

impl<L: ToolCallingLlm> AgentOrchestrator<L> {
    pub fn new(llm: L, model: impl Into<String>, registry: ToolRegistry) -> Self {
        Self {
            llm,
            model: model.into(),
            registry,
        }
    }

    /// Runs the agent loop for one user query. The loop ends when the model
    /// answers in plain text, when it requests email consent, or after
    /// `MAX_TURNS` round-trips, whichever comes first.
    pub async fn chat(
        &self,
        query: &str,
        history: &[Message],
    ) -> Result<AgentOutcome, InvochatError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(system_prompt()));
        messages.extend(history.iter().cloned());
        messages.push(Message::user(query));

        let tools: Vec<ToolSpec> = self.registry.specs();

        for turn in 0..MAX_TURNS {
            let response = self
                .llm
                .complete(LlmRequest {
                    model: self.model.clone(),
                    messages: messages.clone(),
                    tools: tools.clone(),
                    temperature: Some(TEMPERATURE),
                })
                .await?;

            if response.tool_calls.is_empty() {
                return Ok(AgentOutcome::Answer {
                    answer: response.content,
                    history: history.to_vec(),
                });
            }

            // The consent signal is intercepted when it is the first call of
            // the turn; nothing else from that turn is dispatched.
            let first = &response.tool_calls[0];
            if first.name == CONSENT_TOOL_NAME {
                let draft: EmailDraft = serde_json::from_str(&first.arguments)
                    .map_err(|err| InvochatError::ConsentDraft(err.to_string()))?;
                tracing::info!(to = %draft.to_emails, "email consent requested");
                return Ok(AgentOutcome::ConsentRequired {
                    draft,
                    history: history.to_vec(),
                    original_query: query.to_string(),
                });
            }

            messages.push(Message::assistant_with_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let content = self.dispatch(&call.name, &call.arguments, turn).await;
                messages.push(Message::tool(call.id.clone(), call.name.clone(), content));
            }
        }

        tracing::warn!(max_turns = MAX_TURNS, "agent loop exhausted");
        Ok(AgentOutcome::Answer {
            answer: EXHAUSTED_FALLBACK.to_string(),
            history: history.to_vec(),
        })
    }

    /// Runs one tool call; every failure becomes an `{"error": ...}` payload
    /// fed back to the model so the loop can continue.
    async fn dispatch(&self, name: &str, arguments: &str, turn: usize) -> String {
        let Some(tool) = self.registry.get(name) else {
            return json!({ "error": format!("Tool '{name}' is not available.") }).to_string();
        };
        match tool.invoke(arguments).await {
            Ok(Value::String(text)) => text,
            Ok(value) => value.to_string(),
            Err(error) => {
                tracing::error!(tool = name, turn, error = %error, "tool execution error");
                json!({ "error": error.to_string() }).to_string()
            }
        }
    }
}
