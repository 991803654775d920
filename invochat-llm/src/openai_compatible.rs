//! Generic client for any provider speaking OpenAI's chat-completions format
//! (OpenAI, Azure OpenAI, DeepSeek, local gateways, ...).

use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use invochat_core::{
    InvochatError, LlmRequest, LlmResponse, Message, Role, ToolCall, ToolCallingLlm, ToolSpec,
    Value,
};

#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    base_url: String,
    api_key: Option<Secret<String>>,
    http: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let api_key = if self.api_key.is_some() {
            "<redacted>"
        } else {
            "<none>"
        };
        f.debug_struct("OpenAiCompatibleClient")
            .field("base_url", &self.base_url)
            .field("api_key", &api_key)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct OpenAiCompatibleBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl OpenAiCompatibleClient {
    pub fn builder(base_url: impl Into<String>) -> OpenAiCompatibleBuilder {
        OpenAiCompatibleBuilder {
            base_url: Some(base_url.into()),
            api_key: None,
            timeout: None,
        }
    }
}

impl OpenAiCompatibleBuilder {
    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.api_key = if value.trim().is_empty() {
            None
        } else {
            Some(value)
        };
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = Some(value);
        self
    }

    pub fn build(self) -> Result<OpenAiCompatibleClient, InvochatError> {
        let base_url = self
            .base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| InvochatError::InvalidConfig("LLM base URL is empty".to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(120)))
            .build()
            .map_err(|err| InvochatError::InvalidConfig(err.to_string()))?;

        Ok(OpenAiCompatibleClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: self.api_key.map(Secret::new),
            http,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Deserialize, Serialize)]
struct WireFunctionCall {
    name: String,
    // Kept as JSON text end to end; tools parse it themselves.
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

fn map_message(message: Message) -> WireMessage {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };
    let tool_calls = if message.tool_calls.is_empty() {
        None
    } else {
        Some(message.tool_calls.into_iter().map(map_tool_call).collect())
    };
    // Assistant tool-call turns may carry empty content, which some
    // providers reject when serialized as "".
    let content = if message.content.is_empty() && tool_calls.is_some() {
        None
    } else {
        Some(message.content)
    };
    WireMessage {
        role,
        content,
        tool_calls,
        tool_call_id: message.tool_call_id,
        name: message.name,
    }
}

fn map_tool_call(call: ToolCall) -> WireToolCall {
    WireToolCall {
        id: call.id,
        kind: "function".to_string(),
        function: WireFunctionCall {
            name: call.name,
            arguments: call.arguments,
        },
    }
}

fn map_tool_spec(spec: ToolSpec) -> WireTool {
    WireTool {
        kind: "function",
        function: WireFunction {
            name: spec.name,
            description: spec.description,
            parameters: spec.parameters,
        },
    }
}

#[async_trait::async_trait]
impl ToolCallingLlm for OpenAiCompatibleClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, InvochatError> {
        let tools: Vec<WireTool> = request.tools.into_iter().map(map_tool_spec).collect();
        let body = ChatCompletionRequest {
            model: request.model,
            messages: request.messages.into_iter().map(map_message).collect(),
            tool_choice: if tools.is_empty() { None } else { Some("auto") },
            tools: if tools.is_empty() { None } else { Some(tools) },
            temperature: request.temperature,
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self.http.post(url).json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response: ChatCompletionResponse = builder
            .send()
            .await
            .map_err(|err| InvochatError::LlmProvider(err.to_string()))?
            .error_for_status()
            .map_err(|err| InvochatError::LlmProvider(err.to_string()))?
            .json()
            .await
            .map_err(|err| InvochatError::LlmProvider(err.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InvochatError::LlmProvider("no choices returned".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}
