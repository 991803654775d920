use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use invochat_agent::{AgentOrchestrator, AgentOutcome};
use invochat_core::{InvochatError, Message, ToolCallingLlm};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::limit::RequestBodyLimitLayer;

use crate::session::SessionStore;

const MAX_BODY_BYTES: usize = 1024 * 1024;
const MAIL_NOT_CONFIGURED: &str =
    "The email service is not configured correctly on the server.";

pub struct AppState<L> {
    /// `None` until the email service is configured; chat is rejected
    /// entirely in that case, matching the all-or-nothing tool surface.
    pub agent: Option<Arc<AgentOrchestrator<L>>>,
    pub sessions: Arc<dyn SessionStore>,
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            agent: self.agent.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

pub fn router<L>(state: AppState<L>) -> Router
where
    L: ToolCallingLlm + Send + Sync + 'static,
{
    Router::new()
        .route("/agent/chat", post(agent_chat::<L>))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

#[derive(Deserialize)]
struct ChatRequest {
    query: Option<String>,
    #[serde(default)]
    history: Vec<Message>,
    session_id: Option<String>,
}

async fn agent_chat<L>(
    State(state): State<AppState<L>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>)
where
    L: ToolCallingLlm + Send + Sync + 'static,
{
    let Ok(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid JSON body.");
    };
    let Some(query) = request.query.filter(|q| !q.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing 'query' in request body.");
    };
    let Some(agent) = state.agent.as_ref() else {
        tracing::error!("chat request rejected: mail credentials are not configured");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, MAIL_NOT_CONFIGURED);
    };

    // A named session with no inline history replays the stored transcript.
    let history = match (&request.session_id, request.history.is_empty()) {
        (Some(id), true) => state.sessions.get(id).await.unwrap_or_default(),
        _ => request.history,
    };

    match agent.chat(&query, &history).await {
        Ok(AgentOutcome::Answer { answer, history }) => {
            if let Some(id) = &request.session_id {
                let mut updated = history.clone();
                updated.push(Message::user(&query));
                updated.push(Message::assistant(&answer));
                state.sessions.put(id, updated).await;
            }
            (
                StatusCode::OK,
                Json(json!({ "answer": answer, "history": history })),
            )
        }
        Ok(AgentOutcome::ConsentRequired {
            draft,
            history,
            original_query,
        }) => (
            StatusCode::OK,
            Json(json!({
                "action_required": "user_consent_email",
                "draft_details": draft,
                "history": history,
                "original_query": original_query,
            })),
        ),
        Err(error @ InvochatError::ConsentDraft(_)) => {
            tracing::error!(error = %error, "consent draft could not be processed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
        }
        Err(error) => {
            tracing::error!(error = %error, "agent chat failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}
