//! Two-phase email consent protocol.
//!
//! Phase 1: the model calls the consent signal tool; the orchestrator
//! intercepts it and returns the draft to the client instead of dispatching.
//! Phase 2: after explicit user approval, the client submits a composed
//! follow-up request that instructs the model to export the file and send the
//! email with the exact approved draft. The cancel path never reaches the
//! send tool.

use invochat_core::{Message, Role, ToolSpec};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Advertised to the model but never dispatched; the orchestrator intercepts
/// it before tool execution.
pub const CONSENT_TOOL_NAME: &str = "request_user_email_consent";

pub const CANCEL_ACK: &str = "Okay, I've cancelled the email request. How else can I help?";

#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("an email draft is already awaiting confirmation")]
    DraftAlreadyPending,
    #[error("no email draft is awaiting confirmation")]
    NoPendingDraft,
    #[error("no email send is in progress")]
    NoSendInProgress,
}

/// The draft fields the model proposed via the consent tool, shown verbatim
/// to the user for approval.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct EmailDraft {
    pub to_emails: String,
    pub subject: String,
    pub body: String,
    #[serde(default = "default_attachments")]
    pub attachments_json: String,
}

fn default_attachments() -> String {
    "[]".to_string()
}

/// Everything the client must hold between phase 1 and phase 2.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingConsent {
    pub draft: EmailDraft,
    pub history: Vec<Message>,
    pub original_query: String,
}

/// The follow-up chat request produced by approving a draft.
#[derive(Clone, Debug, PartialEq)]
pub struct Phase2Request {
    pub query: String,
    pub history: Vec<Message>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConsentState {
    Idle,
    AwaitingConfirmation(PendingConsent),
    SendingEmail,
}

/// Client-side state machine for the consent handshake.
#[derive(Clone, Debug)]
pub struct ConsentFlow {
    state: ConsentState,
}

impl Default for ConsentFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsentFlow {
    pub fn new() -> Self {
        Self {
            state: ConsentState::Idle,
        }
    }

    pub fn state(&self) -> &ConsentState {
        &self.state
    }

    /// Enter `AwaitingConfirmation` with the draft the agent returned.
    pub fn begin(&mut self, pending: PendingConsent) -> Result<(), ConsentError> {
        if !matches!(self.state, ConsentState::Idle) {
            return Err(ConsentError::DraftAlreadyPending);
        }
        self.state = ConsentState::AwaitingConfirmation(pending);
        Ok(())
    }

    /// The user approved the draft. Produces the phase-2 request and moves to
    /// `SendingEmail`; call [`ConsentFlow::complete`] once the send round-trip
    /// finishes.
    pub fn approve(&mut self) -> Result<Phase2Request, ConsentError> {
        let ConsentState::AwaitingConfirmation(pending) =
            std::mem::replace(&mut self.state, ConsentState::SendingEmail)
        else {
            self.state = ConsentState::Idle;
            return Err(ConsentError::NoPendingDraft);
        };
        Ok(Phase2Request {
            query: phase2_prompt(&pending),
            history: plain_turns(&pending.history),
        })
    }

    /// The user declined. Returns the assistant acknowledgement to append to
    /// the transcript; the send tool is never reached.
    pub fn cancel(&mut self) -> Result<Message, ConsentError> {
        if !matches!(self.state, ConsentState::AwaitingConfirmation(_)) {
            return Err(ConsentError::NoPendingDraft);
        }
        self.state = ConsentState::Idle;
        Ok(Message::assistant(CANCEL_ACK))
    }

    pub fn complete(&mut self) -> Result<(), ConsentError> {
        if !matches!(self.state, ConsentState::SendingEmail) {
            return Err(ConsentError::NoSendInProgress);
        }
        self.state = ConsentState::Idle;
        Ok(())
    }
}

fn phase2_prompt(pending: &PendingConsent) -> String {
    format!(
        "The user wants to send an email based on their original request: '{}'. \
         They have approved the following draft:\n\
         To: {}\n\
         Subject: {}\n\
         Body: {}\n\
         Your task is to now execute this. First, use `export_sql_query_to_csv_tool` to create the necessary file. \
         Then, use `send_email_with_attachments_tool` with the file URL and the exact draft details above.",
        pending.original_query, pending.draft.to_emails, pending.draft.subject, pending.draft.body,
    )
}

/// Only plain user/assistant turns survive into phase 2; tool traffic and
/// assistant tool-call stubs are dropped.
fn plain_turns(history: &[Message]) -> Vec<Message> {
    history
        .iter()
        .filter(|message| {
            matches!(message.role, Role::User | Role::Assistant) && message.tool_calls.is_empty()
        })
        .map(|message| Message {
            role: message.role,
            content: message.content.clone(),
            tool_call_id: None,
            name: None,
            tool_calls: Vec::new(),
        })
        .collect()
}

pub fn consent_tool_spec() -> ToolSpec {
    ToolSpec {
        name: CONSENT_TOOL_NAME.to_string(),
        description: "CRITICAL: Call this function FIRST and ONLY ONCE when a user asks to send \
                      an email. This will show the user a preview of the email and ask for their \
                      confirmation. The system will then automatically handle the actual sending \
                      process after approval."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "to_emails": {
                    "type": "string",
                    "description": "A single string containing one or more comma-separated email addresses. For example: 'recipient1@example.com,recipient2@example.com'"
                },
                "subject": {
                    "type": "string",
                    "description": "The proposed subject line of the email."
                },
                "body": {
                    "type": "string",
                    "description": "The proposed body content of the email. Use newlines (\\n) for paragraphs."
                },
                "attachments_json": {
                    "type": "string",
                    "description": "A JSON string of a list of attachment objects. Each object must have 'url' and 'filename'. IMPORTANT: For emails without attachments, this MUST be an empty list string: '[]'."
                }
            },
            "required": ["to_emails", "subject", "body", "attachments_json"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invochat_core::ToolCall;

    fn pending() -> PendingConsent {
        PendingConsent {
            draft: EmailDraft {
                to_emails: "a@example.com".to_string(),
                subject: "Invoice Report".to_string(),
                body: "Hi,\n\nAttached.".to_string(),
                attachments_json: "[]".to_string(),
            },
            history: vec![
                Message::user("email me the report"),
                Message::assistant_with_calls(
                    "",
                    vec![ToolCall {
                        id: "call_1".to_string(),
                        name: "execute_sql_query_tool".to_string(),
                        arguments: "{}".to_string(),
                    }],
                ),
                Message::tool("call_1", "execute_sql_query_tool", "{\"results\":[]}"),
                Message::assistant("Here is a sample."),
            ],
            original_query: "email me the report".to_string(),
        }
    }

    #[test]
    fn approve_composes_phase2_prompt_and_filters_history() {
        let mut flow = ConsentFlow::new();
        flow.begin(pending()).unwrap();

        let request = flow.approve().unwrap();
        assert!(request
            .query
            .contains("original request: 'email me the report'"));
        assert!(request.query.contains("Subject: Invoice Report"));
        assert!(request.query.contains("export_sql_query_to_csv_tool"));
        // Tool message and the tool-call stub are both dropped.
        assert_eq!(request.history.len(), 2);
        assert!(request
            .history
            .iter()
            .all(|m| m.tool_calls.is_empty() && m.tool_call_id.is_none()));
        assert_eq!(*flow.state(), ConsentState::SendingEmail);

        flow.complete().unwrap();
        assert_eq!(*flow.state(), ConsentState::Idle);
    }

    #[test]
    fn cancel_returns_ack_and_resets() {
        let mut flow = ConsentFlow::new();
        flow.begin(pending()).unwrap();

        let ack = flow.cancel().unwrap();
        assert_eq!(ack.role, Role::Assistant);
        assert_eq!(ack.content, CANCEL_ACK);
        assert_eq!(*flow.state(), ConsentState::Idle);
    }

    #[test]
    fn approve_without_pending_draft_is_rejected() {
        let mut flow = ConsentFlow::new();
        assert!(matches!(
            flow.approve().unwrap_err(),
            ConsentError::NoPendingDraft
        ));
        assert_eq!(*flow.state(), ConsentState::Idle);
    }

    #[test]
    fn second_begin_while_awaiting_is_rejected() {
        let mut flow = ConsentFlow::new();
        flow.begin(pending()).unwrap();
        assert!(matches!(
            flow.begin(pending()).unwrap_err(),
            ConsentError::DraftAlreadyPending
        ));
    }

    #[test]
    fn draft_defaults_to_empty_attachments() {
        let draft: EmailDraft = serde_json::from_str(
            "{\"to_emails\":\"a@b.c\",\"subject\":\"s\",\"body\":\"b\"}",
        )
        .unwrap();
        assert_eq!(draft.attachments_json, "[]");
    }
}
