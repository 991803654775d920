mod consent;
mod orchestrator;
mod prompt;
mod registry;
mod schema;
pub mod tools;

pub use consent::{
    consent_tool_spec, ConsentError, ConsentFlow, ConsentState, EmailDraft, PendingConsent,
    Phase2Request, CANCEL_ACK, CONSENT_TOOL_NAME,
};
pub use orchestrator::{AgentOrchestrator, AgentOutcome, EXHAUSTED_FALLBACK};
pub use prompt::system_prompt;
pub use registry::ToolRegistry;
pub use schema::schema_overview;
