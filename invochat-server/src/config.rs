use std::net::SocketAddr;

use invochat_core::InvochatError;

/// Process configuration, read once at startup. Mail credentials are the one
/// optional pair: without them the server still boots, but chat requests are
/// rejected until the email service is configured.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub database_url: String,
    pub mail_api_key: Option<String>,
    pub mail_sender_email: Option<String>,
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, InvochatError> {
        let bind_addr = optional("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse::<SocketAddr>()
            .map_err(|err| InvochatError::InvalidConfig(format!("BIND_ADDR: {err}")))?;

        Ok(Self {
            llm_base_url: required("LLM_BASE_URL")?,
            llm_api_key: optional("LLM_API_KEY"),
            llm_model: required("LLM_MODEL")?,
            database_url: required("DATABASE_URL")?,
            mail_api_key: optional("MAIL_API_KEY"),
            mail_sender_email: optional("MAIL_SENDER_EMAIL"),
            bind_addr,
        })
    }
}

fn required(key: &str) -> Result<String, InvochatError> {
    optional(key).ok_or_else(|| InvochatError::InvalidConfig(format!("{key} is not set")))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
