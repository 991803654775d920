use std::sync::Arc;

use invochat_agent::{consent_tool_spec, AgentOrchestrator, ToolRegistry};
use invochat_agent::tools::{SendEmailTool, SqlExportTool, SqlQueryTool};
use invochat_llm::OpenAiCompatibleClient;
use invochat_mail::Mailer;
use invochat_server::{router, AppState, FsObjectStore, InMemorySessionStore, ServerConfig};
use invochat_sql::QueryExecutor;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env()?;

    let mut llm_builder = OpenAiCompatibleClient::builder(&config.llm_base_url);
    if let Some(api_key) = &config.llm_api_key {
        llm_builder = llm_builder.api_key(api_key);
    }
    let llm = llm_builder.build()?;

    let agent = if let (Some(api_key), Some(sender)) =
        (&config.mail_api_key, &config.mail_sender_email)
    {
        let mailer = Mailer::builder()
            .api_key(api_key)
            .sender_email(sender)
            .build()?;
        let store = Arc::new(FsObjectStore::new(
            "exports",
            format!("http://{}/files", config.bind_addr),
        ));
        let registry = ToolRegistry::new()
            .register(Arc::new(SqlQueryTool::new(QueryExecutor::new(
                &config.database_url,
            ))))
            .register(Arc::new(SqlExportTool::new(
                QueryExecutor::new(&config.database_url),
                store,
            )))
            .register(Arc::new(SendEmailTool::new(mailer)))
            .declare(consent_tool_spec());
        Some(Arc::new(AgentOrchestrator::new(
            llm,
            config.llm_model.clone(),
            registry,
        )))
    } else {
        tracing::warn!("mail credentials missing; chat requests will be rejected");
        None
    };

    let state = AppState {
        agent,
        sessions: Arc::new(InMemorySessionStore::new()),
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "invochat server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
