pub mod api;
pub mod config;
pub mod pipeline;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pipeline::risk::{OpenAiCompatClient, RiskAssessor};

/// Process entry point: load config, build the assessor, serve until Ctrl-C.
///
/// The chat client is blocking, so it is built (and dropped) outside the
/// async runtime.
pub fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let provider = config::ProviderConfig::from_env().map_err(|e| e.to_string())?;
    let server_config = config::ServerConfig::from_env().map_err(|e| e.to_string())?;

    tracing::info!(
        provider = %provider.kind,
        model = %provider.model,
        base_url = %provider.base_url,
        timeout_secs = provider.timeout_secs,
        "Chat provider configured"
    );

    let client = OpenAiCompatClient::from_config(&provider).map_err(|e| e.to_string())?;
    let assessor = Arc::new(RiskAssessor::new(Box::new(client), &provider.model));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;

    let result = runtime.block_on(serve(server_config, assessor.clone()));

    drop(runtime);
    drop(assessor);
    result
}

async fn serve(
    server_config: config::ServerConfig,
    assessor: Arc<RiskAssessor>,
) -> Result<(), String> {
    let mut server = api::start_server_on(server_config.bind_addr, assessor).await?;

    tracing::info!(
        session_id = %server.session.session_id,
        addr = %server.session.server_addr,
        "Listening"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }

    server.shutdown();
    server.wait().await;
    Ok(())
}
