use std::sync::Arc;

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bizdesk_observability::init();

    let config = bizdesk_api::config::AppConfig::from_env().context("invalid configuration")?;
    let services = bizdesk_api::app::services::build_services(&config).await?;
    let app = bizdesk_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, environment = ?config.environment, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
