use std::sync::Arc;

use anyhow::Context;

use supplyflow_api::app::{AppServices, build_app};
use supplyflow_infra::AppConfig;
use supplyflow_observability::LogConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    supplyflow_observability::init(&LogConfig {
        filter: config.log_filter.clone(),
        json: config.log_json,
    });

    let services = Arc::new(AppServices::in_memory(&config).context("failed to wire services")?);
    let app = build_app(services.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .context("server error")?;

    services.shutdown();
    Ok(())
}
