use anyhow::Context;

use tracker_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracker_observability::init();

    let config = ApiConfig::from_env().context("read configuration")?;
    let app = tracker_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}
