use anyhow::Context;
use cloudscope_api::app::AppState;
use cloudscope_api::config::{ai::create_model, Settings};
use cloudscope_api::routes::build_app;
use cloudscope_api::store::InMemoryRepository;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env().context("invalid configuration")?;
    tokio::fs::create_dir_all(&settings.upload_dir)
        .await
        .with_context(|| format!("cannot create upload dir {}", settings.upload_dir.display()))?;

    let model = create_model(&settings).context("cannot initialise AI model client")?;
    // Inventory lives in process memory only; a restart starts from an empty store.
    let state = AppState::new(
        Arc::new(InMemoryRepository::new()),
        model,
        settings.upload_dir.clone(),
        settings.max_upload_bytes,
    );

    let app = build_app(state);
    let addr = settings.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    tracing::info!(%addr, "backend listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
