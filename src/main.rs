mod agent;
mod config;
mod errors;
mod models;
mod prompt;
mod repository;
mod routes;
mod service;

use tracing::info;

use crate::agent::OllamaClient;
use crate::config::AppConfig;
use crate::repository::catalog_repository::CatalogRepository;
use crate::service::chat_service::ChatService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "store_chat_relay=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env();

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let catalog = CatalogRepository::new(config.catalog_paths.clone());
    let agent = OllamaClient::new(&config.ollama_base_url, &config.model, config.request_timeout)?;
    info!(
        "Relaying chat to {} (model '{}')",
        agent.base_url(),
        config.model
    );
    let chat_service = ChatService::new(catalog, agent);

    let app = routes::router(chat_service);

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, app).await?;
    Ok(())
}
