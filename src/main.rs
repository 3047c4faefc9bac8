// src/main.rs

// --- Declaração dos Módulos ---
mod config;
mod db;
mod error;
mod models;
mod services;
mod state;
mod web;

// --- Imports ---
use crate::{config::Config, state::AppState};
use axum::serve;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuração do Logging (Tracing) ---
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "tutoria=debug,tower_http=info,sqlx=warn".into()
        }))
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Iniciando servidor de tutoria...");

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("Configuração inválida: {}", e))?;
    if !config.lista_vazia_404 {
        tracing::info!("Listas por junção sem resultados respondem [] (LISTA_VAZIA_404=false).");
    }

    // --- Configuração da Base de Dados ---
    let db_pool = match db::create_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Falha crítica ao inicializar a base de dados: {}", e);
            return Err(anyhow::anyhow!("Falha ao conectar/migrar DB: {}", e));
        }
    };

    let addr = config.bind_addr;
    let app_state = AppState::new(db_pool, config);

    tracing::info!("📡 Servidor escutando em http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Falha ao iniciar listener em {}: {}", addr, e);
            return Err(e.into());
        }
    };

    let app = web::routes::create_router(app_state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    tracing::info!("👂 Servidor pronto para aceitar conexões...");
    if let Err(e) = serve(listener, app.into_make_service())
        .with_graceful_shutdown(sinal_de_encerramento())
        .await
    {
        tracing::error!("❌ Erro fatal no servidor: {}", e);
        return Err(e.into());
    }

    tracing::info!("Servidor encerrado.");
    Ok(())
}

async fn sinal_de_encerramento() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao escutar Ctrl+C: {}", e);
        return;
    }
    tracing::warn!("Ctrl+C recebido, encerrando...");
}
