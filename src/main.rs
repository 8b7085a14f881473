mod api;
mod categorias;
mod config;
mod dashboard;
mod entrada;
mod erro;
mod features;
mod modelo;
mod predicao;

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use crate::api::routes::create_router;
use crate::config::{Configuracao, FILTRO_LOG_PADRAO};
use crate::predicao::ServicoPredicao;

fn iniciar_logs() {
    let filtro =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(FILTRO_LOG_PADRAO));

    fmt().with_env_filter(filtro).with_target(true).init();
}

async fn sinal_de_parada() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao aguardar Ctrl+C: {}", e);
    }
    tracing::info!("Encerrando servidor...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    iniciar_logs();

    let config = Configuracao::do_ambiente().context("configuração inválida")?;

    let servico = ServicoPredicao::carregar(&config).with_context(|| {
        format!(
            "falha ao carregar artefatos de {}",
            config.diretorio_modelos.display()
        )
    })?;

    let app = create_router(Arc::new(servico));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.porta))
        .await
        .with_context(|| format!("não foi possível escutar em {}:{}", config.host, config.porta))?;

    tracing::info!("🚀 Servidor ouvindo em http://{}", listener.local_addr()?);
    tracing::info!("   POST /predict  |  GET /health  |  GET /dashboard");

    axum::serve(listener, app)
        .with_graceful_shutdown(sinal_de_parada())
        .await?;

    Ok(())
}
