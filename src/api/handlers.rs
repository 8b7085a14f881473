use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};

use crate::api::error::ErroApi;
use crate::api::models::RespostaSaude;
use crate::api::routes::AppState;
use crate::entrada::EntradaPrevisao;
use crate::erro::ErroValidacao;
use crate::predicao::ResultadoPredicao;

// ========== HEALTH ==========

pub async fn health_check(
    State(app_state): State<AppState>,
) -> Result<Json<RespostaSaude>, ErroApi> {
    let pacote = app_state.servico.pacote()?;

    Ok(Json(RespostaSaude {
        status: "ok",
        models_loaded: true,
        galpao_map: pacote.mapas.galpao.clone(),
        tipo_dia_map: pacote.mapas.tipo_dia.clone(),
        metricas: pacote.metricas,
    }))
}

// ========== PREVISÃO ==========

pub async fn prever(
    State(app_state): State<AppState>,
    payload: Result<Json<EntradaPrevisao>, JsonRejection>,
) -> Result<Json<ResultadoPredicao>, ErroApi> {
    let Json(entrada) = payload.map_err(|rejeicao| ErroValidacao::corpo(rejeicao.body_text()))?;
    entrada.validar()?;

    let resultado = app_state.servico.prever(&entrada)?;
    tracing::info!(
        saidas = resultado.motos_que_sairam,
        retornos = resultado.motos_que_voltaram,
        saldo = resultado.saldo_previsto,
        "previsão realizada"
    );

    Ok(Json(resultado))
}
