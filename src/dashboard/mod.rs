//! Dashboard HTML: formulário com widgets limitados, o mesmo `prever` da API
//! e gráficos em SVG. Aqui o galpão é sempre o código 0.

mod graficos;
mod pagina;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::Html,
};
use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::api::routes::AppState;
use crate::entrada::EntradaPrevisao;
use crate::erro::ErroPredicao;
use crate::predicao::ResultadoPredicao;

pub const GALPAO_DASHBOARD: i64 = 0;

/// Valores dos widgets. Não há validação: os valores são trazidos para as
/// faixas que os próprios widgets permitem.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormularioDashboard {
    pub dia_semana: i64,
    pub motos_em_uso: i64,
    pub motos_disponiveis: i64,
    pub total_motos: i64,
    pub tipo_dia: i64,
    pub choveu: i64,
    pub feriado: i64,
    pub saldo_dia: i64,
    pub prever: Option<String>,
}

impl Default for FormularioDashboard {
    fn default() -> Self {
        Self {
            dia_semana: 0,
            motos_em_uso: 20,
            motos_disponiveis: 80,
            total_motos: 100,
            tipo_dia: 0,
            choveu: 0,
            feriado: 0,
            saldo_dia: 0,
            prever: None,
        }
    }
}

impl FormularioDashboard {
    pub fn limitado(self) -> Self {
        Self {
            dia_semana: self.dia_semana.clamp(0, 6),
            motos_em_uso: self.motos_em_uso.clamp(0, 100),
            motos_disponiveis: self.motos_disponiveis.clamp(0, 100),
            total_motos: self.total_motos.clamp(1, 200),
            tipo_dia: self.tipo_dia.clamp(0, 1),
            choveu: self.choveu.clamp(0, 1),
            feriado: self.feriado.clamp(0, 1),
            saldo_dia: self.saldo_dia.clamp(-50, 50),
            prever: self.prever,
        }
    }

    pub fn deve_prever(&self) -> bool {
        self.prever.is_some()
    }

    pub fn entrada(&self) -> EntradaPrevisao {
        EntradaPrevisao {
            galpao: Some(GALPAO_DASHBOARD),
            galpao_str: None,
            dia_semana: self.dia_semana,
            motos_em_uso: self.motos_em_uso as f64,
            motos_disponiveis: self.motos_disponiveis as f64,
            choveu: self.choveu,
            total_motos: self.total_motos as f64,
            feriado: self.feriado,
            tipo_dia: Some(self.tipo_dia),
            tipo_dia_str: None,
            saldo_dia: self.saldo_dia as f64,
        }
    }
}

pub struct PrevisaoExibida {
    pub resultado: ResultadoPredicao,
    pub instante: DateTime<Local>,
}

pub async fn pagina_dashboard(
    State(app_state): State<AppState>,
    consulta: Result<Query<FormularioDashboard>, QueryRejection>,
) -> (StatusCode, Html<String>) {
    let formulario = match consulta {
        Ok(Query(formulario)) => formulario,
        Err(rejeicao) => {
            tracing::debug!("consulta do dashboard ignorada: {}", rejeicao.body_text());
            FormularioDashboard::default()
        }
    }
    .limitado();

    let pacote = match app_state.servico.pacote() {
        Ok(pacote) => pacote,
        Err(erro) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Html(pagina::pagina_erro(&erro.to_string())),
            )
        }
    };

    let previsao = if formulario.deve_prever() {
        match app_state.servico.prever(&formulario.entrada()) {
            Ok(resultado) => Some(PrevisaoExibida {
                resultado,
                instante: Local::now(),
            }),
            Err(ErroPredicao::Interno { mensagem, causa }) => {
                tracing::error!(erro = %causa, "❌ {}", mensagem);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(pagina::pagina_erro(&mensagem)),
                );
            }
            Err(erro) => {
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Html(pagina::pagina_erro(&erro.to_string())),
                )
            }
        }
    } else {
        None
    };

    (
        StatusCode::OK,
        Html(pagina::renderizar(&formulario, previsao.as_ref(), pacote.metricas.as_ref())),
    )
}
