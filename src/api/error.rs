use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::models::ErrorResponse;
use crate::erro::{ErroPredicao, ErroValidacao};

#[derive(Debug, Error)]
pub enum ErroApi {
    #[error(transparent)]
    Validacao(#[from] ErroValidacao),

    #[error("Modelos não carregados. Gere os artefatos de treino e reinicie o serviço.")]
    ServicoIndisponivel,

    #[error("Erro na predição: {0}")]
    Interno(String),
}

impl ErroApi {
    pub fn status(&self) -> StatusCode {
        match self {
            ErroApi::Validacao(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ErroApi::ServicoIndisponivel => StatusCode::SERVICE_UNAVAILABLE,
            ErroApi::Interno(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErroPredicao> for ErroApi {
    fn from(err: ErroPredicao) -> Self {
        match err {
            ErroPredicao::ServicoIndisponivel => ErroApi::ServicoIndisponivel,
            // a causa fica só no log
            ErroPredicao::Interno { mensagem, causa } => {
                tracing::error!(erro = %causa, "❌ {}", mensagem);
                ErroApi::Interno(mensagem)
            }
        }
    }
}

impl IntoResponse for ErroApi {
    fn into_response(self) -> Response {
        let status = self.status();
        let corpo = match self {
            ErroApi::Validacao(erro) => ErrorResponse {
                error: erro.to_string(),
                campos: erro.violacoes,
            },
            outro => ErrorResponse::new(outro.to_string()),
        };
        (status, Json(corpo)).into_response()
    }
}
