use serde::Serialize;

use crate::categorias::MapaCategorias;
use crate::erro::ViolacaoCampo;
use crate::modelo::MetricasTreino;

#[derive(Debug, Serialize)]
pub struct RespostaSaude {
    pub status: &'static str,
    pub models_loaded: bool,
    pub galpao_map: MapaCategorias,
    pub tipo_dia_map: MapaCategorias,
    pub metricas: Option<MetricasTreino>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub campos: Vec<ViolacaoCampo>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            campos: Vec::new(),
        }
    }
}
