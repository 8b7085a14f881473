//! Vetor de features na ordem fixa usada no treino do escalonador e dos modelos.

use crate::categorias::{resolver, MapasCategoria, CODIGO_PADRAO};
use crate::entrada::EntradaPrevisao;

pub const NUM_FEATURES: usize = 12;

pub const FEATURES: [&str; NUM_FEATURES] = [
    "galpao",
    "dia_semana",
    "motos_em_uso",
    "motos_disponiveis",
    "choveu",
    "total_motos",
    "feriado",
    "tipo_dia",
    "saldo_dia",
    "taxa_ocupacao",
    "choveu_fds",
    "feriado_fds",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VetorFeatures([f64; NUM_FEATURES]);

impl VetorFeatures {
    pub fn valores(&self) -> &[f64] {
        &self.0
    }

    #[cfg(test)]
    pub fn get(&self, nome: &str) -> Option<f64> {
        FEATURES.iter().position(|f| *f == nome).map(|i| self.0[i])
    }
}

/// Converte a entrada no vetor de 12 posições.
///
/// Pressupõe entrada já validada (`total_motos >= 1`).
pub fn normalizar(entrada: &EntradaPrevisao, mapas: &MapasCategoria) -> VetorFeatures {
    let galpao = resolver(
        &mapas.galpao,
        entrada.galpao_str.as_deref(),
        entrada.galpao,
        CODIGO_PADRAO,
    );
    let tipo_dia = resolver(
        &mapas.tipo_dia,
        entrada.tipo_dia_str.as_deref(),
        entrada.tipo_dia,
        CODIGO_PADRAO,
    );

    let taxa_ocupacao = entrada.motos_em_uso / entrada.total_motos;
    let choveu_fds = entrada.choveu * tipo_dia;
    let feriado_fds = entrada.feriado * tipo_dia;

    VetorFeatures([
        galpao as f64,
        entrada.dia_semana as f64,
        entrada.motos_em_uso,
        entrada.motos_disponiveis,
        entrada.choveu as f64,
        entrada.total_motos,
        entrada.feriado as f64,
        tipo_dia as f64,
        entrada.saldo_dia,
        taxa_ocupacao,
        choveu_fds as f64,
        feriado_fds as f64,
    ])
}
