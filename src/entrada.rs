use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::erro::{ErroValidacao, ViolacaoCampo};

/// Payload bruto de uma previsão. `galpao_str` e `tipo_dia_str`, quando
/// presentes, têm precedência sobre os códigos numéricos.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EntradaPrevisao {
    #[serde(default, deserialize_with = "inteiro_opcional")]
    pub galpao: Option<i64>,
    pub galpao_str: Option<String>,
    #[serde(deserialize_with = "inteiro")]
    pub dia_semana: i64,
    pub motos_em_uso: f64,
    pub motos_disponiveis: f64,
    #[serde(deserialize_with = "inteiro")]
    pub choveu: i64,
    pub total_motos: f64,
    #[serde(deserialize_with = "inteiro")]
    pub feriado: i64,
    #[serde(default, deserialize_with = "inteiro_opcional")]
    pub tipo_dia: Option<i64>,
    pub tipo_dia_str: Option<String>,
    pub saldo_dia: f64,
}

/// Inteiro que também aceita um real sem parte fracionária (`6.0`).
struct Inteiro(i64);

struct VisitanteInteiro;

impl<'de> Visitor<'de> for VisitanteInteiro {
    type Value = Inteiro;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("um número inteiro")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Inteiro, E> {
        Ok(Inteiro(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Inteiro, E> {
        i64::try_from(v)
            .map(Inteiro)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Inteiro, E> {
        // i64::MAX as f64 arredonda para 2^63, que já não cabe
        if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
            Ok(Inteiro(v as i64))
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }
}

impl<'de> Deserialize<'de> for Inteiro {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(VisitanteInteiro)
    }
}

fn inteiro<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Inteiro::deserialize(deserializer).map(|i| i.0)
}

fn inteiro_opcional<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Option::<Inteiro>::deserialize(deserializer).map(|i| i.map(|i| i.0))
}

impl EntradaPrevisao {
    /// Checa as faixas de cada campo; não há validação cruzada entre campos.
    pub fn validar(&self) -> Result<(), ErroValidacao> {
        let mut violacoes = Vec::new();

        if let Some(galpao) = self.galpao {
            if galpao < 0 {
                violacoes.push(ViolacaoCampo::new("galpao", "deve ser maior ou igual a 0"));
            }
        }
        if !(0..=6).contains(&self.dia_semana) {
            violacoes.push(ViolacaoCampo::new("dia_semana", "deve estar entre 0 e 6"));
        }
        if !(self.motos_em_uso >= 0.0) {
            violacoes.push(ViolacaoCampo::new("motos_em_uso", "deve ser maior ou igual a 0"));
        }
        if !(self.motos_disponiveis >= 0.0) {
            violacoes.push(ViolacaoCampo::new("motos_disponiveis", "deve ser maior ou igual a 0"));
        }
        if !(0..=1).contains(&self.choveu) {
            violacoes.push(ViolacaoCampo::new("choveu", "deve ser 0 ou 1"));
        }
        if !(self.total_motos >= 1.0) {
            violacoes.push(ViolacaoCampo::new("total_motos", "deve ser maior ou igual a 1"));
        }
        if !(0..=1).contains(&self.feriado) {
            violacoes.push(ViolacaoCampo::new("feriado", "deve ser 0 ou 1"));
        }
        if let Some(tipo_dia) = self.tipo_dia {
            if !(0..=1).contains(&tipo_dia) {
                violacoes.push(ViolacaoCampo::new("tipo_dia", "deve ser 0 ou 1"));
            }
        }
        if !self.saldo_dia.is_finite() {
            violacoes.push(ViolacaoCampo::new("saldo_dia", "deve ser um número finito"));
        }

        if violacoes.is_empty() {
            Ok(())
        } else {
            Err(ErroValidacao { violacoes })
        }
    }
}

#[cfg(test)]
pub(crate) fn entrada_butantan() -> EntradaPrevisao {
    EntradaPrevisao {
        galpao: None,
        galpao_str: Some("BUTANTAN".to_string()),
        dia_semana: 6,
        motos_em_uso: 18.0,
        motos_disponiveis: 82.0,
        choveu: 0,
        total_motos: 100.0,
        feriado: 1,
        tipo_dia: None,
        tipo_dia_str: Some("FIM_DE_SEMANA".to_string()),
        saldo_dia: 7.0,
    }
}
