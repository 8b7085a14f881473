//! Configuração do serviço lida do ambiente (com `.env` carregado antes via `dotenv`).

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FILTRO_LOG_PADRAO: &str = "previsao_motos=info,tower_http=info";

pub const ARQUIVO_ESCALONADOR: &str = "scaler.json";
pub const ARQUIVO_MODELO_SAIDA: &str = "model_saida.json";
pub const ARQUIVO_MODELO_VOLTA: &str = "model_volta.json";
pub const ARQUIVO_METRICAS: &str = "metricas.json";
pub const ARQUIVO_FEATURES: &str = "features.json";

#[derive(Debug, Error)]
pub enum ErroConfiguracao {
    #[error("valor inválido para {variavel}: '{valor}'")]
    ValorInvalido { variavel: &'static str, valor: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Configuracao {
    pub host: String,
    pub porta: u16,
    pub diretorio_modelos: PathBuf,
    pub caminho_dados: PathBuf,
}

impl Configuracao {
    pub fn do_ambiente() -> Result<Self, ErroConfiguracao> {
        Self::de_fonte(|chave| env::var(chave).ok())
    }

    fn de_fonte(ler: impl Fn(&str) -> Option<String>) -> Result<Self, ErroConfiguracao> {
        let ler_ou = |chave: &str, padrao: &str| ler(chave).unwrap_or_else(|| padrao.to_string());

        let porta_bruta = ler_ou("PREVISAO_PORTA", "8000");
        let porta = porta_bruta
            .trim()
            .parse()
            .map_err(|_| ErroConfiguracao::ValorInvalido {
                variavel: "PREVISAO_PORTA",
                valor: porta_bruta.clone(),
            })?;

        Ok(Self {
            host: ler_ou("PREVISAO_HOST", "0.0.0.0"),
            porta,
            diretorio_modelos: PathBuf::from(ler_ou("PREVISAO_MODELS_DIR", "models")),
            caminho_dados: PathBuf::from(ler_ou("PREVISAO_DATA_PATH", "dados_mottu_corrigido.csv")),
        })
    }

    pub fn artefato(&self, nome: &str) -> PathBuf {
        self.diretorio_modelos.join(nome)
    }

    pub fn caminho_dados(&self) -> &Path {
        &self.caminho_dados
    }
}
