use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Falhas ao avaliar o escalonador ou um regressor.
#[derive(Debug, Error)]
pub enum ErroModelo {
    #[error("dimensão inválida: esperado {esperado}, recebido {recebido}")]
    DimensaoInvalida { esperado: usize, recebido: usize },

    #[error("árvore {arvore}, nó {no}: {motivo}")]
    NoInvalido {
        arvore: usize,
        no: usize,
        motivo: String,
    },

    #[error("floresta sem árvores")]
    FlorestaVazia,

    #[error("escala zerada na feature {0}")]
    EscalaZerada(usize),

    #[error("resultado não finito: {0}")]
    ResultadoNaoFinito(f64),
}

/// Erros de serviço devolvidos por `ServicoPredicao::prever`.
#[derive(Debug, Error)]
pub enum ErroPredicao {
    #[error("Modelos não carregados")]
    ServicoIndisponivel,

    #[error("{mensagem}")]
    Interno {
        mensagem: String,
        #[source]
        causa: ErroModelo,
    },
}

/// Falhas fatais de inicialização: o processo não fica pronto.
#[derive(Debug, Error)]
pub enum ErroCarga {
    #[error("não foi possível ler o artefato {}", caminho.display())]
    ArtefatoAusente {
        caminho: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artefato {} com formato inválido", caminho.display())]
    ArtefatoInvalido {
        caminho: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("artefato {} inconsistente", caminho.display())]
    ArtefatoInconsistente {
        caminho: PathBuf,
        #[source]
        source: ErroModelo,
    },

    #[error("ordem das features diverge do treino: esperado {esperado:?}, encontrado {encontrado:?}")]
    OrdemFeaturesDivergente {
        esperado: Vec<String>,
        encontrado: Vec<String>,
    },

    #[error("não foi possível abrir o dataset {}", caminho.display())]
    DatasetAusente {
        caminho: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset {} sem a coluna '{coluna}'", caminho.display())]
    ColunaAusente {
        caminho: PathBuf,
        coluna: &'static str,
    },

    #[error("erro ao ler o dataset {}", caminho.display())]
    DatasetInvalido {
        caminho: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolacaoCampo {
    pub campo: String,
    pub mensagem: String,
}

impl ViolacaoCampo {
    pub fn new(campo: impl Into<String>, mensagem: impl Into<String>) -> Self {
        Self {
            campo: campo.into(),
            mensagem: mensagem.into(),
        }
    }
}

/// Entrada malformada ou fora das faixas aceitas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("entrada inválida: {}", resumir(.violacoes))]
pub struct ErroValidacao {
    pub violacoes: Vec<ViolacaoCampo>,
}

impl ErroValidacao {
    /// Corpo da requisição que nem chegou a ser desserializado.
    pub fn corpo(mensagem: impl Into<String>) -> Self {
        Self {
            violacoes: vec![ViolacaoCampo::new("corpo", mensagem)],
        }
    }
}

fn resumir(violacoes: &[ViolacaoCampo]) -> String {
    violacoes
        .iter()
        .map(|v| format!("{}: {}", v.campo, v.mensagem))
        .collect::<Vec<_>>()
        .join("; ")
}
