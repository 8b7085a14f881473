//! Artefatos treinados fora do serviço: escalonador, regressores e métricas.
//!
//! Todos são JSON e descrevem apenas o estado já ajustado; aqui só há avaliação.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::erro::{ErroCarga, ErroModelo};

const FOLHA: i64 = -1;

/// Regressor de uma saída sobre o vetor já escalonado.
pub trait Regressor: Send + Sync {
    fn prever(&self, x: &[f64]) -> Result<f64, ErroModelo>;

    fn nome(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum Escalonador {
    /// `x * scale + min`, como o `MinMaxScaler` do scikit-learn.
    MinMax { min: Vec<f64>, scale: Vec<f64> },
    /// `(x - mean) / scale`.
    Padrao { mean: Vec<f64>, scale: Vec<f64> },
}

impl Escalonador {
    pub fn validar(&self, dimensao: usize) -> Result<(), ErroModelo> {
        let (deslocamento, escala) = match self {
            Escalonador::MinMax { min, scale } => (min, scale),
            Escalonador::Padrao { mean, scale } => (mean, scale),
        };
        verificar_dimensao(dimensao, deslocamento.len())?;
        verificar_dimensao(dimensao, escala.len())?;
        if let Escalonador::Padrao { scale, .. } = self {
            if let Some(i) = scale.iter().position(|s| *s == 0.0) {
                return Err(ErroModelo::EscalaZerada(i));
            }
        }
        Ok(())
    }

    pub fn transformar(&self, x: &[f64]) -> Result<Vec<f64>, ErroModelo> {
        match self {
            Escalonador::MinMax { min, scale } => {
                verificar_dimensao(min.len(), x.len())?;
                verificar_dimensao(scale.len(), x.len())?;
                Ok(x.iter()
                    .zip(scale.iter().zip(min))
                    .map(|(v, (s, m))| v * s + m)
                    .collect())
            }
            Escalonador::Padrao { mean, scale } => {
                verificar_dimensao(mean.len(), x.len())?;
                verificar_dimensao(scale.len(), x.len())?;
                Ok(x.iter()
                    .zip(mean.iter().zip(scale))
                    .map(|(v, (m, s))| (v - m) / s)
                    .collect())
            }
        }
    }
}

/// Árvore no layout de arrays do scikit-learn: `children_left == -1` marca folha,
/// o desvio é à esquerda quando `x[feature] <= threshold`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArvoreDecisao {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl ArvoreDecisao {
    fn no_invalido(arvore: usize, no: usize, motivo: impl Into<String>) -> ErroModelo {
        ErroModelo::NoInvalido {
            arvore,
            no,
            motivo: motivo.into(),
        }
    }

    pub fn validar(&self, indice: usize, dimensao: usize) -> Result<(), ErroModelo> {
        let n = self.children_left.len();
        if n == 0 {
            return Err(Self::no_invalido(indice, 0, "árvore sem nós"));
        }
        let tamanhos = [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ];
        if tamanhos.iter().any(|t| *t != n) {
            return Err(Self::no_invalido(indice, 0, "arrays com tamanhos diferentes"));
        }

        for no in 0..n {
            let (esquerda, direita) = (self.children_left[no], self.children_right[no]);
            if esquerda == FOLHA {
                if direita != FOLHA {
                    return Err(Self::no_invalido(indice, no, "folha com filho à direita"));
                }
                continue;
            }
            for filho in [esquerda, direita] {
                if filho <= no as i64 || filho >= n as i64 {
                    return Err(Self::no_invalido(indice, no, format!("filho {filho} fora de ordem")));
                }
            }
            let feature = self.feature[no];
            if feature < 0 || feature >= dimensao as i64 {
                return Err(Self::no_invalido(indice, no, format!("feature {feature} inexistente")));
            }
        }
        Ok(())
    }

    pub fn prever(&self, indice: usize, x: &[f64]) -> Result<f64, ErroModelo> {
        let mut no = 0usize;
        loop {
            let esquerda = *self
                .children_left
                .get(no)
                .ok_or_else(|| Self::no_invalido(indice, no, "nó inexistente"))?;
            if esquerda == FOLHA {
                return self
                    .value
                    .get(no)
                    .copied()
                    .ok_or_else(|| Self::no_invalido(indice, no, "folha sem valor"));
            }

            let valor = usize::try_from(self.feature.get(no).copied().unwrap_or(-1))
                .ok()
                .and_then(|f| x.get(f))
                .ok_or_else(|| Self::no_invalido(indice, no, "feature inexistente"))?;
            let limiar = self
                .threshold
                .get(no)
                .ok_or_else(|| Self::no_invalido(indice, no, "nó sem limiar"))?;

            let proximo = if valor <= limiar {
                esquerda
            } else {
                self.children_right
                    .get(no)
                    .copied()
                    .ok_or_else(|| Self::no_invalido(indice, no, "nó sem filho à direita"))?
            };
            // filhos sempre depois do pai; garante que o laço termina
            if proximo <= no as i64 {
                return Err(Self::no_invalido(indice, no, format!("filho {proximo} fora de ordem")));
            }
            no = proximo as usize;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum ModeloRegressao {
    Linear { coeficientes: Vec<f64>, intercepto: f64 },
    /// Média das árvores.
    FlorestaAleatoria { arvores: Vec<ArvoreDecisao> },
}

impl ModeloRegressao {
    pub fn validar(&self, dimensao: usize) -> Result<(), ErroModelo> {
        match self {
            ModeloRegressao::Linear { coeficientes, .. } => {
                verificar_dimensao(dimensao, coeficientes.len())
            }
            ModeloRegressao::FlorestaAleatoria { arvores } => {
                if arvores.is_empty() {
                    return Err(ErroModelo::FlorestaVazia);
                }
                arvores
                    .iter()
                    .enumerate()
                    .try_for_each(|(i, arvore)| arvore.validar(i, dimensao))
            }
        }
    }
}

impl Regressor for ModeloRegressao {
    fn prever(&self, x: &[f64]) -> Result<f64, ErroModelo> {
        match self {
            ModeloRegressao::Linear {
                coeficientes,
                intercepto,
            } => {
                verificar_dimensao(coeficientes.len(), x.len())?;
                Ok(intercepto + coeficientes.iter().zip(x).map(|(c, v)| c * v).sum::<f64>())
            }
            ModeloRegressao::FlorestaAleatoria { arvores } => {
                if arvores.is_empty() {
                    return Err(ErroModelo::FlorestaVazia);
                }
                let mut soma = 0.0;
                for (i, arvore) in arvores.iter().enumerate() {
                    soma += arvore.prever(i, x)?;
                }
                Ok(soma / arvores.len() as f64)
            }
        }
    }

    fn nome(&self) -> &str {
        match self {
            ModeloRegressao::Linear { .. } => "linear",
            ModeloRegressao::FlorestaAleatoria { .. } => "floresta_aleatoria",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MetricasModelo {
    pub r2: f64,
    pub mae: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
}

/// Registro de métricas gravado pelo treino.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MetricasTreino {
    pub model_saida: MetricasModelo,
    pub model_volta: MetricasModelo,
}

fn verificar_dimensao(esperado: usize, recebido: usize) -> Result<(), ErroModelo> {
    if esperado == recebido {
        Ok(())
    } else {
        Err(ErroModelo::DimensaoInvalida { esperado, recebido })
    }
}

pub fn carregar_json<T: DeserializeOwned>(caminho: &Path) -> Result<T, ErroCarga> {
    let conteudo = fs::read_to_string(caminho).map_err(|source| ErroCarga::ArtefatoAusente {
        caminho: caminho.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&conteudo).map_err(|source| ErroCarga::ArtefatoInvalido {
        caminho: caminho.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Divide em `x[2] <= 20`: 10 à esquerda, 30 à direita.
    fn arvore_uso() -> ArvoreDecisao {
        ArvoreDecisao {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![2, -2, -2],
            threshold: vec![20.0, -2.0, -2.0],
            value: vec![20.0, 10.0, 30.0],
        }
    }

    fn arvore_constante(valor: f64) -> ArvoreDecisao {
        ArvoreDecisao {
            children_left: vec![-1],
            children_right: vec![-1],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![valor],
        }
    }

    fn vetor_com_uso(uso: f64) -> Vec<f64> {
        let mut x = vec![0.0; 12];
        x[2] = uso;
        x
    }

    #[test]
    fn min_max_aplica_escala_e_deslocamento() {
        let escalonador = Escalonador::MinMax {
            min: vec![0.0, -0.5],
            scale: vec![0.5, 0.25],
        };
        assert_eq!(escalonador.transformar(&[4.0, 6.0]).unwrap(), vec![2.0, 1.0]);
    }

    #[test]
    fn padrao_centraliza_e_divide() {
        let escalonador = Escalonador::Padrao {
            mean: vec![10.0],
            scale: vec![2.0],
        };
        assert_eq!(escalonador.transformar(&[14.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn escalonador_rejeita_dimensao_errada() {
        let escalonador = Escalonador::MinMax {
            min: vec![0.0; 12],
            scale: vec![1.0; 12],
        };
        assert!(escalonador.validar(12).is_ok());
        assert!(matches!(
            escalonador.transformar(&[1.0, 2.0]),
            Err(ErroModelo::DimensaoInvalida { esperado: 12, recebido: 2 })
        ));
        let padrao = Escalonador::Padrao {
            mean: vec![0.0; 12],
            scale: vec![0.0; 12],
        };
        assert!(matches!(padrao.validar(12), Err(ErroModelo::EscalaZerada(0))));
    }

    #[test]
    fn floresta_faz_media_das_arvores() {
        let floresta = ModeloRegressao::FlorestaAleatoria {
            arvores: vec![arvore_uso(), arvore_constante(50.0)],
        };
        assert!(floresta.validar(12).is_ok());
        assert_eq!(floresta.prever(&vetor_com_uso(18.0)).unwrap(), 30.0);
        assert_eq!(floresta.prever(&vetor_com_uso(20.0)).unwrap(), 30.0);
        assert_eq!(floresta.prever(&vetor_com_uso(25.0)).unwrap(), 40.0);
    }

    #[test]
    fn linear_soma_intercepto() {
        let mut coeficientes = vec![0.0; 12];
        coeficientes[2] = 2.0;
        let modelo = ModeloRegressao::Linear {
            coeficientes,
            intercepto: 1.5,
        };
        assert_eq!(modelo.prever(&vetor_com_uso(3.0)).unwrap(), 7.5);
        assert_eq!(modelo.nome(), "linear");
    }

    #[test]
    fn arvore_com_filho_fora_do_intervalo_e_rejeitada() {
        let mut arvore = arvore_uso();
        arvore.children_left[0] = 7;
        assert!(matches!(
            arvore.validar(0, 12),
            Err(ErroModelo::NoInvalido { arvore: 0, no: 0, .. })
        ));
    }

    #[test]
    fn arvore_ciclica_nao_trava_a_previsao() {
        let mut arvore = arvore_uso();
        arvore.children_left[0] = 0;
        assert!(arvore.validar(0, 12).is_err());
        assert!(arvore.prever(0, &vetor_com_uso(1.0)).is_err());
    }

    #[test]
    fn arvore_com_feature_inexistente_e_rejeitada() {
        let mut arvore = arvore_uso();
        arvore.feature[0] = 12;
        assert!(arvore.validar(3, 12).is_err());
        assert!(arvore.prever(3, &vetor_com_uso(1.0)).is_err());
    }

    #[test]
    fn arvore_com_arrays_desiguais_e_rejeitada() {
        let mut arvore = arvore_uso();
        arvore.value.pop();
        assert!(arvore.validar(0, 12).is_err());
    }

    #[test]
    fn floresta_vazia_e_rejeitada() {
        let floresta = ModeloRegressao::FlorestaAleatoria { arvores: vec![] };
        assert!(matches!(floresta.validar(12), Err(ErroModelo::FlorestaVazia)));
    }

    #[test]
    fn artefatos_sao_lidos_do_json() {
        let dir = tempfile::tempdir().unwrap();
        let caminho = dir.path().join("model_saida.json");
        fs::write(
            &caminho,
            r#"{"tipo":"floresta_aleatoria","arvores":[
                {"children_left":[-1],"children_right":[-1],"feature":[-2],
                 "threshold":[-2.0],"value":[42.0]}]}"#,
        )
        .unwrap();

        let modelo: ModeloRegressao = carregar_json(&caminho).unwrap();
        assert_eq!(modelo.nome(), "floresta_aleatoria");
        assert_eq!(modelo.prever(&[0.0; 12]).unwrap(), 42.0);
    }

    #[test]
    fn metricas_sem_rmse_sao_aceitas() {
        let metricas: MetricasTreino = serde_json::from_str(
            r#"{"model_saida":{"r2":0.85,"mae":3.4},"model_volta":{"r2":0.84,"mae":3.6,"rmse":4.1}}"#,
        )
        .unwrap();
        assert_eq!(metricas.model_saida.rmse, None);
        assert_eq!(metricas.model_volta.rmse, Some(4.1));
    }

    #[test]
    fn artefato_ausente_ou_invalido() {
        let dir = tempfile::tempdir().unwrap();
        let ausente = carregar_json::<Escalonador>(&dir.path().join("scaler.json"));
        assert!(matches!(ausente, Err(ErroCarga::ArtefatoAusente { .. })));

        let caminho = dir.path().join("scaler.json");
        fs::write(&caminho, r#"{"tipo":"robusto"}"#).unwrap();
        let invalido = carregar_json::<Escalonador>(&caminho);
        assert!(matches!(invalido, Err(ErroCarga::ArtefatoInvalido { .. })));
    }
}
