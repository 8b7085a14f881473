use serde::Serialize;

use crate::categorias::{mapa_galpoes, MapaCategorias, MapasCategoria};
use crate::config::{
    Configuracao, ARQUIVO_ESCALONADOR, ARQUIVO_FEATURES, ARQUIVO_METRICAS, ARQUIVO_MODELO_SAIDA,
    ARQUIVO_MODELO_VOLTA,
};
use crate::entrada::EntradaPrevisao;
use crate::erro::{ErroCarga, ErroModelo, ErroPredicao};
use crate::features::{normalizar, FEATURES, NUM_FEATURES};
use crate::modelo::{carregar_json, Escalonador, MetricasModelo, MetricasTreino, ModeloRegressao, Regressor};

/// Tudo o que o treino produz, carregado uma vez e nunca alterado.
pub struct PacoteModelos {
    pub escalonador: Escalonador,
    pub modelo_saida: Box<dyn Regressor>,
    pub modelo_volta: Box<dyn Regressor>,
    pub metricas: Option<MetricasTreino>,
    pub mapas: MapasCategoria,
}

impl PacoteModelos {
    pub fn carregar(config: &Configuracao) -> Result<Self, ErroCarga> {
        let caminho = config.artefato(ARQUIVO_ESCALONADOR);
        let escalonador: Escalonador = carregar_json(&caminho)?;
        escalonador
            .validar(NUM_FEATURES)
            .map_err(|source| ErroCarga::ArtefatoInconsistente { caminho, source })?;

        let modelo_saida = carregar_regressor(config, ARQUIVO_MODELO_SAIDA)?;
        let modelo_volta = carregar_regressor(config, ARQUIVO_MODELO_VOLTA)?;
        let metricas: Option<MetricasTreino> = carregar_json(&config.artefato(ARQUIVO_METRICAS))?;
        verificar_ordem_features(config)?;

        let galpoes = mapa_galpoes(config.caminho_dados())?;

        Ok(Self {
            escalonador,
            modelo_saida: Box::new(modelo_saida),
            modelo_volta: Box::new(modelo_volta),
            metricas,
            mapas: MapasCategoria::new(galpoes),
        })
    }
}

fn carregar_regressor(config: &Configuracao, arquivo: &str) -> Result<ModeloRegressao, ErroCarga> {
    let caminho = config.artefato(arquivo);
    let modelo: ModeloRegressao = carregar_json(&caminho)?;
    modelo
        .validar(NUM_FEATURES)
        .map_err(|source| ErroCarga::ArtefatoInconsistente { caminho, source })?;
    Ok(modelo)
}

/// `features.json` é opcional; quando existe, precisa bater com a ordem fixa.
fn verificar_ordem_features(config: &Configuracao) -> Result<(), ErroCarga> {
    let caminho = config.artefato(ARQUIVO_FEATURES);
    if !caminho.exists() {
        tracing::debug!("{} ausente; ordem das features não verificada", caminho.display());
        return Ok(());
    }
    let encontrado: Vec<String> = carregar_json(&caminho)?;
    if encontrado.iter().map(String::as_str).ne(FEATURES) {
        return Err(ErroCarga::OrdemFeaturesDivergente {
            esperado: FEATURES.iter().map(|f| f.to_string()).collect(),
            encontrado,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResumoMetricas {
    pub saida: MetricasModelo,
    pub volta: MetricasModelo,
}

impl ResumoMetricas {
    fn de(metricas: &MetricasTreino) -> Self {
        Self {
            saida: arredondar_metricas(&metricas.model_saida),
            volta: arredondar_metricas(&metricas.model_volta),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultadoPredicao {
    pub motos_que_sairam: f64,
    pub motos_que_voltaram: f64,
    pub saldo_previsto: f64,
    pub galpao_map: MapaCategorias,
    pub tipo_dia_map: MapaCategorias,
    pub metricas_modelo: Option<ResumoMetricas>,
}

pub enum EstadoServico {
    NaoCarregado,
    Carregado(PacoteModelos),
}

pub struct ServicoPredicao {
    estado: EstadoServico,
}

impl ServicoPredicao {
    pub fn nao_carregado() -> Self {
        Self {
            estado: EstadoServico::NaoCarregado,
        }
    }

    pub fn carregado(pacote: PacoteModelos) -> Self {
        Self {
            estado: EstadoServico::Carregado(pacote),
        }
    }

    /// Carrega todos os artefatos ou falha sem carga parcial.
    pub fn carregar(config: &Configuracao) -> Result<Self, ErroCarga> {
        tracing::info!("Carregando modelos de {}...", config.diretorio_modelos.display());
        let pacote = PacoteModelos::carregar(config)?;
        tracing::info!(
            saida = pacote.modelo_saida.nome(),
            volta = pacote.modelo_volta.nome(),
            galpoes = ?pacote.mapas.galpao.keys().collect::<Vec<_>>(),
            "Modelos carregados com sucesso"
        );
        Ok(Self::carregado(pacote))
    }

    pub fn pacote(&self) -> Result<&PacoteModelos, ErroPredicao> {
        match &self.estado {
            EstadoServico::Carregado(pacote) => Ok(pacote),
            EstadoServico::NaoCarregado => Err(ErroPredicao::ServicoIndisponivel),
        }
    }

    pub fn prever(&self, entrada: &EntradaPrevisao) -> Result<ResultadoPredicao, ErroPredicao> {
        let pacote = self.pacote()?;

        let vetor = normalizar(entrada, &pacote.mapas);
        let escalonado = pacote
            .escalonador
            .transformar(vetor.valores())
            .map_err(|causa| interno("Falha ao escalonar as features", causa))?;

        let saida = avaliar(pacote.modelo_saida.as_ref(), &escalonado)
            .map_err(|causa| interno("Falha no modelo de saídas", causa))?;
        let volta = avaliar(pacote.modelo_volta.as_ref(), &escalonado)
            .map_err(|causa| interno("Falha no modelo de retornos", causa))?;
        let saldo = saida - volta;

        tracing::debug!(saida, volta, saldo, "previsão calculada");

        Ok(ResultadoPredicao {
            motos_que_sairam: arredondar(saida, 2),
            motos_que_voltaram: arredondar(volta, 2),
            saldo_previsto: arredondar(saldo, 2),
            galpao_map: pacote.mapas.galpao.clone(),
            tipo_dia_map: pacote.mapas.tipo_dia.clone(),
            metricas_modelo: pacote.metricas.as_ref().map(ResumoMetricas::de),
        })
    }
}

fn avaliar(modelo: &dyn Regressor, x: &[f64]) -> Result<f64, ErroModelo> {
    let valor = modelo.prever(x)?;
    if valor.is_finite() {
        Ok(valor)
    } else {
        Err(ErroModelo::ResultadoNaoFinito(valor))
    }
}

fn interno(mensagem: &str, causa: ErroModelo) -> ErroPredicao {
    ErroPredicao::Interno {
        mensagem: mensagem.to_string(),
        causa,
    }
}

/// Arredondamento de `f64::round` (metade para longe do zero) na casa pedida.
pub fn arredondar(valor: f64, casas: i32) -> f64 {
    let fator = 10f64.powi(casas);
    (valor * fator).round() / fator
}

fn arredondar_metricas(metricas: &MetricasModelo) -> MetricasModelo {
    MetricasModelo {
        r2: arredondar(metricas.r2, 4),
        mae: arredondar(metricas.mae, 2),
        rmse: metricas.rmse.map(|r| arredondar(r, 2)),
    }
}
