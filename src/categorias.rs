//! Mapas de categoria: nomes normalizados (maiúsculas, sem espaços nas pontas)
//! para códigos inteiros densos a partir de 0.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::erro::ErroCarga;

pub type MapaCategorias = BTreeMap<String, i64>;

pub const COLUNA_GALPAO: &str = "galpao";
pub const CODIGO_PADRAO: i64 = 0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapasCategoria {
    pub galpao: MapaCategorias,
    pub tipo_dia: MapaCategorias,
}

impl MapasCategoria {
    pub fn new(galpao: MapaCategorias) -> Self {
        Self {
            galpao,
            tipo_dia: mapa_tipo_dia(),
        }
    }
}

pub fn mapa_tipo_dia() -> MapaCategorias {
    MapaCategorias::from([("UTIL".to_string(), 0), ("FIM_DE_SEMANA".to_string(), 1)])
}

pub fn normalizar_chave(chave: &str) -> String {
    chave.trim().to_uppercase()
}

/// Monta o mapa de galpões a partir da coluna `galpao` do histórico.
pub fn mapa_galpoes(caminho: &Path) -> Result<MapaCategorias, ErroCarga> {
    let mut leitor = csv::Reader::from_path(caminho).map_err(|source| ErroCarga::DatasetAusente {
        caminho: caminho.to_path_buf(),
        source,
    })?;

    let indice = leitor
        .headers()
        .map_err(|source| ErroCarga::DatasetInvalido {
            caminho: caminho.to_path_buf(),
            source,
        })?
        .iter()
        .position(|coluna| coluna.trim() == COLUNA_GALPAO)
        .ok_or_else(|| ErroCarga::ColunaAusente {
            caminho: caminho.to_path_buf(),
            coluna: COLUNA_GALPAO,
        })?;

    let mut valores = Vec::new();
    for registro in leitor.records() {
        let registro = registro.map_err(|source| ErroCarga::DatasetInvalido {
            caminho: caminho.to_path_buf(),
            source,
        })?;
        if let Some(valor) = registro.get(indice) {
            let valor = valor.trim();
            if !valor.is_empty() {
                valores.push(valor.to_string());
            }
        }
    }

    Ok(mapa_de_valores(&valores))
}

/// Códigos atribuídos pela ordem lexicográfica dos nomes distintos.
/// Uma coluna inteiramente numérica já guarda códigos e gera mapa vazio.
pub fn mapa_de_valores(valores: &[String]) -> MapaCategorias {
    if !valores.is_empty() && valores.iter().all(|v| v.parse::<f64>().is_ok()) {
        tracing::warn!("coluna '{}' já é numérica; mapa de galpões ficará vazio", COLUNA_GALPAO);
        return MapaCategorias::new();
    }

    valores
        .iter()
        .map(|v| normalizar_chave(v))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .zip(0..)
        .collect()
}

/// Resolve um código de categoria. O nome, quando presente, tem precedência
/// sobre o código numérico; nome desconhecido cai no `padrao`.
pub fn resolver(
    mapa: &MapaCategorias,
    chave: Option<&str>,
    codigo: Option<i64>,
    padrao: i64,
) -> i64 {
    match (chave, codigo) {
        (Some(chave), _) => {
            let normalizada = normalizar_chave(chave);
            match mapa.get(&normalizada) {
                Some(codigo) => *codigo,
                None => {
                    tracing::warn!(chave = %normalizada, padrao, "categoria desconhecida, usando código padrão");
                    padrao
                }
            }
        }
        (None, Some(codigo)) => codigo,
        (None, None) => padrao,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn mapa_butantan() -> MapaCategorias {
        MapaCategorias::from([("BUTANTAN".to_string(), 0)])
    }

    #[test]
    fn nome_conhecido_resolve_para_seu_codigo() {
        assert_eq!(resolver(&mapa_butantan(), Some("BUTANTAN"), None, CODIGO_PADRAO), 0);
        assert_eq!(resolver(&mapa_tipo_dia(), Some(" fim_de_semana "), None, CODIGO_PADRAO), 1);
    }

    #[test]
    fn nome_desconhecido_cai_no_padrao() {
        assert_eq!(resolver(&mapa_butantan(), Some("BUTANTAN2"), None, CODIGO_PADRAO), 0);
        assert_eq!(resolver(&mapa_tipo_dia(), Some("feriadao"), Some(1), CODIGO_PADRAO), 0);
    }

    #[test]
    fn nome_tem_precedencia_sobre_codigo() {
        assert_eq!(resolver(&mapa_tipo_dia(), Some("UTIL"), Some(1), CODIGO_PADRAO), 0);
    }

    #[test]
    fn codigo_usado_quando_nao_ha_nome() {
        assert_eq!(resolver(&mapa_tipo_dia(), None, Some(1), CODIGO_PADRAO), 1);
        assert_eq!(resolver(&mapa_tipo_dia(), None, None, CODIGO_PADRAO), 0);
    }

    #[test]
    fn mapa_de_valores_ordena_e_deduplica() {
        let valores: Vec<String> = ["vila mariana", " Butantan", "BUTANTAN ", "Lapa"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mapa = mapa_de_valores(&valores);
        assert_eq!(
            mapa.into_iter().collect::<Vec<_>>(),
            vec![
                ("BUTANTAN".to_string(), 0),
                ("LAPA".to_string(), 1),
                ("VILA MARIANA".to_string(), 2),
            ]
        );
    }

    #[test]
    fn coluna_numerica_gera_mapa_vazio() {
        let valores = vec!["0".to_string(), "1".to_string()];
        assert!(mapa_de_valores(&valores).is_empty());
    }

    #[test]
    fn le_galpoes_do_csv() {
        let mut arquivo = tempfile::NamedTempFile::new().unwrap();
        writeln!(arquivo, "data,galpao,motos_em_uso").unwrap();
        writeln!(arquivo, "2024-01-01,butantan,18").unwrap();
        writeln!(arquivo, "2024-01-02,Lapa,20").unwrap();
        writeln!(arquivo, "2024-01-03,,21").unwrap();
        writeln!(arquivo, "2024-01-04,BUTANTAN,22").unwrap();

        let mapa = mapa_galpoes(arquivo.path()).unwrap();
        assert_eq!(mapa.get("BUTANTAN"), Some(&0));
        assert_eq!(mapa.get("LAPA"), Some(&1));
        assert_eq!(mapa.len(), 2);
    }

    #[test]
    fn csv_sem_coluna_galpao_e_fatal() {
        let mut arquivo = tempfile::NamedTempFile::new().unwrap();
        writeln!(arquivo, "data,motos_em_uso").unwrap();
        writeln!(arquivo, "2024-01-01,18").unwrap();

        let erro = mapa_galpoes(arquivo.path()).unwrap_err();
        assert!(matches!(erro, ErroCarga::ColunaAusente { coluna: "galpao", .. }));
    }

    #[test]
    fn csv_ausente_e_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let erro = mapa_galpoes(&dir.path().join("nao_existe.csv")).unwrap_err();
        assert!(matches!(erro, ErroCarga::DatasetAusente { .. }));
    }
}
