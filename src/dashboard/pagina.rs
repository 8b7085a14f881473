use std::fmt::Write;

use super::graficos::{barras, barras_agrupadas, rosca, Barra, Serie};
use super::{FormularioDashboard, PrevisaoExibida};
use crate::modelo::{MetricasModelo, MetricasTreino};

const DIAS: [&str; 7] = ["Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado", "Domingo"];

const COR_SAIDA: &str = "#c19a6b";
const COR_VOLTA: &str = "#d4a574";
const COR_ESCURA: &str = "#8b4513";

const ESTILO: &str = "
body { font-family: sans-serif; background: #fdf8f3; color: #3b2a1a; margin: 0; }
header { text-align: center; padding: 1rem; }
header h1 { color: #8b4513; margin-bottom: 0.2rem; }
nav { text-align: center; margin-bottom: 1rem; }
nav a { margin: 0 1rem; color: #6b4423; font-weight: bold; }
main { display: flex; gap: 2rem; padding: 0 2rem; }
aside { min-width: 16rem; }
section { margin-bottom: 3rem; }
label { display: block; margin-top: 0.5rem; }
.cartoes { display: flex; gap: 1rem; }
.cartao { flex: 1; padding: 1rem; border-radius: 1rem; text-align: center; color: white; }
.resumo { background: #f5ebe0; padding: 1rem; border-radius: 0.5rem; border-left: 4px solid #a0826d; margin-bottom: 1rem; }
button { width: 100%; margin-top: 1rem; padding: 0.75rem; background: #8b4513; color: white; font-weight: bold; border: none; border-radius: 0.5rem; }
";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interpretacao {
    Positivo(f64),
    Negativo(f64),
    Equilibrado,
}

impl Interpretacao {
    pub fn do_saldo(saldo: f64) -> Self {
        if saldo > 5.0 {
            Interpretacao::Positivo(saldo.abs())
        } else if saldo < -5.0 {
            Interpretacao::Negativo(saldo.abs())
        } else {
            Interpretacao::Equilibrado
        }
    }

    pub fn mensagem(&self) -> String {
        match self {
            Interpretacao::Positivo(n) => format!(
                "<strong>Saldo Positivo</strong>: Espera-se que {n:.0} motos a mais saiam do que retornem."
            ),
            Interpretacao::Negativo(n) => format!(
                "<strong>Saldo Negativo</strong>: Espera-se que {n:.0} motos a mais retornem do que saiam."
            ),
            Interpretacao::Equilibrado => {
                "<strong>Saldo Equilibrado</strong>: Saídas e retornos previstos estão equilibrados.".to_string()
            }
        }
    }
}

fn sim_nao(valor: i64) -> &'static str {
    if valor == 0 {
        "Não"
    } else {
        "Sim"
    }
}

fn tipo_dia(valor: i64) -> &'static str {
    if valor == 0 {
        "Dia Útil"
    } else {
        "Fim de Semana"
    }
}

fn clima(valor: i64) -> &'static str {
    if valor == 0 {
        "Sem Chuva"
    } else {
        "Com Chuva"
    }
}

fn opcoes(nome: &str, rotulo: &str, selecionado: i64, itens: &[(i64, &str)]) -> String {
    let mut html = format!("<label>{rotulo}<select name=\"{nome}\">");
    for (valor, texto) in itens {
        let marcado = if *valor == selecionado { " selected" } else { "" };
        let _ = write!(html, "<option value=\"{valor}\"{marcado}>{texto}</option>");
    }
    html.push_str("</select></label>");
    html
}

fn numero(nome: &str, rotulo: &str, valor: i64, min: i64, max: i64) -> String {
    format!(
        "<label>{rotulo}<input type=\"number\" name=\"{nome}\" value=\"{valor}\" min=\"{min}\" max=\"{max}\" step=\"1\"></label>"
    )
}

fn formulario_html(f: &FormularioDashboard) -> String {
    let dias: Vec<(i64, &str)> = DIAS.iter().enumerate().map(|(i, d)| (i as i64, *d)).collect();
    let mut html = String::from("<form method=\"get\" action=\"/dashboard\"><h3>Parâmetros de Entrada</h3>");
    html.push_str(&opcoes("dia_semana", "Dia da Semana", f.dia_semana, &dias));
    html.push_str(&numero("motos_em_uso", "Motos em Uso", f.motos_em_uso, 0, 100));
    html.push_str(&numero("motos_disponiveis", "Motos Disponíveis", f.motos_disponiveis, 0, 100));
    html.push_str(&numero("total_motos", "Total de Motos", f.total_motos, 1, 200));
    html.push_str(&opcoes("tipo_dia", "Tipo de Dia", f.tipo_dia, &[(0, tipo_dia(0)), (1, tipo_dia(1))]));
    html.push_str(&opcoes("choveu", "Condição Climática", f.choveu, &[(0, clima(0)), (1, clima(1))]));
    html.push_str(&opcoes("feriado", "Feriado", f.feriado, &[(0, "Não"), (1, "Sim")]));
    html.push_str(&numero("saldo_dia", "Saldo do Dia Anterior", f.saldo_dia, -50, 50));
    html.push_str("<button type=\"submit\" name=\"prever\" value=\"1\">Fazer Previsão</button></form>");
    html
}

fn cartao(titulo: &str, valor: &str, legenda: &str, cor: &str) -> String {
    format!(
        "<div class=\"cartao\" style=\"background: {cor}\"><h3>{titulo}</h3><h1>{valor}</h1><p>{legenda}</p></div>"
    )
}

fn resultado_html(previsao: &PrevisaoExibida) -> String {
    let r = &previsao.resultado;
    let cor_saldo = if r.saldo_previsto >= 0.0 { "#8b7355" } else { "#a0522d" };

    let mut html = String::from("<h3>Resultados da Previsão</h3><div class=\"cartoes\">");
    html.push_str(&cartao("Saídas", &format!("{:.0}", r.motos_que_sairam), "motos previstas", COR_SAIDA));
    html.push_str(&cartao("Retornos", &format!("{:.0}", r.motos_que_voltaram), "motos previstas", COR_VOLTA));
    html.push_str(&cartao("Saldo", &format!("{:+.0}", r.saldo_previsto), "diferença", cor_saldo));
    html.push_str("</div>");

    let _ = write!(
        html,
        "<p><small>Previsão feita em {}</small></p>",
        previsao.instante.format("%d/%m/%Y %H:%M:%S")
    );

    html.push_str("<h4>Visualização Comparativa</h4>");
    html.push_str(&barras(
        "Comparação: Saídas vs Retornos",
        &[
            Barra::new("Saídas", r.motos_que_sairam, COR_SAIDA),
            Barra::new("Retornos", r.motos_que_voltaram, COR_VOLTA),
        ],
    ));

    let _ = write!(
        html,
        "<h4>Interpretação</h4><p>{}</p>",
        Interpretacao::do_saldo(r.saldo_previsto).mensagem()
    );
    html
}

fn resumo_parametros(f: &FormularioDashboard) -> String {
    let dia = usize::try_from(f.dia_semana)
        .ok()
        .and_then(|d| DIAS.get(d))
        .copied()
        .unwrap_or(DIAS[0]);

    let mut html = format!(
        "<h3>Resumo dos Parâmetros</h3>\
         <div class=\"resumo\"><strong>Dia:</strong> {dia}<br><strong>Tipo:</strong> {}<br>\
         <strong>Clima:</strong> {}<br><strong>Feriado:</strong> {}</div>\
         <div class=\"resumo\"><strong>Em Uso:</strong> {}<br><strong>Disponíveis:</strong> {}<br>\
         <strong>Total:</strong> {}<br><strong>Saldo Anterior:</strong> {:+}</div>",
        tipo_dia(f.tipo_dia),
        clima(f.choveu),
        sim_nao(f.feriado),
        f.motos_em_uso,
        f.motos_disponiveis,
        f.total_motos,
        f.saldo_dia,
    );

    if f.motos_em_uso + f.motos_disponiveis > 0 {
        html.push_str(&rosca(
            "Status Atual da Frota",
            &[
                Barra::new("Em Uso", f.motos_em_uso as f64, COR_ESCURA),
                Barra::new("Disponíveis", f.motos_disponiveis as f64, COR_SAIDA),
            ],
        ));
    }
    html
}

fn metricas_modelo_html(titulo: &str, m: &MetricasModelo) -> String {
    let rmse = m.rmse.map(|r| format!("{r:.2}")).unwrap_or_else(|| "N/A".to_string());
    format!(
        "<div class=\"resumo\"><h4>{titulo}</h4>\
         <strong>R² Score:</strong> {:.4}<br><strong>MAE:</strong> {:.2}<br><strong>RMSE:</strong> {rmse}</div>",
        m.r2, m.mae
    )
}

fn metricas_html(metricas: Option<&MetricasTreino>) -> String {
    let mut html = String::from("<h2>Performance dos Modelos</h2>");
    let Some(metricas) = metricas else {
        html.push_str("<p>Métricas indisponíveis para os modelos carregados.</p>");
        return html;
    };

    html.push_str(&metricas_modelo_html("Modelo: Motos que Saíram", &metricas.model_saida));
    html.push_str(&metricas_modelo_html("Modelo: Motos que Voltaram", &metricas.model_volta));
    html.push_str(
        "<p><strong>R² Score</strong>: quanto o modelo explica da variação dos dados (mais próximo de 1, melhor).<br>\
         <strong>MAE</strong>: erro médio absoluto das predições.<br>\
         <strong>RMSE</strong>: raiz do erro quadrático médio (penaliza erros maiores).</p>",
    );

    let valores = |m: &MetricasModelo| vec![m.r2, m.mae, m.rmse.unwrap_or(0.0)];
    html.push_str("<h4>Comparação de Métricas</h4>");
    html.push_str(&barras_agrupadas(
        "Métricas dos Modelos",
        &["R² Score", "MAE", "RMSE"],
        &[
            Serie::new("Saídas", COR_ESCURA, valores(&metricas.model_saida)),
            Serie::new("Retornos", COR_SAIDA, valores(&metricas.model_volta)),
        ],
    ));
    html
}

fn sobre_html() -> String {
    "<h2>Sobre o Sistema</h2>\
     <p>Previsão de saídas e retornos de motocicletas por galpão, a partir de dois \
     modelos de regressão treinados sobre o histórico de operação.</p>\
     <h4>Variáveis do Modelo</h4>\
     <ul><li>Galpão</li><li>Dia da Semana (0-6)</li><li>Tipo de Dia (Útil ou Fim de Semana)</li>\
     <li>Condições Climáticas</li><li>Feriado</li><li>Motos em Uso</li><li>Motos Disponíveis</li>\
     <li>Total de Motos</li><li>Saldo do Dia Anterior</li></ul>\
     <p>Derivadas: taxa de ocupação e interações de chuva e feriado com o fim de semana.</p>"
        .to_string()
}

fn documento(corpo: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">\
         <title>Previsão de Demanda de Motos</title><style>{ESTILO}</style></head><body>\
         <header><h1>Sistema de Previsão de Demanda</h1>\
         <p>Previsão de saídas e retornos de motocicletas</p></header>{corpo}\
         <footer><p style=\"text-align:center\"><small>v{}</small></p></footer></body></html>",
        env!("CARGO_PKG_VERSION")
    )
}

pub fn renderizar(
    formulario: &FormularioDashboard,
    previsao: Option<&PrevisaoExibida>,
    metricas: Option<&MetricasTreino>,
) -> String {
    let mut corpo = String::from(
        "<nav><a href=\"#previsao\">Previsão</a><a href=\"#metricas\">Métricas do Modelo</a>\
         <a href=\"#sobre\">Sobre</a></nav>",
    );

    corpo.push_str("<section id=\"previsao\"><main><aside>");
    corpo.push_str(&formulario_html(formulario));
    corpo.push_str("</aside><div>");
    match previsao {
        Some(previsao) => corpo.push_str(&resultado_html(previsao)),
        None => corpo.push_str("<p>Preencha os parâmetros e clique em <em>Fazer Previsão</em>.</p>"),
    }
    corpo.push_str(&resumo_parametros(formulario));
    corpo.push_str("</div></main></section>");

    let _ = write!(corpo, "<section id=\"metricas\">{}</section>", metricas_html(metricas));
    let _ = write!(corpo, "<section id=\"sobre\">{}</section>", sobre_html());

    documento(&corpo)
}

pub fn pagina_erro(mensagem: &str) -> String {
    documento(&format!(
        "<section><h2>Serviço indisponível</h2><p>{}</p></section>",
        escapar(mensagem)
    ))
}

fn escapar(texto: &str) -> String {
    texto
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
