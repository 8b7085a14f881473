//! Gráficos em SVG embutido: barras simples, barras agrupadas e rosca.

use std::f64::consts::PI;
use std::fmt::Write;

const LARGURA: f64 = 420.0;
const ALTURA: f64 = 260.0;
const MARGEM: f64 = 40.0;

pub struct Barra<'a> {
    pub rotulo: &'a str,
    pub valor: f64,
    pub cor: &'a str,
}

impl<'a> Barra<'a> {
    pub fn new(rotulo: &'a str, valor: f64, cor: &'a str) -> Self {
        Self { rotulo, valor, cor }
    }
}

pub struct Serie<'a> {
    pub nome: &'a str,
    pub cor: &'a str,
    pub valores: Vec<f64>,
}

impl<'a> Serie<'a> {
    pub fn new(nome: &'a str, cor: &'a str, valores: Vec<f64>) -> Self {
        Self { nome, cor, valores }
    }
}

/// Valores negativos ou não finitos viram zero no desenho.
fn positivo(valor: f64) -> f64 {
    if valor.is_finite() && valor > 0.0 {
        valor
    } else {
        0.0
    }
}

fn escala(maximo: f64) -> f64 {
    let area = ALTURA - 2.0 * MARGEM;
    if maximo > 0.0 {
        area / maximo
    } else {
        0.0
    }
}

fn abrir(titulo: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {LARGURA} {ALTURA}\" width=\"{LARGURA}\" height=\"{ALTURA}\" role=\"img\">\
         <title>{titulo}</title>\
         <text x=\"{}\" y=\"20\" text-anchor=\"middle\" font-weight=\"bold\">{titulo}</text>",
        LARGURA / 2.0
    )
}

pub fn barras(titulo: &str, itens: &[Barra]) -> String {
    let mut svg = abrir(titulo);
    if itens.is_empty() {
        svg.push_str("</svg>");
        return svg;
    }

    let maximo = itens.iter().map(|b| positivo(b.valor)).fold(0.0, f64::max);
    let fator = escala(maximo);
    let base = ALTURA - MARGEM;
    let passo = (LARGURA - 2.0 * MARGEM) / itens.len() as f64;
    let largura = passo * 0.6;

    for (i, barra) in itens.iter().enumerate() {
        let altura = positivo(barra.valor) * fator;
        let x = MARGEM + passo * i as f64 + (passo - largura) / 2.0;
        let centro = x + largura / 2.0;
        let _ = write!(
            svg,
            "<rect x=\"{x:.1}\" y=\"{:.1}\" width=\"{largura:.1}\" height=\"{altura:.1}\" fill=\"{}\"/>\
             <text x=\"{centro:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{:.1}</text>\
             <text x=\"{centro:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
            base - altura,
            barra.cor,
            base - altura - 5.0,
            barra.valor,
            base + 18.0,
            barra.rotulo,
        );
    }
    svg.push_str("</svg>");
    svg
}

pub fn barras_agrupadas(titulo: &str, categorias: &[&str], series: &[Serie]) -> String {
    let mut svg = abrir(titulo);
    if categorias.is_empty() || series.is_empty() {
        svg.push_str("</svg>");
        return svg;
    }

    let maximo = series
        .iter()
        .flat_map(|s| s.valores.iter().copied())
        .map(positivo)
        .fold(0.0, f64::max);
    let fator = escala(maximo);
    let base = ALTURA - MARGEM;
    let passo = (LARGURA - 2.0 * MARGEM) / categorias.len() as f64;
    let largura = passo * 0.7 / series.len() as f64;

    for (c, categoria) in categorias.iter().enumerate() {
        let inicio = MARGEM + passo * c as f64 + passo * 0.15;
        for (s, serie) in series.iter().enumerate() {
            let valor = serie.valores.get(c).copied().unwrap_or(0.0);
            let altura = positivo(valor) * fator;
            let x = inicio + largura * s as f64;
            let _ = write!(
                svg,
                "<rect x=\"{x:.1}\" y=\"{:.1}\" width=\"{largura:.1}\" height=\"{altura:.1}\" fill=\"{}\"/>\
                 <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\">{valor:.3}</text>",
                base - altura,
                serie.cor,
                x + largura / 2.0,
                base - altura - 4.0,
            );
        }
        let _ = write!(
            svg,
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{categoria}</text>",
            MARGEM + passo * (c as f64 + 0.5),
            base + 18.0,
        );
    }

    for (s, serie) in series.iter().enumerate() {
        let y = 35.0 + 14.0 * s as f64;
        let _ = write!(
            svg,
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"10\" height=\"10\" fill=\"{}\"/>\
             <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{}</text>",
            LARGURA - 110.0,
            y - 9.0,
            serie.cor,
            LARGURA - 95.0,
            y,
            serie.nome,
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Rosca com um círculo por fatia, deslocado via `stroke-dashoffset`.
pub fn rosca(titulo: &str, fatias: &[Barra]) -> String {
    let mut svg = abrir(titulo);
    let total: f64 = fatias.iter().map(|f| positivo(f.valor)).sum();
    if total <= 0.0 {
        svg.push_str("</svg>");
        return svg;
    }

    let raio = 70.0;
    let circunferencia = 2.0 * PI * raio;
    let (cx, cy) = (LARGURA / 2.0 - 60.0, ALTURA / 2.0 + 10.0);
    let mut acumulado = 0.0;

    for (i, fatia) in fatias.iter().enumerate() {
        let fracao = positivo(fatia.valor) / total;
        let comprimento = fracao * circunferencia;
        let _ = write!(
            svg,
            "<circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{raio}\" fill=\"none\" stroke=\"{}\" stroke-width=\"30\" \
             stroke-dasharray=\"{comprimento:.2} {:.2}\" stroke-dashoffset=\"{:.2}\" transform=\"rotate(-90 {cx:.1} {cy:.1})\"/>",
            fatia.cor,
            circunferencia - comprimento,
            -acumulado,
        );
        acumulado += comprimento;

        let y = 60.0 + 18.0 * i as f64;
        let _ = write!(
            svg,
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{}\"/>\
             <text x=\"{:.1}\" y=\"{y:.1}\">{}: {:.0} ({:.1}%)</text>",
            LARGURA - 130.0,
            y - 10.0,
            fatia.cor,
            LARGURA - 112.0,
            fatia.rotulo,
            fatia.valor,
            fracao * 100.0,
        );
    }
    svg.push_str("</svg>");
    svg
}
