use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{classify::ServerErrorsFailureClass, cors::CorsLayer, trace::TraceLayer};
use tracing::Level;

use crate::api::handlers::*;
use crate::dashboard::pagina_dashboard;
use crate::predicao::ServicoPredicao;

#[derive(Clone)]
pub struct AppState {
    pub servico: Arc<ServicoPredicao>,
}

pub fn create_router(servico: Arc<ServicoPredicao>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/predict", post(prever));

    let dashboard_routes = Router::new().route("/dashboard", get(pagina_dashboard));

    Router::new()
        .merge(api_routes)
        .merge(dashboard_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::span!(
                        Level::INFO,
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    tracing::info!(
                        "📥 Requisição recebida: {} {}",
                        request.method(),
                        request.uri()
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        tracing::info!(
                            "📤 Resposta enviada: status={} latency={:.2}ms",
                            response.status(),
                            latency.as_secs_f64() * 1000.0
                        );
                    },
                )
                .on_failure(
                    |error: ServerErrorsFailureClass, latency: std::time::Duration, _span: &tracing::Span| {
                        tracing::error!(
                            "❌ Erro na requisição: {:?} latency={:.2}ms",
                            error,
                            latency.as_secs_f64() * 1000.0
                        );
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .with_state(AppState { servico })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicao::fixtures;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_carregado() -> Router {
        create_router(Arc::new(fixtures::servico()))
    }

    fn app_vazio() -> Router {
        create_router(Arc::new(ServicoPredicao::nao_carregado()))
    }

    fn post_json(corpo: Value) -> Request<Body> {
        Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(corpo.to_string()))
            .unwrap()
    }

    async fn enviar(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn payload_butantan() -> Value {
        json!({
            "galpao_str": "BUTANTAN",
            "dia_semana": 6,
            "motos_em_uso": 18,
            "motos_disponiveis": 82,
            "choveu": 0,
            "total_motos": 100,
            "feriado": 1,
            "tipo_dia_str": "FIM_DE_SEMANA",
            "saldo_dia": 7
        })
    }

    #[tokio::test]
    async fn previsao_valida_retorna_200() {
        let (status, corpo) = enviar(app_carregado(), post_json(payload_butantan())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["motos_que_sairam"], json!(28.0));
        assert_eq!(corpo["motos_que_voltaram"], json!(13.2));
        assert_eq!(corpo["saldo_previsto"], json!(14.8));
        assert_eq!(corpo["galpao_map"], json!({"BUTANTAN": 0}));
        assert_eq!(corpo["tipo_dia_map"], json!({"UTIL": 0, "FIM_DE_SEMANA": 1}));
        assert_eq!(corpo["metricas_modelo"]["saida"], json!({"r2": 0.8532, "mae": 3.46, "rmse": 4.57}));
        assert_eq!(corpo["metricas_modelo"]["volta"], json!({"r2": 0.8421, "mae": 3.67}));
    }

    #[tokio::test]
    async fn campo_obrigatorio_ausente_retorna_422() {
        let mut payload = payload_butantan();
        payload.as_object_mut().unwrap().remove("dia_semana");
        let (status, corpo) = enviar(app_carregado(), post_json(payload)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(corpo["campos"][0]["campo"], "corpo");
    }

    #[tokio::test]
    async fn faixa_invalida_retorna_422_com_campos() {
        let mut payload = payload_butantan();
        payload["dia_semana"] = json!(9);
        payload["total_motos"] = json!(0);
        let (status, corpo) = enviar(app_carregado(), post_json(payload)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let campos: Vec<&str> = corpo["campos"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["campo"].as_str().unwrap())
            .collect();
        assert_eq!(campos, vec!["dia_semana", "total_motos"]);
    }

    #[tokio::test]
    async fn inteiros_enviados_como_reais_sao_aceitos() {
        let mut payload = payload_butantan();
        payload["dia_semana"] = json!(6.0);
        payload["feriado"] = json!(1.0);
        let (status, corpo) = enviar(app_carregado(), post_json(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["motos_que_sairam"], json!(28.0));
    }

    #[tokio::test]
    async fn inteiro_com_fracao_retorna_422() {
        let mut payload = payload_butantan();
        payload["dia_semana"] = json!(6.5);
        let (status, corpo) = enviar(app_carregado(), post_json(payload)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(corpo["campos"][0]["campo"], "corpo");
    }

    #[tokio::test]
    async fn json_malformado_retorna_422() {
        let request = Request::post("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"dia_semana\": "))
            .unwrap();
        let (status, _) = enviar(app_carregado(), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn sem_modelos_previsao_retorna_503() {
        let (status, corpo) = enviar(app_vazio(), post_json(payload_butantan())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(corpo["error"].as_str().unwrap().contains("Modelos não carregados"));
    }

    #[tokio::test]
    async fn health_com_modelos() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, corpo) = enviar(app_carregado(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["status"], "ok");
        assert_eq!(corpo["models_loaded"], true);
        assert_eq!(corpo["metricas"]["model_saida"]["r2"], json!(0.853249));
    }

    #[tokio::test]
    async fn health_sem_metricas_retorna_null() {
        let pacote = crate::predicao::PacoteModelos {
            metricas: None,
            ..fixtures::pacote()
        };
        let app = create_router(Arc::new(ServicoPredicao::carregado(pacote)));
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, corpo) = enviar(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(corpo["metricas"], Value::Null);
    }

    #[tokio::test]
    async fn health_sem_modelos_retorna_503() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, _) = enviar(app_vazio(), request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
