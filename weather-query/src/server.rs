//! HTTP surface: `GET /` liveness and `POST /query`.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use weather_query_core::{QueryError, QueryOrchestrator};

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<QueryOrchestrator>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

/// A fault that reached the HTTP boundary.
pub struct ApiError(QueryError);

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "query failed");
        let body = serde_json::json!({ "detail": self.0.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub fn router(orchestrator: Arc<QueryOrchestrator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/query", post(process_query))
        .layer(cors)
        .with_state(AppState { orchestrator })
}

pub async fn serve(addr: &str, orchestrator: Arc<QueryOrchestrator>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Weather query API listening on http://{addr}");

    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Weather Query API is running" }))
}

async fn process_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let orchestrator = Arc::clone(&state.orchestrator);

    // A panic inside the pipeline ends this task only; report it as a fault.
    let reply = tokio::spawn(async move { orchestrator.handle(&request.query).await })
        .await
        .map_err(|err| QueryError::Internal(err.to_string()))??;

    info!(response = %reply.text, "sending response");
    Ok(Json(QueryResponse {
        response: reply.text,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Number;
    use std::time::Duration;
    use tower::ServiceExt;
    use weather_query_core::{
        CompletionError, LanguageModel, Observation, ProviderError, ResponseComposer,
        WeatherProvider, orchestrator::NON_WEATHER_RESPONSE,
    };

    const PUNE_RAW: &str =
        "The weather in Pune is clear sky. Temperature: 25°C (feels like 27°C), Humidity: 40%";

    #[derive(Debug)]
    struct ClearSky;

    #[async_trait]
    impl WeatherProvider for ClearSky {
        async fn current(&self, city: &str) -> Result<Observation, ProviderError> {
            Ok(Observation {
                city: city.to_string(),
                description: "clear sky".into(),
                temperature_c: Number::from(25),
                feels_like_c: Number::from(27),
                humidity_pct: Number::from(40),
                observed_at: None,
            })
        }
    }

    #[derive(Debug)]
    enum Model {
        Friendly,
        RateLimited,
        Broken,
    }

    #[async_trait]
    impl LanguageModel for Model {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            match self {
                Model::Friendly => Ok("Sunny and 25°C in Pune, enjoy!".into()),
                Model::RateLimited => Err(CompletionError::RateLimited("quota".into())),
                Model::Broken => panic!("tokenizer exploded"),
            }
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    fn app(model: Model) -> Router {
        let composer = ResponseComposer::new(Arc::new(model), Duration::from_secs(5));
        let orchestrator = QueryOrchestrator::new(Arc::new(ClearSky), composer);
        router(Arc::new(orchestrator.unwrap()))
    }

    fn query_request(query: &str) -> Request<Body> {
        let body = serde_json::json!({ "query": query }).to_string();

        Request::builder()
            .method("POST")
            .uri("/query")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn ask(model: Model, query: &str) -> Response {
        app(model).oneshot(query_request(query)).await.unwrap()
    }

    async fn json_body(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_reports_running() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = app(Model::Friendly).oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["message"], "Weather Query API is running");
    }

    #[tokio::test]
    async fn weather_query_returns_composed_answer() {
        let res = ask(Model::Friendly, "weather in Pune").await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["response"], "Sunny and 25°C in Pune, enjoy!");
    }

    #[tokio::test]
    async fn rate_limited_model_returns_raw_sentence() {
        let res = ask(Model::RateLimited, "weather in Pune").await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["response"], PUNE_RAW);
    }

    #[tokio::test]
    async fn non_weather_query_is_refused_with_success_status() {
        let res = ask(Model::Friendly, "tell me a joke").await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["response"], NON_WEATHER_RESPONSE);
    }

    #[tokio::test]
    async fn pipeline_fault_is_a_500_with_detail() {
        let res = ask(Model::Broken, "weather in Pune").await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(res).await;
        let detail = body["detail"].as_str().unwrap_or_default();
        assert!(detail.contains("panicked"), "detail was {detail}");
    }

    #[tokio::test]
    async fn missing_query_field_is_rejected() {
        let req = Request::builder()
            .method("POST")
            .uri("/query")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let res = app(Model::Friendly).oneshot(req).await.unwrap();

        assert!(res.status().is_client_error());
    }
}
