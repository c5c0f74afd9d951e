//! Water Potability Advisor - Web Server
//!
//! Serves the single-page check form and a small JSON API on top of
//! `potability-core`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  POTABILITY ADVISOR                      │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌────────────────────┐  │
//! │  │  Form     │   │  JSON API │   │  Health / Status   │  │
//! │  │  (HTML)   │   │  (Axum)   │   │                    │  │
//! │  └─────┬─────┘   └─────┬─────┘   └─────────┬──────────┘  │
//! │        └───────────────┼───────────────────┘             │
//! │                        ▼                                 │
//! │              ┌───────────────────┐                       │
//! │              │ PotabilityAdvisor │  (loaded once)        │
//! │              └───────────────────┘                       │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;
mod views;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use potability_core::PotabilityAdvisor;

pub use error::{AppError, AppResult};

const DEFAULT_LOG_FILTER: &str = "potability_server=debug,potability_core=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_tracing(&config);

    tracing::info!(
        "{} v{} starting ({})",
        potability_core::constants::APP_NAME,
        potability_core::constants::APP_VERSION,
        config.environment
    );
    tracing::info!("Model: {}", config.model_path.display());
    tracing::info!("Scaler: {}", config.scaler_path.display());

    // Artifacts load once; no listener without them
    let advisor = PotabilityAdvisor::load(config.artifact_paths()).map_err(|e| {
        tracing::error!("Startup halted: {}", e);
        e
    })?;

    for info in advisor.artifacts().info() {
        tracing::info!(
            "Loaded {} ({}, {} bytes, sha256 {})",
            info.artifact,
            info.format,
            info.size_bytes,
            info.sha256
        );
    }

    // Build application state
    let state = AppState {
        advisor: Arc::new(advisor),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &config::Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<PotabilityAdvisor>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Page
    let page_routes = Router::new()
        .route("/", get(handlers::form::index))
        .route("/check", post(handlers::form::check));

    // JSON API
    let api_routes = Router::new()
        .route("/api/v1/check", post(handlers::api::check))
        .route("/api/v1/fields", get(handlers::api::fields))
        .route("/api/v1/status", get(handlers::api::status));

    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(page_routes)
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use potability_core::{
        ArtifactPaths, Artifacts, ClassProbabilities, Classifier, FeatureScaler, InferenceError,
        Label,
    };

    fn artifact_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../artifacts")
    }

    fn test_config() -> config::Config {
        let paths = ArtifactPaths::in_dir(artifact_dir());
        config::Config {
            port: 0,
            environment: "test".to_string(),
            model_path: paths.model,
            scaler_path: paths.scaler,
            model_classes: paths.model_classes,
            log_json: false,
        }
    }

    fn app() -> Router {
        let config = test_config();
        let advisor = PotabilityAdvisor::load(config.artifact_paths()).unwrap();
        create_router(AppState {
            advisor: Arc::new(advisor),
            config,
        })
    }

    struct Passthrough;

    impl FeatureScaler for Passthrough {
        fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Ok(features.to_vec())
        }

        fn kind(&self) -> &'static str {
            "passthrough"
        }
    }

    /// Classifier whose runtime always fails
    struct Broken;

    impl Classifier for Broken {
        fn predict(&self, _features: &[f64]) -> Result<Label, InferenceError> {
            Err(InferenceError::Runtime("session poisoned".to_string()))
        }

        fn predict_proba(&self, _features: &[f64]) -> Result<ClassProbabilities, InferenceError> {
            Err(InferenceError::Runtime("session poisoned".to_string()))
        }

        fn kind(&self) -> &'static str {
            "broken"
        }
    }

    fn broken_app() -> Router {
        let artifacts = Artifacts::from_parts(Box::new(Passthrough), Box::new(Broken));
        create_router(AppState {
            advisor: Arc::new(PotabilityAdvisor::new(Arc::new(artifacts))),
            config: test_config(),
        })
    }

    fn defaults_body() -> Value {
        json!({
            "ph": 7.08,
            "hardness": 196.0,
            "solids": 22000.0,
            "chloramines": 7.10,
            "sulfate": 333.0,
            "conductivity": 426.0,
            "organic_carbon": 14.0,
            "trihalomethanes": 66.0,
            "turbidity": 3.96
        })
    }

    fn defaults_form() -> String {
        "ph=7.08&hardness=196&solids=22000&chloramines=7.1&sulfate=333\
         &conductivity=426&organic_carbon=14&trihalomethanes=66&turbidity=3.96"
            .to_string()
    }

    fn json_request(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn form_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/check")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn read_body(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&read_body(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "test");
    }

    #[tokio::test]
    async fn index_renders_defaults_without_verdict() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let page = read_body(response).await;
        assert!(page.contains("value=\"7.08\""));
        assert!(page.contains("value=\"3.96\""));
        assert!(!page.contains("<progress"));
    }

    #[tokio::test]
    async fn form_check_renders_verdict() {
        let response = app().oneshot(form_request(defaults_form())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let page = read_body(response).await;
        assert!(page.contains("STATUS: WATER IS SAFE TO DRINK (POTABLE)"));
        assert!(page.contains("72.5%"));
        assert!(page.contains("<progress max=\"100\" value=\"72\">"));
        assert!(page.contains("<td>Turbidity (NTU)</td><td>3.96</td>"));
    }

    #[tokio::test]
    async fn form_out_of_range_is_422_without_verdict() {
        let body = defaults_form().replace("ph=7.08", "ph=14.01");
        let response = app().oneshot(form_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let page = read_body(response).await;
        assert!(page.contains("pH must be between 0 and 14"));
        assert!(page.contains("value=\"14.01\""));
        assert!(!page.contains("id=\"verdict\""));
    }

    #[tokio::test]
    async fn api_check_defaults_is_potable() {
        let response = app()
            .oneshot(json_request("/api/v1/check", &defaults_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&read_body(response).await).unwrap();
        assert_eq!(body["label"], "potable");
        assert_eq!(body["potable"], true);
        assert_eq!(body["confidence_display"], "72.5%");
        assert_eq!(body["progress"], 72);
        assert_eq!(body["sample"]["ph"], 7.08);
        assert!(body["check_id"].is_string());
    }

    #[tokio::test]
    async fn api_check_acidic_is_not_potable() {
        let mut body = defaults_body();
        body["ph"] = json!(2.0);
        let response = app()
            .oneshot(json_request("/api/v1/check", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&read_body(response).await).unwrap();
        assert_eq!(body["label"], "not_potable");
        assert!((body["confidence"].as_f64().unwrap() - 63.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn api_check_out_of_range_is_400() {
        let mut body = defaults_body();
        body["turbidity"] = json!(7.5);
        let response = app()
            .oneshot(json_request("/api/v1/check", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_str(&read_body(response).await).unwrap();
        assert_eq!(body["status"], 400);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn api_check_wrong_type_is_400() {
        let mut body = defaults_body();
        body["ph"] = json!("abc");
        let response = app()
            .oneshot(json_request("/api/v1/check", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_str(&read_body(response).await).unwrap();
        assert_eq!(body["status"], 400);
        assert!(body["error"].as_str().unwrap().contains("ph"));
    }

    #[tokio::test]
    async fn api_check_unreadable_body_is_400() {
        let malformed = Request::builder()
            .method("POST")
            .uri("/api/v1/check")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"ph\": 7.0,"))
            .unwrap();
        let response = app().oneshot(malformed).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&read_body(response).await).unwrap();
        assert_eq!(body["status"], 400);

        let untyped = Request::builder()
            .method("POST")
            .uri("/api/v1/check")
            .body(Body::from(defaults_body().to_string()))
            .unwrap();
        let response = app().oneshot(untyped).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&read_body(response).await).unwrap();
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn api_check_missing_field_is_400() {
        let mut body = defaults_body();
        body.as_object_mut().unwrap().remove("sulfate");
        let response = app()
            .oneshot(json_request("/api/v1/check", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pipeline_failure_is_generic_500() {
        let response = broken_app()
            .oneshot(json_request("/api/v1/check", &defaults_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = serde_json::from_str(&read_body(response).await).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert!(!body.to_string().contains("poisoned"));
    }

    #[tokio::test]
    async fn form_pipeline_failure_is_html_500() {
        let response = broken_app().oneshot(form_request(defaults_form())).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));

        let page = read_body(response).await;
        assert!(page.contains("could not be completed"));
        assert!(!page.contains("poisoned"));
    }

    #[tokio::test]
    async fn form_check_flags_values_outside_guidelines() {
        let body = defaults_form().replace("ph=7.08", "ph=2");
        let response = app().oneshot(form_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let page = read_body(response).await;
        assert!(page.contains("<td>pH</td><td>2</td><td><span class=\"error\">outside 6.5 - 8.5</span></td>"));
        assert!(page.contains("<td>Turbidity (NTU)</td><td>3.96</td><td>within &lt; 5.0</td>"));
    }

    #[tokio::test]
    async fn fields_and_status_endpoints() {
        let app = app();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/v1/fields").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let fields: Value = serde_json::from_str(&read_body(response).await).unwrap();
        assert_eq!(fields.as_array().unwrap().len(), 9);
        assert_eq!(fields[0]["name"], "ph");
        assert_eq!(fields[0]["guideline"]["safe_range"], "6.5 - 8.5");

        let response = app
            .oneshot(Request::builder().uri("/api/v1/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status: Value = serde_json::from_str(&read_body(response).await).unwrap();
        assert_eq!(status["model_loaded"], true);
        assert_eq!(status["classifier"], "random_forest");
        assert_eq!(status["feature_count"], 9);
        assert_eq!(status["artifacts"][0]["ensemble"]["n_trees"], 4);
        assert!(status["artifacts"][1].get("ensemble").is_none());
    }
}
