use super::*;
use crate::common::{self, HealthCheck, ServiceInfo, TunnelUrl};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::{
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, info_span, Instrument};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MediBot API",
        version = "2.0",
        description = "Advanced Medical Information Assistant API"
    ),
    paths(
        common::root,
        common::health_check,
        common::get_ngrok_url,
        chat,
    ),
    components(schemas(
        ServiceInfo,
        HealthCheck,
        TunnelUrl,
        ChatRequest,
        ChatResponse,
        MedicationInfo,
    ))
)]
pub struct ApiDoc;

#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer with optional medication facts", body = ChatResponse),
        (status = 422, description = "Malformed request body"),
        (status = 500, description = "Internal server error")
    )
)]
/// Answer a text question and/or a medication photo.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, MediBotError> {
    let Json(request) = payload.map_err(|e| MediBotError::InvalidRequest(e.body_text()))?;

    let request_id = uuid::Uuid::new_v4();
    async move {
        info!(
            "Processing chat request (image: {}, message length: {})",
            request.image().is_some(),
            request.message.len()
        );
        let response = state.bot.chat(&request).await?;
        info!(
            "Chat request complete (confidence: {}, sources: {:?})",
            response.confidence, response.sources
        );
        Ok::<_, MediBotError>(Json(response))
    }
    .instrument(info_span!("chat", %request_id))
    .await
}

/// All public routes, with CORS open to any origin and the docs UI at /docs.
pub fn router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    Router::new()
        .route("/", get(common::root))
        .route("/health", get(common::health_check))
        .route("/get-ngrok-url", get(common::get_ngrok_url))
        .route("/chat", post(chat))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured address and serve until the process stops.
pub async fn serve(state: Arc<AppState>) -> Result<(), MediBotError> {
    let listener = TcpListener::bind(&state.config.bind_addr)
        .await
        .map_err(|e| {
            MediBotError::InvalidConfig(format!(
                "Failed to bind {}: {e}",
                state.config.bind_addr
            ))
        })?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| MediBotError::Internal(format!("Failed to read local address: {e}")))?;
    info!("MediBot API listening on {local_addr}");
    info!("API docs available at http://{local_addr}/docs");

    axum::serve(listener, router(state).into_make_service())
        .await
        .map_err(|e| MediBotError::Internal(format!("Server failed: {e}")))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::app::responder::MEDICAL_DISCLAIMER;
    use crate::app::vision::test::{png_base64, StubModel};
    use crate::Config;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(config: Config, labels_url: String, model: Arc<StubModel>) -> Arc<AppState> {
        let labels = LabelClient::new(labels_url, Duration::from_secs(5)).unwrap();
        Arc::new(AppState {
            config,
            bot: MediBot::new(KnowledgeBase::embedded().unwrap(), labels, model),
        })
    }

    fn offline_state(config: Config) -> Arc<AppState> {
        test_state(
            config,
            "http://127.0.0.1:1/drug/label.json".into(),
            StubModel::answering("Name: Advil"),
        )
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_descriptor() {
        let app = router(offline_state(Config::default()));
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["version"], "2.0");
        assert_eq!(body["endpoints"], json!(["/chat", "/health", "/docs"]));
    }

    #[tokio::test]
    async fn health_reports_key_presence_only() {
        let app = router(offline_state(Config::default()));
        let body = body_json(app.oneshot(get("/health")).await.unwrap()).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], "2.0");
        assert_eq!(body["google_ai_configured"], false);
        assert!(body["timestamp"].as_str().unwrap().contains('T'));

        let config = Config {
            google_api_key: Some("not-a-real-key".into()),
            ..Config::default()
        };
        let app = router(offline_state(config));
        let body = body_json(app.oneshot(get("/health")).await.unwrap()).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["google_ai_configured"], true);
    }

    #[tokio::test]
    async fn ngrok_url_is_null_without_file() {
        let config = Config {
            tunnel_file: std::env::temp_dir().join(format!("missing-{}.json", uuid::Uuid::new_v4())),
            ..Config::default()
        };
        let app = router(offline_state(config));
        let body = body_json(app.oneshot(get("/get-ngrok-url")).await.unwrap()).await;
        assert_eq!(body, json!({"url": null}));
    }

    #[tokio::test]
    async fn chat_headache() {
        let app = router(offline_state(Config::default()));
        let response = app
            .oneshot(post_json(
                "/chat",
                r#"{"message": "I have a headache", "image_data": null}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let text = body["response"].as_str().unwrap();
        assert!(text.contains("Headache Information"));
        assert!(text.ends_with(MEDICAL_DISCLAIMER));
        assert_eq!(body["confidence"], 0.85);
        assert_eq!(body["sources"], json!(["MediBot Knowledge Base"]));
        assert_eq!(body["medication_info"], Value::Null);
    }

    #[tokio::test]
    async fn chat_empty_request() {
        let app = router(offline_state(Config::default()));
        let response = app
            .oneshot(post_json("/chat", r#"{"message": "", "image_data": null}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["response"], MEDICAL_DISCLAIMER);
        assert_eq!(body["confidence"], 0.0);
        assert_eq!(body["medication_info"], Value::Null);
        assert_eq!(body["sources"], json!([]));
    }

    #[tokio::test]
    async fn chat_image_with_label_enrichment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "purpose": ["Pain reliever"],
                    "adverse_reactions": ["nausea", "heartburn"]
                }]
            })))
            .mount(&server)
            .await;
        let state = test_state(
            Config::default(),
            server.uri(),
            StubModel::answering("- Name: Advil\n- Purpose: pain"),
        );

        let body = json!({
            "message": "",
            "image_data": format!("data:image/png;base64,{}", png_base64())
        });
        let response = router(state)
            .oneshot(post_json("/chat", &body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["confidence"], 0.9);
        assert_eq!(
            body["sources"],
            json!(["Google Gemini AI Image Analysis", "FDA Database"])
        );
        assert_eq!(body["medication_info"]["name"], "Advil");
        assert_eq!(body["medication_info"]["purpose"], "Pain reliever");
        assert_eq!(
            body["medication_info"]["side_effects"],
            json!(["nausea", "heartburn"])
        );
    }

    #[tokio::test]
    async fn malformed_body_is_422_with_detail() {
        let app = router(offline_state(Config::default()));
        let response = app
            .oneshot(post_json("/chat", r#"{"message": 42}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("message"));
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let app = router(offline_state(Config::default()));
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = router(offline_state(Config::default()));
        let response = app.oneshot(get("/openapi.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["paths"]["/chat"]["post"].is_object());
        assert!(body["paths"]["/health"]["get"].is_object());
    }
}
