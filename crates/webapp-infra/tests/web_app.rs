use anyhow::Error as AnyError;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::Response,
};
use http_body_util::BodyExt;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use utoipa_axum::{router::OpenApiRouter, routes};
use webapp_infra::web::{build_router, FeatureConfig, WebAppConfig, WebApplication, PROBLEM_CONTENT_TYPE};
use webapp_test::test;

#[derive(Debug, Deserialize)]
struct GreeterConfig {
    greeting: String,
}

impl FeatureConfig for GreeterConfig {
    const NAME: &'static str = "greeter";
}

#[utoipa::path(get, path = "/greeting", responses((status = OK, body = String)))]
async fn get_greeting(State(greeting): State<String>) -> String {
    greeting
}

struct Greeter;

impl WebApplication for Greeter {
    type AppConfig = GreeterConfig;
    type AppState = String;

    async fn create_state(&self, config: &WebAppConfig<Self::AppConfig>) -> Result<Self::AppState, AnyError> {
        Ok(config.feature.greeting.clone())
    }

    async fn create_routes(
        &self,
        _config: &WebAppConfig<Self::AppConfig>,
    ) -> Result<OpenApiRouter<Self::AppState>, AnyError> {
        Ok(OpenApiRouter::new().routes(routes!(get_greeting)))
    }
}

async fn load_config() -> WebAppConfig<GreeterConfig> {
    WebAppConfig::<GreeterConfig>::load("test", Some("./tests/web_configs/app.json".into()))
        .await
        .unwrap()
}

async fn get(uri: &str) -> Response {
    get_with_config(&load_config().await, uri).await
}

async fn get_with_config(config: &WebAppConfig<GreeterConfig>, uri: &str) -> Response {
    let router = build_router(&Greeter, config).await.unwrap();
    router
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::ORIGIN, "https://localhost:5001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

#[test]
async fn test_application_routes_are_served_from_root() {
    let response = get("/greeting").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-powered-by"], "greeter@custom");
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://localhost:5001"
    );
    assert_eq!(body_bytes(response).await, b"Hello");
}

#[test]
async fn test_health_routes_are_nested() {
    let response = get("/greeter/info/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"Ok");

    let response = get("/greeter/info/version").await;
    assert_eq!(response.status(), StatusCode::OK);
    let version: JsonValue = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(version, json!({"appName": "greeter", "version": "custom"}));
}

#[test]
async fn test_openapi_lists_all_routes() {
    let response = get("/greeter/doc/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc: JsonValue = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.contains_key("/greeting"));
    assert!(paths.contains_key("/greeter/info/ready"));
    assert!(paths.contains_key("/greeter/info/version"));
}

#[test]
async fn test_unknown_route_is_a_problem() {
    let response = get("/greeter/unknown").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[header::CONTENT_TYPE], PROBLEM_CONTENT_TYPE);
    assert_eq!(response.headers()["x-powered-by"], "greeter@custom");
    let problem: JsonValue = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(problem["status"], 404);
    assert_eq!(problem["type"], "not-found");
    assert_eq!(problem["instance"], "/greeter/unknown");
    assert_eq!(problem["detail"], "No route for GET /greeter/unknown");
}

#[test]
async fn test_problem_details_are_hidden_by_default() {
    let mut config = load_config().await;
    config.service.full_problem_response = false;

    let response = get_with_config(&config, "/greeter/unknown").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[header::CONTENT_TYPE], PROBLEM_CONTENT_TYPE);
    let problem: JsonValue = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(problem, json!({"status": 404, "type": "not-found"}));
}

#[test]
async fn test_disallowed_origin_has_no_cors_header() {
    let config = load_config().await;
    let router = build_router(&Greeter, &config).await.unwrap();
    let response = router
        .oneshot(
            Request::builder()
                .uri("/greeting")
                .header(header::ORIGIN, "https://contoso.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
