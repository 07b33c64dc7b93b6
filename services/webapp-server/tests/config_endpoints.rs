use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use futures::future::join_all;
use http_body_util::BodyExt;
use serde_json::{json, Value as JsonValue};
use std::env;
use tower::ServiceExt;
use webapp_infra::web::{build_router, WebAppConfig, PROBLEM_CONTENT_TYPE};
use webapp_server::{AppConfig, AppState, Application, ConfigController};
use webapp_shared::AzureAdB2C;
use webapp_test::test;

const TEST_CONFIG: &str = "./tests/configs/server_config.test.json";

async fn load_config(path: &str) -> WebAppConfig<AppConfig> {
    WebAppConfig::<AppConfig>::load("test", Some(path.into())).await.unwrap()
}

async fn create_router() -> Router {
    let config = load_config(TEST_CONFIG).await;
    build_router(&Application, &config).await.unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, content_type, body)
}

async fn get(router: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    send(router, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

#[test]
async fn test_config_returns_the_configured_record() {
    let router = create_router().await;

    let (status, content_type, body) = get(router, "/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let body: JsonValue = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        json!({
            "domain": "contoso.b2clogin.com",
            "clientId": "abc123",
            "signUpSignInPolicyId": "B2C_1_signin"
        })
    );
}

#[test]
async fn test_both_routes_return_identical_bodies() {
    let router = create_router().await;

    let (status_config, _, config) = get(router.clone(), "/config").await;
    let (status_b2c, _, b2c) = get(router, "/azureb2cconfig").await;

    assert_eq!(status_config, StatusCode::OK);
    assert_eq!(status_b2c, StatusCode::OK);
    assert_eq!(config, b2c);
}

#[test]
async fn test_repeated_requests_are_idempotent() {
    let router = create_router().await;

    let (_, _, first) = get(router.clone(), "/azureb2cconfig").await;
    for _ in 0..5 {
        let (status, _, body) = get(router.clone(), "/azureb2cconfig").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, first);
    }
}

#[test]
async fn test_extraneous_input_is_ignored() {
    let router = create_router().await;
    let (_, _, expected) = get(router.clone(), "/config").await;

    let (status, _, body) = get(router.clone(), "/config?domain=fabrikam.b2clogin.com&debug").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, expected);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/azureb2cconfig")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"clientId": "overridden"}"#))
        .unwrap();
    let (status, _, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, expected);
}

#[test]
async fn test_concurrent_requests_do_not_interfere() {
    let router = create_router().await;
    let (_, _, expected) = get(router.clone(), "/config").await;

    let requests = (0..16).map(|i| {
        let router = router.clone();
        let uri = if i % 2 == 0 { "/config" } else { "/azureb2cconfig" };
        tokio::spawn(async move { get(router, uri).await })
    });

    for result in join_all(requests).await {
        let (status, _, body) = result.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, expected);
    }
}

#[test]
async fn test_config_routes_are_read_only() {
    let router = create_router().await;

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/config")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _, _) = send(router, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[test]
async fn test_config_routes_are_documented() {
    let router = create_router().await;

    let (status, _, body) = get(router, "/webapp/doc/openapi.json").await;
    assert_eq!(status, StatusCode::OK);

    let doc: JsonValue = serde_json::from_slice(&body).unwrap();
    assert!(doc["paths"]["/config"]["get"].is_object());
    assert!(doc["paths"]["/azureb2cconfig"]["get"].is_object());
    assert!(doc["components"]["schemas"]["AzureAdB2C"].is_object());
}

#[test]
async fn test_version_is_served_under_the_feature_name() {
    let router = create_router().await;

    let (status, _, body) = get(router, "/webapp/info/version").await;
    assert_eq!(status, StatusCode::OK);
    let body: JsonValue = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["appName"], "webapp");
}

#[test]
async fn test_unbound_configuration_fails_at_startup() {
    let result = WebAppConfig::<AppConfig>::load("test", Some("./tests/configs/server_config.missing_client.json".into())).await;
    let err = result.unwrap_err();
    log::debug!("{err:#}");
    assert!(err.to_string().contains("clientId"), "{err}");
}

#[test]
async fn test_injected_record_is_served_as_is() {
    let record = AzureAdB2C::new("fabrikam.onmicrosoft.com", "def456").with_sign_up_sign_in_policy("B2C_1_susi");
    let (router, _) = ConfigController::new().into_router().split_for_parts();
    let router = router.with_state(AppState::from_azure_ad_b2c(record.clone()));

    for uri in ["/config", "/azureb2cconfig"] {
        let (status, _, body) = get(router.clone(), uri).await;
        assert_eq!(status, StatusCode::OK);
        let served: AzureAdB2C = serde_json::from_slice(&body).unwrap();
        assert_eq!(served, record);
    }
}

#[test(serial = "env")]
async fn test_client_id_is_overridden_by_environment() {
    env::set_var("WEBAPP--WEBAPP--AZURE_AD_B2C--CLIENT_ID", "007");
    let config = WebAppConfig::<AppConfig>::load("test", Some("./tests/configs/server_config.env.json".into())).await;
    env::remove_var("WEBAPP--WEBAPP--AZURE_AD_B2C--CLIENT_ID");

    let config = config.unwrap();
    assert_eq!(config.feature.azure_ad_b2c.client_id, "007");

    let router = build_router(&Application, &config).await.unwrap();
    let (status, _, body) = get(router, "/config").await;
    assert_eq!(status, StatusCode::OK);
    let body: JsonValue = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["clientId"], "007");
    assert_eq!(body["domain"], "contoso.b2clogin.com");
}

#[test]
async fn test_unknown_route_hides_problem_details() {
    let router = create_router().await;

    let (status, content_type, body) = get(router, "/config/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type.as_deref(), Some(PROBLEM_CONTENT_TYPE));
    let body: JsonValue = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"status": 404, "type": "not-found"}));
}
