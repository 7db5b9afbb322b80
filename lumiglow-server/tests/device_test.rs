use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::mock_app::{MockApp, RED_DESCRIPTOR};

fn connection_request(uuid: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/api/devices/{uuid}/connection"))
        .method(Method::GET)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_connection_status() {
    let app = MockApp::new(RED_DESCRIPTOR).await;

    let response = app
        .router
        .clone()
        .oneshot(connection_request("u1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let _device = app.connect_device("u1").await;

    let response = app
        .router
        .clone()
        .oneshot(connection_request("u1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"uuid": "u1", "connectionId": "conn-u1"}));
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = MockApp::new(RED_DESCRIPTOR).await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["paths"]["/api/lighting/audio"].is_object());
    assert!(body["paths"]["/api/devices/{uuid}/connection"].is_object());
}
