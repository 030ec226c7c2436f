//! Equipment repository tests against a local HTTP server

use axum::{
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use equipment_scanner::{
    config::ApiConfig,
    error::AppError,
    repository::{EquipmentSource, Repository},
    services::lookup::LookupService,
    ScanError,
};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn api(base_url: String, token: Option<&str>) -> ApiConfig {
    ApiConfig {
        base_url,
        token: token.map(str::to_string),
        ..Default::default()
    }
}

async fn list_equipment(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer desk-token") => Ok(Json(json!([
            { "item_code": "EQ-001", "name": "Projector", "status": "available", "price": "12500.00" },
            { "item_code": "EQ-002", "name": "Tripod", "status": "borrowed", "quantity": 0 }
        ]))),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

#[tokio::test]
async fn test_fetch_with_bearer_token() {
    let base_url = serve(Router::new().route("/api/equipment", get(list_equipment))).await;
    let repository = Repository::new(&api(base_url, Some("desk-token"))).unwrap();

    let records = repository.equipment.fetch_equipment_list().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Projector");
    assert!(records[0].is_borrowable());
    assert!(!records[1].is_borrowable());
}

#[tokio::test]
async fn test_rejected_request_surfaces_status() {
    let base_url = serve(Router::new().route("/api/equipment", get(list_equipment))).await;
    let repository = Repository::new(&api(base_url, None)).unwrap();

    let err = repository.equipment.list().await.unwrap_err();
    assert!(matches!(err, AppError::Api { status: 401, .. }));
}

#[tokio::test]
async fn test_wrapped_payload() {
    let app = Router::new().route(
        "/api/equipment",
        get(|| async { Json(json!({ "data": [{ "item_code": "EQ-009", "name": "Microphone" }] })) }),
    );
    let base_url = serve(app).await;
    let repository = Repository::new(&api(base_url, None)).unwrap();

    let lookup = LookupService::new(std::sync::Arc::new(repository.equipment));
    let record = lookup.resolve("EQ-009").await.unwrap();
    assert_eq!(record.name, "Microphone");
    assert_eq!(
        lookup.resolve("EQ-010").await,
        Err(ScanError::LookupNotFound { code: "EQ-010".into() })
    );
}

#[tokio::test]
async fn test_unreachable_api_is_network_error() {
    let repository = Repository::new(&api("http://127.0.0.1:9".into(), None)).unwrap();
    let lookup = LookupService::new(std::sync::Arc::new(repository.equipment));

    assert!(matches!(
        lookup.resolve("EQ-001").await,
        Err(ScanError::LookupNetwork(_))
    ));
}
