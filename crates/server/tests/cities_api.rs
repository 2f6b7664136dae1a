//! Router-level tests for the `/cities` resource, driven through
//! `tower::ServiceExt::oneshot` against an in-memory repository.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use configs::UniquenessMode;
use server::routes;
use server::state::ServerState;
use service::city::{CityService, InMemoryCityRepository};

fn app_with(repo: Arc<InMemoryCityRepository>, mode: UniquenessMode) -> Router {
    let svc = CityService::new(repo).with_uniqueness(mode);
    routes::build_router(ServerState::new(svc), CorsLayer::very_permissive())
}

fn app() -> (Router, Arc<InMemoryCityRepository>) {
    let repo = InMemoryCityRepository::new();
    (app_with(repo.clone(), UniquenessMode::EffectivePair), repo)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

async fn create(router: &Router, name: &str, country: &str) -> Value {
    let (status, body) = send(router, Method::POST, "/cities", Some(json!({"name": name, "country": country}))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn list_starts_empty() {
    let (router, _) = app();
    let (status, body) = send(&router, Method::GET, "/cities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn create_returns_201_with_record() {
    let (router, _) = app();
    let body = create(&router, "Paris", "France").await;
    let obj = body.as_object().unwrap();
    let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["country", "created_at", "id", "name", "updated_at"]);
    assert_eq!(body["name"], "Paris");
    assert_eq!(body["created_at"], body["updated_at"]);

    let id = body["id"].as_str().unwrap();
    let (status, shown) = send(&router, Method::GET, &format!("/cities/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown, body);
}

#[tokio::test]
async fn create_validation_errors_are_field_keyed() {
    let (router, repo) = app();
    let (status, body) = send(&router, Method::POST, "/cities", Some(json!({"name": "P", "country": 12}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"], json!(["The name field must be at least 2 characters."]));
    assert_eq!(body["errors"]["country"], json!(["The country field must be a string."]));
    assert_eq!(body["message"], "The name field must be at least 2 characters. (and 1 more error)");

    let (status, body) = send(&router, Method::POST, "/cities", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"], json!(["The name field is required."]));
    assert_eq!(repo.save_count(), 0);
}

#[tokio::test]
async fn duplicate_create_is_422_on_name() {
    let (router, _) = app();
    create(&router, "Paris", "France").await;
    let (status, body) = send(&router, Method::POST, "/cities", Some(json!({"name": "paris", "country": "FRANCE"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"], json!(["This city already exists in this country."]));
    assert!(body["errors"].get("country").is_none());
}

#[tokio::test]
async fn unknown_or_malformed_ids_are_404() {
    let (router, _) = app();
    let missing = uuid::Uuid::new_v4();
    for uri in [format!("/cities/{missing}"), "/cities/not-a-uuid".to_string()] {
        let (status, body) = send(&router, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "City not found"}));

        let (status, body) = send(&router, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "City not found"}));

        let (status, body) = send(&router, Method::PUT, &uri, Some(json!({"name": "Nice"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "City not found"}));
    }
}

#[tokio::test]
async fn put_and_patch_update_partially() {
    let (router, _) = app();
    let city = create(&router, "Paris", "France").await;
    let uri = format!("/cities/{}", city["id"].as_str().unwrap());

    let (status, body) = send(&router, Method::PATCH, &uri, Some(json!({"country": "Germany"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Paris");
    assert_eq!(body["country"], "Germany");
    assert_eq!(body["created_at"], city["created_at"]);
    assert_eq!(body["id"], city["id"]);

    let (status, body) = send(&router, Method::PUT, &uri, Some(json!({"name": "Berlin", "country": "Germany"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Berlin");

    let (status, body) = send(&router, Method::PUT, &uri, Some(json!({"name": null}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"], json!(["The name field is required."]));
}

#[tokio::test]
async fn update_into_existing_pair_is_422() {
    let (router, _) = app();
    create(&router, "Paris", "France").await;
    let lyon = create(&router, "Lyon", "France").await;
    let uri = format!("/cities/{}", lyon["id"].as_str().unwrap());

    let (status, body) = send(&router, Method::PUT, &uri, Some(json!({"name": "PARIS", "country": "france"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"], json!(["This city already exists in this country."]));

    // single field, default mode: still checked against the stored country
    let (status, _) = send(&router, Method::PATCH, &uri, Some(json!({"name": "paris"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn single_field_update_unchecked_in_both_fields_mode() {
    let router = app_with(InMemoryCityRepository::new(), UniquenessMode::BothFieldsSupplied);
    create(&router, "Paris", "France").await;
    let lyon = create(&router, "Lyon", "France").await;
    let uri = format!("/cities/{}", lyon["id"].as_str().unwrap());

    let (status, body) = send(&router, Method::PATCH, &uri, Some(json!({"name": "Paris"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Paris");
}

#[tokio::test]
async fn delete_returns_204_then_404() {
    let (router, _) = app();
    let city = create(&router, "Rome", "Italy").await;
    let uri = format!("/cities/{}", city["id"].as_str().unwrap());

    let (status, body) = send(&router, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&router, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = send(&router, Method::GET, "/cities", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn storage_failure_is_500_without_details() {
    let (router, repo) = app();
    repo.set_failing(true);
    let (status, body) = send(&router, Method::GET, "/cities", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Server Error"}));

    let (status, _) = send(&router, Method::POST, "/cities", Some(json!({"name": "Rome", "country": "Italy"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_and_openapi() {
    let (router, _) = app();
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, doc) = send(&router, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/cities/{id}").is_some());
}
