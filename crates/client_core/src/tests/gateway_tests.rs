use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use super::*;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    coordinator::CatalogConsole,
    error::ConsoleError,
    form::{EditForm, FieldValue, ProductField},
    session::{MemoryCredentialStore, SessionStore},
};

const VALID_TOKEN: &str = "tok-123";

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: Method,
    path: String,
    authorization: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    listing_rejected: Arc<AtomicBool>,
}

async fn catalog_service(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let path = uri.path().to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let missing_title = body["data"]["title"].as_str().is_some_and(str::is_empty);
    state.requests.lock().await.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization: authorization.clone(),
        body,
    });

    let authorized = authorization.as_deref() == Some(VALID_TOKEN);
    match (method.as_str(), path.as_str()) {
        ("POST", "/v2/admin/signin") => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "signed in",
                "uid": "u-1",
                "token": VALID_TOKEN,
                "expired": 1_893_456_000_000i64
            })),
        ),
        ("POST", "/v2/api/user/check") if authorized => {
            (StatusCode::OK, Json(json!({ "success": true, "uid": "u-1" })))
        }
        ("POST", "/v2/api/user/check") => (
            StatusCode::FORBIDDEN,
            Json(json!({ "success": false, "message": "please sign in again" })),
        ),
        (_, p) if p.starts_with("/v2/api/shop/") && !authorized => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "unauthorized" })),
        ),
        ("GET", "/v2/api/shop/admin/products") if state.listing_rejected.load(Ordering::SeqCst) => (
            StatusCode::OK,
            Json(json!({ "success": false, "message": "token invalid" })),
        ),
        ("GET", "/v2/api/shop/admin/products") => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "products": [
                    { "id": "b", "title": "Second", "origin_price": 20, "price": 10, "is_enabled": 0 },
                    { "id": "a", "title": "First", "origin_price": 200, "price": 150, "is_enabled": 1,
                      "imagesUrl": ["https://img/a1.png"] },
                    { "id": "c", "title": "Third", "origin_price": "30", "price": 25, "is_enabled": 1 }
                ],
                "pagination": { "total_pages": 1, "current_page": 1 }
            })),
        ),
        ("PUT", "/v2/api/shop/admin/product/missing") => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "product not found" })),
        ),
        ("POST", "/v2/api/shop/admin/product") if missing_title => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": ["title is required", "unit is required"] })),
        ),
        ("POST", "/v2/api/shop/admin/product")
        | ("PUT", _)
        | ("DELETE", _) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "done" })),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "no route" })),
        ),
    }
}

async fn spawn_catalog_service() -> anyhow::Result<(GatewayConfig, MockState)> {
    let state = MockState::default();
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .fallback(catalog_service)
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let config = GatewayConfig::new(&format!("http://{addr}"), "shop")?;
    Ok((config, state))
}

async fn authorized_gateway() -> (HttpCatalogGateway, MockState) {
    let (config, state) = spawn_catalog_service().await.expect("spawn server");
    let gateway = HttpCatalogGateway::new(config).expect("gateway");
    gateway.authorize(VALID_TOKEN).await;
    (gateway, state)
}

fn draft_with(title: &str, origin_price: &str, price: &str, enabled: bool) -> ProductDraft {
    let mut form = EditForm::new();
    form.open_create();
    form.edit_field(ProductField::Title, FieldValue::Text(title.into()))
        .expect("title");
    form.edit_field(ProductField::OriginPrice, FieldValue::Text(origin_price.into()))
        .expect("origin price");
    form.edit_field(ProductField::Price, FieldValue::Text(price.into()))
        .expect("price");
    form.edit_field(ProductField::IsEnabled, FieldValue::Checked(enabled))
        .expect("enabled");
    form.draft().cloned().expect("draft")
}

#[tokio::test]
async fn sign_in_returns_token_and_millisecond_expiry() {
    let (config, state) = spawn_catalog_service().await.expect("spawn server");
    let gateway = HttpCatalogGateway::new(config).expect("gateway");

    let grant = gateway
        .sign_in(&Credentials {
            username: "admin@example.test".into(),
            password: "secret".into(),
        })
        .await
        .expect("sign in");

    assert_eq!(grant.token, VALID_TOKEN);
    assert_eq!(grant.expires_at.timestamp_millis(), 1_893_456_000_000);
    let requests = state.requests.lock().await;
    assert_eq!(
        requests[0].body,
        json!({ "username": "admin@example.test", "password": "secret" })
    );
}

#[tokio::test]
async fn session_check_uses_raw_token_header() {
    let (gateway, state) = authorized_gateway().await;
    assert!(gateway.validate_session().await.expect("check"));
    assert_eq!(
        state.requests.lock().await[0].authorization.as_deref(),
        Some(VALID_TOKEN)
    );

    gateway.authorize("stale").await;
    let err = gateway.validate_session().await.expect_err("stale token");
    assert!(err.is_auth(), "unexpected error: {err}");
}

#[tokio::test]
async fn list_preserves_service_order() {
    let (gateway, _state) = authorized_gateway().await;
    let products = gateway.list().await.expect("list");

    let ids: Vec<_> = products
        .iter()
        .map(|p| p.id.as_ref().expect("id").0.as_str())
        .collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
    assert!(!products[0].is_enabled);
    assert_eq!(products[2].origin_price, 30.0);
    assert!(products[0].images_url.is_none());
}

#[tokio::test]
async fn list_without_token_is_an_auth_rejection() {
    let (config, _state) = spawn_catalog_service().await.expect("spawn server");
    let gateway = HttpCatalogGateway::new(config).expect("gateway");

    let err = gateway.list().await.expect_err("unauthorized");
    match err {
        GatewayError::Rejected(rejection) => {
            assert_eq!(rejection.status, 401);
            assert_eq!(rejection.message, "unauthorized");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn create_wraps_coerced_fields_in_data_envelope() {
    let (gateway, state) = authorized_gateway().await;
    gateway
        .create(&draft_with("A", "100", "80", true))
        .await
        .expect("create");

    let requests = state.requests.lock().await;
    let req = requests.last().expect("request");
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "/v2/api/shop/admin/product");
    let data = &req.body["data"];
    assert_eq!(data["title"], json!("A"));
    assert_eq!(data["origin_price"], json!(100));
    assert_eq!(data["price"], json!(80));
    assert_eq!(data["is_enabled"], json!(1));
    assert_eq!(data["imagesUrl"], json!([""]));
    assert!(data.get("id").is_none());
}

#[tokio::test]
async fn create_surfaces_validation_messages() {
    let (gateway, _state) = authorized_gateway().await;
    let err = gateway
        .create(&draft_with("", "", "", false))
        .await
        .expect_err("validation");
    assert!(
        err.to_string()
            .contains("title is required; unit is required"),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn update_puts_to_product_id_and_keeps_unknown_fields() {
    let (gateway, state) = authorized_gateway().await;
    let mut seed = shared::domain::Product {
        id: Some(ProductId::from("X")),
        title: "Tea".into(),
        origin_price: 100.0,
        price: 90.0,
        ..Default::default()
    };
    seed.extra.insert("num".into(), json!(7));
    let mut form = EditForm::new();
    form.open_edit(&seed);
    let draft = form.draft().cloned().expect("draft");

    gateway
        .update(&ProductId::from("X"), &draft)
        .await
        .expect("update");

    let requests = state.requests.lock().await;
    let req = requests.last().expect("request");
    assert_eq!(req.method, Method::PUT);
    assert_eq!(req.path, "/v2/api/shop/admin/product/X");
    assert_eq!(req.body["data"]["price"], json!(90));
    assert_eq!(req.body["data"]["is_enabled"], json!(0));
    assert_eq!(req.body["data"]["num"], json!(7));
}

#[tokio::test]
async fn update_of_missing_product_is_rejected() {
    let (gateway, _state) = authorized_gateway().await;
    let err = gateway
        .update(&ProductId::from("missing"), &draft_with("A", "1", "1", true))
        .await
        .expect_err("missing");
    assert!(matches!(
        err,
        GatewayError::Rejected(ServiceRejection { status: 404, .. })
    ));
}

#[tokio::test]
async fn delete_targets_product_path() {
    let (gateway, state) = authorized_gateway().await;
    gateway
        .delete(&ProductId::from("a"))
        .await
        .expect("delete");

    let requests = state.requests.lock().await;
    let req = requests.last().expect("request");
    assert_eq!(req.method, Method::DELETE);
    assert_eq!(req.path, "/v2/api/shop/admin/product/a");
    assert_eq!(req.authorization.as_deref(), Some(VALID_TOKEN));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let config = GatewayConfig::new(&format!("http://{addr}"), "shop").expect("config");
    let gateway = HttpCatalogGateway::new(config).expect("gateway");
    let err = gateway.list().await.expect_err("refused");
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn list_answered_with_success_false_is_a_rejection() {
    let (gateway, state) = authorized_gateway().await;
    state.listing_rejected.store(true, Ordering::SeqCst);

    let err = gateway.list().await.expect_err("rejected listing");
    match err {
        GatewayError::Rejected(rejection) => assert_eq!(rejection.message, "token invalid"),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_listing_keeps_previous_catalog() {
    let (gateway, state) = authorized_gateway().await;
    let mut console = CatalogConsole::new(
        Arc::new(gateway),
        SessionStore::open(Box::new(MemoryCredentialStore::default())),
    );
    console.refresh().await.expect("first listing");
    assert_eq!(console.catalog().len(), 3);

    state.listing_rejected.store(true, Ordering::SeqCst);
    let err = console.refresh().await.expect_err("second listing rejected");

    assert!(matches!(err, ConsoleError::Fetch(_)));
    assert_eq!(err.user_message(), "Failed to load products");
    assert_eq!(console.catalog().len(), 3);
}
