//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{Money, ProductId, UserId};
use ledger::{InMemoryAccountLedger, InMemoryInventoryLedger, Product, User};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::InMemoryOrderStore;
use tower::ServiceExt;
use workflow::OrderWorkflow;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestEnv {
    app: axum::Router,
    store: InMemoryOrderStore,
    accounts: InMemoryAccountLedger,
    inventory: InMemoryInventoryLedger,
}

fn setup() -> TestEnv {
    let store = InMemoryOrderStore::new();
    let accounts = InMemoryAccountLedger::new();
    let inventory = InMemoryInventoryLedger::new();

    let workflow = OrderWorkflow::new(store.clone(), accounts.clone(), inventory.clone());
    let state = api::AppState::new(workflow);
    let app = api::create_app(state, get_metrics_handle());

    TestEnv {
        app,
        store,
        accounts,
        inventory,
    }
}

fn seed(env: &TestEnv) {
    env.accounts.put_user(User {
        id: UserId::new(1),
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        cash_balance: Money::from_cents(10000),
    });
    env.inventory.put_product(Product {
        id: ProductId::new(1),
        name: "Widget".to_string(),
        description: String::new(),
        price: Money::from_cents(3000),
        stock: 5,
        category: String::new(),
        image_url: String::new(),
    });
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let env = setup();

    let response = env
        .app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "orders");
}

#[tokio::test]
async fn test_create_order() {
    let env = setup();
    seed(&env);

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orders",
            serde_json::json!({"user_id": 1, "product_id": 1, "quantity": 2}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = response_json(response).await;
    assert_eq!(json["status"], "completed");
    assert_eq!(json["quantity"], 2);
    assert_eq!(json["total_price"], 60.0);
    assert!(json["id"].as_i64().is_some());

    // Side effects reached the ledgers.
    assert_eq!(
        env.accounts.balance_of(UserId::new(1)),
        Some(Money::from_cents(4000))
    );
    assert_eq!(env.inventory.stock_of(ProductId::new(1)), Some(3));
}

#[tokio::test]
async fn test_create_order_insufficient_stock_is_bad_request() {
    let env = setup();
    seed(&env);

    let response = env
        .app
        .oneshot(json_request(
            "POST",
            "/api/orders",
            serde_json::json!({"user_id": 1, "product_id": 1, "quantity": 9}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Insufficient stock"));
}

#[tokio::test]
async fn test_create_order_unknown_user_is_not_found() {
    let env = setup();
    seed(&env);

    let response = env
        .app
        .oneshot(json_request(
            "POST",
            "/api/orders",
            serde_json::json!({"user_id": 42, "product_id": 1, "quantity": 1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_order_dependency_failure_is_internal_error() {
    let env = setup();
    seed(&env);
    env.inventory.set_fail_on_write(true);

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orders",
            serde_json::json!({"user_id": 1, "product_id": 1, "quantity": 1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    // The rollback ran: no order remains visible.
    assert_eq!(env.store.order_count().await, 0);
}

#[tokio::test]
async fn test_get_order_round_trip() {
    let env = setup();
    seed(&env);

    let created = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orders",
            serde_json::json!({"user_id": 1, "product_id": 1, "quantity": 1}),
        ))
        .await
        .unwrap();
    let created_json = response_json(created).await;
    let id = created_json["id"].as_i64().unwrap();

    let response = env
        .app
        .oneshot(
            Request::builder()
                .uri(format!("/api/orders/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["id"], id);
    assert_eq!(json["total_price"], 30.0);
}

#[tokio::test]
async fn test_get_missing_order_is_not_found() {
    let env = setup();

    let response = env
        .app
        .oneshot(
            Request::builder()
                .uri("/api/orders/999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_orders_newest_first() {
    let env = setup();
    seed(&env);

    for _ in 0..2 {
        env.app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/orders",
                serde_json::json!({"user_id": 1, "product_id": 1, "quantity": 1}),
            ))
            .await
            .unwrap();
    }

    let response = env
        .app
        .oneshot(
            Request::builder()
                .uri("/api/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    let orders = json.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders[0]["id"].as_i64().unwrap() > orders[1]["id"].as_i64().unwrap());
}

#[tokio::test]
async fn test_cancel_order_twice_reports_already_cancelled() {
    let env = setup();
    seed(&env);

    let created = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/orders",
            serde_json::json!({"user_id": 1, "product_id": 1, "quantity": 2}),
        ))
        .await
        .unwrap();
    let id = response_json(created).await["id"].as_i64().unwrap();

    let first = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/orders/{id}/cancel"),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first_json = response_json(first).await;
    assert_eq!(first_json["already_cancelled"], false);
    assert_eq!(first_json["order"]["status"], "cancelled");

    let second = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/orders/{id}/cancel"),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second_json = response_json(second).await;
    assert_eq!(second_json["already_cancelled"], true);

    // Refund applied exactly once.
    assert_eq!(
        env.accounts.balance_of(UserId::new(1)),
        Some(Money::from_cents(10000))
    );
    assert_eq!(env.inventory.stock_of(ProductId::new(1)), Some(5));
}

#[tokio::test]
async fn test_cancel_missing_order_is_not_found() {
    let env = setup();

    let response = env
        .app
        .oneshot(json_request(
            "POST",
            "/api/orders/404/cancel",
            serde_json::json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_reports_line_outcomes() {
    let env = setup();
    seed(&env);
    env.inventory.put_product(Product {
        id: ProductId::new(2),
        name: "Gadget".to_string(),
        description: String::new(),
        price: Money::from_cents(2000),
        stock: 0,
        category: String::new(),
        image_url: String::new(),
    });

    let response = env
        .app
        .oneshot(json_request(
            "POST",
            "/api/checkout",
            serde_json::json!({"user_id": 1, "cart": {"1": 2, "2": 1}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["successful"].as_array().unwrap().len(), 1);
    assert_eq!(json["failed"].as_array().unwrap().len(), 1);
    assert_eq!(json["successful"][0]["line_total"], 60.0);
}

#[tokio::test]
async fn test_checkout_aggregate_rejection() {
    let env = setup();
    seed(&env);

    // 4 * $30 = $120 exceeds the $100 balance.
    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/checkout",
            serde_json::json!({"user_id": 1, "cart": {"1": 4}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(env.store.order_count().await, 0);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let env = setup();

    let response = env
        .app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
