//! REST API integration tests. Spawn the server and call endpoints with reqwest.

use bond_matching_engine::api;
use bond_matching_engine::{DefaultComplianceGate, MemoryStore, RecordingComplianceGate};
use std::net::SocketAddr;
use std::sync::Arc;

async fn spawn_app() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let state = api::create_app_state(
        Arc::new(MemoryStore::new()),
        Arc::new(DefaultComplianceGate),
    );
    spawn_with_state(state).await
}

async fn spawn_denying_app() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let state = api::create_app_state(
        Arc::new(MemoryStore::new()),
        Arc::new(RecordingComplianceGate::denying()),
    );
    spawn_with_state(state).await
}

async fn spawn_with_state(state: api::AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    (addr, handle)
}

fn order_body(instrument: &str, side: &str, price: &str, qty: &str, user: &str) -> serde_json::Value {
    serde_json::json!({
        "instrument": instrument,
        "side": side,
        "price": price,
        "quantity": qty,
        "userId": user
    })
}

#[tokio::test]
async fn health_returns_ok() {
    let (addr, _handle) = spawn_app().await;
    let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn submit_passive_order_returns_empty_trade_list() {
    let (addr, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/api/orders", addr))
        .json(&order_body("GOVT10Y", "BUY", "98.50", "1000", "U1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let trades: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(trades.is_empty());
}

#[tokio::test]
async fn crossing_orders_return_executed_trades() {
    let (addr, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/api/orders", addr);

    client
        .post(&url)
        .json(&order_body("GOVT10Y", "SELL", "98.50", "1000", "U2"))
        .send()
        .await
        .unwrap();
    let response = client
        .post(&url)
        .json(&order_body("GOVT10Y", "BUY", "98.60", "1000", "U1"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let trades: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0]["price"], "98.50");
    assert_eq!(trades[0]["quantity"], "1000");
    assert!(trades[0].get("buyerOrderId").is_some());
    assert!(trades[0].get("sellerOrderId").is_some());
}

#[tokio::test]
async fn non_positive_price_is_rejected_with_400() {
    let (addr, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/api/orders", addr))
        .json(&order_body("GOVT10Y", "BUY", "0", "1000", "U1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("price"));
}

#[tokio::test]
async fn compliance_rejection_maps_to_422() {
    let (addr, _handle) = spawn_denying_app().await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/api/orders", addr))
        .json(&order_body("GOVT10Y", "BUY", "98.50", "1000", "U1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn ledger_endpoints_return_recorded_trades() {
    let (addr, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let orders_url = format!("http://{}/api/orders", addr);

    client
        .post(&orders_url)
        .json(&order_body("GOVT10Y", "SELL", "98.50", "1000", "U2"))
        .send()
        .await
        .unwrap();
    client
        .post(&orders_url)
        .json(&order_body("GOVT10Y", "BUY", "98.60", "1000", "U1"))
        .send()
        .await
        .unwrap();

    for path in [
        "/api/ledger".to_string(),
        "/api/ledger?userId=U1".to_string(),
        "/api/ledger/user/U2".to_string(),
        "/api/ledger/instrument/GOVT10Y".to_string(),
        "/api/ledger/today".to_string(),
    ] {
        let response = client
            .get(format!("http://{}{}", addr, path))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "{path}");
        let trades: Vec<serde_json::Value> = response.json().await.unwrap();
        assert_eq!(trades.len(), 1, "{path}");
    }
}

#[tokio::test]
async fn ledger_amount_filters_are_applied() {
    let (addr, _handle) = spawn_app().await;
    let client = reqwest::Client::new();
    let orders_url = format!("http://{}/api/orders", addr);

    client
        .post(&orders_url)
        .json(&order_body("GOVT10Y", "SELL", "98.50", "1000", "U2"))
        .send()
        .await
        .unwrap();
    client
        .post(&orders_url)
        .json(&order_body("GOVT10Y", "BUY", "98.60", "1000", "U1"))
        .send()
        .await
        .unwrap();

    // 98.50 × 1000 = 98500: outside [1, 50000].
    let response = client
        .get(format!(
            "http://{}/api/ledger?minAmount=1&maxAmount=50000",
            addr
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let trades: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(trades.is_empty());

    let response = client
        .get(format!("http://{}/api/ledger?minAmount=90000", addr))
        .send()
        .await
        .unwrap();
    let trades: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(trades.len(), 1);
}

#[tokio::test]
async fn unknown_user_ledger_is_empty() {
    let (addr, _handle) = spawn_app().await;
    let response = reqwest::get(format!("http://{}/api/ledger/user/NOBODY", addr))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let trades: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(trades.is_empty());
}
