//! Service binary: wires the in-memory store, default compliance gate, and
//! REST router. Kubernetes probes hit `/health`; clients submit orders via
//! `POST /api/orders` and read history under `/api/ledger`.

use bond_matching_engine::api;
use bond_matching_engine::compliance::DefaultComplianceGate;
use bond_matching_engine::store::MemoryStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().compact().init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let state = api::create_app_state(
        Arc::new(MemoryStore::new()),
        Arc::new(DefaultComplianceGate),
    );
    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await.expect("bind");
    info!("listening on http://{}", addr);
    axum::serve(listener, app).await.expect("serve");
}
