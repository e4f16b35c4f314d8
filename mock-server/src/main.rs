use mock_server::Store;
use serde_json::json;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Account and data available when the mock server is run by hand.
fn demo_store() -> Store {
    let user = "demo@raseed.app";
    Store::default()
        .with_user("Demo", user, "demo123")
        .with_warranty_product(
            user,
            json!({"name": "TV", "brand": "Sony", "expiry_date": "2026-01-01", "days_until_expiry": 12}),
        )
        .with_warranty_product(
            user,
            json!({"name": "Air Fryer", "brand": "Philips", "expiry_date": "2027-03-15", "days_until_expiry": 450}),
        )
        .with_wallet_item(
            user,
            json!({"id": "rcpt-1", "item_type": "receipt", "title": "Reliance Digital", "subtitle": "₹54,990"}),
        )
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "mock backend listening");
    mock_server::run_with(listener, demo_store()).await
}
