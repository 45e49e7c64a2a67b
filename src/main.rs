use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wavelink_signal::{coordinator::Coordinator, server};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let coordinator = Arc::new(Coordinator::new());
    let app = server::router(coordinator);

    let addr = std::env::var("SIGNAL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    tracing::info!(%addr, "signaling node listening");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
