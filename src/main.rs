mod routes;
mod models;
mod groq;
mod deploy;

use axum::{Router, routing::post};
use routes::{generate_site, deploy_site, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use std::sync::Arc;
use tower_http::cors::{CorsLayer, Any};

use crate::groq::GroqClient;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let api_key = std::env::var("GROQ_API_KEY").unwrap_or_else(|_| "DEMO_KEY".into());
    tracing::info!("Using API key: {}...", &api_key[..std::cmp::min(10, api_key.len())]);
    let state = AppState {
        groq: Arc::new(GroqClient::new(api_key)),
    };

    let app = Router::new()
        .route("/api/generate", post(generate_site))
        .route("/api/deploy", post(deploy_site))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state);

    let port: u16 = std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080);
    let addr = SocketAddr::from(([0,0,0,0], port));
    tracing::info!(%addr, "Starting server");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app).await.unwrap();
}
