//! HTTP server for the query API

pub mod routes;
pub mod state;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::{Error, Result};
use state::AppState;

/// Query API server
pub struct RagServer {
    state: AppState,
}

impl RagServer {
    /// Create a server around prepared state
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::config(format!("Invalid address: {}", e)))?;

        let router = self.router();

        tracing::info!("Starting query server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::config(format!("Failed to bind: {}", e)))?;
        self.state.set_ready(true);

        let served = axum::serve(listener, router)
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)));
        self.state.set_ready(false);
        served
    }

    /// Get the server address
    pub fn address(&self) -> String {
        let server = &self.state.config().server;
        format!("{}:{}", server.host, server.port)
    }
}

/// Router for `state`, with tracing and (optionally) permissive CORS
pub fn build_router(state: AppState) -> Router {
    let enable_cors = state.config().server.enable_cors;

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .route("/query", post(routes::query::query_rag))
        .route("/categories", get(routes::categories))
        .nest("/api", routes::api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}

/// Banner endpoint
async fn root() -> Json<Value> {
    Json(json!({
        "message": "Healthcare RAG API is running!",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Readiness check endpoint
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
