//! API routes for the query server

pub mod query;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::query_rag))
        .route("/categories", get(categories))
        .route("/info", get(info))
}

/// GET /api/categories - Distinct category labels in the index
pub async fn categories(State(state): State<AppState>) -> Json<Value> {
    let categories = state.pipeline().index().categories();
    Json(json!({
        "count": categories.len(),
        "categories": categories,
    }))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<Value> {
    let config = state.config();
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Grounded question answering over a fixed FAQ knowledge base",
        "index": {
            "chunks": state.pipeline().index().len(),
            "dimensions": state.pipeline().index().dimensions(),
        },
        "retrieval": { "top_k": config.retrieval.top_k },
        "endpoints": {
            "POST /api/query": "Ask a question",
            "GET /api/categories": "List knowledge base categories",
            "POST /query": "Alias of POST /api/query",
            "GET /categories": "Alias of GET /api/categories",
            "GET /api/info": "This document",
            "GET /health": "Liveness",
            "GET /ready": "Readiness"
        }
    }))
}
