//! Query endpoint

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

/// Answer for bare greetings
pub const GREETING_ANSWER: &str =
    "Hello! 👋 I'm your Medicare Assistant. Ask me about Medicare eligibility, coverage, costs, and more!";

/// Source label attached to the greeting answer
pub const GREETING_SOURCE: &str = "Healthcare Assistant";

/// POST /api/query - Run one question through the pipeline
pub async fn query_rag(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    if request.is_blank() {
        return Err(Error::InvalidRequest("question must not be empty".to_string()));
    }

    if state.config().server.greeting_shortcut && request.is_greeting() {
        tracing::info!("Greeting shortcut for \"{}\"", request.trimmed());
        return Ok(Json(QueryResponse::shortcut(
            request.question,
            GREETING_ANSWER,
            GREETING_SOURCE,
        )));
    }

    let start = Instant::now();
    let pipeline = state.pipeline();
    let finished = pipeline.run(request.trimmed()).await?;

    let mut response = QueryResponse::from_state(finished, pipeline.top_k());
    response.question = request.question;

    tracing::info!(
        "Query completed in {}ms ({:?}, {} sources)",
        start.elapsed().as_millis(),
        response.outcome,
        response.sources.len()
    );

    Ok(Json(response))
}
