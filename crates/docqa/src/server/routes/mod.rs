//! API routes for the question-answering server

pub mod ask;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;
use crate::types::{MediaType, Strategy};

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/ask",
            post(ask::ask_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    Json(serde_json::json!({
        "name": "docqa",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Ask questions about one uploaded document",
        "endpoints": {
            "GET /": "Question-answering page",
            "POST /api/ask": "Upload a file with api_key, question, k and strategy; returns the answer",
            "GET /api/info": "This description",
            "GET /health": "Liveness check"
        },
        "media_types": MediaType::ALL.iter().map(|m| m.mime()).collect::<Vec<_>>(),
        "strategies": Strategy::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        "k": {
            "min": config.retrieval.min_k,
            "max": config.retrieval.max_k,
            "default": config.retrieval.default_k
        },
        "chunking": {
            "chunk_size": config.chunking.chunk_size,
            "chunk_overlap": config.chunking.chunk_overlap
        },
        "models": {
            "chat": config.openai.chat_model,
            "embeddings": config.embeddings.model
        },
        "max_upload_size": config.server.max_upload_size,
        "busy": state.is_busy()
    }))
}
