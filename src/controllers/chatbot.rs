use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::{middleware::AuthUser, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chatbot", get(chatbot_page))
        .route("/chatbot_api", post(chatbot_api))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

// GET /chatbot
async fn chatbot_page(user: AuthUser) -> Json<serde_json::Value> {
    Json(json!({
        "page": "chatbot",
        "greeting": format!("Hi {}! Ask me anything about your next trip.", user.username),
        "endpoint": "/chatbot_api"
    }))
}

// POST /chatbot_api
// Ошибки внешнего сервиса сюда не доходят: клиент сам подставляет ответ-заглушку
async fn chatbot_api(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let reply = state.chat.reply(&req.message).await;
    Json(ChatResponse { reply })
}
