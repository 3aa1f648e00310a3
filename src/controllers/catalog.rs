use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::{
    error::PageResult,
    middleware::AuthUser,
    services::catalog,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(welcome))
        .route("/home", get(home))
        .route("/hotel/{hotel}", get(hotel))
        .route("/reviews", get(review_list))
}

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    pub search: Option<String>,
}

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({
        "page": "welcome",
        "links": {
            "browse": "/home",
            "signup": "/signup",
            "login": "/login"
        }
    }))
}

// GET /home?search=
async fn home(State(state): State<Arc<AppState>>, Query(params): Query<HomeQuery>) -> PageResult {
    let query = params.search.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let destinations = catalog::browse(&state.db, query).await?;

    Ok(Json(json!({
        "query": query,
        "count": destinations.len(),
        "destinations": destinations
    }))
    .into_response())
}

// GET /hotel/{hotel}
async fn hotel(State(state): State<Arc<AppState>>, Path(hotel): Path<String>) -> PageResult {
    let detail = catalog::hotel_detail(&state.db, &hotel).await?;
    Ok(Json(detail).into_response())
}

// GET /reviews
async fn review_list(State(state): State<Arc<AppState>>, _user: AuthUser) -> PageResult {
    let destinations = catalog::browse(&state.db, None).await?;
    Ok(Json(json!({ "destinations": destinations })).into_response())
}
