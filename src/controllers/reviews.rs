use axum::{
    extract::{Form, Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::{
    controllers::path_segment,
    error::{redirect_with, AppError, PageResult},
    middleware::AuthUser,
    models::Permission,
    services::{
        catalog,
        reviews::{submit_review, ReviewForm},
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/review/{hotel}", get(review_page).post(add_review))
}

// GET /review/{hotel}
async fn review_page(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(hotel): Path<String>,
) -> PageResult {
    let detail = catalog::hotel_detail(&state.db, &hotel).await?;
    Ok(Json(detail).into_response())
}

// POST /review/{hotel}
async fn add_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(hotel): Path<String>,
    Form(form): Form<ReviewForm>,
) -> PageResult {
    user.require(Permission::WriteReviews)?;
    let back = format!("/review/{}", path_segment(&hotel));
    submit_review(&state.db, user.user_id, &user.username, &hotel, &form)
        .await
        .map_err(|e| match e {
            AppError::Validation(_) => e.back_to(back.clone()),
            other => other.into(),
        })?;

    Ok(redirect_with(&back, "Review added successfully!", "success").into_response())
}
