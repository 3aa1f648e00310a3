use axum::{
    extract::{Form, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::{
    controllers::path_segment,
    error::{redirect_with, AppError, PageResult},
    middleware::AuthUser,
    models::Permission,
    repository::Store,
    services::booking::{create_booking, BookingForm},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/book/{hotel}", get(booking_page).post(book))
}

#[derive(Debug, Deserialize)]
pub struct RoomQuery {
    pub room: Option<String>,
}

// GET /book/{hotel}?room=
async fn booking_page(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(hotel): Path<String>,
    Query(query): Query<RoomQuery>,
) -> PageResult {
    user.require(Permission::BookStays)?;
    let destination = state
        .db
        .find_destination(&hotel)
        .await?
        .ok_or_else(|| AppError::NotFound("Hotel not found!".to_string()))?;
    let selected = destination.resolve_room(None, query.room.as_deref());

    Ok(Json(json!({
        "hotel": destination,
        "selected_room": selected,
        "action": format!("/book/{}", path_segment(&hotel)),
        "fields": ["name", "nights", "room_type"]
    }))
    .into_response())
}

// POST /book/{hotel}?room=
async fn book(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(hotel): Path<String>,
    Query(query): Query<RoomQuery>,
    Form(form): Form<BookingForm>,
) -> PageResult {
    submit_booking(&state.db, &user, &hotel, query.room.as_deref(), &form).await
}

/// Бронирует и отправляет на оплату; ошибки формы возвращают обратно к форме.
pub(crate) async fn submit_booking<S: Store>(
    store: &S,
    user: &AuthUser,
    hotel: &str,
    preselected_room: Option<&str>,
    form: &BookingForm,
) -> PageResult {
    user.require(Permission::BookStays)?;
    let booking = create_booking(store, user.user_id, hotel, form, preselected_room)
        .await
        .map_err(|e| match e {
            AppError::Validation(_) => e.back_to(format!("/book/{}", path_segment(hotel))),
            other => other.into(),
        })?;

    Ok(redirect_with(&format!("/payment/{}", booking.id), "Booking successful!", "success").into_response())
}
