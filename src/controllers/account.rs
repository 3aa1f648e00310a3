//! Личный кабинет, профиль и сводка администратора.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;

use crate::{
    error::PageResult,
    middleware::AuthUser,
    models::Permission,
    repository::Store,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/profile", get(profile))
        .route("/admin", get(admin))
}

// GET /dashboard
async fn dashboard(State(state): State<Arc<AppState>>, user: AuthUser) -> PageResult {
    let bookings = state.db.bookings_for_user(user.user_id).await?;
    let reviews = state.db.reviews_for_user(user.user_id).await?;
    let payments = state.db.payments_for_user(user.user_id).await?;

    Ok(Json(json!({
        "user": { "id": user.user_id, "username": user.username, "email": user.email },
        "bookings": bookings,
        "reviews": reviews,
        "payments": payments
    }))
    .into_response())
}

// GET /profile
async fn profile(State(state): State<Arc<AppState>>, user: AuthUser) -> PageResult {
    let bookings = state.db.bookings_for_user(user.user_id).await?;
    let reviews = state.db.reviews_for_user(user.user_id).await?;
    let paid = bookings.iter().filter(|b| b.paid).count();

    Ok(Json(json!({
        "id": user.user_id,
        "username": user.username,
        "email": user.email,
        "role": user.role,
        "permissions": user.role.permissions(),
        "bookings_count": bookings.len(),
        "paid_bookings_count": paid,
        "reviews_count": reviews.len()
    }))
    .into_response())
}

// GET /admin
async fn admin(State(state): State<Arc<AppState>>, user: AuthUser) -> PageResult {
    admin_overview(&state.db, &user).await
}

/// Сводка по всем бронированиям, платежам и отзывам. Только для администратора.
pub(crate) async fn admin_overview<S: Store>(store: &S, user: &AuthUser) -> PageResult {
    user.require(Permission::ViewAllBookings)?;
    user.require(Permission::ViewAllReviews)?;

    let bookings = store.all_bookings().await?;
    let reviews = store.all_reviews().await?;
    let payments = store.all_payments().await?;
    let revenue: f64 = payments.iter().map(|p| p.amount).sum();

    tracing::info!(admin_id = user.user_id, "Admin overview requested");
    Ok(Json(json!({
        "totals": {
            "bookings": bookings.len(),
            "paid_bookings": bookings.iter().filter(|b| b.paid).count(),
            "payments": payments.len(),
            "revenue": revenue,
            "reviews": reviews.len()
        },
        "bookings": bookings,
        "reviews": reviews
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support::{body_json, location, signed_in};
    use crate::models::{destination::sample, Role};
    use crate::repository::memory::MemoryStore;
    use crate::services::booking::{create_booking, BookingForm};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn plain_user_is_sent_home_from_admin() {
        let store = MemoryStore::default();
        let response = admin_overview(&store, &signed_in(1, Role::User))
            .await
            .unwrap_err()
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/home?msg=Access+denied&category=danger");
    }

    #[tokio::test]
    async fn admin_sees_everyone_s_bookings() {
        let store = MemoryStore::with_destinations(vec![sample("Sea View", "Goa", 1000.0, &[])]);
        let form = BookingForm { name: "Asha".into(), nights: Some("2".into()), room_type: None };
        create_booking(&store, 1, "Sea View", &form, None).await.unwrap();
        create_booking(&store, 2, "Sea View", &form, None).await.unwrap();

        let response = admin_overview(&store, &signed_in(9, Role::Admin)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["totals"]["bookings"], 2);
        assert_eq!(body["totals"]["paid_bookings"], 0);
        assert_eq!(body["totals"]["revenue"], 0.0);
    }
}
