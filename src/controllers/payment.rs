use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::{
    config::PaymentConfig,
    controllers::path_segment,
    error::{AppError, PageResult},
    middleware::AuthUser,
    repository::Store,
    services::{payment::PaymentService, receipt::fetch_receipt},
    sessions::intents::IntentStore,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payment/process", post(process_payment))
        .route("/payment/receipt/{txn_id}", get(download_receipt))
        .route("/payment/{booking_id}", get(initiate_payment))
}

// GET /payment/{booking_id}
async fn initiate_payment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
) -> PageResult {
    start_payment(&state.db, &state.intents, &state.config.payment, &user, &booking_id).await
}

// POST /payment/process
async fn process_payment(State(state): State<Arc<AppState>>, user: AuthUser) -> PageResult {
    finish_payment(&state.db, &state.intents, &state.config.payment, &user).await
}

// GET /payment/receipt/{txn_id}
async fn download_receipt(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(txn_id): Path<String>,
) -> PageResult {
    receipt_download(&state.db, &user, &txn_id).await
}

pub(crate) async fn start_payment<S: Store, I: IntentStore>(
    store: &S,
    intents: &I,
    config: &PaymentConfig,
    user: &AuthUser,
    booking_id: &str,
) -> PageResult {
    // Нечисловой id ведёт себя как несуществующее бронирование
    let booking_id: i64 = booking_id
        .parse()
        .map_err(|_| AppError::NotFound("Booking not found!".to_string()).back_to("/dashboard"))?;

    let intent = PaymentService::new(store, intents, config)
        .initiate(user.user_id, &user.session_id, booking_id)
        .await
        .map_err(|e| e.back_to("/dashboard"))?;

    Ok(Json(json!({
        "success": true,
        "intent": intent,
        "expires_in": config.intent_ttl_seconds,
        "confirm_url": "/payment/process"
    }))
    .into_response())
}

pub(crate) async fn finish_payment<S: Store, I: IntentStore>(
    store: &S,
    intents: &I,
    config: &PaymentConfig,
    user: &AuthUser,
) -> PageResult {
    let payment = PaymentService::new(store, intents, config)
        .confirm(user.user_id, &user.session_id)
        .await
        .map_err(|e| e.back_to("/dashboard"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Payment successful!",
        "payment": payment,
        "receipt_url": format!("/payment/receipt/{}", path_segment(&payment.txn_id))
    }))
    .into_response())
}

/// PDF-квитанция как вложение; чужой transaction id - редирект с "not found".
pub(crate) async fn receipt_download<S: Store>(store: &S, user: &AuthUser, txn_id: &str) -> PageResult {
    let receipt = fetch_receipt(store, user.user_id, &user.username, txn_id)
        .await
        .map_err(|e| e.back_to("/dashboard"))?;

    let disposition = format!("attachment; filename=\"{}\"", receipt.filename());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        receipt.render_pdf(),
    )
        .into_response())
}
