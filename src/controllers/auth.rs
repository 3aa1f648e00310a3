use axum::{
    extract::{Form, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::{
    error::{redirect_with, PageResult},
    middleware::{expired_session_cookie, issue_session_token, session_cookie, AuthUser},
    services::accounts::{self, LoginForm, SignupForm},
    sessions::{intents::IntentStore, SessionUser},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", get(signup_page).post(signup))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

async fn signup_page() -> Json<serde_json::Value> {
    Json(json!({
        "page": "signup",
        "action": "/signup",
        "fields": ["username", "email", "password"]
    }))
}

async fn login_page() -> Json<serde_json::Value> {
    Json(json!({
        "page": "login",
        "action": "/login",
        "fields": ["email", "password"]
    }))
}

// POST /signup
async fn signup(State(state): State<Arc<AppState>>, Form(form): Form<SignupForm>) -> PageResult {
    accounts::register(&state.db, &form, state.config.session.bcrypt_cost)
        .await
        .map_err(|e| e.back_to("/signup"))?;
    Ok(redirect_with("/login", "Account created successfully! Please log in.", "success").into_response())
}

// POST /login
async fn login(State(state): State<Arc<AppState>>, Form(form): Form<LoginForm>) -> PageResult {
    let user = accounts::authenticate(&state.db, &form)
        .await
        .map_err(|e| e.back_to("/login"))?;

    let session_id = state
        .sessions
        .create(&SessionUser {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role(),
        })
        .await?;
    let token = issue_session_token(&state.config.session, user.id, &session_id)?;

    info!(user_id = user.id, "User logged in");
    Ok((
        [(header::SET_COOKIE, session_cookie(&state.config.session, &token))],
        redirect_with("/home", "Login successful!", "success"),
    )
        .into_response())
}

// GET /logout
async fn logout(State(state): State<Arc<AppState>>, user: AuthUser) -> PageResult {
    let response = sign_out(&state.intents, &user).await?;
    state.sessions.destroy(&user.session_id).await?;
    info!(user_id = user.user_id, "User logged out");
    Ok(response)
}

/// Сбрасывает незавершённую оплату сессии и гасит cookie.
pub(crate) async fn sign_out<I: IntentStore>(intents: &I, user: &AuthUser) -> PageResult {
    intents.remove(&user.session_id).await?;
    Ok((
        [(header::SET_COOKIE, expired_session_cookie())],
        redirect_with("/login", "Logged out successfully.", "info"),
    )
        .into_response())
}
