use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    config::SessionConfig,
    error::AppError,
    models::{Permission, Role},
};

pub const SESSION_COOKIE: &str = "session";

/// Пользователь текущего запроса и его сессия.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub session_id: String,
}

impl AuthUser {
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.role.can(permission) {
            Ok(())
        } else {
            tracing::warn!(user_id = self.user_id, ?permission, "Permission denied");
            Err(AppError::Forbidden("Access denied".to_string()))
        }
    }
}

// Содержимое подписанного cookie
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: i64,
    sid: String,
    exp: i64,
}

/// Подписывает идентификатор сессии в JWT для cookie.
pub fn issue_session_token(config: &SessionConfig, user_id: i64, session_id: &str) -> Result<String, AppError> {
    let claims = SessionClaims {
        sub: user_id,
        sid: session_id.to_string(),
        exp: Utc::now().timestamp() + config.ttl_seconds() as i64,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("session token: {e}")))
}

fn read_session_token(config: &SessionConfig, token: &str) -> Option<SessionClaims> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .ok()
}

pub fn session_cookie(config: &SessionConfig, token: &str) -> String {
    let secure = if config.cookie_secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        config.ttl_seconds(),
        secure
    )
}

pub fn expired_session_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

fn cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

// Cookie-сессия: подпись JWT, затем проверка, что сессия жива в Redis
impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_value(parts, SESSION_COOKIE).ok_or(AppError::Unauthenticated)?;
        let claims = read_session_token(&state.config.session, token).ok_or(AppError::Unauthenticated)?;

        let user = state
            .sessions
            .get(&claims.sid)
            .await?
            .filter(|user| user.user_id == claims.sub)
            .ok_or(AppError::Unauthenticated)?;

        Ok(AuthUser {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            role: user.role,
            session_id: claims.sid,
        })
    }
}
