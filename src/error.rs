//! Ошибки HTTP-слоя.
//!
//! Пользовательские ошибки превращаются в редирект с сообщением
//! (`?msg=...&category=...`), инфраструктурные - в 500 с JSON.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::repository::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Please log in to access this page.")]
    Unauthenticated,
    #[error("{0}")]
    SessionExpired(String),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("session store error: {0}")]
    Session(#[from] redis::RedisError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Куда отправить пользователя, если обработчик не указал свой адрес.
    fn default_target(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "/login",
            AppError::SessionExpired(_) => "/dashboard",
            _ => "/home",
        }
    }

    /// Перенаправить на конкретную страницу (например, обратно к форме).
    pub fn back_to(self, path: impl Into<String>) -> PageError {
        PageError { error: self, back: Some(path.into()) }
    }
}

/// Ошибка обработчика страницы вместе с адресом возврата.
#[derive(Debug)]
pub struct PageError {
    pub error: AppError,
    pub back: Option<String>,
}

impl From<AppError> for PageError {
    fn from(error: AppError) -> Self {
        PageError { error, back: None }
    }
}

impl From<StoreError> for PageError {
    fn from(error: StoreError) -> Self {
        AppError::from(error).into()
    }
}

impl From<redis::RedisError> for PageError {
    fn from(error: redis::RedisError) -> Self {
        AppError::from(error).into()
    }
}

pub type PageResult<T = Response> = Result<T, PageError>;

/// Строит адрес редиректа с сообщением для пользователя.
pub fn flash_url(path: &str, message: &str, category: &str) -> String {
    let query = serde_urlencoded::to_string([("msg", message), ("category", category)])
        .unwrap_or_default();
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, separator, query)
}

pub fn redirect_with(path: &str, message: &str, category: &str) -> Redirect {
    Redirect::to(&flash_url(path, message, category))
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let message = self.error.to_string();
        let category = match &self.error {
            AppError::Unauthenticated | AppError::SessionExpired(_) => "info",
            AppError::Store(_) | AppError::Session(_) | AppError::Internal(_) => {
                tracing::error!(error = %self.error, "Request failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": false, "message": "Internal server error" })),
                )
                    .into_response();
            }
            _ => "danger",
        };
        let target = self
            .back
            .unwrap_or_else(|| self.error.default_target().to_string());
        redirect_with(&target, &message, category).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        PageError::from(self).into_response()
    }
}
