use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::error::AppError;
use crate::models::{NewUser, Role, User};
use crate::repository::{Store, StoreError};

#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Регистрирует пользователя с ролью `user`. Хеширование bcrypt - в blocking-пуле.
pub async fn register<S: Store>(store: &S, form: &SignupForm, bcrypt_cost: u32) -> Result<User, AppError> {
    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = normalize_email(&form.email);
    if store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Validation("Email already exists!".to_string()));
    }

    let password = form.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt_cost))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("bcrypt: {e}")))?;

    let user = store
        .insert_user(NewUser {
            username: form.username.trim().to_string(),
            email,
            password_hash,
            role: Role::User,
        })
        .await
        .map_err(|e| match e {
            // Гонка двух регистраций с одним email
            StoreError::DuplicateEmail => AppError::Validation("Email already exists!".to_string()),
            other => AppError::Store(other),
        })?;

    info!(user_id = user.id, "User registered");
    Ok(user)
}

/// Проверяет email и пароль. Любая неудача - одно и то же сообщение.
pub async fn authenticate<S: Store>(store: &S, form: &LoginForm) -> Result<User, AppError> {
    let email = normalize_email(&form.email);
    let Some(user) = store.find_user_by_email(&email).await? else {
        return Err(AppError::Validation(INVALID_CREDENTIALS.to_string()));
    };

    let password = form.password.clone();
    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verify task failed: {e}")))?
        .unwrap_or_else(|e| {
            warn!(user_id = user.id, "Stored password hash is unreadable: {}", e);
            false
        });

    if !valid {
        return Err(AppError::Validation(INVALID_CREDENTIALS.to_string()));
    }
    Ok(user)
}
