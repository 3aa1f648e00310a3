//! Серверные сессии в Redis.
//!
//! `session:{id}` хранит JSON с данными пользователя и живёт `ttl_seconds`.
//! Идентификатор сессии передаётся браузеру внутри подписанного cookie
//! (см. [`crate::middleware`]), выход из системы удаляет ключ.

pub mod intents;

use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::models::Role;
use crate::redis_client::RedisClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Clone)]
pub struct SessionStore {
    redis: RedisClient,
    ttl_seconds: u64,
}

fn session_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}

fn serde_error(e: serde_json::Error) -> redis::RedisError {
    redis::RedisError::from((redis::ErrorKind::TypeError, "Session payload error", e.to_string()))
}

impl SessionStore {
    pub fn new(redis: RedisClient, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }

    /// Создаёт сессию и возвращает её идентификатор.
    pub async fn create(&self, user: &SessionUser) -> Result<String, redis::RedisError> {
        let session_id = Uuid::new_v4().to_string();
        let data = serde_json::to_string(user).map_err(serde_error)?;
        let mut conn = self.redis.conn.clone();
        let _: () = conn.set_ex(session_key(&session_id), data, self.ttl_seconds).await?;
        info!(user_id = user.user_id, "Session created");
        Ok(session_id)
    }

    pub async fn get(&self, session_id: &str) -> Result<Option<SessionUser>, redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        let data: Option<String> = conn.get(session_key(session_id)).await?;
        data.map(|raw| serde_json::from_str(&raw).map_err(serde_error))
            .transpose()
    }

    /// Удаляет сессию (logout).
    pub async fn destroy(&self, session_id: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        let _: () = conn.del(session_key(session_id)).await?;
        info!("Session destroyed");
        Ok(())
    }
}
