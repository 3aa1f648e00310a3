use redis::AsyncCommands;
use std::future::Future;

use crate::models::PaymentIntent;
use crate::redis_client::RedisClient;

/// Короткоживущее хранилище намерений оплаты, ключ - идентификатор сессии.
/// Истёкшее намерение неотличимо от отсутствующего.
pub trait IntentStore: Send + Sync {
    /// Сохраняет намерение, заменяя предыдущее для этой сессии.
    fn put(&self, session_id: &str, intent: &PaymentIntent) -> impl Future<Output = Result<(), redis::RedisError>> + Send;
    fn get(&self, session_id: &str) -> impl Future<Output = Result<Option<PaymentIntent>, redis::RedisError>> + Send;
    fn remove(&self, session_id: &str) -> impl Future<Output = Result<(), redis::RedisError>> + Send;
}

#[derive(Clone)]
pub struct RedisIntentStore {
    redis: RedisClient,
    ttl_seconds: u64,
}

impl RedisIntentStore {
    pub fn new(redis: RedisClient, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }
}

fn intent_key(session_id: &str) -> String {
    format!("payment_intent:{}", session_id)
}

impl IntentStore for RedisIntentStore {
    async fn put(&self, session_id: &str, intent: &PaymentIntent) -> Result<(), redis::RedisError> {
        let data = serde_json::to_string(intent).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialize error", e.to_string()))
        })?;
        let mut conn = self.redis.conn.clone();
        conn.set_ex(intent_key(session_id), data, self.ttl_seconds).await
    }

    async fn get(&self, session_id: &str) -> Result<Option<PaymentIntent>, redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        let data: Option<String> = conn.get(intent_key(session_id)).await?;
        // Битое значение считаем отсутствующим намерением
        Ok(data.and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    async fn remove(&self, session_id: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        conn.del(intent_key(session_id)).await
    }
}
