pub mod config;
pub mod database;
pub mod redis_client;
pub mod models;
pub mod repository;
pub mod sessions;
pub mod error;
pub mod middleware;
pub mod services;
pub mod controllers;

use std::sync::Arc;

use services::chat::ChatClient;
use sessions::{intents::RedisIntentStore, SessionStore};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub sessions: SessionStore,
    pub intents: RedisIntentStore,
    pub chat: ChatClient,
    pub config: config::Config,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
        tracing::info!("Database connected");

        db.run_migrations().await?;

        let redis = redis_client::RedisClient::new(&config.redis.url).await?;
        tracing::info!("Redis connected");

        let sessions = SessionStore::new(redis.clone(), config.session.ttl_seconds());
        let intents = RedisIntentStore::new(redis.clone(), config.payment.intent_ttl_seconds);
        let chat = ChatClient::new(config.chat.clone(), &config.circuit_breaker);
        if config.chat.api_key.is_empty() {
            tracing::warn!("CHAT_API_KEY is not set - chatbot will answer with the fallback reply");
        }

        Ok(Arc::new(Self {
            db,
            sessions,
            intents,
            chat,
            config,
        }))
    }
}
