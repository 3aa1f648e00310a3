use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub session: SessionConfig,
    pub payment: PaymentConfig,
    pub chat: ChatConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Настройки Redis (сессии и платёжные намерения)
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

// Настройки сессий: подпись cookie и время жизни
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_hours: i64,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
}

impl SessionConfig {
    pub fn ttl_seconds(&self) -> u64 {
        (self.ttl_hours.max(1) as u64) * 3600
    }
}

// Настройки оплаты
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub intent_ttl_seconds: u64,
    pub order_prefix: String,
    pub txn_prefix: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            intent_ttl_seconds: 900,
            order_prefix: "ORD".to_string(),
            txn_prefix: "TXN".to_string(),
        }
    }
}

// Настройки внешнего сервиса генерации ответов для чат-бота
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn or_default(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = or_default(name, default);
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

// Ноль для TTL в Redis недопустим: SET EX 0 отклоняется
fn positive(name: &'static str, default: &str) -> Result<u64, ConfigError> {
    let value: u64 = parsed(name, default)?;
    if value == 0 {
        return Err(ConfigError::Invalid { name, value: value.to_string() });
    }
    Ok(value)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            app: AppConfig {
                host: or_default("HOST", "0.0.0.0"),
                port: parsed("PORT", "8000")?,
                environment: or_default("ENVIRONMENT", "development"),
                rust_log: or_default("RUST_LOG", "travel_booking=debug,tower_http=debug"),
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                pool_size: parsed("DB_POOL_SIZE", "20")?,
            },
            redis: RedisConfig {
                url: required("REDIS_URL")?,
            },
            session: SessionConfig {
                secret: required("SESSION_SECRET")?,
                ttl_hours: parsed("SESSION_TTL_HOURS", "24")?,
                cookie_secure: parsed("COOKIE_SECURE", "false")?,
                bcrypt_cost: parsed("BCRYPT_COST", "12")?,
            },
            payment: PaymentConfig {
                intent_ttl_seconds: positive("PAYMENT_INTENT_TTL_SECONDS", "900")?,
                order_prefix: or_default("PAYMENT_ORDER_PREFIX", "ORD"),
                txn_prefix: or_default("PAYMENT_TXN_PREFIX", "TXN"),
            },
            chat: ChatConfig {
                api_url: or_default("CHAT_API_URL", "https://api.anthropic.com/v1"),
                // Пустой ключ допустим: чат-бот просто будет отвечать заглушкой
                api_key: or_default("CHAT_API_KEY", ""),
                model: or_default("CHAT_MODEL", "claude-3-5-haiku-latest"),
                max_tokens: parsed("CHAT_MAX_TOKENS", "512")?,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: parsed("CIRCUIT_BREAKER_FAILURE_THRESHOLD", "5")?,
                timeout_seconds: parsed("CIRCUIT_BREAKER_TIMEOUT_SECONDS", "60")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Переменные окружения общие для процесса, поэтому всё в одном тесте
    #[test]
    fn reads_env_with_defaults_and_rejects_bad_values() {
        env::remove_var("DATABASE_URL");
        assert!(matches!(Config::from_env(), Err(ConfigError::Missing("DATABASE_URL"))));

        env::set_var("DATABASE_URL", "postgres://localhost/travel");
        env::set_var("REDIS_URL", "redis://localhost");
        env::set_var("SESSION_SECRET", "secret");
        env::remove_var("PAYMENT_INTENT_TTL_SECONDS");
        env::remove_var("PAYMENT_ORDER_PREFIX");
        env::set_var("SESSION_TTL_HOURS", "2");

        let config = Config::from_env().unwrap();
        assert_eq!(config.payment.intent_ttl_seconds, 900);
        assert_eq!(config.payment.order_prefix, "ORD");
        assert_eq!(config.session.ttl_seconds(), 7200);

        env::set_var("PORT", "eighty");
        match Config::from_env() {
            Err(ConfigError::Invalid { name, value }) => {
                assert_eq!(name, "PORT");
                assert_eq!(value, "eighty");
            }
            other => panic!("expected invalid PORT, got {:?}", other.map(|_| ())),
        }
        env::remove_var("PORT");

        env::set_var("PAYMENT_INTENT_TTL_SECONDS", "0");
        match Config::from_env() {
            Err(ConfigError::Invalid { name, .. }) => assert_eq!(name, "PAYMENT_INTENT_TTL_SECONDS"),
            other => panic!("expected invalid intent TTL, got {:?}", other.map(|_| ())),
        }
        env::remove_var("PAYMENT_INTENT_TTL_SECONDS");
        env::remove_var("SESSION_TTL_HOURS");
    }
}
