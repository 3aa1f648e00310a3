//! chat.rs
//!
//! Клиент внешнего сервиса генерации текста для чат-бота.
//!
//! 1.  **CircuitBreaker**: после серии сбоев подряд перестаёт обращаться к сервису
//!     на время таймаута, затем пропускает один пробный запрос.
//! 2.  **ChatClient**: добавляет к сообщению пользователя фиксированную персону
//!     ассистента и вызывает API синхронно на каждое сообщение. Любая ошибка
//!     превращается в фиксированный ответ с извинением, наружу не пробрасывается.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{ChatConfig, CircuitBreakerConfig};

pub const PERSONA_PROMPT: &str = "You are a friendly travel assistant for a hotel booking website. \
Help travelers choose destinations, compare room types, understand prices and plan their stay. \
Keep answers short and practical.";

pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble answering right now. Please try again in a little while.";

pub const EMPTY_MESSAGE_REPLY: &str = "Please type a question about your trip and I'll do my best to help.";

/// Состояния "Автоматического выключателя".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    /// Запросы разрешены.
    Closed,
    /// Запросы блокируются до истечения таймаута.
    Open,
    /// Разрешён один пробный запрос.
    HalfOpen,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: RwLock<CircuitState>,
    /// Счетчик последовательных сбоев.
    failure_count: AtomicU32,
    /// Время последнего сбоя, в миллисекундах от `origin`.
    last_failure_ms: AtomicU64,
    /// Пробный запрос в полуоткрытом состоянии уже выполняется.
    trial_in_flight: AtomicBool,
    origin: Instant,
    failure_threshold: u32,
    timeout_duration: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, timeout: Duration) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            last_failure_ms: AtomicU64::new(0),
            trial_in_flight: AtomicBool::new(false),
            origin: Instant::now(),
            failure_threshold: failure_threshold.max(1),
            timeout_duration: timeout,
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn read_state(&self) -> CircuitState {
        *self.state.read().unwrap_or_else(|p| p.into_inner())
    }

    fn set_state(&self, next: CircuitState) {
        *self.state.write().unwrap_or_else(|p| p.into_inner()) = next;
    }

    /// Проверяет, можно ли выполнить следующий запрос к сервису.
    /// В полуоткрытом состоянии пропускает только один запрос до его результата.
    pub fn can_execute(&self) -> bool {
        match self.read_state() {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => self.claim_trial(),
            CircuitState::Open => {
                let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
                match *state {
                    CircuitState::Closed => return true,
                    CircuitState::HalfOpen => {}
                    CircuitState::Open => {
                        let since_failure = self
                            .elapsed_ms()
                            .saturating_sub(self.last_failure_ms.load(Ordering::Relaxed));
                        if since_failure < self.timeout_duration.as_millis() as u64 {
                            return false;
                        }
                        *state = CircuitState::HalfOpen;
                        info!("Chat circuit breaker transitioning to HalfOpen state");
                    }
                }
                drop(state);
                self.claim_trial()
            }
        }
    }

    fn claim_trial(&self) -> bool {
        self.trial_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn record_success(&self) {
        if self.read_state() == CircuitState::HalfOpen {
            info!("Chat circuit breaker recovered - transitioning to Closed state");
        }
        self.failure_count.store(0, Ordering::Relaxed);
        self.set_state(CircuitState::Closed);
        self.trial_in_flight.store(false, Ordering::Release);
    }

    pub fn record_failure(&self) {
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.last_failure_ms.store(self.elapsed_ms(), Ordering::Relaxed);

        match self.read_state() {
            CircuitState::Closed if failures >= self.failure_threshold => {
                self.set_state(CircuitState::Open);
                error!(failures, threshold = self.failure_threshold, "Chat circuit breaker OPENED");
            }
            CircuitState::HalfOpen => {
                self.set_state(CircuitState::Open);
                warn!("Chat circuit breaker test failed - returning to Open state");
            }
            _ => {}
        }
        self.trial_in_flight.store(false, Ordering::Release);
    }

    pub fn state(&self) -> CircuitState {
        self.read_state()
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat service is not configured")]
    NotConfigured,
    #[error("circuit breaker is open - chat service temporarily unavailable")]
    CircuitOpen,
    #[error("chat service request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat service returned no text")]
    EmptyResponse,
}

// --- Модели API сообщений ---

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatConfig,
    breaker: Arc<CircuitBreaker>,
}

impl ChatClient {
    pub fn new(config: ChatConfig, breaker: &CircuitBreakerConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            breaker: Arc::new(CircuitBreaker::new(
                breaker.failure_threshold,
                Duration::from_secs(breaker.timeout_seconds),
            )),
        }
    }

    pub fn breaker_state(&self) -> CircuitState {
        self.breaker.state()
    }

    fn prompt(message: &str) -> String {
        format!("{}\n\nTraveler: {}", PERSONA_PROMPT, message.trim())
    }

    /// Ответ для пользователя. Никогда не возвращает ошибку.
    pub async fn reply(&self, message: &str) -> String {
        if message.trim().is_empty() {
            return EMPTY_MESSAGE_REPLY.to_string();
        }
        match self.generate(message).await {
            Ok(text) => text,
            Err(e) => {
                error!("Chat reply failed: {}", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }

    pub async fn generate(&self, message: &str) -> Result<String, ChatError> {
        if self.config.api_key.is_empty() {
            return Err(ChatError::NotConfigured);
        }
        if !self.breaker.can_execute() {
            warn!("Chat circuit breaker is OPEN - blocking request");
            return Err(ChatError::CircuitOpen);
        }

        match self.call(message).await {
            Ok(text) => {
                self.breaker.record_success();
                Ok(text)
            }
            Err(e) => {
                self.breaker.record_failure();
                Err(e)
            }
        }
    }

    async fn call(&self, message: &str) -> Result<String, ChatError> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message { role: "user", content: Self::prompt(message) }],
        };

        let response: MessagesResponse = self
            .http
            .post(format!("{}/messages", self.config.api_url.trim_end_matches('/')))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(ChatError::EmptyResponse);
        }
        Ok(text.trim().to_string())
    }
}
