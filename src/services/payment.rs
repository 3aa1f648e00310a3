//! payment.rs
//!
//! Сервисный слой оплаты бронирования.
//!
//! Жизненный цикл бронирования: `UNPAID → INTENT_CREATED → PAID`.
//! 1.  **initiate**: проверяет, что бронирование принадлежит пользователю и ещё
//!     не оплачено, генерирует order id и кладёт [`PaymentIntent`] в хранилище
//!     намерений под ключом сессии. В базу ничего не пишется.
//! 2.  **confirm**: берёт живое намерение сессии, генерирует transaction id и
//!     одной транзакцией пишет запись журнала и флаг `paid` бронирования.
//!     После успеха намерение удаляется, повторное подтверждение невозможно.
//!
//! Реального платёжного шлюза нет: подтверждение всегда успешно.

use chrono::Utc;
use tracing::{info, warn};

use crate::{
    config::PaymentConfig,
    error::AppError,
    models::{
        payment::{generate_order_id, generate_txn_id},
        NewPayment, Payment, PaymentIntent,
    },
    repository::{Store, StoreError},
    sessions::intents::IntentStore,
};

pub struct PaymentService<'a, S, I> {
    store: &'a S,
    intents: &'a I,
    config: &'a PaymentConfig,
}

impl<'a, S: Store, I: IntentStore> PaymentService<'a, S, I> {
    pub fn new(store: &'a S, intents: &'a I, config: &'a PaymentConfig) -> Self {
        Self { store, intents, config }
    }

    /// Создаёт намерение оплаты для бронирования пользователя.
    pub async fn initiate(
        &self,
        user_id: i64,
        session_id: &str,
        booking_id: i64,
    ) -> Result<PaymentIntent, AppError> {
        let booking = self
            .store
            .find_booking_for_user(booking_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found!".to_string()))?;

        if booking.paid {
            return Err(AppError::Validation("This booking is already paid.".to_string()));
        }

        let now = Utc::now();
        let intent = PaymentIntent {
            order_id: generate_order_id(&self.config.order_prefix, now),
            booking_id: booking.id,
            amount: booking.amount_due(),
            hotel: booking.hotel.clone(),
            nights: booking.nights,
            created_at: now,
        };

        self.intents.put(session_id, &intent).await?;
        info!(
            order_id = %intent.order_id,
            booking_id = intent.booking_id,
            amount = intent.amount,
            "Payment intent created"
        );
        Ok(intent)
    }

    /// Подтверждает намерение текущей сессии и записывает платёж.
    pub async fn confirm(&self, user_id: i64, session_id: &str) -> Result<Payment, AppError> {
        let intent = self.intents.get(session_id).await?.ok_or_else(|| {
            AppError::SessionExpired("Payment session expired. Please try again.".to_string())
        })?;

        let payment = NewPayment {
            order_id: intent.order_id.clone(),
            txn_id: generate_txn_id(&self.config.txn_prefix),
            booking_id: intent.booking_id,
            amount: intent.amount,
            hotel: intent.hotel.clone(),
            user_id,
            created_at: Utc::now(),
        };

        let recorded = match self.store.record_payment(payment).await {
            Ok(recorded) => recorded,
            Err(StoreError::BookingNotPayable(booking_id)) => {
                // Бронирование исчезло или уже оплачено - намерение больше не нужно
                warn!(booking_id, order_id = %intent.order_id, "Intent refers to a booking that cannot be paid");
                self.intents.remove(session_id).await?;
                return Err(AppError::NotFound("Booking not found or already paid.".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        self.intents.remove(session_id).await?;
        info!(
            txn_id = %recorded.txn_id,
            order_id = %recorded.order_id,
            booking_id = recorded.booking_id,
            amount = recorded.amount,
            "Payment confirmed"
        );
        Ok(recorded)
    }
}
