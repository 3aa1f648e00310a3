//! Граница между сервисами и хранилищем.
//!
//! Сервисы бронирования, оплаты и отзывов работают через трейт [`Store`].
//! Рабочая реализация - [`crate::database::Database`] поверх PostgreSQL,
//! в тестах используется `memory::MemoryStore`.

pub mod postgres;
#[cfg(test)]
pub mod memory;

use std::future::Future;
use thiserror::Error;

use crate::models::{
    Booking, Destination, NewBooking, NewPayment, NewReview, NewUser, Payment, Review, User,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("email already registered")]
    DuplicateEmail,
    /// Бронирование не найдено, чужое или уже оплачено: журнал не записан.
    #[error("booking {0} cannot be marked as paid")]
    BookingNotPayable(i64),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait Store: Send + Sync {
    // --- destinations ---
    fn find_destination(&self, name: &str) -> impl Future<Output = StoreResult<Option<Destination>>> + Send;
    /// Пустой или отсутствующий фильтр возвращает весь каталог.
    fn list_destinations(&self, search: Option<&str>) -> impl Future<Output = StoreResult<Vec<Destination>>> + Send;

    // --- users ---
    fn insert_user(&self, user: NewUser) -> impl Future<Output = StoreResult<User>> + Send;
    fn find_user_by_email(&self, email: &str) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    // --- bookings ---
    fn insert_booking(&self, booking: NewBooking) -> impl Future<Output = StoreResult<Booking>> + Send;
    fn find_booking_for_user(&self, booking_id: i64, user_id: i64) -> impl Future<Output = StoreResult<Option<Booking>>> + Send;
    fn bookings_for_user(&self, user_id: i64) -> impl Future<Output = StoreResult<Vec<Booking>>> + Send;
    fn all_bookings(&self) -> impl Future<Output = StoreResult<Vec<Booking>>> + Send;

    // --- payments ---
    /// Вставляет запись журнала и помечает бронирование оплаченным одной транзакцией.
    fn record_payment(&self, payment: NewPayment) -> impl Future<Output = StoreResult<Payment>> + Send;
    fn find_payment_for_user(&self, txn_id: &str, user_id: i64) -> impl Future<Output = StoreResult<Option<Payment>>> + Send;
    fn payments_for_user(&self, user_id: i64) -> impl Future<Output = StoreResult<Vec<Payment>>> + Send;
    fn all_payments(&self) -> impl Future<Output = StoreResult<Vec<Payment>>> + Send;

    // --- reviews ---
    fn insert_review(&self, review: NewReview) -> impl Future<Output = StoreResult<Review>> + Send;
    fn reviews_for_hotel(&self, hotel: &str) -> impl Future<Output = StoreResult<Vec<Review>>> + Send;
    /// Пары (отель, оценка) для набора отелей, чтобы посчитать агрегаты одним запросом.
    fn ratings_for_hotels(&self, hotels: &[String]) -> impl Future<Output = StoreResult<Vec<(String, i32)>>> + Send;
    fn reviews_for_user(&self, user_id: i64) -> impl Future<Output = StoreResult<Vec<Review>>> + Send;
    fn all_reviews(&self) -> impl Future<Output = StoreResult<Vec<Review>>> + Send;
}
