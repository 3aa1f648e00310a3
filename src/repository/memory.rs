use chrono::Utc;
use std::sync::Mutex;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    payment::PAYMENT_SUCCESS, Booking, Destination, NewBooking, NewPayment, NewReview, NewUser,
    Payment, Review, User,
};

#[derive(Default)]
struct Tables {
    destinations: Vec<Destination>,
    users: Vec<User>,
    bookings: Vec<Booking>,
    payments: Vec<Payment>,
    reviews: Vec<Review>,
}

/// Хранилище в памяти для тестов сервисов.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn with_destinations(destinations: Vec<Destination>) -> Self {
        let store = Self::default();
        store.tables.lock().unwrap().destinations = destinations;
        store
    }

    pub fn booking(&self, id: i64) -> Option<Booking> {
        self.tables.lock().unwrap().bookings.iter().find(|b| b.id == id).cloned()
    }

    pub fn payment_count(&self) -> usize {
        self.tables.lock().unwrap().payments.len()
    }

    pub fn booking_count(&self) -> usize {
        self.tables.lock().unwrap().bookings.len()
    }

    fn newest_first<T: Clone>(rows: impl Iterator<Item = T>) -> Vec<T> {
        let mut rows: Vec<T> = rows.collect();
        rows.reverse();
        rows
    }
}

impl Store for MemoryStore {
    async fn find_destination(&self, name: &str) -> StoreResult<Option<Destination>> {
        let t = self.tables.lock().unwrap();
        Ok(t.destinations.iter().find(|d| d.name == name).cloned())
    }

    async fn list_destinations(&self, search: Option<&str>) -> StoreResult<Vec<Destination>> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<Destination> = t
            .destinations
            .iter()
            .filter(|d| search.map_or(true, |q| d.matches(q)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let row = User {
            id: t.users.len() as i64 + 1,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role.as_str().to_string(),
            created_at: Utc::now(),
        };
        t.users.push(row.clone());
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_booking(&self, booking: NewBooking) -> StoreResult<Booking> {
        let mut t = self.tables.lock().unwrap();
        let row = Booking {
            id: t.bookings.len() as i64 + 1,
            user_id: booking.user_id,
            hotel: booking.hotel,
            guest_name: booking.guest_name,
            room_type: booking.room_type,
            nights: booking.nights,
            price_per_night: booking.price_per_night,
            total_price: Some(booking.total_price),
            paid: false,
            txn_id: None,
            created_at: Utc::now(),
        };
        t.bookings.push(row.clone());
        Ok(row)
    }

    async fn find_booking_for_user(&self, booking_id: i64, user_id: i64) -> StoreResult<Option<Booking>> {
        let t = self.tables.lock().unwrap();
        Ok(t.bookings
            .iter()
            .find(|b| b.id == booking_id && b.user_id == user_id)
            .cloned())
    }

    async fn bookings_for_user(&self, user_id: i64) -> StoreResult<Vec<Booking>> {
        let t = self.tables.lock().unwrap();
        Ok(Self::newest_first(t.bookings.iter().filter(|b| b.user_id == user_id).cloned()))
    }

    async fn all_bookings(&self) -> StoreResult<Vec<Booking>> {
        let t = self.tables.lock().unwrap();
        Ok(Self::newest_first(t.bookings.iter().cloned()))
    }

    async fn record_payment(&self, payment: NewPayment) -> StoreResult<Payment> {
        let mut t = self.tables.lock().unwrap();
        let next_id = t.payments.len() as i64 + 1;
        let booking = t
            .bookings
            .iter_mut()
            .find(|b| b.id == payment.booking_id && b.user_id == payment.user_id && !b.paid)
            .ok_or(StoreError::BookingNotPayable(payment.booking_id))?;
        booking.paid = true;
        booking.txn_id = Some(payment.txn_id.clone());

        let row = Payment {
            id: next_id,
            order_id: payment.order_id,
            txn_id: payment.txn_id,
            booking_id: payment.booking_id,
            amount: payment.amount,
            hotel: payment.hotel,
            user_id: payment.user_id,
            created_at: payment.created_at,
            status: PAYMENT_SUCCESS.to_string(),
        };
        t.payments.push(row.clone());
        Ok(row)
    }

    async fn find_payment_for_user(&self, txn_id: &str, user_id: i64) -> StoreResult<Option<Payment>> {
        let t = self.tables.lock().unwrap();
        Ok(t.payments
            .iter()
            .find(|p| p.txn_id == txn_id && p.user_id == user_id)
            .cloned())
    }

    async fn payments_for_user(&self, user_id: i64) -> StoreResult<Vec<Payment>> {
        let t = self.tables.lock().unwrap();
        Ok(Self::newest_first(t.payments.iter().filter(|p| p.user_id == user_id).cloned()))
    }

    async fn all_payments(&self) -> StoreResult<Vec<Payment>> {
        let t = self.tables.lock().unwrap();
        Ok(Self::newest_first(t.payments.iter().cloned()))
    }

    async fn insert_review(&self, review: NewReview) -> StoreResult<Review> {
        let mut t = self.tables.lock().unwrap();
        let row = Review {
            id: t.reviews.len() as i64 + 1,
            user_id: review.user_id,
            username: review.username,
            hotel: review.hotel,
            rating: review.rating,
            comment: review.comment,
            created_at: Utc::now(),
        };
        t.reviews.push(row.clone());
        Ok(row)
    }

    async fn reviews_for_hotel(&self, hotel: &str) -> StoreResult<Vec<Review>> {
        let t = self.tables.lock().unwrap();
        Ok(Self::newest_first(t.reviews.iter().filter(|r| r.hotel == hotel).cloned()))
    }

    async fn ratings_for_hotels(&self, hotels: &[String]) -> StoreResult<Vec<(String, i32)>> {
        let t = self.tables.lock().unwrap();
        Ok(t.reviews
            .iter()
            .filter(|r| hotels.contains(&r.hotel))
            .map(|r| (r.hotel.clone(), r.rating))
            .collect())
    }

    async fn reviews_for_user(&self, user_id: i64) -> StoreResult<Vec<Review>> {
        let t = self.tables.lock().unwrap();
        Ok(Self::newest_first(t.reviews.iter().filter(|r| r.user_id == user_id).cloned()))
    }

    async fn all_reviews(&self) -> StoreResult<Vec<Review>> {
        let t = self.tables.lock().unwrap();
        Ok(Self::newest_first(t.reviews.iter().cloned()))
    }
}
