use tracing::info;

use super::{Store, StoreError, StoreResult};
use crate::database::Database;
use crate::models::{
    payment::PAYMENT_SUCCESS, Booking, Destination, NewBooking, NewPayment, NewReview, NewUser,
    Payment, Review, User,
};

const DESTINATION_COLUMNS: &str = "name, location, price, description, room_types, images";
const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";
const BOOKING_COLUMNS: &str =
    "id, user_id, hotel, guest_name, room_type, nights, price_per_night, total_price, paid, txn_id, created_at";
const PAYMENT_COLUMNS: &str =
    "id, order_id, txn_id, booking_id, amount, hotel, user_id, created_at, status";
const REVIEW_COLUMNS: &str = "id, user_id, username, hotel, rating, comment, created_at";

// Экранируем спецсимволы LIKE, чтобы поиск был по подстроке, а не по шаблону
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl Store for Database {
    async fn find_destination(&self, name: &str) -> StoreResult<Option<Destination>> {
        let sql = format!("SELECT {DESTINATION_COLUMNS} FROM destinations WHERE name = $1");
        Ok(sqlx::query_as::<_, Destination>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_destinations(&self, search: Option<&str>) -> StoreResult<Vec<Destination>> {
        let search = search.map(str::trim).filter(|q| !q.is_empty());
        let rows = match search {
            None => {
                let sql = format!("SELECT {DESTINATION_COLUMNS} FROM destinations ORDER BY name");
                sqlx::query_as::<_, Destination>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(query) => {
                let sql = format!(
                    "SELECT {DESTINATION_COLUMNS} FROM destinations \
                     WHERE name ILIKE $1 OR location ILIKE $1 ORDER BY name"
                );
                sqlx::query_as::<_, Destination>(&sql)
                    .bind(like_pattern(query))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
                other => StoreError::Database(other),
            })
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_booking(&self, booking: NewBooking) -> StoreResult<Booking> {
        let sql = format!(
            "INSERT INTO bookings (user_id, hotel, guest_name, room_type, nights, price_per_night, total_price, paid) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE) RETURNING {BOOKING_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Booking>(&sql)
            .bind(booking.user_id)
            .bind(&booking.hotel)
            .bind(&booking.guest_name)
            .bind(&booking.room_type)
            .bind(booking.nights)
            .bind(booking.price_per_night)
            .bind(booking.total_price)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_booking_for_user(&self, booking_id: i64, user_id: i64) -> StoreResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 AND user_id = $2");
        Ok(sqlx::query_as::<_, Booking>(&sql)
            .bind(booking_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn bookings_for_user(&self, user_id: i64) -> StoreResult<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Booking>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn all_bookings(&self) -> StoreResult<Vec<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC, id DESC");
        Ok(sqlx::query_as::<_, Booking>(&sql).fetch_all(&self.pool).await?)
    }

    async fn record_payment(&self, payment: NewPayment) -> StoreResult<Payment> {
        let mut tx = self.pool.begin().await?;

        // Сначала бронирование: условие paid = FALSE не даёт оплатить дважды
        let updated = sqlx::query(
            "UPDATE bookings SET paid = TRUE, txn_id = $1 \
             WHERE id = $2 AND user_id = $3 AND paid = FALSE",
        )
        .bind(&payment.txn_id)
        .bind(payment.booking_id)
        .bind(payment.user_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::BookingNotPayable(payment.booking_id));
        }

        let sql = format!(
            "INSERT INTO payments (order_id, txn_id, booking_id, amount, hotel, user_id, created_at, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {PAYMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Payment>(&sql)
            .bind(&payment.order_id)
            .bind(&payment.txn_id)
            .bind(payment.booking_id)
            .bind(payment.amount)
            .bind(&payment.hotel)
            .bind(payment.user_id)
            .bind(payment.created_at)
            .bind(PAYMENT_SUCCESS)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(txn_id = %row.txn_id, booking_id = row.booking_id, "Payment recorded");
        Ok(row)
    }

    async fn find_payment_for_user(&self, txn_id: &str, user_id: i64) -> StoreResult<Option<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE txn_id = $1 AND user_id = $2");
        Ok(sqlx::query_as::<_, Payment>(&sql)
            .bind(txn_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn payments_for_user(&self, user_id: i64) -> StoreResult<Vec<Payment>> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Payment>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn all_payments(&self) -> StoreResult<Vec<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY created_at DESC, id DESC");
        Ok(sqlx::query_as::<_, Payment>(&sql).fetch_all(&self.pool).await?)
    }

    async fn insert_review(&self, review: NewReview) -> StoreResult<Review> {
        let sql = format!(
            "INSERT INTO reviews (user_id, username, hotel, rating, comment) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {REVIEW_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(review.user_id)
            .bind(&review.username)
            .bind(&review.hotel)
            .bind(review.rating)
            .bind(&review.comment)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn reviews_for_hotel(&self, hotel: &str) -> StoreResult<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE hotel = $1 ORDER BY created_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(hotel)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn ratings_for_hotels(&self, hotels: &[String]) -> StoreResult<Vec<(String, i32)>> {
        if hotels.is_empty() {
            return Ok(vec![]);
        }
        Ok(sqlx::query_as::<_, (String, i32)>(
            "SELECT hotel, rating FROM reviews WHERE hotel = ANY($1)",
        )
        .bind(hotels)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn reviews_for_user(&self, user_id: i64) -> StoreResult<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn all_reviews(&self) -> StoreResult<Vec<Review>> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at DESC, id DESC");
        Ok(sqlx::query_as::<_, Review>(&sql).fetch_all(&self.pool).await?)
    }
}
