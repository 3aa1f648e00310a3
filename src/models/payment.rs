use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const PAYMENT_SUCCESS: &str = "success";

/// Запись платёжного журнала. Только вставка, никогда не изменяется.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: String,
    pub txn_id: String,
    pub booking_id: i64,
    pub amount: f64,
    pub hotel: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: String,
    pub txn_id: String,
    pub booking_id: i64,
    pub amount: f64,
    pub hotel: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Эфемерное намерение оплаты, живёт в хранилище сессий до подтверждения или истечения TTL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub order_id: String,
    pub booking_id: i64,
    pub amount: f64,
    pub hotel: String,
    pub nights: i32,
    pub created_at: DateTime<Utc>,
}

/// `ORD20261017203015-A7K2`: префикс, UTC время и 4 случайных символа.
pub fn generate_order_id(prefix: &str, now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("{}{}-{}", prefix, now.format("%Y%m%d%H%M%S"), suffix)
}

/// `TXN04918273`: префикс и 8 случайных цифр.
pub fn generate_txn_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let digits: String = (0..8)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    format!("{}{}", prefix, digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn order_id_has_prefix_timestamp_and_suffix() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 20, 30, 15).unwrap();
        let id = generate_order_id("ORD", now);
        let (head, suffix) = id.split_once('-').unwrap();
        assert_eq!(head, "ORD20261017203015");
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn txn_id_is_prefix_and_eight_digits() {
        let id = generate_txn_id("TXN");
        let digits = id.strip_prefix("TXN").unwrap();
        assert_eq!(digits.len(), 8);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }
}
