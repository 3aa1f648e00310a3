use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::destination::{Destination, RoomType};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub hotel: String,
    pub guest_name: String,
    pub room_type: String,
    pub nights: i32,
    pub price_per_night: f64,
    pub total_price: Option<f64>,
    pub paid: bool,
    pub txn_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Сумма к оплате: сохранённый итог, либо цена за ночь для старых записей без итога.
    pub fn amount_due(&self) -> f64 {
        self.total_price.unwrap_or(self.price_per_night)
    }
}

/// Данные для вставки нового бронирования.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i64,
    pub hotel: String,
    pub guest_name: String,
    pub room_type: String,
    pub nights: i32,
    pub price_per_night: f64,
    pub total_price: f64,
}

impl NewBooking {
    /// Итог считается один раз, здесь, и дальше не пересчитывается.
    pub fn quote(user_id: i64, hotel: &Destination, room: RoomType, guest_name: &str, nights: i32) -> Self {
        NewBooking {
            user_id,
            hotel: hotel.name.clone(),
            guest_name: guest_name.trim().to_string(),
            room_type: room.name,
            nights,
            price_per_night: room.price,
            total_price: room.price * f64::from(nights),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidNights(pub String);

/// Пустое значение - одна ночь, меньше единицы - приводится к одной ночи,
/// не целое число - ошибка.
pub fn parse_nights(raw: Option<&str>) -> Result<i32, InvalidNights> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Ok(1);
    }
    let nights: i64 = raw.parse().map_err(|_| InvalidNights(raw.to_string()))?;
    Ok(nights.clamp(1, i64::from(i32::MAX)) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::destination::sample;
    use proptest::prelude::*;

    #[test]
    fn nights_default_to_one() {
        assert_eq!(parse_nights(None), Ok(1));
        assert_eq!(parse_nights(Some("")), Ok(1));
        assert_eq!(parse_nights(Some("   ")), Ok(1));
    }

    #[test]
    fn nights_below_one_are_coerced() {
        assert_eq!(parse_nights(Some("0")), Ok(1));
        assert_eq!(parse_nights(Some("-4")), Ok(1));
        assert_eq!(parse_nights(Some(" 3 ")), Ok(3));
    }

    #[test]
    fn non_numeric_nights_are_rejected() {
        assert_eq!(parse_nights(Some("two")), Err(InvalidNights("two".into())));
        assert!(parse_nights(Some("2.5")).is_err());
    }

    #[test]
    fn three_nights_at_thousand_cost_three_thousand() {
        let hotel = sample("Sea View", "Goa", 1000.0, &[]);
        let room = hotel.resolve_room(None, None);
        let booking = NewBooking::quote(7, &hotel, room, " Asha ", 3);
        assert_eq!(booking.price_per_night, 1000.0);
        assert_eq!(booking.total_price, 3000.0);
        assert_eq!(booking.guest_name, "Asha");
    }

    proptest! {
        #[test]
        fn total_is_price_times_nights(price in 0u32..100_000, nights in 1i32..365) {
            let hotel = sample("H", "L", 10.0, &[("Room", f64::from(price))]);
            let room = hotel.resolve_room(Some("Room"), None);
            let booking = NewBooking::quote(1, &hotel, room, "Guest", nights);
            prop_assert_eq!(booking.total_price, booking.price_per_night * f64::from(booking.nights));
        }
    }
}
