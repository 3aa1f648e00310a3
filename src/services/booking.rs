use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::models::{booking::parse_nights, Booking, NewBooking};
use crate::repository::Store;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct BookingForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "Guest name is required"))]
    pub name: String,
    pub nights: Option<String>,
    pub room_type: Option<String>,
}

/// Создаёт бронирование. Неизвестный отель - `NotFound`, кривые данные формы -
/// `Validation`; в обоих случаях ничего не записывается.
pub async fn create_booking<S: Store>(
    store: &S,
    user_id: i64,
    hotel_name: &str,
    form: &BookingForm,
    preselected_room: Option<&str>,
) -> Result<Booking, AppError> {
    let hotel = store
        .find_destination(hotel_name)
        .await?
        .ok_or_else(|| AppError::NotFound("Hotel not found!".to_string()))?;

    if form.name.trim().is_empty() {
        return Err(AppError::Validation("Guest name is required".to_string()));
    }
    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let nights = parse_nights(form.nights.as_deref()).map_err(|e| {
        AppError::Validation(format!("Nights must be a whole number, got '{}'", e.0))
    })?;

    let room = hotel.resolve_room(form.room_type.as_deref(), preselected_room);
    let booking = store
        .insert_booking(NewBooking::quote(user_id, &hotel, room, &form.name, nights))
        .await?;

    info!(
        booking_id = booking.id,
        hotel = %booking.hotel,
        nights = booking.nights,
        total = booking.amount_due(),
        "Booking created"
    );
    Ok(booking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::destination::sample;
    use crate::repository::memory::MemoryStore;

    fn store() -> MemoryStore {
        MemoryStore::with_destinations(vec![
            sample("Sea View", "Goa", 1000.0, &[]),
            sample("Palace", "Jaipur", 5000.0, &[("Deluxe", 7000.0), ("Royal Suite", 12000.0)]),
        ])
    }

    fn form(name: &str, nights: Option<&str>, room: Option<&str>) -> BookingForm {
        BookingForm {
            name: name.to_string(),
            nights: nights.map(str::to_string),
            room_type: room.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn booking_total_is_nights_times_room_price() {
        let store = store();
        let booking = create_booking(&store, 1, "Sea View", &form("Asha", Some("3"), None), None)
            .await
            .unwrap();
        assert_eq!(booking.room_type, "Standard");
        assert_eq!(booking.price_per_night, 1000.0);
        assert_eq!(booking.total_price, Some(3000.0));
        assert!(!booking.paid);
        assert_eq!(booking.txn_id, None);
    }

    #[tokio::test]
    async fn query_preselection_picks_room() {
        let store = store();
        let booking = create_booking(&store, 1, "Palace", &form("Ravi", None, None), Some("Royal Suite"))
            .await
            .unwrap();
        assert_eq!(booking.room_type, "Royal Suite");
        assert_eq!(booking.nights, 1);
        assert_eq!(booking.total_price, Some(12000.0));
    }

    #[tokio::test]
    async fn unknown_hotel_creates_nothing() {
        let store = store();
        let err = create_booking(&store, 1, "Atlantis", &form("Asha", Some("2"), None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.booking_count(), 0);
    }

    #[tokio::test]
    async fn bad_nights_abort_the_booking() {
        let store = store();
        let err = create_booking(&store, 1, "Sea View", &form("Asha", Some("many"), None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.booking_count(), 0);
    }

    #[tokio::test]
    async fn form_without_guest_name_reaches_validation() {
        let store = store();
        let form: BookingForm = serde_urlencoded::from_str("nights=2").unwrap();
        let err = create_booking(&store, 1, "Sea View", &form, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Guest name is required"));
        assert_eq!(store.booking_count(), 0);
    }

    #[tokio::test]
    async fn blank_guest_name_is_rejected() {
        let store = store();
        let err = create_booking(&store, 1, "Sea View", &form("   ", None, None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
