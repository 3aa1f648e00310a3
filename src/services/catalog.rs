use serde::Serialize;
use std::collections::HashMap;

use crate::error::AppError;
use crate::models::{Destination, RatingSummary, Review};
use crate::repository::Store;

#[derive(Debug, Serialize)]
pub struct DestinationListing {
    #[serde(flatten)]
    pub destination: Destination,
    pub rating: RatingSummary,
}

#[derive(Debug, Serialize)]
pub struct HotelDetail {
    #[serde(flatten)]
    pub destination: Destination,
    pub rating: RatingSummary,
    pub reviews: Vec<Review>,
}

/// Каталог с агрегатами отзывов. Агрегаты пересчитываются на каждом чтении:
/// один запрос оценок на всю выдачу, затем группировка по отелю.
pub async fn browse<S: Store>(store: &S, search: Option<&str>) -> Result<Vec<DestinationListing>, AppError> {
    let destinations = store.list_destinations(search).await?;
    let names: Vec<String> = destinations.iter().map(|d| d.name.clone()).collect();

    let mut ratings: HashMap<String, Vec<i32>> = HashMap::new();
    for (hotel, rating) in store.ratings_for_hotels(&names).await? {
        ratings.entry(hotel).or_default().push(rating);
    }

    Ok(destinations
        .into_iter()
        .map(|destination| {
            let rating = RatingSummary::from_ratings(
                ratings.remove(&destination.name).unwrap_or_default(),
            );
            DestinationListing { destination, rating }
        })
        .collect())
}

pub async fn hotel_detail<S: Store>(store: &S, name: &str) -> Result<HotelDetail, AppError> {
    let destination = store
        .find_destination(name)
        .await?
        .ok_or_else(|| AppError::NotFound("Hotel not found!".to_string()))?;
    let reviews = store.reviews_for_hotel(name).await?;
    let rating = RatingSummary::from_ratings(reviews.iter().map(|r| r.rating));
    Ok(HotelDetail { destination, rating, reviews })
}
