use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub hotel: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: i64,
    pub username: String,
    pub hotel: String,
    pub rating: i32,
    pub comment: String,
}

/// Средняя оценка и число отзывов. Без отзывов среднее не определено (`null`), а не 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: usize,
}

impl RatingSummary {
    pub fn from_ratings<I: IntoIterator<Item = i32>>(ratings: I) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0i64, 0usize), |(sum, count), r| (sum + i64::from(r), count + 1));
        let average = (count > 0).then(|| sum as f64 / count as f64);
        RatingSummary { average, count }
    }
}
