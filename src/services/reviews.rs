use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::models::{NewReview, Review};
use crate::repository::Store;

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Comment is too long"))]
    pub comment: String,
}

#[derive(Debug, Validate)]
struct Rating {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    value: i32,
}

/// Добавляет отзыв. Отзывы только добавляются: ни правки, ни удаления нет.
pub async fn submit_review<S: Store>(
    store: &S,
    user_id: i64,
    username: &str,
    hotel_name: &str,
    form: &ReviewForm,
) -> Result<Review, AppError> {
    if store.find_destination(hotel_name).await?.is_none() {
        return Err(AppError::NotFound("Hotel not found!".to_string()));
    }

    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let rating = Rating {
        value: form
            .rating
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("Rating must be a whole number".to_string()))?,
    };
    rating
        .validate()
        .map_err(|_| AppError::Validation("Rating must be between 1 and 5".to_string()))?;

    let review = store
        .insert_review(NewReview {
            user_id,
            username: username.to_string(),
            hotel: hotel_name.to_string(),
            rating: rating.value,
            comment: form.comment.trim().to_string(),
        })
        .await?;

    info!(hotel = %review.hotel, rating = review.rating, "Review added");
    Ok(review)
}
