pub mod auth;
pub mod catalog;
pub mod bookings;
pub mod payment;
pub mod reviews;
pub mod account;
pub mod chatbot;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(catalog::routes())
        .merge(bookings::routes())
        .merge(payment::routes())
        .merge(reviews::routes())
        .merge(account::routes())
        .merge(chatbot::routes())
}

/// Кодирует сегмент пути (название отеля) для редиректов.
pub(crate) fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{http::header::LOCATION, response::Response};

    use crate::middleware::AuthUser;
    use crate::models::Role;

    pub fn signed_in(user_id: i64, role: Role) -> AuthUser {
        AuthUser {
            user_id,
            username: format!("user{}", user_id),
            email: format!("user{}@example.com", user_id),
            role,
            session_id: format!("session-{}", user_id),
        }
    }

    pub fn location(response: &Response) -> &str {
        response.headers()[LOCATION].to_str().unwrap()
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::path_segment;

    #[test]
    fn hotel_names_are_percent_encoded() {
        assert_eq!(path_segment("Sea View"), "Sea%20View");
        assert_eq!(path_segment("Café/Bar"), "Caf%C3%A9%2FBar");
        assert_eq!(path_segment("plain-name_1"), "plain-name_1");
    }
}
