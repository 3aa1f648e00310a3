use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Название синтетического номера, если у отеля нет списка типов номеров.
pub const STANDARD_ROOM: &str = "Standard";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomType {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    pub location: String,
    pub price: f64,
    pub description: Option<String>,
    #[sqlx(json)]
    pub room_types: Vec<RoomType>,
    pub images: Vec<String>,
}

impl Destination {
    /// Выбирает тип номера: явный выбор из формы, затем предвыбор из query,
    /// затем первый тип номера отеля, затем синтетический "Standard" по базовой цене.
    pub fn resolve_room(&self, selected: Option<&str>, preselected: Option<&str>) -> RoomType {
        let wanted = [selected, preselected]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty());

        if let Some(wanted) = wanted {
            if let Some(room) = self.room_types.iter().find(|r| r.name == wanted) {
                return room.clone();
            }
        }

        self.room_types.first().cloned().unwrap_or_else(|| RoomType {
            name: STANDARD_ROOM.to_string(),
            price: self.price,
        })
    }

    /// Регистронезависимый поиск подстроки в названии или локации.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.location.to_lowercase().contains(&query)
    }
}

#[cfg(test)]
pub(crate) fn sample(name: &str, location: &str, price: f64, rooms: &[(&str, f64)]) -> Destination {
    Destination {
        name: name.to_string(),
        location: location.to_string(),
        price,
        description: None,
        room_types: rooms
            .iter()
            .map(|(n, p)| RoomType { name: n.to_string(), price: *p })
            .collect(),
        images: vec![],
    }
}
