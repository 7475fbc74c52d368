use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::store::{Entity, Patch, SqlValue};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Room {
    pub id: i64,
    pub name: String,
}

impl Entity for Room {
    const TABLE: &'static str = "rooms";
    const SORT_COLUMNS: &'static [&'static str] = &["id", "name"];
    const CONFLICT_MESSAGE: &'static str = "Room already exists";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Deserialize)]
pub struct RoomCreate {
    pub name: String,
}

/// Rooms only carry a name, so the update is not sparse
#[derive(Debug, Deserialize)]
pub struct RoomUpdate {
    pub name: String,
}

impl Patch for RoomUpdate {
    fn changes(&self) -> Vec<(&'static str, SqlValue)> {
        vec![("name", SqlValue::Text(self.name.clone()))]
    }
}
