use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::store::{Entity, Patch, SqlValue};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Desk {
    pub id: i64,
    pub number: i32,
    pub room_id: i64,
}

impl Entity for Desk {
    const TABLE: &'static str = "desks";
    const SORT_COLUMNS: &'static [&'static str] = &["id", "number", "room_id"];
    const CONFLICT_MESSAGE: &'static str = "Desk already exists";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Deserialize)]
pub struct DeskCreate {
    pub number: i32,
    pub room_id: i64,
}

/// Sparse update: absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct DeskUpdate {
    pub number: Option<i32>,
    pub room_id: Option<i64>,
}

impl Patch for DeskUpdate {
    fn changes(&self) -> Vec<(&'static str, SqlValue)> {
        let mut changes = Vec::new();
        if let Some(number) = self.number {
            changes.push(("number", SqlValue::Int(number)));
        }
        if let Some(room_id) = self.room_id {
            changes.push(("room_id", SqlValue::BigInt(room_id)));
        }
        changes
    }
}
