use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::store::{Entity, Patch, SqlValue};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub desk_id: i64,
    pub date: NaiveDate,
    pub approved_status: bool,
}

impl Entity for Booking {
    const TABLE: &'static str = "bookings";
    const SORT_COLUMNS: &'static [&'static str] =
        &["id", "user_id", "desk_id", "date", "approved_status"];
    const CONFLICT_MESSAGE: &'static str = "Booking already exists";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingCreate {
    pub user_id: i64,
    pub desk_id: i64,
    pub date: NaiveDate,
    pub approved_status: bool,
}

/// Sparse update: absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct BookingUpdate {
    pub user_id: Option<i64>,
    pub desk_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub approved_status: Option<bool>,
}

impl Patch for BookingUpdate {
    fn changes(&self) -> Vec<(&'static str, SqlValue)> {
        let mut changes = Vec::new();
        if let Some(user_id) = self.user_id {
            changes.push(("user_id", SqlValue::BigInt(user_id)));
        }
        if let Some(desk_id) = self.desk_id {
            changes.push(("desk_id", SqlValue::BigInt(desk_id)));
        }
        if let Some(date) = self.date {
            changes.push(("date", SqlValue::Date(date)));
        }
        if let Some(approved_status) = self.approved_status {
            changes.push(("approved_status", SqlValue::Bool(approved_status)));
        }
        changes
    }
}
