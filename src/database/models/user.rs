use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::store::{Entity, Patch, SqlValue};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    // Never leaves the server
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub admin: bool,
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const SORT_COLUMNS: &'static [&'static str] = &["id", "email", "username", "admin"];
    const CONFLICT_MESSAGE: &'static str = "Email already registered";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

/// Sparse update: absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub admin: Option<bool>,
}

impl Patch for UserUpdate {
    fn changes(&self) -> Vec<(&'static str, SqlValue)> {
        let mut changes = Vec::new();
        if let Some(username) = &self.username {
            changes.push(("username", SqlValue::Text(username.clone())));
        }
        if let Some(email) = &self.email {
            changes.push(("email", SqlValue::Text(email.clone())));
        }
        if let Some(admin) = self.admin {
            changes.push(("admin", SqlValue::Bool(admin)));
        }
        changes
    }
}
