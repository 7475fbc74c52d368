use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{self, postgres::PgArguments, postgres::PgRow, FromRow, PgPool};

use crate::database::manager::{map_sqlx_error, DatabaseError};
use crate::query::{RangeParam, SortParam};

/// A storage-backed entity kind. The associated constants are the closed
/// per-kind tables that let one generic engine serve every entity without
/// runtime reflection.
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin + Serialize {
    const TABLE: &'static str;
    /// Attribute names accepted as dynamic sort fields
    const SORT_COLUMNS: &'static [&'static str];
    /// Message reported when storage rejects a duplicate unique key
    const CONFLICT_MESSAGE: &'static str;

    fn id(&self) -> i64;
}

/// A typed column value destined for a bind parameter
#[derive(Debug, Clone)]
pub enum SqlValue {
    BigInt(i64),
    Int(i32),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
}

/// A sparse update: only the listed columns are written
pub trait Patch {
    fn changes(&self) -> Vec<(&'static str, SqlValue)>;
}

/// Build the ORDER BY fragment for an entity kind, validating the sort
/// field against the kind's allow-list. Default is ascending by id.
pub fn order_clause<T: Entity>(sort: Option<&SortParam>) -> Result<String, DatabaseError> {
    match sort {
        None => Ok("ORDER BY \"id\" ASC".to_string()),
        Some(sort) => {
            if !T::SORT_COLUMNS.contains(&sort.field.as_str()) {
                return Err(DatabaseError::InvalidQuery(format!(
                    "Cannot sort {} by '{}'",
                    T::TABLE,
                    sort.field
                )));
            }
            Ok(format!(
                "ORDER BY \"{}\" {}",
                sort.field,
                sort.direction.to_sql()
            ))
        }
    }
}

fn bind_value<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    value: &SqlValue,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match value {
        SqlValue::BigInt(v) => q.bind(*v),
        SqlValue::Int(v) => q.bind(*v),
        SqlValue::Bool(v) => q.bind(*v),
        SqlValue::Text(v) => q.bind(v.clone()),
        SqlValue::Date(v) => q.bind(*v),
    }
}

/// One parameterized access path shared by all four entity kinds
pub struct Store<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Entity> Store<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    /// List all records, dynamically sorted, optionally sliced by
    /// offset+limit. No range means the full set.
    pub async fn list(
        &self,
        sort: Option<&SortParam>,
        range: Option<&RangeParam>,
    ) -> Result<Vec<T>, DatabaseError> {
        let order = order_clause::<T>(sort)?;
        let mut sql = format!("SELECT * FROM \"{}\" {}", T::TABLE, order);

        let rows = if let Some(range) = range {
            sql.push_str(" OFFSET $1 LIMIT $2");
            sqlx::query_as::<_, T>(&sql)
                .bind(range.offset)
                .bind(range.limit)
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?
        };

        Ok(rows)
    }

    /// Single-record lookup; absence is a None, not an error
    pub async fn get(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM \"{}\" WHERE \"id\" = $1", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Apply only the fields present in the patch and return the refreshed
    /// record. An empty patch reads the record back unchanged.
    pub async fn update_by_diff<P: Patch>(&self, id: i64, patch: &P) -> Result<T, DatabaseError> {
        let changes = patch.changes();
        if changes.is_empty() {
            return self
                .get(id)
                .await?
                .ok_or_else(|| DatabaseError::NotFound("Record not found".to_string()));
        }

        let assignments: Vec<String> = changes
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("\"{}\" = ${}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE \"id\" = ${} RETURNING *",
            T::TABLE,
            assignments.join(", "),
            changes.len() + 1
        );

        let mut q = sqlx::query_as::<_, T>(&sql);
        for (_, value) in &changes {
            q = bind_value(q, value);
        }
        let row = q
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, T::CONFLICT_MESSAGE))?;

        row.ok_or_else(|| DatabaseError::NotFound("Record not found".to_string()))
    }

    /// Remove the record; deleting a non-existent id is a no-op
    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", T::TABLE);
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Desk, DeskUpdate, User, UserUpdate};
    use crate::query::SortDirection;

    #[test]
    fn default_sort_is_id_ascending() {
        let clause = order_clause::<User>(None).unwrap();
        assert_eq!(clause, "ORDER BY \"id\" ASC");
    }

    #[test]
    fn sort_field_is_validated_against_allow_list() {
        let sort = SortParam {
            field: "hashed_password".to_string(),
            direction: SortDirection::Asc,
        };
        assert!(matches!(
            order_clause::<User>(Some(&sort)),
            Err(DatabaseError::InvalidQuery(_))
        ));

        let sort = SortParam {
            field: "number".to_string(),
            direction: SortDirection::Desc,
        };
        assert_eq!(
            order_clause::<Desk>(Some(&sort)).unwrap(),
            "ORDER BY \"number\" DESC"
        );
    }

    #[test]
    fn empty_patch_has_no_changes() {
        assert!(UserUpdate::default().changes().is_empty());
        assert!(DeskUpdate::default().changes().is_empty());
    }

    #[test]
    fn patch_lists_only_present_fields() {
        let patch = UserUpdate {
            email: Some("newemail@gmail.com".to_string()),
            ..Default::default()
        };
        let changes = patch.changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].0, "email");
    }
}
