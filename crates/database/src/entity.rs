//! Generic entity persistence.
//!
//! Every table is written through the same handful of statements, built from
//! the [`Entity`] description of the model. Per-entity behaviour (such as the
//! single-current-assignment rule) is declared on the model through
//! [`Entity::exclusive_flag`] rather than re-implemented per table.

use chrono::{DateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Assignment, Escalation, Rotation, User};

/// A bindable SQLite statement.
pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// A boolean column that may be set on at most one row per scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusiveFlag {
    /// Flag column (e.g., `is_current`).
    pub column: &'static str,
    /// Column that defines the scope (e.g., `rotation_id`).
    pub scope_column: &'static str,
    /// Scope value of the row being written.
    pub scope_value: String,
}

/// A persisted model with an opaque string id.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin {
    /// Name used in errors and logs.
    const NAME: &'static str;
    /// Backing table.
    const TABLE: &'static str;
    /// Columns other than `id`, in the order `bind_columns` binds them.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn set_updated_at(&mut self, at: DateTime<Utc>);

    /// Bind every column in [`Entity::COLUMNS`] order.
    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;

    /// Flag that must be cleared on every other row of the same scope when
    /// this row is written with it set.
    fn exclusive_flag(&self) -> Option<ExclusiveFlag> {
        None
    }
}

/// Assign a fresh id if the entity has none.
pub(crate) fn ensure_id<T: Entity>(entity: &mut T) {
    if entity.id().is_empty() {
        entity.set_id(Uuid::new_v4().to_string());
    }
}

/// `id, col1, col2, ...` for SELECT statements.
pub(crate) fn select_list<T: Entity>() -> String {
    let mut columns = Vec::with_capacity(T::COLUMNS.len() + 1);
    columns.push("id");
    columns.extend_from_slice(T::COLUMNS);
    columns.join(", ")
}

pub(crate) async fn fetch_by_id<T: Entity>(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<T>> {
    let sql = format!("SELECT {} FROM {} WHERE id = ?", select_list::<T>(), T::TABLE);
    sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("find", T::NAME, id, e))
}

pub(crate) async fn fetch_all<T: Entity>(conn: &mut SqliteConnection) -> Result<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY created_at",
        select_list::<T>(),
        T::TABLE
    );
    sqlx::query_as::<_, T>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("list", T::NAME, "*", e))
}

pub(crate) async fn insert<T: Entity>(conn: &mut SqliteConnection, entity: &T) -> Result<()> {
    let placeholders = vec!["?"; T::COLUMNS.len() + 1].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        T::TABLE,
        select_list::<T>(),
        placeholders
    );

    entity
        .bind_columns(sqlx::query(&sql).bind(entity.id()))
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::write("create", T::NAME, entity.id(), e))?;

    Ok(())
}

pub(crate) async fn overwrite<T: Entity>(conn: &mut SqliteConnection, entity: &T) -> Result<()> {
    let assignments = T::COLUMNS
        .iter()
        .map(|column| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("UPDATE {} SET {} WHERE id = ?", T::TABLE, assignments);

    let result = entity
        .bind_columns(sqlx::query(&sql))
        .bind(entity.id())
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::write("update", T::NAME, entity.id(), e))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: T::NAME,
            id: entity.id().to_string(),
        });
    }

    Ok(())
}

pub(crate) async fn remove<T: Entity>(conn: &mut SqliteConnection, id: &str) -> Result<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?", T::TABLE);
    let result = sqlx::query(&sql)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("delete", T::NAME, id, e))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: T::NAME,
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Clear `flag` on every other row in the same scope. Returns rows touched.
pub(crate) async fn clear_exclusive<T: Entity>(
    conn: &mut SqliteConnection,
    id: &str,
    flag: &ExclusiveFlag,
    at: DateTime<Utc>,
) -> Result<u64> {
    let sql = format!(
        "UPDATE {} SET {} = 0, updated_at = ? WHERE {} = ? AND id != ?",
        T::TABLE,
        flag.column,
        flag.scope_column
    );

    let result = sqlx::query(&sql)
        .bind(at)
        .bind(&flag.scope_value)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("reset", T::NAME, id, e))?;

    Ok(result.rows_affected())
}

impl Entity for User {
    const NAME: &'static str = "User";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] =
        &["handle", "name", "email", "is_active", "created_at", "updated_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.handle)
            .bind(&self.name)
            .bind(&self.email)
            .bind(self.is_active)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl Entity for Rotation {
    const NAME: &'static str = "Rotation";
    const TABLE: &'static str = "rotations";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "description",
        "repository",
        "is_active",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.name)
            .bind(&self.description)
            .bind(&self.repository)
            .bind(self.is_active)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}

impl Entity for Assignment {
    const NAME: &'static str = "Assignment";
    const TABLE: &'static str = "assignments";
    const COLUMNS: &'static [&'static str] = &[
        "rotation_id",
        "user_id",
        "start_time",
        "end_time",
        "is_current",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.rotation_id)
            .bind(&self.user_id)
            .bind(self.start_time)
            .bind(self.end_time)
            .bind(self.is_current)
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn exclusive_flag(&self) -> Option<ExclusiveFlag> {
        self.is_current.then(|| ExclusiveFlag {
            column: "is_current",
            scope_column: "rotation_id",
            scope_value: self.rotation_id.clone(),
        })
    }
}

impl Entity for Escalation {
    const NAME: &'static str = "Escalation";
    const TABLE: &'static str = "escalations";
    const COLUMNS: &'static [&'static str] = &[
        "assignment_id",
        "issue_number",
        "pr_number",
        "repository",
        "status",
        "escalation_time",
        "resolution_time",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.assignment_id)
            .bind(self.issue_number)
            .bind(self.pr_number)
            .bind(&self.repository)
            .bind(self.status)
            .bind(self.escalation_time)
            .bind(self.resolution_time)
            .bind(self.created_at)
            .bind(self.updated_at)
    }
}
