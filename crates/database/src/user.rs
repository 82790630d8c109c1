//! User lookups.

use sqlx::SqliteConnection;

use crate::entity::select_list;
use crate::error::{DatabaseError, Result};
use crate::models::User;
use crate::repository::Repository;

/// Find a user by platform handle.
pub async fn find_by_handle(conn: &mut SqliteConnection, handle: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE handle = ?", select_list::<User>());
    sqlx::query_as::<_, User>(&sql)
        .bind(handle)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("find", "User", handle, e))
}

impl Repository<User> {
    pub async fn find_by_handle(&self, handle: &str) -> Result<Option<User>> {
        let mut conn = self.acquire().await?;
        find_by_handle(&mut conn, handle).await
    }
}
