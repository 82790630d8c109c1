//! Assignment lookups.

use sqlx::SqliteConnection;

use crate::entity::select_list;
use crate::error::{DatabaseError, Result};
use crate::models::Assignment;
use crate::repository::Repository;

/// The current assignment of a rotation, if any.
pub async fn find_current_by_rotation(
    conn: &mut SqliteConnection,
    rotation_id: &str,
) -> Result<Option<Assignment>> {
    let sql = format!(
        "SELECT {} FROM assignments WHERE rotation_id = ? AND is_current = 1 \
         ORDER BY updated_at DESC LIMIT 1",
        select_list::<Assignment>()
    );
    sqlx::query_as::<_, Assignment>(&sql)
        .bind(rotation_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("find", "Assignment", rotation_id, e))
}

pub async fn find_by_rotation(
    conn: &mut SqliteConnection,
    rotation_id: &str,
) -> Result<Vec<Assignment>> {
    let sql = format!(
        "SELECT {} FROM assignments WHERE rotation_id = ? ORDER BY start_time DESC",
        select_list::<Assignment>()
    );
    sqlx::query_as::<_, Assignment>(&sql)
        .bind(rotation_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("find", "Assignment", rotation_id, e))
}

pub async fn find_by_user(conn: &mut SqliteConnection, user_id: &str) -> Result<Vec<Assignment>> {
    let sql = format!(
        "SELECT {} FROM assignments WHERE user_id = ? ORDER BY start_time DESC",
        select_list::<Assignment>()
    );
    sqlx::query_as::<_, Assignment>(&sql)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("find", "Assignment", user_id, e))
}

impl Repository<Assignment> {
    pub async fn find_current_by_rotation(&self, rotation_id: &str) -> Result<Option<Assignment>> {
        let mut conn = self.acquire().await?;
        find_current_by_rotation(&mut conn, rotation_id).await
    }

    pub async fn find_by_rotation(&self, rotation_id: &str) -> Result<Vec<Assignment>> {
        let mut conn = self.acquire().await?;
        find_by_rotation(&mut conn, rotation_id).await
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Assignment>> {
        let mut conn = self.acquire().await?;
        find_by_user(&mut conn, user_id).await
    }
}
