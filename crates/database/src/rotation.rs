//! Rotation lookups.

use sqlx::SqliteConnection;

use crate::entity::select_list;
use crate::error::{DatabaseError, Result};
use crate::models::Rotation;
use crate::repository::Repository;

/// All rotations owned by a repository, oldest first.
pub async fn find_by_repository(
    conn: &mut SqliteConnection,
    repository: &str,
) -> Result<Vec<Rotation>> {
    let sql = format!(
        "SELECT {} FROM rotations WHERE repository = ? ORDER BY created_at, id",
        select_list::<Rotation>()
    );
    sqlx::query_as::<_, Rotation>(&sql)
        .bind(repository)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::query("find", "Rotation", repository, e))
}

impl Repository<Rotation> {
    pub async fn find_by_repository(&self, repository: &str) -> Result<Vec<Rotation>> {
        let mut conn = self.acquire().await?;
        find_by_repository(&mut conn, repository).await
    }
}
