//! Transaction scope shared by every writer.

use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::entity::{self, Entity};
use crate::error::Result;

/// A unit of work over any entity tables.
///
/// Writes made through a `Transaction` become visible together on
/// [`Transaction::commit`]. Dropping it without committing rolls back.
pub struct Transaction {
    inner: sqlx::Transaction<'static, Sqlite>,
}

impl Transaction {
    /// Open a write transaction.
    ///
    /// `BEGIN IMMEDIATE` takes the write lock up front, so concurrent writers
    /// wait on the busy timeout rather than failing when a deferred
    /// transaction tries to upgrade from a read lock.
    pub(crate) async fn begin(pool: &SqlitePool) -> Result<Self> {
        let inner = pool.begin_with("BEGIN IMMEDIATE").await?;
        Ok(Self { inner })
    }

    /// Connection for the per-entity query functions (`user::find_by_handle`, ...).
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.inner
    }

    pub async fn find_by_id<T: Entity>(&mut self, id: &str) -> Result<Option<T>> {
        entity::fetch_by_id(self.conn(), id).await
    }

    /// Insert an entity, assigning an id if it has none.
    ///
    /// If the entity carries an exclusive flag, the flag is cleared on its
    /// siblings first, inside this transaction.
    pub async fn create<T: Entity>(&mut self, record: &mut T) -> Result<()> {
        entity::ensure_id(record);
        if let Some(flag) = record.exclusive_flag() {
            let cleared =
                entity::clear_exclusive::<T>(self.conn(), record.id(), &flag, Utc::now()).await?;
            debug!(entity = T::NAME, id = %record.id(), cleared, "Reset exclusive flag");
        }
        entity::insert(self.conn(), record).await
    }

    /// Overwrite an existing entity and refresh its update time.
    pub async fn update<T: Entity>(&mut self, record: &mut T) -> Result<()> {
        let now = Utc::now();
        record.set_updated_at(now);
        if let Some(flag) = record.exclusive_flag() {
            let cleared = entity::clear_exclusive::<T>(self.conn(), record.id(), &flag, now).await?;
            debug!(entity = T::NAME, id = %record.id(), cleared, "Reset exclusive flag");
        }
        entity::overwrite(self.conn(), record).await
    }

    pub async fn delete<T: Entity>(&mut self, id: &str) -> Result<()> {
        entity::remove::<T>(self.conn(), id).await
    }

    pub async fn commit(self) -> Result<()> {
        self.inner.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.inner.rollback().await?;
        Ok(())
    }
}
