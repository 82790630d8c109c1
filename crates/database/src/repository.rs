//! Pool-backed CRUD for one entity type.

use std::marker::PhantomData;

use chrono::Utc;
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool};

use crate::entity::{self, Entity};
use crate::error::Result;
use crate::transaction::Transaction;

/// CRUD over a single table.
///
/// Entity-specific lookups are provided as inherent impls on the concrete
/// instantiation (for example `Repository<User>::find_by_handle`).
pub struct Repository<T> {
    pool: SqlitePool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<T> Repository<T> {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    pub(crate) async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }
}

impl<T: Entity> Repository<T> {
    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        let mut conn = self.acquire().await?;
        entity::fetch_by_id(&mut conn, id).await
    }

    pub async fn find_all(&self) -> Result<Vec<T>> {
        let mut conn = self.acquire().await?;
        entity::fetch_all(&mut conn).await
    }

    /// Insert an entity, assigning an id if it has none.
    ///
    /// Writes that set an exclusive flag run in their own transaction so the
    /// sibling reset and the insert commit together; other writes go straight
    /// to the pool.
    pub async fn create(&self, record: &mut T) -> Result<()> {
        if record.exclusive_flag().is_some() {
            let mut tx = Transaction::begin(&self.pool).await?;
            tx.create(record).await?;
            return tx.commit().await;
        }

        entity::ensure_id(record);
        let mut conn = self.acquire().await?;
        entity::insert(&mut conn, record).await
    }

    /// Overwrite an existing entity and refresh its update time.
    pub async fn update(&self, record: &mut T) -> Result<()> {
        if record.exclusive_flag().is_some() {
            let mut tx = Transaction::begin(&self.pool).await?;
            tx.update(record).await?;
            return tx.commit().await;
        }

        record.set_updated_at(Utc::now());
        let mut conn = self.acquire().await?;
        entity::overwrite(&mut conn, record).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut conn = self.acquire().await?;
        entity::remove::<T>(&mut conn, id).await
    }
}
