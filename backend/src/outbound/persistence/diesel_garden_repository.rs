//! PostgreSQL-backed `GardenRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{GardenFilter, GardenRepository, GardenRepositoryError};
use crate::domain::{Garden, GardenChanges, GardenId, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_record_graph::{GraphLoadError, assemble_gardens};
use super::models::{GardenRow, GardenUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::gardens;

/// Diesel-backed implementation of the garden repository port.
#[derive(Clone)]
pub struct DieselGardenRepository {
    pool: DbPool,
}

impl DieselGardenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GardenRepositoryError {
    map_basic_pool_error(error, GardenRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> GardenRepositoryError {
    map_basic_diesel_error(
        error,
        GardenRepositoryError::query,
        GardenRepositoryError::connection,
    )
}

fn map_graph_error(error: GraphLoadError) -> GardenRepositoryError {
    match error {
        GraphLoadError::Diesel(err) => map_diesel_error(err),
        invalid @ GraphLoadError::InvalidRow { .. } => {
            GardenRepositoryError::query(invalid.to_string())
        }
    }
}

/// Build an `ILIKE` pattern matching `needle` anywhere, with wildcards escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

impl DieselGardenRepository {
    async fn load_one(
        &self,
        owner: &UserId,
        id: GardenId,
    ) -> Result<Option<Garden>, GardenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(row) = gardens::table
            .filter(gardens::id.eq(id.get()))
            .filter(gardens::user_id.eq(owner.as_uuid()))
            .select(GardenRow::as_select())
            .first::<GardenRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };

        let mut assembled = assemble_gardens(&mut conn, vec![row])
            .await
            .map_err(map_graph_error)?;
        Ok(assembled.pop())
    }
}

#[async_trait]
impl GardenRepository for DieselGardenRepository {
    async fn list_for_owner(
        &self,
        owner: &UserId,
        filter: &GardenFilter,
    ) -> Result<Vec<Garden>, GardenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = gardens::table
            .filter(gardens::user_id.eq(owner.as_uuid()))
            .select(GardenRow::as_select())
            .into_boxed();
        if let Some(needle) = filter.name_contains.as_deref() {
            query = query.filter(gardens::name.ilike(contains_pattern(needle)));
        }
        let rows = query
            .order((gardens::name.desc(), gardens::id.asc()))
            .load::<GardenRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        assemble_gardens(&mut conn, rows)
            .await
            .map_err(map_graph_error)
    }

    async fn find_for_owner(
        &self,
        owner: &UserId,
        id: GardenId,
    ) -> Result<Option<Garden>, GardenRepositoryError> {
        self.load_one(owner, id).await
    }

    async fn update_for_owner(
        &self,
        owner: &UserId,
        id: GardenId,
        changes: &GardenChanges,
    ) -> Result<Option<Garden>, GardenRepositoryError> {
        if changes.name.is_none() && changes.level.is_none() {
            return self.load_one(owner, id).await;
        }

        let update = GardenUpdate {
            name: changes.name.as_ref().map(AsRef::as_ref),
            level: changes.level.map(|level| level.get()),
        };
        let updated = {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(
                gardens::table
                    .filter(gardens::id.eq(id.get()))
                    .filter(gardens::user_id.eq(owner.as_uuid())),
            )
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.load_one(owner, id).await
    }

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: GardenId,
    ) -> Result<bool, GardenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(
            gardens::table
                .filter(gardens::id.eq(id.get()))
                .filter(gardens::user_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map(|deleted| deleted > 0)
        .map_err(map_diesel_error)
    }
}
