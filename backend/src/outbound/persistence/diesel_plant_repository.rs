//! PostgreSQL-backed `PlantRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PlantRepository, PlantRepositoryError};
use crate::domain::{Plant, PlantChanges, PlantId, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_record_graph::plant_from_row;
use super::models::{PlantRow, PlantUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::plants;

/// Diesel-backed implementation of the plant repository port.
#[derive(Clone)]
pub struct DieselPlantRepository {
    pool: DbPool,
}

impl DieselPlantRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PlantRepositoryError {
    map_basic_pool_error(error, PlantRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PlantRepositoryError {
    map_basic_diesel_error(
        error,
        PlantRepositoryError::query,
        PlantRepositoryError::connection,
    )
}

fn to_domain(row: PlantRow) -> Result<Plant, PlantRepositoryError> {
    plant_from_row(row).map_err(|err| PlantRepositoryError::query(err.to_string()))
}

fn changeset(changes: &PlantChanges) -> PlantUpdate<'_> {
    let telemetry = &changes.telemetry;
    PlantUpdate {
        name: changes.name.as_ref().map(AsRef::as_ref),
        soil_moisture: telemetry.soil_moisture,
        fertilizer_rate: telemetry.fertilizer_rate,
        height: telemetry.height,
        stem_count: telemetry.stem_count,
        health_score: telemetry.health_score,
        is_present: telemetry.is_present,
        soil_cohesion: telemetry.soil_cohesion,
        disease_index: telemetry.disease_index,
        insect_density: telemetry.insect_density,
    }
}

#[async_trait]
impl PlantRepository for DieselPlantRepository {
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Plant>, PlantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        plants::table
            .filter(plants::user_id.eq(owner.as_uuid()))
            .order(plants::id.asc())
            .select(PlantRow::as_select())
            .load::<PlantRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn update_for_owner(
        &self,
        owner: &UserId,
        id: PlantId,
        changes: &PlantChanges,
    ) -> Result<Option<Plant>, PlantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let scoped = plants::table
            .filter(plants::id.eq(id.get()))
            .filter(plants::user_id.eq(owner.as_uuid()));

        let row = if changes.name.is_none() && changes.telemetry.is_empty() {
            scoped
                .select(PlantRow::as_select())
                .first::<PlantRow>(&mut conn)
                .await
        } else {
            diesel::update(scoped)
                .set(&changeset(changes))
                .returning(PlantRow::as_returning())
                .get_result::<PlantRow>(&mut conn)
                .await
        }
        .optional()
        .map_err(map_diesel_error)?;

        row.map(to_domain).transpose()
    }

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: PlantId,
    ) -> Result<bool, PlantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(
            plants::table
                .filter(plants::id.eq(id.get()))
                .filter(plants::user_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map(|deleted| deleted > 0)
        .map_err(map_diesel_error)
    }
}
