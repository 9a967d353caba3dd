//! PostgreSQL-backed `ContractRepository` implementation.
//!
//! Contract creation writes the contract, its gardens, their plants and every
//! link row inside one transaction. A failure at any step rolls the whole
//! cascade back.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{ContractRepository, ContractRepositoryError};
use crate::domain::{Contract, ContractId, ContractPlan, RecordName, UserId};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_record_graph::{
    GraphLoadError, assemble_contracts, contract_from_row, garden_from_row, plant_from_row,
};
use super::models::{
    ContractGardenLink, ContractRow, GardenPlantLink, GardenRow, NewContractRow, NewGardenRow,
    NewPlantRow, PlantRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{contract_gardens, contracts, garden_plants, gardens, plants};

/// Diesel-backed implementation of the contract repository port.
#[derive(Clone)]
pub struct DieselContractRepository {
    pool: DbPool,
}

impl DieselContractRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ContractRepositoryError {
    map_basic_pool_error(error, ContractRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ContractRepositoryError {
    map_basic_diesel_error(
        error,
        ContractRepositoryError::query,
        ContractRepositoryError::connection,
    )
}

fn map_graph_error(error: GraphLoadError) -> ContractRepositoryError {
    match error {
        GraphLoadError::Diesel(err) => map_diesel_error(err),
        invalid @ GraphLoadError::InvalidRow { .. } => {
            ContractRepositoryError::query(invalid.to_string())
        }
    }
}

/// Rows returned by the cascade insert, ready for assembly.
struct InsertedCascade {
    contract: ContractRow,
    gardens: Vec<GardenRow>,
    plants: Vec<PlantRow>,
}

impl InsertedCascade {
    fn into_contract(self) -> Result<Contract, GraphLoadError> {
        let mut plants_by_garden: HashMap<i64, Vec<PlantRow>> = HashMap::new();
        let mut plants = self.plants;
        plants.sort_by_key(|row| row.id);
        for plant in plants {
            plants_by_garden.entry(plant.garden_id).or_default().push(plant);
        }

        let mut garden_rows = self.gardens;
        garden_rows.sort_by_key(|row| row.id);
        let gardens = garden_rows
            .into_iter()
            .map(|row| {
                let plants = plants_by_garden
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(plant_from_row)
                    .collect::<Result<Vec<_>, _>>()?;
                garden_from_row(row, plants)
            })
            .collect::<Result<Vec<_>, _>>()?;
        contract_from_row(self.contract, gardens)
    }
}

async fn insert_cascade(
    conn: &mut diesel_async::AsyncPgConnection,
    plan: &ContractPlan,
) -> QueryResult<InsertedCascade> {
    let name_folded = plan.name.folded();
    let contract = diesel::insert_into(contracts::table)
        .values(&NewContractRow {
            id: *plan.id.as_uuid(),
            user_id: *plan.owner.as_uuid(),
            name: plan.name.as_ref(),
            name_folded: &name_folded,
            description: plan.description.as_str(),
            level: plan.level.get(),
        })
        .returning(ContractRow::as_returning())
        .get_result::<ContractRow>(conn)
        .await?;

    if plan.gardens.is_empty() {
        return Ok(InsertedCascade {
            contract,
            gardens: Vec::new(),
            plants: Vec::new(),
        });
    }

    let new_gardens: Vec<NewGardenRow<'_>> = plan
        .gardens
        .iter()
        .map(|garden| NewGardenRow {
            user_id: *garden.owner.as_uuid(),
            name: garden.name.as_ref(),
            level: garden.level.get(),
        })
        .collect();
    let garden_rows = diesel::insert_into(gardens::table)
        .values(&new_gardens)
        .returning(GardenRow::as_returning())
        .get_results::<GardenRow>(conn)
        .await?;

    let garden_links: Vec<ContractGardenLink> = garden_rows
        .iter()
        .map(|garden| ContractGardenLink {
            contract_id: contract.id,
            garden_id: garden.id,
        })
        .collect();
    diesel::insert_into(contract_gardens::table)
        .values(&garden_links)
        .execute(conn)
        .await?;

    // Postgres returns multi-row insert results in VALUES order.
    let new_plants: Vec<NewPlantRow<'_>> = garden_rows
        .iter()
        .zip(&plan.gardens)
        .flat_map(|(row, garden)| {
            garden.plants.iter().map(move |plant| NewPlantRow {
                garden_id: row.id,
                user_id: *plant.owner.as_uuid(),
                name: plant.name.as_ref(),
                soil_moisture: plant.telemetry.soil_moisture,
                fertilizer_rate: plant.telemetry.fertilizer_rate,
                height: plant.telemetry.height,
                stem_count: plant.telemetry.stem_count,
                health_score: plant.telemetry.health_score,
                is_present: plant.telemetry.is_present,
                soil_cohesion: plant.telemetry.soil_cohesion,
                disease_index: plant.telemetry.disease_index,
                insect_density: plant.telemetry.insect_density,
            })
        })
        .collect();
    if new_plants.is_empty() {
        return Ok(InsertedCascade {
            contract,
            gardens: garden_rows,
            plants: Vec::new(),
        });
    }
    let plant_rows = diesel::insert_into(plants::table)
        .values(&new_plants)
        .returning(PlantRow::as_returning())
        .get_results::<PlantRow>(conn)
        .await?;

    let plant_links: Vec<GardenPlantLink> = plant_rows
        .iter()
        .map(|plant| GardenPlantLink {
            garden_id: plant.garden_id,
            plant_id: plant.id,
        })
        .collect();
    diesel::insert_into(garden_plants::table)
        .values(&plant_links)
        .execute(conn)
        .await?;

    Ok(InsertedCascade {
        contract,
        gardens: garden_rows,
        plants: plant_rows,
    })
}

#[async_trait]
impl ContractRepository for DieselContractRepository {
    async fn name_exists(
        &self,
        owner: &UserId,
        name: &RecordName,
    ) -> Result<bool, ContractRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            contracts::table
                .filter(contracts::user_id.eq(owner.as_uuid()))
                .filter(contracts::name_folded.eq(name.folded())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn create_with_cascade(
        &self,
        plan: &ContractPlan,
    ) -> Result<Contract, ContractRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let inserted = conn
            .transaction(|conn| async move { insert_cascade(conn, plan).await }.scope_boxed())
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    ContractRepositoryError::duplicate_name(plan.name.as_ref())
                } else {
                    map_diesel_error(err)
                }
            })?;

        inserted.into_contract().map_err(map_graph_error)
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Contract>, ContractRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = contracts::table
            .filter(contracts::user_id.eq(owner.as_uuid()))
            .order(contracts::seq.desc())
            .select(ContractRow::as_select())
            .load::<ContractRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        assemble_contracts(&mut conn, rows)
            .await
            .map_err(map_graph_error)
    }

    async fn find_for_owner(
        &self,
        owner: &UserId,
        id: &ContractId,
    ) -> Result<Option<Contract>, ContractRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(row) = contracts::table
            .filter(contracts::id.eq(id.as_uuid()))
            .filter(contracts::user_id.eq(owner.as_uuid()))
            .select(ContractRow::as_select())
            .first::<ContractRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };

        let mut assembled = assemble_contracts(&mut conn, vec![row])
            .await
            .map_err(map_graph_error)?;
        Ok(assembled.pop())
    }

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: &ContractId,
    ) -> Result<bool, ContractRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(
            contracts::table
                .filter(contracts::id.eq(id.as_uuid()))
                .filter(contracts::user_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map(|deleted| deleted > 0)
        .map_err(map_diesel_error)
    }
}
