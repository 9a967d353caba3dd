//! Loading and assembly of the contract → garden → plant graph.
//!
//! Children are fetched through the link tables in one query per level and
//! stitched together in memory, so listing N contracts costs three queries.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::{
    Contract, ContractId, Garden, GardenId, Level, Plant, PlantId, PlantTelemetry, RecordName,
    UserId,
};

use super::models::{ContractRow, GardenRow, PlantRow};
use super::schema::{contract_gardens, garden_plants, gardens, plants};

/// Failures while loading or converting stored records.
#[derive(Debug, thiserror::Error)]
pub(super) enum GraphLoadError {
    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),
    #[error("stored {record} row is invalid: {reason}")]
    InvalidRow {
        record: &'static str,
        reason: String,
    },
}

fn invalid(record: &'static str, reason: impl ToString) -> GraphLoadError {
    GraphLoadError::InvalidRow {
        record,
        reason: reason.to_string(),
    }
}

pub(super) fn plant_from_row(row: PlantRow) -> Result<Plant, GraphLoadError> {
    let name = RecordName::new(&row.name).map_err(|err| invalid("plant", err))?;
    Ok(Plant {
        id: PlantId::new(row.id),
        garden_id: GardenId::new(row.garden_id),
        owner: UserId::from(row.user_id),
        name,
        telemetry: PlantTelemetry {
            soil_moisture: row.soil_moisture,
            fertilizer_rate: row.fertilizer_rate,
            height: row.height,
            stem_count: row.stem_count,
            health_score: row.health_score,
            is_present: row.is_present,
            soil_cohesion: row.soil_cohesion,
            disease_index: row.disease_index,
            insect_density: row.insect_density,
        },
    })
}

pub(super) fn garden_from_row(row: GardenRow, plants: Vec<Plant>) -> Result<Garden, GraphLoadError> {
    let name = RecordName::new(&row.name).map_err(|err| invalid("garden", err))?;
    let level = Level::new(i64::from(row.level)).map_err(|err| invalid("garden", err))?;
    Ok(Garden {
        id: GardenId::new(row.id),
        owner: UserId::from(row.user_id),
        name,
        level,
        plants,
    })
}

pub(super) fn contract_from_row(
    row: ContractRow,
    gardens: Vec<Garden>,
) -> Result<Contract, GraphLoadError> {
    let name = RecordName::new(&row.name).map_err(|err| invalid("contract", err))?;
    let level = Level::new(i64::from(row.level)).map_err(|err| invalid("contract", err))?;
    Ok(Contract {
        id: ContractId::from(row.id),
        owner: UserId::from(row.user_id),
        name,
        description: row.description,
        level,
        created_at: row.created_at,
        gardens,
    })
}

/// Group rows under their parent key, keeping the incoming order.
fn group_by_parent<K, V>(pairs: Vec<(K, V)>) -> HashMap<K, Vec<V>>
where
    K: std::hash::Hash + Eq,
{
    let mut grouped: HashMap<K, Vec<V>> = HashMap::new();
    for (parent, child) in pairs {
        grouped.entry(parent).or_default().push(child);
    }
    grouped
}

/// Attach plants to already-fetched garden rows.
pub(super) async fn assemble_gardens(
    conn: &mut AsyncPgConnection,
    rows: Vec<GardenRow>,
) -> Result<Vec<Garden>, GraphLoadError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let garden_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let linked: Vec<(i64, PlantRow)> = garden_plants::table
        .inner_join(plants::table)
        .filter(garden_plants::garden_id.eq_any(&garden_ids))
        .order(plants::id.asc())
        .select((garden_plants::garden_id, PlantRow::as_select()))
        .load(conn)
        .await?;

    let mut plants_by_garden = group_by_parent(linked);
    rows.into_iter()
        .map(|row| {
            let plants = plants_by_garden
                .remove(&row.id)
                .unwrap_or_default()
                .into_iter()
                .map(plant_from_row)
                .collect::<Result<Vec<_>, _>>()?;
            garden_from_row(row, plants)
        })
        .collect()
}

/// Attach gardens (and their plants) to already-fetched contract rows.
pub(super) async fn assemble_contracts(
    conn: &mut AsyncPgConnection,
    rows: Vec<ContractRow>,
) -> Result<Vec<Contract>, GraphLoadError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let contract_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let linked: Vec<(Uuid, GardenRow)> = contract_gardens::table
        .inner_join(gardens::table)
        .filter(contract_gardens::contract_id.eq_any(&contract_ids))
        .order(gardens::id.asc())
        .select((contract_gardens::contract_id, GardenRow::as_select()))
        .load(conn)
        .await?;

    // The cascade links each garden to exactly one contract.
    let contract_for_garden: HashMap<i64, Uuid> = linked
        .iter()
        .map(|(contract_id, garden)| (garden.id, *contract_id))
        .collect();
    let garden_rows = linked.into_iter().map(|(_, garden)| garden).collect();
    let gardens = assemble_gardens(conn, garden_rows).await?;

    let mut gardens_by_contract = group_by_parent(
        gardens
            .into_iter()
            .filter_map(|garden| {
                contract_for_garden
                    .get(&garden.id.get())
                    .map(|contract_id| (*contract_id, garden))
            })
            .collect(),
    );
    rows.into_iter()
        .map(|row| {
            let gardens = gardens_by_contract.remove(&row.id).unwrap_or_default();
            contract_from_row(row, gardens)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn plant_row(id: i64, garden_id: i64, name: &str) -> PlantRow {
        PlantRow {
            id,
            garden_id,
            user_id: Uuid::nil(),
            name: name.to_owned(),
            soil_moisture: 40,
            fertilizer_rate: 0,
            height: 3,
            stem_count: 1,
            health_score: 0,
            is_present: true,
            soil_cohesion: 0,
            disease_index: 0,
            insect_density: 0,
        }
    }

    #[test]
    fn plant_rows_keep_their_telemetry() {
        let plant = plant_from_row(plant_row(9, 2, "newplant")).expect("valid row");
        assert_eq!(plant.id.get(), 9);
        assert_eq!(plant.garden_id.get(), 2);
        assert_eq!(plant.telemetry.soil_moisture, 40);
        assert!(plant.telemetry.is_present);
    }

    #[test]
    fn blank_stored_names_are_reported() {
        let err = plant_from_row(plant_row(1, 1, "  ")).expect_err("blank name");
        assert!(matches!(err, GraphLoadError::InvalidRow { record: "plant", .. }));
    }

    #[test]
    fn out_of_range_levels_are_reported() {
        let row = ContractRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "orchard".to_owned(),
            description: String::new(),
            level: 9,
            created_at: Utc::now(),
        };
        let err = contract_from_row(row, Vec::new()).expect_err("level 9");
        assert!(err.to_string().contains("contract"));
    }

    #[test]
    fn grouping_preserves_child_order() {
        let grouped = group_by_parent(vec![(1, "a"), (2, "b"), (1, "c")]);
        assert_eq!(grouped.get(&1), Some(&vec!["a", "c"]));
        assert_eq!(grouped.get(&2), Some(&vec!["b"]));
    }
}
