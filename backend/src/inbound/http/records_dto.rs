//! JSON representations of contracts, gardens and plants.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Contract, Garden, Plant};

/// Plant with its telemetry readings.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PlantResponse {
    #[schema(example = 1)]
    pub id: i64,
    pub garden_id: i64,
    #[schema(example = "newplant")]
    pub name: String,
    pub soil_moisture: i32,
    pub fertilizer_rate: i32,
    pub height: i32,
    pub stem_count: i32,
    pub health_score: i32,
    pub is_present: bool,
    pub soil_cohesion: i32,
    pub disease_index: i32,
    pub insect_density: i32,
}

impl From<&Plant> for PlantResponse {
    fn from(plant: &Plant) -> Self {
        let telemetry = plant.telemetry;
        Self {
            id: plant.id.get(),
            garden_id: plant.garden_id.get(),
            name: plant.name.to_string(),
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
}

/// Garden with its plants, ordered by plant id.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GardenResponse {
    pub id: i64,
    pub name: String,
    #[schema(minimum = 1, maximum = 3)]
    pub level: i16,
    pub plants: Vec<PlantResponse>,
}

impl From<&Garden> for GardenResponse {
    fn from(garden: &Garden) -> Self {
        Self {
            id: garden.id.get(),
            name: garden.name.to_string(),
            level: garden.level.get(),
            plants: garden.plants.iter().map(PlantResponse::from).collect(),
        }
    }
}

/// Contract as shown in listings; omits the description.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ContractSummary {
    #[schema(example = "7f2c5c3e-2d0b-4c52-9a55-1f5c1d1b9e4a")]
    pub id: String,
    pub name: String,
    #[schema(minimum = 1, maximum = 3)]
    pub level: i16,
    pub gardens: Vec<GardenResponse>,
}

impl From<&Contract> for ContractSummary {
    fn from(contract: &Contract) -> Self {
        Self {
            id: contract.id.to_string(),
            name: contract.name.to_string(),
            level: contract.level.get(),
            gardens: contract.gardens.iter().map(GardenResponse::from).collect(),
        }
    }
}

/// Full contract representation.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ContractDetail {
    #[serde(flatten)]
    pub summary: ContractSummary,
    pub description: String,
}

impl From<&Contract> for ContractDetail {
    fn from(contract: &Contract) -> Self {
        Self {
            summary: ContractSummary::from(contract),
            description: contract.description.clone(),
        }
    }
}

/// Envelope used by the contract listing.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ContractList {
    pub result: Vec<ContractSummary>,
}
