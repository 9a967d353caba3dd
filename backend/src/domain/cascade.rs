//! Contract creation cascade.
//!
//! Creating a contract synthesises `level * 10` gardens, each inheriting the
//! contract's name, level and owner. Every garden in turn receives
//! `garden.level * 10` default plants owned by the garden's owner. The plan is
//! pure data; a repository applies it inside one transaction.


use super::{ContractId, Level, PlantTelemetry, RecordName, UserId};

/// Children created per unit of level.
pub const FAN_OUT_PER_LEVEL: usize = 10;
/// Name given to every synthesised plant.
pub const DEFAULT_PLANT_NAME: &str = "newplant";

/// Validated input for a new contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContract {
    pub name: RecordName,
    pub description: String,
    pub level: Level,
}

/// Plant row awaiting insertion; ids are assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantDraft {
    pub owner: UserId,
    pub name: RecordName,
    pub telemetry: PlantTelemetry,
}

/// Garden row and its plants awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GardenPlan {
    pub owner: UserId,
    pub name: RecordName,
    pub level: Level,
    pub plants: Vec<PlantDraft>,
}

/// Every row written when a contract is created.
///
/// # Examples
/// ```
/// use backend::domain::{ContractPlan, Level, NewContract, RecordName, UserId};
///
/// let plan = ContractPlan::build(
///     UserId::random(),
///     NewContract {
///         name: RecordName::new("orchard").unwrap(),
///         description: String::new(),
///         level: Level::new(2).unwrap(),
///     },
/// );
/// assert_eq!(plan.gardens.len(), 20);
/// assert_eq!(plan.plant_count(), 20 * 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractPlan {
    pub id: ContractId,
    pub owner: UserId,
    pub name: RecordName,
    pub description: String,
    pub level: Level,
    pub gardens: Vec<GardenPlan>,
}

impl ContractPlan {
    /// Expand a validated contract request into its full cascade.
    pub fn build(owner: UserId, contract: NewContract) -> Self {
        let NewContract {
            name,
            description,
            level,
        } = contract;
        let gardens = (0..level.fan_out())
            .map(|_| GardenPlan::for_contract(&owner, &name, level))
            .collect();
        Self {
            id: ContractId::random(),
            owner,
            name,
            description,
            level,
            gardens,
        }
    }

    /// Total number of plants across every planned garden.
    pub fn plant_count(&self) -> usize {
        self.gardens.iter().map(|garden| garden.plants.len()).sum()
    }
}

impl GardenPlan {
    fn for_contract(owner: &UserId, name: &RecordName, level: Level) -> Self {
        let plants = (0..level.fan_out())
            .map(|_| PlantDraft::default_for(owner))
            .collect();
        Self {
            owner: owner.clone(),
            name: name.clone(),
            level,
            plants,
        }
    }
}

impl PlantDraft {
    fn default_for(owner: &UserId) -> Self {
        Self {
            owner: owner.clone(),
            name: RecordName(DEFAULT_PLANT_NAME.to_owned()),
            telemetry: PlantTelemetry::default(),
        }
    }
}
