//! Driving ports for plant use-cases.

use async_trait::async_trait;

use crate::domain::{Error, Plant, PlantChanges, PlantId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlantCommand: Send + Sync {
    async fn update(
        &self,
        owner: &UserId,
        id: PlantId,
        changes: PlantChanges,
    ) -> Result<Plant, Error>;

    async fn delete(&self, owner: &UserId, id: PlantId) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlantQuery: Send + Sync {
    async fn list(&self, owner: &UserId) -> Result<Vec<Plant>, Error>;
}
