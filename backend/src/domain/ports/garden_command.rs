//! Driving ports for garden use-cases.

use async_trait::async_trait;

use crate::domain::{Error, Garden, GardenChanges, GardenId, UserId};

use super::GardenFilter;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GardenCommand: Send + Sync {
    async fn update(
        &self,
        owner: &UserId,
        id: GardenId,
        changes: GardenChanges,
    ) -> Result<Garden, Error>;

    async fn delete(&self, owner: &UserId, id: GardenId) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GardenQuery: Send + Sync {
    async fn list(&self, owner: &UserId, filter: GardenFilter) -> Result<Vec<Garden>, Error>;

    async fn get(&self, owner: &UserId, id: GardenId) -> Result<Garden, Error>;
}
