//! Driving ports for contract use-cases.

use async_trait::async_trait;

use crate::domain::{Contract, ContractId, Error, NewContract, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContractCommand: Send + Sync {
    /// Create a contract and its full garden and plant cascade.
    async fn create(&self, owner: &UserId, request: NewContract) -> Result<Contract, Error>;

    /// Delete a contract owned by `owner`; `not_found` otherwise.
    async fn delete(&self, owner: &UserId, id: &ContractId) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContractQuery: Send + Sync {
    /// Contracts owned by `owner`, newest first.
    async fn list(&self, owner: &UserId) -> Result<Vec<Contract>, Error>;

    async fn get(&self, owner: &UserId, id: &ContractId) -> Result<Contract, Error>;
}
