//! Contract services.
//!
//! Creation validates name uniqueness for the caller, expands the request into
//! a [`ContractPlan`] and hands the whole plan to the repository, which owns
//! the transaction boundary.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    ContractCommand, ContractQuery, ContractRepository, ContractRepositoryError,
};
use crate::domain::{Contract, ContractId, ContractPlan, Error, NewContract, UserId};

/// Message returned when the caller already owns a contract with the name.
pub const DUPLICATE_CONTRACT_MESSAGE: &str = "contract with name already exists";
/// Message returned for records that are missing or owned by someone else.
pub const NOT_FOUND_MESSAGE: &str = "Not found.";

fn duplicate_name_error() -> Error {
    Error::invalid_field("name", "duplicate", DUPLICATE_CONTRACT_MESSAGE)
}

fn map_repository_error(error: ContractRepositoryError) -> Error {
    match error {
        ContractRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("contract repository unavailable: {message}"))
        }
        ContractRepositoryError::Query { message } => {
            Error::internal(format!("contract repository error: {message}"))
        }
        ContractRepositoryError::DuplicateName { .. } => duplicate_name_error(),
    }
}

/// Contract service implementing the contract driving ports.
#[derive(Clone)]
pub struct ContractService<R> {
    contracts: Arc<R>,
}

impl<R> ContractService<R> {
    pub fn new(contracts: Arc<R>) -> Self {
        Self { contracts }
    }
}

#[async_trait]
impl<R> ContractCommand for ContractService<R>
where
    R: ContractRepository,
{
    async fn create(&self, owner: &UserId, request: NewContract) -> Result<Contract, Error> {
        if self
            .contracts
            .name_exists(owner, &request.name)
            .await
            .map_err(map_repository_error)?
        {
            return Err(duplicate_name_error());
        }

        let plan = ContractPlan::build(owner.clone(), request);
        let contract = self
            .contracts
            .create_with_cascade(&plan)
            .await
            .map_err(map_repository_error)?;
        info!(
            contract_id = %contract.id,
            owner = %owner,
            gardens = plan.gardens.len(),
            plants = plan.plant_count(),
            "contract created"
        );
        Ok(contract)
    }

    async fn delete(&self, owner: &UserId, id: &ContractId) -> Result<(), Error> {
        let removed = self
            .contracts
            .delete_for_owner(owner, id)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(Error::not_found(NOT_FOUND_MESSAGE));
        }
        info!(contract_id = %id, owner = %owner, "contract deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> ContractQuery for ContractService<R>
where
    R: ContractRepository,
{
    async fn list(&self, owner: &UserId) -> Result<Vec<Contract>, Error> {
        self.contracts
            .list_for_owner(owner)
            .await
            .map_err(map_repository_error)
    }

    async fn get(&self, owner: &UserId, id: &ContractId) -> Result<Contract, Error> {
        self.contracts
            .find_for_owner(owner, id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND_MESSAGE))
    }
}

#[cfg(test)]
#[path = "contract_service_tests.rs"]
mod tests;
