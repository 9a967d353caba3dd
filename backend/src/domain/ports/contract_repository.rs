//! Port for contract persistence, including the creation cascade.

use async_trait::async_trait;

use crate::domain::{Contract, ContractId, ContractPlan, RecordName, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by contract repository adapters.
    pub enum ContractRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "contract repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "contract repository query failed: {message}",
        /// The owner already has a contract with this name, ignoring case.
        DuplicateName { name: String } =>
            "contract named {name} already exists for this owner",
    }
}

/// Owner-scoped contract storage.
///
/// Every read and delete filters on the owner; another user's contract is
/// reported exactly like a missing one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// Whether `owner` has a contract whose name matches `name` ignoring case.
    async fn name_exists(
        &self,
        owner: &UserId,
        name: &RecordName,
    ) -> Result<bool, ContractRepositoryError>;

    /// Write the contract, its gardens, their plants and every link row
    /// atomically. Nothing is persisted when any write fails.
    async fn create_with_cascade(
        &self,
        plan: &ContractPlan,
    ) -> Result<Contract, ContractRepositoryError>;

    /// Contracts owned by `owner`, newest first.
    async fn list_for_owner(&self, owner: &UserId)
    -> Result<Vec<Contract>, ContractRepositoryError>;

    async fn find_for_owner(
        &self,
        owner: &UserId,
        id: &ContractId,
    ) -> Result<Option<Contract>, ContractRepositoryError>;

    /// Remove the contract and its garden links; returns `false` when no
    /// contract matched.
    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: &ContractId,
    ) -> Result<bool, ContractRepositoryError>;
}
