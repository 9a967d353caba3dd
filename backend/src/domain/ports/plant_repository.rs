//! Port for plant persistence.

use async_trait::async_trait;

use crate::domain::{Plant, PlantChanges, PlantId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by plant repository adapters.
    pub enum PlantRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "plant repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "plant repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlantRepository: Send + Sync {
    /// Plants owned by `owner`, ordered by id.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Plant>, PlantRepositoryError>;

    async fn update_for_owner(
        &self,
        owner: &UserId,
        id: PlantId,
        changes: &PlantChanges,
    ) -> Result<Option<Plant>, PlantRepositoryError>;

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: PlantId,
    ) -> Result<bool, PlantRepositoryError>;
}
