//! Port for garden persistence.

use async_trait::async_trait;

use crate::domain::{Garden, GardenChanges, GardenId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by garden repository adapters.
    pub enum GardenRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "garden repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "garden repository query failed: {message}",
    }
}

/// Listing filter for gardens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GardenFilter {
    /// Case-insensitive substring the garden name must contain.
    pub name_contains: Option<String>,
}

/// Owner-scoped garden storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GardenRepository: Send + Sync {
    /// Gardens owned by `owner`, ordered by name descending then id.
    async fn list_for_owner(
        &self,
        owner: &UserId,
        filter: &GardenFilter,
    ) -> Result<Vec<Garden>, GardenRepositoryError>;

    async fn find_for_owner(
        &self,
        owner: &UserId,
        id: GardenId,
    ) -> Result<Option<Garden>, GardenRepositoryError>;

    /// Apply `changes` and return the updated garden, or `None` when no
    /// garden matched.
    async fn update_for_owner(
        &self,
        owner: &UserId,
        id: GardenId,
        changes: &GardenChanges,
    ) -> Result<Option<Garden>, GardenRepositoryError>;

    /// Remove the garden, its plants and its link rows.
    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: GardenId,
    ) -> Result<bool, GardenRepositoryError>;
}
