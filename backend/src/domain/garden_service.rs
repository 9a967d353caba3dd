//! Garden and plant services.
//!
//! Both entities are only reachable through owner-scoped repository calls, so
//! a record owned by another user surfaces as `not_found`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::contract_service::NOT_FOUND_MESSAGE;
use crate::domain::ports::{
    GardenCommand, GardenFilter, GardenQuery, GardenRepository, GardenRepositoryError,
    PlantCommand, PlantQuery, PlantRepository, PlantRepositoryError,
};
use crate::domain::{Error, Garden, GardenChanges, GardenId, Plant, PlantChanges, PlantId, UserId};

fn map_garden_error(error: GardenRepositoryError) -> Error {
    match error {
        GardenRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("garden repository unavailable: {message}"))
        }
        GardenRepositoryError::Query { message } => {
            Error::internal(format!("garden repository error: {message}"))
        }
    }
}

fn map_plant_error(error: PlantRepositoryError) -> Error {
    match error {
        PlantRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("plant repository unavailable: {message}"))
        }
        PlantRepositoryError::Query { message } => {
            Error::internal(format!("plant repository error: {message}"))
        }
    }
}

fn not_found() -> Error {
    Error::not_found(NOT_FOUND_MESSAGE)
}

/// Garden service implementing the garden driving ports.
#[derive(Clone)]
pub struct GardenService<R> {
    gardens: Arc<R>,
}

impl<R> GardenService<R> {
    pub fn new(gardens: Arc<R>) -> Self {
        Self { gardens }
    }
}

#[async_trait]
impl<R> GardenCommand for GardenService<R>
where
    R: GardenRepository,
{
    async fn update(
        &self,
        owner: &UserId,
        id: GardenId,
        changes: GardenChanges,
    ) -> Result<Garden, Error> {
        self.gardens
            .update_for_owner(owner, id, &changes)
            .await
            .map_err(map_garden_error)?
            .ok_or_else(not_found)
    }

    async fn delete(&self, owner: &UserId, id: GardenId) -> Result<(), Error> {
        if !self
            .gardens
            .delete_for_owner(owner, id)
            .await
            .map_err(map_garden_error)?
        {
            return Err(not_found());
        }
        info!(garden_id = %id, owner = %owner, "garden deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> GardenQuery for GardenService<R>
where
    R: GardenRepository,
{
    async fn list(&self, owner: &UserId, filter: GardenFilter) -> Result<Vec<Garden>, Error> {
        self.gardens
            .list_for_owner(owner, &filter)
            .await
            .map_err(map_garden_error)
    }

    async fn get(&self, owner: &UserId, id: GardenId) -> Result<Garden, Error> {
        self.gardens
            .find_for_owner(owner, id)
            .await
            .map_err(map_garden_error)?
            .ok_or_else(not_found)
    }
}

/// Plant service implementing the plant driving ports.
#[derive(Clone)]
pub struct PlantService<R> {
    plants: Arc<R>,
}

impl<R> PlantService<R> {
    pub fn new(plants: Arc<R>) -> Self {
        Self { plants }
    }
}

#[async_trait]
impl<R> PlantCommand for PlantService<R>
where
    R: PlantRepository,
{
    async fn update(
        &self,
        owner: &UserId,
        id: PlantId,
        changes: PlantChanges,
    ) -> Result<Plant, Error> {
        self.plants
            .update_for_owner(owner, id, &changes)
            .await
            .map_err(map_plant_error)?
            .ok_or_else(not_found)
    }

    async fn delete(&self, owner: &UserId, id: PlantId) -> Result<(), Error> {
        if !self
            .plants
            .delete_for_owner(owner, id)
            .await
            .map_err(map_plant_error)?
        {
            return Err(not_found());
        }
        Ok(())
    }
}

#[async_trait]
impl<R> PlantQuery for PlantService<R>
where
    R: PlantRepository,
{
    async fn list(&self, owner: &UserId) -> Result<Vec<Plant>, Error> {
        self.plants
            .list_for_owner(owner)
            .await
            .map_err(map_plant_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockGardenRepository, MockPlantRepository};
    use crate::domain::{ErrorCode, Level, RecordName};
    use rstest::rstest;

    fn garden(owner: &UserId) -> Garden {
        Garden {
            id: GardenId::new(7),
            owner: owner.clone(),
            name: RecordName::new("orchard").expect("valid"),
            level: Level::default(),
            plants: Vec::new(),
        }
    }

    #[tokio::test]
    async fn list_passes_name_filter_through() {
        let owner = UserId::random();
        let listed = vec![garden(&owner)];
        let mut repo = MockGardenRepository::new();
        repo.expect_list_for_owner()
            .withf(|_, filter| filter.name_contains.as_deref() == Some("orch"))
            .return_once(move |_, _| Ok(listed));

        let gardens = GardenService::new(Arc::new(repo))
            .list(
                &owner,
                GardenFilter {
                    name_contains: Some("orch".to_owned()),
                },
            )
            .await
            .expect("listed");

        assert_eq!(gardens.len(), 1);
    }

    #[tokio::test]
    async fn update_of_foreign_garden_is_not_found() {
        let mut repo = MockGardenRepository::new();
        repo.expect_update_for_owner().returning(|_, _, _| Ok(None));

        let error = GardenService::new(Arc::new(repo))
            .update(&UserId::random(), GardenId::new(1), GardenChanges::default())
            .await
            .expect_err("foreign garden");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(GardenRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(GardenRepositoryError::query("broken"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn garden_failures_are_mapped(
        #[case] failure: GardenRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockGardenRepository::new();
        repo.expect_find_for_owner()
            .return_once(move |_, _| Err(failure));

        let error = GardenService::new(Arc::new(repo))
            .get(&UserId::random(), GardenId::new(1))
            .await
            .expect_err("failure");

        assert_eq!(error.code(), expected);
    }

    #[rstest]
    #[case(true, None)]
    #[case(false, Some(ErrorCode::NotFound))]
    #[tokio::test]
    async fn garden_delete_outcomes(#[case] removed: bool, #[case] expected: Option<ErrorCode>) {
        let mut repo = MockGardenRepository::new();
        repo.expect_delete_for_owner()
            .returning(move |_, _| Ok(removed));

        let result = GardenService::new(Arc::new(repo))
            .delete(&UserId::random(), GardenId::new(3))
            .await;

        assert_eq!(result.err().map(|err| err.code()), expected);
    }

    #[rstest]
    #[case(true, None)]
    #[case(false, Some(ErrorCode::NotFound))]
    #[tokio::test]
    async fn plant_delete_outcomes(#[case] removed: bool, #[case] expected: Option<ErrorCode>) {
        let mut repo = MockPlantRepository::new();
        repo.expect_delete_for_owner()
            .returning(move |_, _| Ok(removed));

        let result = PlantService::new(Arc::new(repo))
            .delete(&UserId::random(), PlantId::new(3))
            .await;

        assert_eq!(result.err().map(|err| err.code()), expected);
    }

    #[tokio::test]
    async fn plant_outage_is_service_unavailable() {
        let mut repo = MockPlantRepository::new();
        repo.expect_list_for_owner()
            .returning(|_| Err(PlantRepositoryError::connection("refused")));

        let error = PlantService::new(Arc::new(repo))
            .list(&UserId::random())
            .await
            .expect_err("outage");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
