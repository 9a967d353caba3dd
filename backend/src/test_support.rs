//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.
//!
//! [`InMemoryStore`] implements every driven storage port over one mutex, so
//! each call is atomic and a failed cascade leaves nothing behind, matching the
//! transactional Diesel adapters.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    AuthTokenPersistenceError, AuthTokenRepository, ContractRepository, ContractRepositoryError,
    GardenFilter, GardenRepository, GardenRepositoryError, PasswordHashError, PasswordHasher,
    PlantRepository, PlantRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Contract, ContractId, ContractPlan, EmailAddress, Garden, GardenChanges, GardenId, Level,
    PasswordDigest, Plant, PlantChanges, PlantId, ProfileChanges, RecordName, TokenDigest, User,
    UserId,
};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
struct StoredContract {
    id: ContractId,
    owner: UserId,
    name: RecordName,
    description: String,
    level: Level,
    seq: u64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredGarden {
    owner: UserId,
    name: RecordName,
    level: Level,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    tokens: HashMap<TokenDigest, UserId>,
    contracts: Vec<StoredContract>,
    gardens: BTreeMap<i64, StoredGarden>,
    plants: BTreeMap<i64, Plant>,
    contract_gardens: Vec<(ContractId, i64)>,
    garden_plants: Vec<(i64, i64)>,
    last_contract_seq: u64,
    last_garden_id: i64,
    last_plant_id: i64,
}

impl StoreState {
    fn plants_of(&self, garden_id: i64) -> Vec<Plant> {
        let mut plant_ids: Vec<i64> = self
            .garden_plants
            .iter()
            .filter(|(garden, _)| *garden == garden_id)
            .map(|(_, plant)| *plant)
            .collect();
        plant_ids.sort_unstable();
        plant_ids
            .into_iter()
            .filter_map(|id| self.plants.get(&id).cloned())
            .collect()
    }

    fn garden(&self, id: i64) -> Option<Garden> {
        self.gardens.get(&id).map(|stored| Garden {
            id: GardenId::new(id),
            owner: stored.owner.clone(),
            name: stored.name.clone(),
            level: stored.level,
            plants: self.plants_of(id),
        })
    }

    fn contract(&self, stored: &StoredContract) -> Contract {
        let mut garden_ids: Vec<i64> = self
            .contract_gardens
            .iter()
            .filter(|(contract, _)| *contract == stored.id)
            .map(|(_, garden)| *garden)
            .collect();
        garden_ids.sort_unstable();
        Contract {
            id: stored.id,
            owner: stored.owner.clone(),
            name: stored.name.clone(),
            description: stored.description.clone(),
            level: stored.level,
            created_at: stored.created_at,
            gardens: garden_ids
                .into_iter()
                .filter_map(|id| self.garden(id))
                .collect(),
        }
    }

    fn owned_garden(&self, owner: &UserId, id: GardenId) -> Option<&StoredGarden> {
        self.gardens
            .get(&id.get())
            .filter(|garden| &garden.owner == owner)
    }

    fn remove_garden(&mut self, id: i64) {
        self.gardens.remove(&id);
        self.contract_gardens.retain(|(_, garden)| *garden != id);
        let orphaned: Vec<i64> = self
            .plants
            .values()
            .filter(|plant| plant.garden_id.get() == id)
            .map(|plant| plant.id.get())
            .collect();
        for plant_id in orphaned {
            self.remove_plant(plant_id);
        }
        self.garden_plants.retain(|(garden, _)| *garden != id);
    }

    fn remove_plant(&mut self, id: i64) {
        self.plants.remove(&id);
        self.garden_plants.retain(|(_, plant)| *plant != id);
    }

    fn apply_plan(&mut self, plan: &ContractPlan) {
        self.last_contract_seq += 1;
        self.contracts.push(StoredContract {
            id: plan.id,
            owner: plan.owner.clone(),
            name: plan.name.clone(),
            description: plan.description.clone(),
            level: plan.level,
            seq: self.last_contract_seq,
            created_at: Utc::now(),
        });
        for garden in &plan.gardens {
            self.last_garden_id += 1;
            let garden_id = self.last_garden_id;
            self.gardens.insert(
                garden_id,
                StoredGarden {
                    owner: garden.owner.clone(),
                    name: garden.name.clone(),
                    level: garden.level,
                },
            );
            self.contract_gardens.push((plan.id, garden_id));
            for draft in &garden.plants {
                self.last_plant_id += 1;
                let plant_id = self.last_plant_id;
                self.plants.insert(
                    plant_id,
                    Plant {
                        id: PlantId::new(plant_id),
                        garden_id: GardenId::new(garden_id),
                        owner: draft.owner.clone(),
                        name: draft.name.clone(),
                        telemetry: draft.telemetry,
                    },
                );
                self.garden_plants.push((garden_id, plant_id));
            }
        }
    }
}

/// Storage failure injected into every subsequent call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Behave as if the database were unreachable.
    Connection,
    /// Behave as if a query failed.
    Query,
    /// Fail contract creation after the cascade has been partially applied.
    CascadeAborted,
}

/// In-memory implementation of every storage port.
///
/// Clones share the same underlying state.
///
/// # Examples
/// ```
/// use backend::test_support::InMemoryStore;
///
/// let store = InMemoryStore::default();
/// assert_eq!(store.row_counts(), (0, 0, 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    failure: Arc<Mutex<Option<InjectedFailure>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail in the given way.
    pub fn fail_with(&self, failure: InjectedFailure) {
        *lock(&self.failure) = Some(failure);
    }

    pub fn clear_failure(&self) {
        *lock(&self.failure) = None;
    }

    /// Number of stored `(contracts, gardens, plants)`.
    pub fn row_counts(&self) -> (usize, usize, usize) {
        let state = lock(&self.state);
        (
            state.contracts.len(),
            state.gardens.len(),
            state.plants.len(),
        )
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        lock(&self.state).users.len()
    }

    /// Overwrite a stored user, for example to deactivate an account.
    pub fn replace_user(&self, user: User) {
        lock(&self.state).users.insert(user.id().clone(), user);
    }

    fn injected(&self) -> Option<InjectedFailure> {
        *lock(&self.failure)
    }

    fn check<E, C, Q>(&self, connection: C, query: Q) -> Result<(), E>
    where
        C: FnOnce(&'static str) -> E,
        Q: FnOnce(&'static str) -> E,
    {
        match self.injected() {
            Some(InjectedFailure::Connection) => Err(connection("injected connection failure")),
            Some(InjectedFailure::Query) => Err(query("injected query failure")),
            Some(InjectedFailure::CascadeAborted) | None => Ok(()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.check(UserPersistenceError::connection, UserPersistenceError::query)?;
        let mut state = lock(&self.state);
        if state.users.values().any(|existing| existing.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        state.users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.check(UserPersistenceError::connection, UserPersistenceError::query)?;
        Ok(lock(&self.state).users.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.check(UserPersistenceError::connection, UserPersistenceError::query)?;
        Ok(lock(&self.state)
            .users
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.check(UserPersistenceError::connection, UserPersistenceError::query)?;
        let mut state = lock(&self.state);
        let Some(current) = state.users.get(id) else {
            return Ok(None);
        };
        let updated = User::new(
            current.id().clone(),
            current.email().clone(),
            changes.name.clone().unwrap_or_else(|| current.name().clone()),
            current.flags(),
            changes
                .password
                .clone()
                .unwrap_or_else(|| current.password().clone()),
        );
        state.users.insert(id.clone(), updated.clone());
        Ok(Some(updated))
    }
}

#[async_trait]
impl AuthTokenRepository for InMemoryStore {
    async fn rotate(
        &self,
        owner: &UserId,
        digest: &TokenDigest,
    ) -> Result<(), AuthTokenPersistenceError> {
        self.check(
            AuthTokenPersistenceError::connection,
            AuthTokenPersistenceError::query,
        )?;
        let mut state = lock(&self.state);
        state.tokens.retain(|_, holder| holder != owner);
        state.tokens.insert(digest.clone(), owner.clone());
        Ok(())
    }

    async fn find_owner(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserId>, AuthTokenPersistenceError> {
        self.check(
            AuthTokenPersistenceError::connection,
            AuthTokenPersistenceError::query,
        )?;
        Ok(lock(&self.state).tokens.get(digest).cloned())
    }
}

#[async_trait]
impl ContractRepository for InMemoryStore {
    async fn name_exists(
        &self,
        owner: &UserId,
        name: &RecordName,
    ) -> Result<bool, ContractRepositoryError> {
        self.check(
            ContractRepositoryError::connection,
            ContractRepositoryError::query,
        )?;
        let folded = name.folded();
        Ok(lock(&self.state)
            .contracts
            .iter()
            .any(|contract| &contract.owner == owner && contract.name.folded() == folded))
    }

    async fn create_with_cascade(
        &self,
        plan: &ContractPlan,
    ) -> Result<Contract, ContractRepositoryError> {
        self.check(
            ContractRepositoryError::connection,
            ContractRepositoryError::query,
        )?;
        let mut state = lock(&self.state);
        if state.contracts.iter().any(|contract| {
            contract.owner == plan.owner && contract.name.folded() == plan.name.folded()
        }) {
            return Err(ContractRepositoryError::duplicate_name(plan.name.as_ref()));
        }

        // Work on a copy and commit only on success.
        let mut staged = state.clone();
        staged.apply_plan(plan);
        if self.injected() == Some(InjectedFailure::CascadeAborted) {
            return Err(ContractRepositoryError::query("injected cascade failure"));
        }

        let created = staged
            .contracts
            .last()
            .map(|stored| staged.contract(stored))
            .ok_or_else(|| ContractRepositoryError::query("cascade produced no contract"))?;
        *state = staged;
        Ok(created)
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Contract>, ContractRepositoryError> {
        self.check(
            ContractRepositoryError::connection,
            ContractRepositoryError::query,
        )?;
        let state = lock(&self.state);
        let mut owned: Vec<&StoredContract> = state
            .contracts
            .iter()
            .filter(|contract| &contract.owner == owner)
            .collect();
        owned.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(owned.into_iter().map(|stored| state.contract(stored)).collect())
    }

    async fn find_for_owner(
        &self,
        owner: &UserId,
        id: &ContractId,
    ) -> Result<Option<Contract>, ContractRepositoryError> {
        self.check(
            ContractRepositoryError::connection,
            ContractRepositoryError::query,
        )?;
        let state = lock(&self.state);
        Ok(state
            .contracts
            .iter()
            .find(|contract| &contract.id == id && &contract.owner == owner)
            .map(|stored| state.contract(stored)))
    }

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: &ContractId,
    ) -> Result<bool, ContractRepositoryError> {
        self.check(
            ContractRepositoryError::connection,
            ContractRepositoryError::query,
        )?;
        let mut state = lock(&self.state);
        let before = state.contracts.len();
        state
            .contracts
            .retain(|contract| !(&contract.id == id && &contract.owner == owner));
        let deleted = state.contracts.len() < before;
        if deleted {
            state.contract_gardens.retain(|(contract, _)| contract != id);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl GardenRepository for InMemoryStore {
    async fn list_for_owner(
        &self,
        owner: &UserId,
        filter: &GardenFilter,
    ) -> Result<Vec<Garden>, GardenRepositoryError> {
        self.check(
            GardenRepositoryError::connection,
            GardenRepositoryError::query,
        )?;
        let needle = filter.name_contains.as_deref().map(str::to_lowercase);
        let state = lock(&self.state);
        let mut gardens: Vec<Garden> = state
            .gardens
            .iter()
            .filter(|(_, garden)| &garden.owner == owner)
            .filter(|(_, garden)| {
                needle
                    .as_deref()
                    .is_none_or(|needle| garden.name.folded().contains(needle))
            })
            .filter_map(|(id, _)| state.garden(*id))
            .collect();
        gardens.sort_by(|a, b| {
            b.name
                .as_ref()
                .cmp(a.name.as_ref())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(gardens)
    }

    async fn find_for_owner(
        &self,
        owner: &UserId,
        id: GardenId,
    ) -> Result<Option<Garden>, GardenRepositoryError> {
        self.check(
            GardenRepositoryError::connection,
            GardenRepositoryError::query,
        )?;
        let state = lock(&self.state);
        Ok(state
            .owned_garden(owner, id)
            .and_then(|_| state.garden(id.get())))
    }

    async fn update_for_owner(
        &self,
        owner: &UserId,
        id: GardenId,
        changes: &GardenChanges,
    ) -> Result<Option<Garden>, GardenRepositoryError> {
        self.check(
            GardenRepositoryError::connection,
            GardenRepositoryError::query,
        )?;
        let mut state = lock(&self.state);
        if state.owned_garden(owner, id).is_none() {
            return Ok(None);
        }
        let Some(mut garden) = state.garden(id.get()) else {
            return Ok(None);
        };
        changes.apply_to(&mut garden);
        if let Some(stored) = state.gardens.get_mut(&id.get()) {
            stored.name = garden.name.clone();
            stored.level = garden.level;
        }
        Ok(Some(garden))
    }

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: GardenId,
    ) -> Result<bool, GardenRepositoryError> {
        self.check(
            GardenRepositoryError::connection,
            GardenRepositoryError::query,
        )?;
        let mut state = lock(&self.state);
        if state.owned_garden(owner, id).is_none() {
            return Ok(false);
        }
        state.remove_garden(id.get());
        Ok(true)
    }
}

#[async_trait]
impl PlantRepository for InMemoryStore {
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Plant>, PlantRepositoryError> {
        self.check(PlantRepositoryError::connection, PlantRepositoryError::query)?;
        Ok(lock(&self.state)
            .plants
            .values()
            .filter(|plant| &plant.owner == owner)
            .cloned()
            .collect())
    }

    async fn update_for_owner(
        &self,
        owner: &UserId,
        id: PlantId,
        changes: &PlantChanges,
    ) -> Result<Option<Plant>, PlantRepositoryError> {
        self.check(PlantRepositoryError::connection, PlantRepositoryError::query)?;
        let mut state = lock(&self.state);
        let Some(plant) = state
            .plants
            .get_mut(&id.get())
            .filter(|plant| &plant.owner == owner)
        else {
            return Ok(None);
        };
        changes.apply_to(plant);
        Ok(Some(plant.clone()))
    }

    async fn delete_for_owner(
        &self,
        owner: &UserId,
        id: PlantId,
    ) -> Result<bool, PlantRepositoryError> {
        self.check(PlantRepositoryError::connection, PlantRepositoryError::query)?;
        let mut state = lock(&self.state);
        let owned = state
            .plants
            .get(&id.get())
            .is_some_and(|plant| &plant.owner == owner);
        if owned {
            state.remove_plant(id.get());
        }
        Ok(owned)
    }
}

/// Cheap, reversible hasher for tests; never use outside them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextHasher;

const PLAIN_PREFIX: &str = "plain$";

impl PasswordHasher for PlainTextHasher {
    fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHashError> {
        Ok(PasswordDigest::new(format!("{PLAIN_PREFIX}{password}")))
    }

    fn verify(&self, password: &str, digest: &PasswordDigest) -> Result<bool, PasswordHashError> {
        digest
            .as_str()
            .strip_prefix(PLAIN_PREFIX)
            .map(|stored| stored == password)
            .ok_or_else(|| PasswordHashError::malformed_digest("missing plain$ prefix"))
    }
}
