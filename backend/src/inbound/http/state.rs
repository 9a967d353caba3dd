//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, AuthTokenRepository, ContractCommand, ContractQuery,
    ContractRepository, GardenCommand, GardenQuery, GardenRepository, LoginService,
    PasswordHasher, PlantCommand, PlantQuery, PlantRepository, TokenAuthenticator,
    UserRepository,
};
use crate::domain::{AccountService, ContractService, GardenService, PlantService, TokenService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub login: Arc<dyn LoginService>,
    pub authenticator: Arc<dyn TokenAuthenticator>,
    pub contracts: Arc<dyn ContractCommand>,
    pub contracts_query: Arc<dyn ContractQuery>,
    pub gardens: Arc<dyn GardenCommand>,
    pub gardens_query: Arc<dyn GardenQuery>,
    pub plants: Arc<dyn PlantCommand>,
    pub plants_query: Arc<dyn PlantQuery>,
}

/// Driven adapters the domain services are built from.
pub struct Adapters<U, T, C, G, P, H> {
    pub users: Arc<U>,
    pub tokens: Arc<T>,
    pub contracts: Arc<C>,
    pub gardens: Arc<G>,
    pub plants: Arc<P>,
    pub hasher: Arc<H>,
}

impl HttpState {
    /// Wire the domain services over a set of driven adapters.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use backend::inbound::http::state::{Adapters, HttpState};
    /// use backend::test_support::{InMemoryStore, PlainTextHasher};
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let state = HttpState::from_adapters(
    ///     Adapters {
    ///         users: store.clone(),
    ///         tokens: store.clone(),
    ///         contracts: store.clone(),
    ///         gardens: store.clone(),
    ///         plants: store,
    ///         hasher: Arc::new(PlainTextHasher),
    ///     },
    ///     5,
    /// );
    /// # let _ = state;
    /// ```
    pub fn from_adapters<U, T, C, G, P, H>(
        adapters: Adapters<U, T, C, G, P, H>,
        min_password_length: usize,
    ) -> Self
    where
        U: UserRepository + 'static,
        T: AuthTokenRepository + 'static,
        C: ContractRepository + 'static,
        G: GardenRepository + 'static,
        P: PlantRepository + 'static,
        H: PasswordHasher + 'static,
    {
        let Adapters {
            users,
            tokens,
            contracts,
            gardens,
            plants,
            hasher,
        } = adapters;

        let accounts = Arc::new(AccountService::new(
            users.clone(),
            hasher.clone(),
            min_password_length,
        ));
        let login = Arc::new(TokenService::new(users, tokens, hasher));
        let contracts = Arc::new(ContractService::new(contracts));
        let gardens = Arc::new(GardenService::new(gardens));
        let plants = Arc::new(PlantService::new(plants));

        Self {
            accounts: accounts.clone(),
            accounts_query: accounts,
            login: login.clone(),
            authenticator: login,
            contracts: contracts.clone(),
            contracts_query: contracts,
            gardens: gardens.clone(),
            gardens_query: gardens,
            plants: plants.clone(),
            plants_query: plants,
        }
    }
}
