//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports (repositories, hashing) are implemented by outbound adapters
//! and expose typed errors built with `define_port_error!`. Driving ports are
//! implemented by domain services and called by inbound adapters; they return
//! the transport-agnostic [`crate::domain::Error`].

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod auth_token_repository;
mod contract_command;
mod contract_repository;
mod garden_command;
mod garden_repository;
mod login_service;
mod password_hasher;
mod plant_command;
mod plant_repository;
mod user_repository;

pub use account_command::{
    AccountCommand, AccountQuery, ProfileUpdateRequest, SignUpRequest, SuperuserRequest,
};
#[cfg(test)]
pub use account_command::{MockAccountCommand, MockAccountQuery};
#[cfg(test)]
pub use auth_token_repository::MockAuthTokenRepository;
pub use auth_token_repository::{AuthTokenPersistenceError, AuthTokenRepository};
pub use contract_command::{ContractCommand, ContractQuery};
#[cfg(test)]
pub use contract_command::{MockContractCommand, MockContractQuery};
#[cfg(test)]
pub use contract_repository::MockContractRepository;
pub use contract_repository::{ContractRepository, ContractRepositoryError};
pub use garden_command::{GardenCommand, GardenQuery};
#[cfg(test)]
pub use garden_command::{MockGardenCommand, MockGardenQuery};
#[cfg(test)]
pub use garden_repository::MockGardenRepository;
pub use garden_repository::{GardenFilter, GardenRepository, GardenRepositoryError};
pub use login_service::{LoginService, TokenAuthenticator};
#[cfg(test)]
pub use login_service::{MockLoginService, MockTokenAuthenticator};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use plant_command::{MockPlantCommand, MockPlantQuery};
pub use plant_command::{PlantCommand, PlantQuery};
#[cfg(test)]
pub use plant_repository::MockPlantRepository;
pub use plant_repository::{PlantRepository, PlantRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
