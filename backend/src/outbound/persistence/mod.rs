//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL through `diesel-async` with `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Owner scoping**: every record query filters on the owning user, so a
//!   foreign id behaves exactly like a missing one.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselContractRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/gardens")).await?;
//! let contracts = DieselContractRepository::new(pool);
//! ```

mod diesel_auth_token_repository;
mod diesel_basic_error_mapping;
mod diesel_contract_repository;
mod diesel_garden_repository;
mod diesel_plant_repository;
mod diesel_record_graph;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_auth_token_repository::DieselAuthTokenRepository;
pub use diesel_contract_repository::DieselContractRepository;
pub use diesel_garden_repository::DieselGardenRepository;
pub use diesel_plant_repository::DieselPlantRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
