//! Wire the Diesel and Argon2 adapters into the HTTP state.

use std::sync::Arc;

use backend::inbound::http::state::{Adapters, HttpState};
use backend::outbound::persistence::{
    DieselAuthTokenRepository, DieselContractRepository, DieselGardenRepository,
    DieselPlantRepository, DieselUserRepository,
};
use backend::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Build handler state backed by the configured database pool.
pub(super) fn build_http_state(config: &ServerConfig) -> HttpState {
    let pool = &config.db_pool;
    HttpState::from_adapters(
        Adapters {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            tokens: Arc::new(DieselAuthTokenRepository::new(pool.clone())),
            contracts: Arc::new(DieselContractRepository::new(pool.clone())),
            gardens: Arc::new(DieselGardenRepository::new(pool.clone())),
            plants: Arc::new(DieselPlantRepository::new(pool.clone())),
            hasher: Arc::new(Argon2PasswordHasher::default()),
        },
        config.min_password_length,
    )
}
