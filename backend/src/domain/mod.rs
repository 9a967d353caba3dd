//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: Define strongly typed entities used by the API and persistence
//! layers, plus the services implementing the driving ports. Nothing in here
//! depends on actix or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User and its value types: identity and credentials.
//! - Contract, Garden, Plant: owner-scoped records.
//! - ContractPlan: the creation cascade applied by repositories.

pub mod account_service;
pub mod auth;
pub mod cascade;
pub mod contract_service;
pub mod error;
pub mod garden_service;
pub mod ports;
pub mod records;
pub mod token_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::{AccountService, DUPLICATE_EMAIL_MESSAGE};
pub use self::auth::{
    AuthToken, LoginCredentials, LoginValidationError, NewPassword, PasswordValidationError,
    TokenDigest,
};
pub use self::cascade::{
    ContractPlan, DEFAULT_PLANT_NAME, FAN_OUT_PER_LEVEL, GardenPlan, NewContract, PlantDraft,
};
pub use self::contract_service::{ContractService, DUPLICATE_CONTRACT_MESSAGE, NOT_FOUND_MESSAGE};
pub use self::error::{Error, ErrorCode};
pub use self::garden_service::{GardenService, PlantService};
pub use self::records::{
    Contract, ContractId, Garden, GardenChanges, GardenId, LEVEL_MAX, LEVEL_MIN, Level, Plant,
    PlantChanges, PlantId, PlantTelemetry, RECORD_NAME_MAX, RecordName, RecordValidationError,
    SOIL_MOISTURE_MAX, TelemetryChanges,
};
pub use self::token_service::{INVALID_CREDENTIALS_MESSAGE, TokenService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, PasswordDigest, PermissionFlags, ProfileChanges, USER_FIELD_MAX, User, UserId,
    UserName, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
