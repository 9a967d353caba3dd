//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod contracts;
pub mod error;
pub mod gardens;
pub mod health;
pub mod plants;
pub mod records_dto;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use crate::domain::ApiResult;

/// Register every API route along with the JSON and query error handlers.
///
/// Handlers expect `web::Data<HttpState>` to be registered on the app.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .configure(users::configure)
        .configure(contracts::configure)
        .configure(gardens::configure)
        .configure(plants::configure);
}
