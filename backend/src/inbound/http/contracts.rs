//! Contract API handlers.
//!
//! ```text
//! GET    /contracts/
//! POST   /contracts/      {"name":"orchard","level":2,"description":"..."}
//! GET    /contracts/{id}/
//! DELETE /contracts/{id}/
//! ```
//!
//! Contracts are immutable once created; every other method on the detail
//! route answers `405` without touching storage.

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ContractId, Error, NewContract};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, authenticated_method_not_allowed};
use crate::inbound::http::records_dto::{ContractDetail, ContractList, ContractSummary};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_level, parse_path_id, parse_record_name, require,
};

const NAME: FieldName = FieldName::new("name");
const LEVEL: FieldName = FieldName::new("level");

/// Request body for `POST /contracts/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateContractBody {
    #[schema(example = "orchard")]
    pub name: Option<String>,
    #[schema(minimum = 1, maximum = 3, example = 1)]
    pub level: Option<i64>,
    pub description: Option<String>,
}

impl TryFrom<CreateContractBody> for NewContract {
    type Error = Error;

    fn try_from(body: CreateContractBody) -> Result<Self, Self::Error> {
        let name = require(body.name, NAME)?;
        Ok(Self {
            name: parse_record_name(&name, NAME)?,
            level: body
                .level
                .map(|raw| parse_level(raw, LEVEL))
                .transpose()?
                .unwrap_or_default(),
            description: body.description.unwrap_or_default(),
        })
    }
}

/// List the caller's contracts, newest first.
#[utoipa::path(
    get,
    path = "/contracts/",
    responses(
        (status = 200, description = "Contracts", body = ContractList),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["contracts"],
    operation_id = "listContracts"
)]
pub async fn list_contracts(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<ContractList>> {
    let contracts = state.contracts_query.list(caller.id()).await?;
    Ok(web::Json(ContractList {
        result: contracts.iter().map(ContractSummary::from).collect(),
    }))
}

/// Create a contract together with its gardens and plants.
#[utoipa::path(
    post,
    path = "/contracts/",
    request_body = CreateContractBody,
    responses(
        (status = 201, description = "Contract created", body = ContractDetail),
        (status = 400, description = "Invalid or duplicate contract", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["contracts"],
    operation_id = "createContract"
)]
pub async fn create_contract(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateContractBody>,
) -> ApiResult<HttpResponse> {
    let request = NewContract::try_from(payload.into_inner())?;
    let contract = state.contracts.create(caller.id(), request).await?;
    Ok(HttpResponse::Created().json(ContractDetail::from(&contract)))
}

/// Fetch one of the caller's contracts.
#[utoipa::path(
    get,
    path = "/contracts/{id}/",
    params(("id" = String, Path, description = "Contract UUID")),
    responses(
        (status = 200, description = "Contract", body = ContractDetail),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 405, description = "Contracts cannot be modified", body = Error)
    ),
    tags = ["contracts"],
    operation_id = "getContract"
)]
pub async fn get_contract(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ContractDetail>> {
    let id = parse_path_id(&path, ContractId::parse)?;
    let contract = state.contracts_query.get(caller.id(), &id).await?;
    Ok(web::Json(ContractDetail::from(&contract)))
}

/// Delete one of the caller's contracts; its gardens are kept.
#[utoipa::path(
    delete,
    path = "/contracts/{id}/",
    params(("id" = String, Path, description = "Contract UUID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["contracts"],
    operation_id = "deleteContract"
)]
pub async fn delete_contract(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_path_id(&path, ContractId::parse)?;
    state.contracts.delete(caller.id(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the contract routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/contracts/")
            .route(web::get().to(list_contracts))
            .route(web::post().to(create_contract))
            .default_service(web::to(authenticated_method_not_allowed)),
    )
    .service(
        web::resource("/contracts/{id}/")
            .route(web::get().to(get_contract))
            .route(web::delete().to(delete_contract))
            .default_service(web::to(authenticated_method_not_allowed)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Level;
    use rstest::rstest;

    #[test]
    fn omitted_fields_take_defaults() {
        let request = NewContract::try_from(CreateContractBody {
            name: Some("orchard".to_owned()),
            ..Default::default()
        })
        .expect("valid body");
        assert_eq!(request.level, Level::default());
        assert_eq!(request.description, "");
    }

    #[rstest]
    #[case(CreateContractBody::default(), "name")]
    #[case(CreateContractBody { name: Some("  ".to_owned()), ..Default::default() }, "name")]
    #[case(CreateContractBody { name: Some("x".to_owned()), level: Some(4), ..Default::default() }, "level")]
    #[case(CreateContractBody { name: Some("x".to_owned()), level: Some(0), ..Default::default() }, "level")]
    fn invalid_bodies_name_the_field(#[case] body: CreateContractBody, #[case] field: &str) {
        let err = NewContract::try_from(body).expect_err("invalid");
        assert_eq!(
            err.details().and_then(|details| details["field"].as_str()),
            Some(field)
        );
    }
}

#[cfg(test)]
#[path = "contracts_tests.rs"]
mod handler_tests;
