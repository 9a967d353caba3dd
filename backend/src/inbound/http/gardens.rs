//! Garden API handlers.
//!
//! ```text
//! GET    /gardens/?name=rose
//! GET    /gardens/{id}/
//! PATCH  /gardens/{id}/  {"level":2}
//! PUT    /gardens/{id}/  {"name":"rose bed","level":2}
//! DELETE /gardens/{id}/
//! ```
//!
//! Gardens only come into being through the contract cascade, so the
//! collection route has no `POST`.

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::GardenFilter;
use crate::domain::{Error, GardenChanges, GardenId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, authenticated_method_not_allowed};
use crate::inbound::http::records_dto::GardenResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_level, parse_path_id, parse_record_name, require,
};

const NAME: FieldName = FieldName::new("name");
const LEVEL: FieldName = FieldName::new("level");

/// Query string accepted by the garden listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GardenListQuery {
    /// Case-insensitive substring matched against garden names.
    pub name: Option<String>,
}

impl From<GardenListQuery> for GardenFilter {
    fn from(query: GardenListQuery) -> Self {
        Self {
            name_contains: query.name.filter(|name| !name.is_empty()),
        }
    }
}

/// Body of `PATCH` and `PUT /gardens/{id}/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct GardenBody {
    pub name: Option<String>,
    #[schema(minimum = 1, maximum = 3)]
    pub level: Option<i64>,
}

impl GardenBody {
    fn into_changes(self) -> Result<GardenChanges, Error> {
        Ok(GardenChanges {
            name: self
                .name
                .map(|raw| parse_record_name(&raw, NAME))
                .transpose()?,
            level: self
                .level
                .map(|raw| parse_level(raw, LEVEL))
                .transpose()?,
        })
    }

    /// Full replacement: the name must be present.
    fn into_replacement(self) -> Result<GardenChanges, Error> {
        let name = require(self.name, NAME)?;
        Self {
            name: Some(name),
            level: self.level,
        }
        .into_changes()
    }
}

/// List the caller's gardens, optionally filtered by name.
#[utoipa::path(
    get,
    path = "/gardens/",
    params(GardenListQuery),
    responses(
        (status = 200, description = "Gardens ordered by name descending", body = [GardenResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["gardens"],
    operation_id = "listGardens"
)]
pub async fn list_gardens(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    query: web::Query<GardenListQuery>,
) -> ApiResult<web::Json<Vec<GardenResponse>>> {
    let gardens = state
        .gardens_query
        .list(caller.id(), query.into_inner().into())
        .await?;
    Ok(web::Json(gardens.iter().map(GardenResponse::from).collect()))
}

/// Fetch one of the caller's gardens.
#[utoipa::path(
    get,
    path = "/gardens/{id}/",
    params(("id" = i64, Path, description = "Garden id")),
    responses(
        (status = 200, description = "Garden", body = GardenResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["gardens"],
    operation_id = "getGarden"
)]
pub async fn get_garden(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<GardenResponse>> {
    let id = parse_path_id(&path, GardenId::parse)?;
    let garden = state.gardens_query.get(caller.id(), id).await?;
    Ok(web::Json(GardenResponse::from(&garden)))
}

/// Partially update one of the caller's gardens.
#[utoipa::path(
    patch,
    path = "/gardens/{id}/",
    params(("id" = i64, Path, description = "Garden id")),
    request_body = GardenBody,
    responses(
        (status = 200, description = "Updated garden", body = GardenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["gardens"],
    operation_id = "patchGarden"
)]
pub async fn patch_garden(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<GardenBody>,
) -> ApiResult<web::Json<GardenResponse>> {
    let id = parse_path_id(&path, GardenId::parse)?;
    let changes = payload.into_inner().into_changes()?;
    let garden = state.gardens.update(caller.id(), id, changes).await?;
    Ok(web::Json(GardenResponse::from(&garden)))
}

/// Replace the editable fields of one of the caller's gardens.
#[utoipa::path(
    put,
    path = "/gardens/{id}/",
    params(("id" = i64, Path, description = "Garden id")),
    request_body = GardenBody,
    responses(
        (status = 200, description = "Updated garden", body = GardenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["gardens"],
    operation_id = "replaceGarden"
)]
pub async fn put_garden(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<GardenBody>,
) -> ApiResult<web::Json<GardenResponse>> {
    let id = parse_path_id(&path, GardenId::parse)?;
    let changes = payload.into_inner().into_replacement()?;
    let garden = state.gardens.update(caller.id(), id, changes).await?;
    Ok(web::Json(GardenResponse::from(&garden)))
}

/// Delete one of the caller's gardens and its plants.
#[utoipa::path(
    delete,
    path = "/gardens/{id}/",
    params(("id" = i64, Path, description = "Garden id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["gardens"],
    operation_id = "deleteGarden"
)]
pub async fn delete_garden(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_path_id(&path, GardenId::parse)?;
    state.gardens.delete(caller.id(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the garden routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/gardens/")
            .route(web::get().to(list_gardens))
            .default_service(web::to(authenticated_method_not_allowed)),
    )
    .service(
        web::resource("/gardens/{id}/")
            .route(web::get().to(get_garden))
            .route(web::patch().to(patch_garden))
            .route(web::put().to(put_garden))
            .route(web::delete().to(delete_garden))
            .default_service(web::to(authenticated_method_not_allowed)),
    );
}

#[cfg(test)]
#[path = "gardens_tests.rs"]
mod tests;
