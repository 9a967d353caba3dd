//! Plant API handlers.
//!
//! ```text
//! GET    /plants/
//! PATCH  /plants/{id}/  {"soil_moisture":40,"is_present":false}
//! PUT    /plants/{id}/  {"name":"fern","height":12}
//! DELETE /plants/{id}/
//! ```
//!
//! Plants have no detail read; `GET /plants/{id}/` answers `405`.

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, PlantChanges, PlantId, TelemetryChanges};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, authenticated_method_not_allowed};
use crate::inbound::http::records_dto::PlantResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_path_id, parse_record_name, record_field_error, require,
};

const NAME: FieldName = FieldName::new("name");

/// Body of `PATCH` and `PUT /plants/{id}/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct PlantBody {
    pub name: Option<String>,
    #[schema(minimum = 0, maximum = 100)]
    pub soil_moisture: Option<i32>,
    #[schema(minimum = 0)]
    pub fertilizer_rate: Option<i32>,
    #[schema(minimum = 0)]
    pub height: Option<i32>,
    #[schema(minimum = 0)]
    pub stem_count: Option<i32>,
    #[schema(minimum = 0)]
    pub health_score: Option<i32>,
    pub is_present: Option<bool>,
    #[schema(minimum = 0)]
    pub soil_cohesion: Option<i32>,
    #[schema(minimum = 0)]
    pub disease_index: Option<i32>,
    #[schema(minimum = 0)]
    pub insect_density: Option<i32>,
}

impl PlantBody {
    fn into_changes(self) -> Result<PlantChanges, Error> {
        let telemetry = TelemetryChanges {
            soil_moisture: self.soil_moisture,
            fertilizer_rate: self.fertilizer_rate,
            height: self.height,
            stem_count: self.stem_count,
            health_score: self.health_score,
            is_present: self.is_present,
            soil_cohesion: self.soil_cohesion,
            disease_index: self.disease_index,
            insect_density: self.insect_density,
        };
        telemetry
            .validate()
            .map_err(|(field, err)| record_field_error(FieldName::new(field), err))?;
        Ok(PlantChanges {
            name: self
                .name
                .map(|raw| parse_record_name(&raw, NAME))
                .transpose()?,
            telemetry,
        })
    }
}

/// List the caller's plants.
#[utoipa::path(
    get,
    path = "/plants/",
    responses(
        (status = 200, description = "Plants ordered by id", body = [PlantResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["plants"],
    operation_id = "listPlants"
)]
pub async fn list_plants(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<PlantResponse>>> {
    let plants = state.plants_query.list(caller.id()).await?;
    Ok(web::Json(plants.iter().map(PlantResponse::from).collect()))
}

/// Partially update one of the caller's plants.
#[utoipa::path(
    patch,
    path = "/plants/{id}/",
    params(("id" = i64, Path, description = "Plant id")),
    request_body = PlantBody,
    responses(
        (status = 200, description = "Updated plant", body = PlantResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 405, description = "Plants have no detail read", body = Error)
    ),
    tags = ["plants"],
    operation_id = "patchPlant"
)]
pub async fn patch_plant(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<PlantBody>,
) -> ApiResult<web::Json<PlantResponse>> {
    let id = parse_path_id(&path, PlantId::parse)?;
    let changes = payload.into_inner().into_changes()?;
    let plant = state.plants.update(caller.id(), id, changes).await?;
    Ok(web::Json(PlantResponse::from(&plant)))
}

/// Update one of the caller's plants; the name must be supplied.
#[utoipa::path(
    put,
    path = "/plants/{id}/",
    params(("id" = i64, Path, description = "Plant id")),
    request_body = PlantBody,
    responses(
        (status = 200, description = "Updated plant", body = PlantResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["plants"],
    operation_id = "replacePlant"
)]
pub async fn put_plant(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<PlantBody>,
) -> ApiResult<web::Json<PlantResponse>> {
    let id = parse_path_id(&path, PlantId::parse)?;
    let mut body = payload.into_inner();
    body.name = Some(require(body.name.take(), NAME)?);
    let plant = state
        .plants
        .update(caller.id(), id, body.into_changes()?)
        .await?;
    Ok(web::Json(PlantResponse::from(&plant)))
}

/// Delete one of the caller's plants.
#[utoipa::path(
    delete,
    path = "/plants/{id}/",
    params(("id" = i64, Path, description = "Plant id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["plants"],
    operation_id = "deletePlant"
)]
pub async fn delete_plant(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_path_id(&path, PlantId::parse)?;
    state.plants.delete(caller.id(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the plant routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/plants/")
            .route(web::get().to(list_plants))
            .default_service(web::to(authenticated_method_not_allowed)),
    )
    .service(
        web::resource("/plants/{id}/")
            .route(web::patch().to(patch_plant))
            .route(web::put().to(put_plant))
            .route(web::delete().to(delete_plant))
            .default_service(web::to(authenticated_method_not_allowed)),
    );
}

#[cfg(test)]
#[path = "plants_tests.rs"]
mod tests;
