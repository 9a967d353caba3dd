//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every inbound HTTP path and the DTO schemas they use.
//! The document is served by Swagger UI in debug builds and exported with
//! `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::contracts::CreateContractBody;
use crate::inbound::http::gardens::GardenBody;
use crate::inbound::http::plants::PlantBody;
use crate::inbound::http::records_dto::{
    ContractDetail, ContractList, ContractSummary, GardenResponse, PlantResponse,
};
use crate::inbound::http::users::{
    ProfilePatch, SignUpBody, TokenRequest, TokenResponse, UserResponse,
};

/// Name of the token security scheme in the generated document.
pub const TOKEN_SCHEME: &str = "TokenAuth";

/// Adds the `Authorization: Token <key>` security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            TOKEN_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "`Token <key>` where the key is issued by POST /user/token/.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Garden records API",
        description = "Token-authenticated access to contracts, gardens and plants."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("TokenAuth" = [])),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::create_token,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::contracts::list_contracts,
        crate::inbound::http::contracts::create_contract,
        crate::inbound::http::contracts::get_contract,
        crate::inbound::http::contracts::delete_contract,
        crate::inbound::http::gardens::list_gardens,
        crate::inbound::http::gardens::get_garden,
        crate::inbound::http::gardens::patch_garden,
        crate::inbound::http::gardens::put_garden,
        crate::inbound::http::gardens::delete_garden,
        crate::inbound::http::plants::list_plants,
        crate::inbound::http::plants::patch_plant,
        crate::inbound::http::plants::put_plant,
        crate::inbound::http::plants::delete_plant,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        SignUpBody,
        TokenRequest,
        TokenResponse,
        ProfilePatch,
        UserResponse,
        CreateContractBody,
        ContractSummary,
        ContractDetail,
        ContractList,
        GardenBody,
        GardenResponse,
        PlantBody,
        PlantResponse,
    )),
    tags(
        (name = "users", description = "Accounts and API tokens"),
        (name = "contracts", description = "Contracts and their creation cascade"),
        (name = "gardens", description = "Gardens owned by the caller"),
        (name = "plants", description = "Plants owned by the caller"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
