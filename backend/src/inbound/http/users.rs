//! Account API handlers.
//!
//! ```text
//! POST  /user/create/ {"email":"a@example.com","password":"secret","name":"Ada"}
//! POST  /user/token/  {"email":"a@example.com","password":"secret"}
//! GET   /user/me/
//! PATCH /user/me/     {"name":"Ada L."}
//! ```

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::ports::{ProfileUpdateRequest, SignUpRequest};
use crate::domain::{
    EmailAddress, Error, LoginCredentials, LoginValidationError, User, UserName,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, authenticated_method_not_allowed};
use crate::inbound::http::error::method_not_allowed;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require, user_field_error};

const EMAIL: FieldName = FieldName::new("email");
const NAME: FieldName = FieldName::new("name");
const PASSWORD: FieldName = FieldName::new("password");

/// Sign-up request body for `POST /user/create/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct SignUpBody {
    #[schema(example = "test@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
    #[schema(example = "Test Name")]
    pub name: Option<String>,
}

/// Token request body for `POST /user/token/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Token issued by `POST /user/token/`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")]
    pub token: String,
}

/// Partial profile update for `PATCH /user/me/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Public view of an account; never carries the password.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email().to_string(),
            name: user.name().to_string(),
        }
    }
}

fn parse_sign_up(body: SignUpBody) -> Result<SignUpRequest, Error> {
    let email = require(body.email, EMAIL)?;
    let password = Zeroizing::new(require(body.password, PASSWORD)?);
    let name = require(body.name, NAME)?;
    Ok(SignUpRequest {
        email: EmailAddress::new(&email).map_err(|err| user_field_error(EMAIL, err))?,
        name: UserName::new(&name).map_err(|err| user_field_error(NAME, err))?,
        password,
    })
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    Error::invalid_field(field, "blank", err.to_string())
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/user/create/",
    request_body = SignUpBody,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid or duplicate details", body = Error),
        (status = 405, description = "Method not allowed", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<SignUpBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_sign_up(payload.into_inner())?;
    let user = state.accounts.sign_up(request).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Exchange credentials for an API token.
#[utoipa::path(
    post,
    path = "/user/token/",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid credentials", body = Error),
        (status = 405, description = "Method not allowed", body = Error)
    ),
    tags = ["users"],
    operation_id = "createToken",
    security([])
)]
pub async fn create_token(
    state: web::Data<HttpState>,
    payload: web::Json<TokenRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let TokenRequest { email, password } = payload.into_inner();
    let email = require(email, EMAIL)?;
    let password = Zeroizing::new(require(password, PASSWORD)?);
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(map_login_validation_error)?;
    let token = state.login.issue_token(&credentials).await?;
    Ok(web::Json(TokenResponse {
        token: token.as_str().to_owned(),
    }))
}

/// Current user's profile.
#[utoipa::path(
    get,
    path = "/user/me/",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
pub async fn get_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.accounts_query.profile(caller.id()).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Update the current user's name and/or password.
#[utoipa::path(
    patch,
    path = "/user/me/",
    request_body = ProfilePatch,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<ProfilePatch>,
) -> ApiResult<web::Json<UserResponse>> {
    let ProfilePatch { name, password } = payload.into_inner();
    let request = ProfileUpdateRequest {
        name: name
            .map(|raw| UserName::new(&raw).map_err(|err| user_field_error(NAME, err)))
            .transpose()?,
        password: password.map(Zeroizing::new),
    };
    let user = state.accounts.update_profile(caller.id(), request).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Register the account routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/user/create/")
            .route(web::post().to(create_user))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/user/token/")
            .route(web::post().to(create_token))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/user/me/")
            .route(web::get().to(get_profile))
            .route(web::patch().to(update_profile))
            .default_service(web::to(authenticated_method_not_allowed)),
    );
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
