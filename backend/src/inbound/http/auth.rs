//! Token authentication for HTTP handlers.
//!
//! Handlers that need a caller take an [`AuthenticatedUser`] argument. The
//! extractor reads `Authorization: Token <key>` (`Bearer` is accepted as an
//! alias), resolves the key through the [`TokenAuthenticator`] port and fails
//! with `401` before the handler body runs.
//!
//! [`TokenAuthenticator`]: crate::domain::ports::TokenAuthenticator

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{AuthToken, Error, UserId};

use super::error::method_not_allowed;
use super::state::HttpState;

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
const EMPTY_TOKEN: &str = "Invalid token header. No credentials provided.";
const SPACED_TOKEN: &str = "Invalid token header. Token string should not contain spaces.";

/// Identity of the caller, resolved from the request's API token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    pub fn id(&self) -> &UserId {
        &self.0
    }
}

/// Pull the token key out of the `Authorization` header.
fn presented_token(headers: &HeaderMap) -> Result<AuthToken, Error> {
    let raw = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::unauthorized(MISSING_CREDENTIALS))?;

    let mut parts = raw.split_whitespace();
    let scheme = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return Err(Error::unauthorized(MISSING_CREDENTIALS));
    }
    let key = parts.next().ok_or_else(|| Error::unauthorized(EMPTY_TOKEN))?;
    if parts.next().is_some() {
        return Err(Error::unauthorized(SPACED_TOKEN));
    }
    AuthToken::from_presented(key).ok_or_else(|| Error::unauthorized(EMPTY_TOKEN))
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = presented_token(req.headers());
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let token = token?;
            let user_id = state
                .authenticator
                .authenticate(&token)
                .await
                .inspect_err(|err| warn!(error = %err, "token rejected"))?;
            Ok(Self(user_id))
        })
    }
}

/// Default service for authenticated resources.
///
/// The caller is resolved first so anonymous requests get `401` whatever the
/// method.
pub async fn authenticated_method_not_allowed(
    _caller: AuthenticatedUser,
    req: HttpRequest,
) -> Result<HttpResponse, Error> {
    method_not_allowed(req).await
}
