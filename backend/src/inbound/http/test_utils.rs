//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

use crate::inbound::http::configure_api;
use crate::inbound::http::state::{Adapters, HttpState};
use crate::test_support::{InMemoryStore, PlainTextHasher};

/// Minimum password length used by handler tests.
pub const TEST_MIN_PASSWORD: usize = 5;
pub const TEST_PASSWORD: &str = "testpass123";

/// Handler state backed entirely by `store`.
pub fn test_state(store: &InMemoryStore) -> web::Data<HttpState> {
    let store = Arc::new(store.clone());
    web::Data::new(HttpState::from_adapters(
        Adapters {
            users: store.clone(),
            tokens: store.clone(),
            contracts: store.clone(),
            gardens: store.clone(),
            plants: store,
            hasher: Arc::new(PlainTextHasher),
        },
        TEST_MIN_PASSWORD,
    ))
}

/// Application exposing every API route over `store`.
pub fn test_app(
    store: &InMemoryStore,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(test_state(store))
        .configure(configure_api)
}

/// Register `email` and return a fresh token for it.
pub async fn sign_up_and_token<S>(app: &S, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let created = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/user/create/")
            .set_json(json!({"email": email, "password": TEST_PASSWORD, "name": "Test Name"}))
            .to_request(),
    )
    .await;
    assert!(created.status().is_success(), "sign-up failed");

    let body: Value = actix_test::call_and_read_body_json(
        app,
        actix_test::TestRequest::post()
            .uri("/user/token/")
            .set_json(json!({"email": email, "password": TEST_PASSWORD}))
            .to_request(),
    )
    .await;
    body["token"]
        .as_str()
        .expect("token in response")
        .to_owned()
}

/// `Authorization` header value for `token`.
pub fn token_header(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Token {token}"))
}

/// Create a contract through the API and return its JSON body.
pub async fn create_contract<S>(app: &S, token: &str, body: Value) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/contracts/")
            .insert_header(token_header(token))
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);
    actix_test::read_body_json(response).await
}
