//! Tests for account HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::DUPLICATE_EMAIL_MESSAGE;
use crate::inbound::http::test_utils::{
    TEST_PASSWORD, sign_up_and_token, test_app, token_header,
};
use crate::test_support::InMemoryStore;

fn sign_up_body(email: &str, password: &str) -> Value {
    json!({"email": email, "password": password, "name": "Test Name"})
}

#[actix_web::test]
async fn sign_up_returns_public_profile() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/user/create/")
            .set_json(sign_up_body("test@example.com", TEST_PASSWORD))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body, json!({"email": "test@example.com", "name": "Test Name"}));
    assert_eq!(store.user_count(), 1);
}

#[actix_web::test]
async fn duplicate_email_is_rejected() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let request = || {
        actix_test::TestRequest::post()
            .uri("/user/create/")
            .set_json(sign_up_body("test@example.com", TEST_PASSWORD))
            .to_request()
    };
    actix_test::call_service(&app, request()).await;

    let response = actix_test::call_service(&app, request()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["errors"][0], DUPLICATE_EMAIL_MESSAGE);
    assert_eq!(store.user_count(), 1);
}

#[rstest]
#[case(sign_up_body("test@example.com", "pw"), "password")]
#[case(json!({"email": "test@example.com", "name": "Test Name"}), "password")]
#[case(sign_up_body("not-an-email", TEST_PASSWORD), "email")]
#[case(json!({"email": "test@example.com", "password": TEST_PASSWORD}), "name")]
#[actix_web::test]
async fn invalid_sign_up_creates_nothing(#[case] body: Value, #[case] field: &str) {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/user/create/")
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], field);
    assert_eq!(store.user_count(), 0);
}

#[actix_web::test]
async fn token_is_issued_for_valid_credentials() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;

    let token = sign_up_and_token(&app, "test@example.com").await;

    assert!(!token.is_empty());
}

#[rstest]
#[case(json!({"email": "test@example.com", "password": "wrong-pass"}))]
#[case(json!({"email": "nobody@example.com", "password": TEST_PASSWORD}))]
#[case(json!({"email": "test@example.com", "password": ""}))]
#[actix_web::test]
async fn bad_credentials_get_no_token(#[case] body: Value) {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    sign_up_and_token(&app, "test@example.com").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/user/token/")
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert!(body.get("token").is_none());
}

#[actix_web::test]
async fn login_revokes_the_previous_token() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let first = sign_up_and_token(&app, "test@example.com").await;

    let mut current = first.clone();
    for _ in 0..3 {
        let body: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::post()
                .uri("/user/token/")
                .set_json(json!({"email": "test@example.com", "password": TEST_PASSWORD}))
                .to_request(),
        )
        .await;
        current = body["token"].as_str().expect("token").to_owned();
    }
    assert_ne!(current, first);

    let me_request = |token: String| {
        actix_test::TestRequest::get()
            .uri("/user/me/")
            .insert_header(token_header(&token))
            .to_request()
    };
    let stale = actix_test::call_service(&app, me_request(first)).await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);
    let fresh = actix_test::call_service(&app, me_request(current)).await;
    assert_eq!(fresh.status(), StatusCode::OK);
}

#[actix_web::test]
async fn profile_requires_authentication() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/user/me/").to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unknown_token_is_unauthorised() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/user/me/")
            .insert_header(token_header("deadbeef"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn profile_never_exposes_the_password() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let token = sign_up_and_token(&app, "test@example.com").await;

    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/user/me/")
            .insert_header(token_header(&token))
            .to_request(),
    )
    .await;

    assert_eq!(body, json!({"email": "test@example.com", "name": "Test Name"}));
}

#[actix_web::test]
async fn patch_updates_name_and_password() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let token = sign_up_and_token(&app, "test@example.com").await;

    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::patch()
            .uri("/user/me/")
            .insert_header(token_header(&token))
            .set_json(json!({"name": "New Name", "password": "newpassword123"}))
            .to_request(),
    )
    .await;
    assert_eq!(body["name"], "New Name");

    let relogin = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/user/token/")
            .set_json(json!({"email": "test@example.com", "password": "newpassword123"}))
            .to_request(),
    )
    .await;
    assert_eq!(relogin.status(), StatusCode::OK);
}

#[actix_web::test]
async fn post_to_profile_is_not_allowed() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let token = sign_up_and_token(&app, "test@example.com").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/user/me/")
            .insert_header(token_header(&token))
            .set_json(json!({}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
