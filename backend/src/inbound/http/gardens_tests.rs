//! Tests for garden HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{
    create_contract, sign_up_and_token, test_app, token_header,
};
use crate::test_support::InMemoryStore;

fn first_garden_id(contract: &Value) -> i64 {
    contract["gardens"][0]["id"].as_i64().expect("garden id")
}

#[actix_web::test]
async fn listing_is_scoped_filtered_and_sorted() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let token = sign_up_and_token(&app, "owner@example.com").await;
    let other = sign_up_and_token(&app, "other@example.com").await;
    create_contract(&app, &token, json!({"name": "Apple"})).await;
    create_contract(&app, &token, json!({"name": "Rose"})).await;
    create_contract(&app, &other, json!({"name": "Rosemary"})).await;

    let all: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/gardens/")
            .insert_header(token_header(&token))
            .to_request(),
    )
    .await;
    let names: Vec<&str> = all
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|garden| garden["name"].as_str())
        .collect();
    assert_eq!(names.len(), 20);
    assert_eq!(names.first(), Some(&"Rose"));
    assert_eq!(names.last(), Some(&"Apple"));

    let filtered: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/gardens/?name=ros")
            .insert_header(token_header(&token))
            .to_request(),
    )
    .await;
    let filtered = filtered.as_array().expect("array");
    assert_eq!(filtered.len(), 10);
    assert!(filtered.iter().all(|garden| garden["name"] == "Rose"));
}

#[actix_web::test]
async fn garden_detail_includes_plants() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let token = sign_up_and_token(&app, "owner@example.com").await;
    let contract = create_contract(&app, &token, json!({"name": "Rose", "level": 2})).await;
    let id = first_garden_id(&contract);

    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/gardens/{id}/"))
            .insert_header(token_header(&token))
            .to_request(),
    )
    .await;

    assert_eq!(body["level"], 2);
    assert_eq!(body["plants"].as_array().map(Vec::len), Some(20));
}

#[rstest]
#[case("other")]
#[case("missing")]
#[case("garbage")]
#[actix_web::test]
async fn unreachable_gardens_are_not_found(#[case] scenario: &str) {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let owner = sign_up_and_token(&app, "owner@example.com").await;
    let intruder = sign_up_and_token(&app, "intruder@example.com").await;
    let contract = create_contract(&app, &owner, json!({"name": "Rose"})).await;
    let (token, uri) = match scenario {
        "other" => (intruder, format!("/gardens/{}/", first_garden_id(&contract))),
        "missing" => (owner, "/gardens/99999/".to_owned()),
        _ => (owner, "/gardens/abc/".to_owned()),
    };

    for request in [
        actix_test::TestRequest::get(),
        actix_test::TestRequest::delete(),
    ] {
        let response = actix_test::call_service(
            &app,
            request
                .uri(&uri)
                .insert_header(token_header(&token))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
    assert_eq!(store.row_counts(), (1, 10, 100));
}

#[actix_web::test]
async fn patch_changes_only_supplied_fields() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let token = sign_up_and_token(&app, "owner@example.com").await;
    let contract = create_contract(&app, &token, json!({"name": "Rose"})).await;
    let id = first_garden_id(&contract);

    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/gardens/{id}/"))
            .insert_header(token_header(&token))
            .set_json(json!({"level": 3}))
            .to_request(),
    )
    .await;

    assert_eq!(body["name"], "Rose");
    assert_eq!(body["level"], 3);
}

#[rstest]
#[case("PUT", json!({"level": 2}), "name")]
#[case("PATCH", json!({"level": 9}), "level")]
#[case("PATCH", json!({"name": ""}), "name")]
#[actix_web::test]
async fn invalid_updates_are_rejected(
    #[case] method: &str,
    #[case] body: Value,
    #[case] field: &str,
) {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let token = sign_up_and_token(&app, "owner@example.com").await;
    let contract = create_contract(&app, &token, json!({"name": "Rose"})).await;
    let uri = format!("/gardens/{}/", first_garden_id(&contract));
    let request = match method {
        "PUT" => actix_test::TestRequest::put(),
        _ => actix_test::TestRequest::patch(),
    };

    let response = actix_test::call_service(
        &app,
        request
            .uri(&uri)
            .insert_header(token_header(&token))
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn put_with_name_replaces_it() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let token = sign_up_and_token(&app, "owner@example.com").await;
    let contract = create_contract(&app, &token, json!({"name": "Rose"})).await;
    let id = first_garden_id(&contract);

    let body: Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/gardens/{id}/"))
            .insert_header(token_header(&token))
            .set_json(json!({"name": "Tulip"}))
            .to_request(),
    )
    .await;

    assert_eq!(body["name"], "Tulip");
    assert_eq!(body["level"], 1);
}

#[actix_web::test]
async fn delete_removes_the_garden_and_its_plants() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let token = sign_up_and_token(&app, "owner@example.com").await;
    let contract = create_contract(&app, &token, json!({"name": "Rose"})).await;
    let id = first_garden_id(&contract);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/gardens/{id}/"))
            .insert_header(token_header(&token))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.row_counts(), (1, 9, 90));
}

#[actix_web::test]
async fn gardens_cannot_be_created_directly() {
    let store = InMemoryStore::new();
    let app = actix_test::init_service(test_app(&store)).await;
    let token = sign_up_and_token(&app, "owner@example.com").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/gardens/")
            .insert_header(token_header(&token))
            .set_json(json!({"name": "Rose"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(store.row_counts(), (0, 0, 0));
}
