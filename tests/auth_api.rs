use actix_web::test::TestRequest;
use actix_web::{test, web, App};
use serde_json::json;

use ecommerce_api::api;

mod support;

#[actix_web::test]
async fn register_login_and_token_gating() {
    let test_db = support::init_test_db("auth").await;
    let state = web::Data::new(support::build_state(test_db.pool.clone()));
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .service(api::auth::register)
            .service(api::auth::login)
            .service(api::analytics::products_count),
    )
    .await;

    // registration lowercases the email and hands back a usable token
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "Alice@Example.com", "password": "s3cret", "username": "alice"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["role"], json!("user"));
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert!(body["data"]["userId"].is_number());

    // same email again, regardless of case
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "alice@example.com", "password": "other"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], json!("A user with this email already exists"));

    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "not-an-email", "password": "pw"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"email": "bob@example.com", "password": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], json!("Password is required"));

    // a fresh user token is accepted but not admin
    let req = TestRequest::get()
        .uri("/api/analytics/products/count")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // login with the same credentials, case-insensitive email
    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "ALICE@example.com", "password": "s3cret"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["data"]["token"].is_string());

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "alice@example.com", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], json!("Invalid credentials"));

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "nobody@example.com", "password": "pw"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // garbage bearer token is rejected before any handler runs
    let req = TestRequest::get()
        .uri("/api/analytics/products/count")
        .insert_header(("Authorization", "Bearer not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}
