mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{TestApp, clinic_payload};

#[tokio::test]
async fn test_register_requires_admin() {
    let app = TestApp::new();
    let (_, patient_token) = app.register_patient("maria", "12345678901").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/clinic/register",
            None,
            Some(clinic_payload("boaviagem", "12345678901901234")),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request(
            Method::POST,
            "/clinic/register",
            Some(&patient_token),
            Some(clinic_payload("boaviagem", "12345678901901234")),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied. Required roles: ROLE_ADMIN");
}

#[tokio::test]
async fn test_admin_registers_clinic() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/clinic/register",
            Some(&admin),
            Some(clinic_payload("boaviagem", "12345678901901234")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["cnpj"], "12345678901901234");
    assert_eq!(body["city"], "Recife");

    let (status, body) = app
        .request(
            Method::POST,
            "/clinic/register",
            Some(&admin),
            Some(clinic_payload("outra", "12345678901901234")),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CNPJ já existe");
}

#[tokio::test]
async fn test_any_role_reads_clinic_by_cnpj() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.request(
        Method::POST,
        "/clinic/register",
        Some(&admin),
        Some(clinic_payload("boaviagem", "12345678901901234")),
    )
    .await;
    let (_, patient_token) = app.register_patient("maria", "12345678901").await;

    let (status, body) = app
        .request(
            Method::GET,
            "/clinic/cnpj/12345678901901234",
            Some(&patient_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "boaviagem");

    let (status, _) = app
        .request(
            Method::GET,
            "/clinic/cnpj/00000000000000",
            Some(&patient_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clinic_owner_deactivates_itself() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, body) = app
        .request(
            Method::POST,
            "/clinic/register",
            Some(&admin),
            Some(clinic_payload("boaviagem", "12345678901901234")),
        )
        .await;
    let clinic_id: uuid::Uuid = body["id"].as_str().unwrap().parse().unwrap();
    let clinic_token = app.login("boaviagem").await;

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/clinic/{clinic_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/clinic/{clinic_id}"),
            Some(&clinic_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let stored = app.store.any_clinic(clinic_id).await.unwrap();
    assert!(!stored.active);
    assert!(!stored.user.active);

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/clinic/{clinic_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clinic_updates_own_email() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, body) = app
        .request(
            Method::POST,
            "/clinic/register",
            Some(&admin),
            Some(clinic_payload("boaviagem", "12345678901901234")),
        )
        .await;
    let clinic_id = body["id"].as_str().unwrap().to_string();
    let clinic_token = app.login("boaviagem").await;

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/clinic/{clinic_id}"),
            Some(&clinic_token),
            Some(json!({ "email": "contato@boaviagem.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "contato@boaviagem.com");

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/clinic/{clinic_id}"),
            Some(&clinic_token),
            Some(json!({ "email": "admin@bookease.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email já existe");
}

#[tokio::test]
async fn test_lookup_by_name_and_city() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (status, created) = app
        .request(
            Method::POST,
            "/clinic/register",
            Some(&admin),
            Some(clinic_payload("boaviagem", "12345678901901234")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, patient_token) = app.register_patient("maria", "12345678901").await;

    let (status, body) = app
        .request(
            Method::GET,
            "/clinic/name?name=User%20boaviagem",
            Some(&patient_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);

    let (status, body) = app
        .request(Method::GET, "/clinic/city?city=Recife", Some(&patient_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);

    let (status, _) = app
        .request(Method::GET, "/clinic/city?city=Olinda", Some(&patient_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(Method::GET, "/clinic/city?city=Recife", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
