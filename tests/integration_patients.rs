mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use bookease_models::RoleName;
use common::{PASSWORD, TestApp, patient_payload};

#[tokio::test]
async fn test_register_is_public() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/patient/register",
            None,
            Some(patient_payload("maria", "12345678901")),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["cpf"], "12345678901");
    assert_eq!(body["username"], "maria");
    assert_eq!(body["active"], true);
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_cpf_conflicts() {
    let app = TestApp::new();
    app.register_patient("maria", "12345678901").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/patient/register",
            None,
            Some(patient_payload("joana", "12345678901")),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CPF já existe");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new();
    app.register_patient("maria", "12345678901").await;

    let mut payload = patient_payload("joana", "10987654321");
    payload["user"]["email"] = json!("maria@bookease.com");

    let (status, body) = app
        .request(Method::POST, "/patient/register", None, Some(payload))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email já existe");
}

#[tokio::test]
async fn test_register_invalid_cpf_is_unprocessable() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/patient/register",
            None,
            Some(patient_payload("maria", "1234567890a")),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "CPF deve conter apenas números");
}

#[tokio::test]
async fn test_lookups_require_authentication() {
    let app = TestApp::new();
    let (patient_id, token) = app.register_patient("maria", "12345678901").await;

    let (status, _) = app
        .request(Method::GET, &format!("/patient/{patient_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request(Method::GET, "/patient/cpf/12345678901", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], patient_id.to_string());
}

#[tokio::test]
async fn test_owner_updates_profile() {
    let app = TestApp::new();
    let (patient_id, token) = app.register_patient("maria", "12345678901").await;

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/patient/{patient_id}"),
            Some(&token),
            Some(json!({ "name": "Maria Souza", "phone": "81987654321" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Maria Souza");
    assert_eq!(body["phone"], "81987654321");
}

#[tokio::test]
async fn test_other_patient_cannot_update() {
    let app = TestApp::new();
    let (maria_id, _) = app.register_patient("maria", "12345678901").await;
    let (_, joana_token) = app.register_patient("joana", "10987654321").await;

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/patient/{maria_id}"),
            Some(&joana_token),
            Some(json!({ "name": "Hijacked" })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "Você só pode alterar suas próprias informações"
    );
}

#[tokio::test]
async fn test_doctor_role_cannot_reach_patient_mutations() {
    let app = TestApp::new();
    let (patient_id, _) = app.register_patient("maria", "12345678901").await;
    app.seed_user("house", RoleName::Doctor).await;
    let doctor_token = app.login("house").await;

    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/patient/{patient_id}"),
            Some(&doctor_token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied. Required roles: ROLE_PATIENT");
}

#[tokio::test]
async fn test_owner_deactivation_hides_patient_and_blocks_login() {
    let app = TestApp::new();
    let (patient_id, token) = app.register_patient("maria", "12345678901").await;

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/patient/{patient_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let stored = app.store.any_patient(patient_id).await.unwrap();
    assert!(!stored.active);
    assert!(!stored.user.active);

    let (status, _) = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "maria", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The CPF and username are free again once the old record is inactive.
    app.register_patient("maria", "12345678901").await;
}

#[tokio::test]
async fn test_lookup_by_display_name() {
    let app = TestApp::new();
    let (patient_id, token) = app.register_patient("maria", "12345678901").await;

    let (status, body) = app
        .request(Method::GET, "/patient/name?name=User%20maria", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], patient_id.to_string());

    let (status, body) = app
        .request(Method::GET, "/patient/name?name=Nobody", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Patient with identifier Nobody not found");
}
