#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use bookease::router::init_router;
use bookease::state::AppState;
use bookease_auth::CredentialStore;
use bookease_auth::TokenService;
use bookease_auth::testing::test_token_service;
use bookease_config::CorsConfig;
use bookease_core::{BcryptHasher, PasswordHasher};
use bookease_db::MemoryStore;
use bookease_models::{RoleName, User, UserRequestDto};

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub tokens: Arc<TokenService>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(test_token_service());
        let state = AppState::in_memory(
            store.clone(),
            tokens.clone(),
            Arc::new(BcryptHasher::with_cost(4)),
            CorsConfig::default(),
        );

        Self {
            store,
            tokens,
            router: init_router(state),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Stores an account that is not linked to any clinic, doctor or patient.
    pub async fn seed_user(&self, username: &str, role: RoleName) -> User {
        let dto = user_payload_dto(username);
        let hash = BcryptHasher::with_cost(4).hash(PASSWORD).unwrap();
        let user = User::new(&dto, hash, role);
        self.store.save_user(&user).await.unwrap();
        user
    }

    pub async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.seed_user("admin", RoleName::Admin).await;
        self.login("admin").await
    }

    /// Registers a patient through the public endpoint and logs in as it.
    pub async fn register_patient(&self, username: &str, cpf: &str) -> (Uuid, String) {
        let (status, body) = self
            .request(
                Method::POST,
                "/patient/register",
                None,
                Some(patient_payload(username, cpf)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let id = body["id"].as_str().unwrap().parse().unwrap();
        (id, self.login(username).await)
    }
}

fn user_payload_dto(username: &str) -> UserRequestDto {
    UserRequestDto {
        username: username.to_string(),
        password: PASSWORD.to_string(),
        name: format!("User {username}"),
        phone: None,
        email: format!("{username}@bookease.com"),
    }
}

pub fn user_payload(username: &str) -> Value {
    json!({
        "username": username,
        "password": PASSWORD,
        "name": format!("User {username}"),
        "email": format!("{username}@bookease.com"),
    })
}

pub fn patient_payload(username: &str, cpf: &str) -> Value {
    json!({ "cpf": cpf, "user": user_payload(username) })
}

pub fn clinic_payload(username: &str, cnpj: &str) -> Value {
    json!({
        "cnpj": cnpj,
        "city": "Recife",
        "address": "Rua da Aurora, 10",
        "user": user_payload(username),
    })
}

pub fn doctor_payload(username: &str, crm: &str) -> Value {
    json!({ "crm": crm, "user": user_payload(username) })
}
