#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use khedma_api::api::{app, AppState};
use khedma_api::auth::password::hash_password;
use khedma_api::config::AppConfig;
use khedma_api::database::models::{Audience, NewAccount, PricingType, Role, AccountType, ServiceMode};
use khedma_api::database::{MemoryStore, Store};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "secret1";

/// Ids of the catalog rows every [`TestApp`] starts with.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    pub category_id: i64,
    /// "House Cleaning", audience `both`
    pub service_id: i64,
    /// visit / non_resident at 100
    pub visit_tier_id: i64,
    /// contract / resident at 2000
    pub contract_tier_id: i64,
    /// "Office Cleaning", audience `business`
    pub business_service_id: i64,
    /// Tier of the business service; never valid for `service_id`
    pub business_tier_id: i64,
}

/// The application router over a fresh in-memory store, driven in-process.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub catalog: Catalog,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = Some(TEST_SECRET.to_string());
    config.api.enable_request_logging = false;
    config
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());

        let category = store.seed_category("Cleaning", 1).await;
        let house = store.seed_service(category.id, "House Cleaning", Audience::Both).await;
        let visit = store
            .seed_pricing(house.id, PricingType::Visit, ServiceMode::NonResident, Decimal::new(100, 0))
            .await;
        let contract = store
            .seed_pricing(house.id, PricingType::Contract, ServiceMode::Resident, Decimal::new(2000, 0))
            .await;
        let office = store.seed_service(category.id, "Office Cleaning", Audience::Business).await;
        let office_tier = store
            .seed_pricing(office.id, PricingType::Visit, ServiceMode::NonResident, Decimal::new(300, 0))
            .await;

        let shared: Arc<dyn Store> = store.clone();
        let state = AppState::new(test_config(), shared).expect("test state");

        Self {
            store,
            catalog: Catalog {
                category_id: category.id,
                service_id: house.id,
                visit_tier_id: visit.id,
                contract_tier_id: contract.id,
                business_service_id: office.id,
                business_tier_id: office_tier.id,
            },
            router: app(state),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    /// Register an individual account and return its token.
    pub async fn register(&self, email: &str) -> String {
        let res = self
            .post(
                "/api/auth/register",
                None,
                json!({ "email": email, "password": PASSWORD, "full_name": "Test User" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register failed: {}", res.body);
        res.data()["token"].as_str().expect("token").to_string()
    }

    /// Create an admin directly in the store, then log in through the API.
    pub async fn admin_token(&self) -> String {
        let email = "admin@khedma.test";
        if !self.store.email_registered(email).await.expect("store") {
            self.store
                .create_account(NewAccount {
                    email: email.to_string(),
                    password_hash: hash_password(PASSWORD).expect("hash"),
                    full_name: "Admin".to_string(),
                    role: Role::Admin,
                    account_type: AccountType::Individual,
                    business_name: None,
                    business_registration: None,
                    phone: None,
                    address: None,
                    city: None,
                })
                .await
                .expect("create admin");
        }

        let res = self
            .post("/api/auth/login", None, json!({ "email": email, "password": PASSWORD }))
            .await;
        assert_eq!(res.status, StatusCode::OK, "admin login failed: {}", res.body);
        res.data()["token"].as_str().expect("token").to_string()
    }

    pub fn booking_body(&self, pricing_id: i64) -> Value {
        json!({
            "service_id": self.catalog.service_id,
            "pricing_id": pricing_id,
            "booking_type": "visit",
            "service_mode": "non_resident",
            "start_date": "2026-11-01",
            "service_address": "12 King Fahd Rd",
        })
    }

    /// Create a booking on the visit tier and return its id.
    pub async fn book(&self, token: &str) -> i64 {
        let res = self
            .post("/api/bookings", Some(token), self.booking_body(self.catalog.visit_tier_id))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "booking failed: {}", res.body);
        res.data()["booking_id"].as_i64().expect("booking_id")
    }
}

/// The compiled binary serving an in-memory store on a free port.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_khedma-api"))
            .args(["serve", "--memory-store", "--port", &port.to_string()])
            .env("JWT_SECRET", TEST_SECRET)
            .env("APP_ENV", "development")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self { port, base_url, child };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/api/health", self.base_url);

        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
