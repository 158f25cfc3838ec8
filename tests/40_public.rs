mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{TestApp, TestServer};

#[tokio::test]
async fn contact_form_end_to_end() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/contact"))
        .json(&json!({ "name": "N", "email": "bad", "message": "hi" }))
        .send()
        .await?;
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Invalid email address");

    let res = client
        .post(server.url("/api/contact"))
        .json(&json!({ "name": "N", "email": "n@x.com", "message": "hi" }))
        .send()
        .await?;
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert!(body["data"]["submission_id"].is_i64());

    Ok(())
}

#[tokio::test]
async fn contact_requires_fields() {
    let app = TestApp::new().await;
    let res = app.post("/api/contact", None, json!({ "name": "N" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Missing required fields: email, message");
}

#[tokio::test]
async fn provider_application() {
    let app = TestApp::new().await;
    let application = json!({
        "full_name": "Provider One",
        "email": "p@x.com",
        "phone": "0500000000",
        "skills": ["cooking", "cleaning", "cooking"],
        "experience_years": 4,
        "date_of_birth": "1990-05-01",
    });

    let res = app.post("/api/providers/apply", None, application.clone()).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert!(res.data()["application_id"].is_i64());

    let res = app.post("/api/providers/apply", None, application).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "This email is already registered");
}

#[tokio::test]
async fn provider_application_needs_skills() {
    let app = TestApp::new().await;

    let res = app
        .post(
            "/api/providers/apply",
            None,
            json!({ "full_name": "P", "email": "p@x.com", "phone": "1", "skills": [] }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Missing required fields: skills");

    let res = app
        .post(
            "/api/providers/apply",
            None,
            json!({ "full_name": "P", "email": "p@x", "phone": "1", "skills": "ironing" }),
        )
        .await;
    assert_eq!(res.error(), "Invalid email address");
}
