mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn admin_routes_require_the_admin_role() {
    let app = TestApp::new().await;
    let user = app.register("a@x.com").await;

    let res = app.get("/api/admin/stats", None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.get("/api/admin/stats", Some(&user)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error(), "Admin access required");

    let admin = app.admin_token().await;
    let res = app.get("/api/admin/stats", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn booking_lifecycle() {
    let app = TestApp::new().await;
    let user = app.register("a@x.com").await;
    let admin = app.admin_token().await;
    let id = app.book(&user).await;
    let path = format!("/api/admin/bookings/{}", id);

    let res = app.put(&path, Some(&admin), json!({ "status": "completed", "notes": "skip" })).await;
    assert_eq!(res.status, StatusCode::OK, "forward jumps are allowed: {}", res.body);
    assert_eq!(res.data()["booking"]["notes"], "skip");

    let res = app.put(&path, Some(&admin), json!({ "status": "pending" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Invalid status transition");

    let res = app.put(&path, Some(&admin), json!({ "status": "cancelled" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.put(&path, Some(&admin), json!({ "status": "completed", "notes": "done" })).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.put(&path, Some(&admin), json!({})).await;
    assert_eq!(res.error(), "Missing required fields: status");

    let res = app.put(&path, Some(&admin), json!({ "status": "lost" })).await;
    assert_eq!(res.error(), "Invalid status");

    let res = app.put("/api/admin/bookings/9999", Some(&admin), json!({ "status": "confirmed" })).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assign_provider_to_booking() {
    let app = TestApp::new().await;
    let user = app.register("a@x.com").await;
    let admin = app.admin_token().await;
    let id = app.book(&user).await;

    let res = app
        .post(
            "/api/providers/apply",
            None,
            json!({ "full_name": "Provider One", "email": "p@x.com", "phone": "0500", "skills": "cleaning" }),
        )
        .await;
    let provider_id = res.data()["application_id"].as_i64().unwrap_or_default();

    let res = app
        .put(
            &format!("/api/admin/bookings/{}", id),
            Some(&admin),
            json!({ "status": "confirmed", "assigned_provider_id": 9999 }),
        )
        .await;
    assert_eq!(res.error(), "Assigned provider does not exist");

    let res = app
        .put(
            &format!("/api/admin/bookings/{}", id),
            Some(&admin),
            json!({ "status": "confirmed", "assigned_provider_id": provider_id.to_string() }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    let res = app.get(&format!("/api/bookings/{}", id), Some(&user)).await;
    assert_eq!(res.data()["booking"]["provider_name"], "Provider One");
    assert_eq!(res.data()["booking"]["status"], "confirmed");

    let res = app.get("/api/admin/bookings?status=confirmed", Some(&admin)).await;
    assert_eq!(res.data()["bookings"].as_array().map(Vec::len), Some(1));
    assert_eq!(res.data()["bookings"][0]["user_email"], "a@x.com");
}

#[tokio::test]
async fn dashboard_stats() {
    let app = TestApp::new().await;
    let user = app.register("a@x.com").await;
    app.register("b@x.com").await;
    let admin = app.admin_token().await;
    let first = app.book(&user).await;
    app.book(&user).await;
    app.put(&format!("/api/bookings/{}/cancel", first), Some(&user), json!({}))
        .await;
    app.post("/api/contact", None, json!({ "name": "N", "email": "n@x.com", "message": "hi" }))
        .await;

    let res = app.get("/api/admin/dashboard", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    let stats = &res.data()["stats"];
    assert_eq!(stats["total_users"], 2);
    assert_eq!(stats["active_services"], 2);
    assert_eq!(stats["bookings"]["total"], 2);
    assert_eq!(stats["bookings"]["by_status"]["pending"], 1);
    assert_eq!(stats["bookings"]["by_status"]["cancelled"], 1);
    assert_eq!(stats["providers"]["total"], 0);
    assert_eq!(stats["new_contacts"], 1);
    assert_eq!(stats["recent_bookings"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn users_are_paginated() {
    let app = TestApp::new().await;
    for i in 0..3 {
        app.register(&format!("u{}@x.com", i)).await;
    }
    let admin = app.admin_token().await;

    let res = app.get("/api/admin/users?page=2&limit=3", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["users"].as_array().map(Vec::len), Some(1));
    assert_eq!(
        res.data()["pagination"],
        json!({ "page": 2, "limit": 3, "total": 4, "pages": 2 })
    );

    let res = app.get("/api/admin/users?limit=500", Some(&admin)).await;
    assert_eq!(res.data()["pagination"]["limit"], 100);

    let res = app.get("/api/admin/users?page=x", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn out_of_range_page_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let res = app
        .get("/api/admin/users?page=9223372036854775807&limit=100", Some(&admin))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Invalid page");

    // The last accepted page is simply empty.
    let res = app.get("/api/admin/users?page=1000000&limit=100", Some(&admin)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["users"].as_array().map(Vec::len), Some(0));
    assert_eq!(res.data()["pagination"]["page"], 1_000_000);
}

#[tokio::test]
async fn deactivated_users_cannot_log_in() {
    let app = TestApp::new().await;
    let token = app.register("a@x.com").await;
    let admin = app.admin_token().await;

    let me = app.get("/api/auth/me", Some(&token)).await;
    let id = me.data()["user"]["id"].as_i64().unwrap_or_default();

    let res = app
        .put(&format!("/api/admin/users/{}", id), Some(&admin), json!({ "is_active": false }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["user"]["is_active"], false);

    let res = app
        .post("/api/auth/login", None, json!({ "email": "a@x.com", "password": common::PASSWORD }))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.put("/api/admin/users/9999", Some(&admin), json!({ "role": "admin" })).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admins_cannot_demote_themselves() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let me = app.get("/api/auth/me", Some(&admin)).await;
    let id = me.data()["user"]["id"].as_i64().unwrap_or_default();

    let res = app
        .put(&format!("/api/admin/users/{}", id), Some(&admin), json!({ "role": "user" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .put(&format!("/api/admin/users/{}", id), Some(&admin), json!({ "is_active": false }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn provider_and_contact_triage() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    app.post(
        "/api/providers/apply",
        None,
        json!({ "full_name": "P", "email": "p@x.com", "phone": "1", "skills": ["cooking"] }),
    )
    .await;
    let res = app.get("/api/admin/providers?status=pending", Some(&admin)).await;
    let provider_id = res.data()["providers"][0]["id"].as_i64().unwrap_or_default();

    let res = app
        .put(
            &format!("/api/admin/providers/{}", provider_id),
            Some(&admin),
            json!({ "status": "approved", "notes": "Interviewed" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["provider"]["status"], "approved");
    assert_eq!(res.data()["provider"]["notes"], "Interviewed");

    let res = app
        .put(&format!("/api/admin/providers/{}", provider_id), Some(&admin), json!({ "status": "hired" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post("/api/contact", None, json!({ "name": "N", "email": "n@x.com", "message": "hi" }))
        .await;
    let contact_id = res.data()["submission_id"].as_i64().unwrap_or_default();

    let res = app
        .put(&format!("/api/admin/contacts/{}", contact_id), Some(&admin), json!({ "status": "read" }))
        .await;
    assert_eq!(res.data()["submission"]["status"], "read");

    let res = app.get("/api/admin/contacts?status=new", Some(&admin)).await;
    assert_eq!(res.data()["submissions"].as_array().map(Vec::len), Some(0));

    let res = app.put("/api/admin/contacts/9999", Some(&admin), json!({ "status": "read" })).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_management() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let service_path = format!("/api/admin/services/{}", app.catalog.business_service_id);

    let res = app.put(&service_path, Some(&admin), json!({ "is_active": false })).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get("/api/services", None).await;
    assert_eq!(res.data()["services"].as_array().map(Vec::len), Some(1));

    let res = app.get("/api/admin/services", Some(&admin)).await;
    assert_eq!(res.data()["services"].as_array().map(Vec::len), Some(2));

    let res = app.put(&service_path, Some(&admin), json!({ "name": " " })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .get(&format!("/api/admin/pricing?service_id={}", app.catalog.service_id), Some(&admin))
        .await;
    assert_eq!(res.data()["pricing"].as_array().map(Vec::len), Some(2));

    let res = app
        .put(
            &format!("/api/admin/pricing/{}", app.catalog.visit_tier_id),
            Some(&admin),
            json!({ "price": -1 }),
        )
        .await;
    assert_eq!(res.error(), "Price cannot be negative");

    let tier_path = format!("/api/admin/pricing/{}", app.catalog.visit_tier_id);
    let res = app.put(&tier_path, Some(&admin), json!({ "price": 1e12 })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Price must be less than 100000000");

    let res = app.put(&tier_path, Some(&admin), json!({ "price": "10.005" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Price cannot have more than 2 decimal places");

    let res = app.put(&tier_path, Some(&admin), json!({ "price": "99999999.99" })).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);

    let res = app
        .put(
            &format!("/api/admin/pricing/{}", app.catalog.visit_tier_id),
            Some(&admin),
            json!({ "is_active": false }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let user = app.register("a@x.com").await;
    let res = app
        .post("/api/bookings", Some(&user), app.booking_body(app.catalog.visit_tier_id))
        .await;
    assert_eq!(res.error(), "Invalid pricing option");
}
