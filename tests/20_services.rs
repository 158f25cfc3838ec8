mod common;

use axum::http::StatusCode;

use common::TestApp;

fn names(list: &serde_json::Value) -> Vec<String> {
    list.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|s| s["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn categories_and_services() {
    let app = TestApp::new().await;

    let res = app.get("/api/services/categories", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(names(&res.data()["categories"]), vec!["Cleaning"]);

    let res = app.get("/api/services", None).await;
    assert_eq!(names(&res.data()["services"]), vec!["House Cleaning", "Office Cleaning"]);
    assert_eq!(res.data()["services"][0]["category_name"], "Cleaning");
}

#[tokio::test]
async fn audience_filter_includes_both() {
    let app = TestApp::new().await;

    let res = app.get("/api/services?audience=individual", None).await;
    assert_eq!(names(&res.data()["services"]), vec!["House Cleaning"]);

    let res = app.get("/api/services?audience=business", None).await;
    assert_eq!(names(&res.data()["services"]), vec!["House Cleaning", "Office Cleaning"]);

    let res = app.get("/api/services?audience=aliens", None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.get("/api/services?category=abc", None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.get("/api/services?audience=", None).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn single_service_and_pricing() {
    let app = TestApp::new().await;
    let id = app.catalog.service_id;

    let res = app.get(&format!("/api/services/{}", id), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["service"]["name"], "House Cleaning");

    let res = app.get(&format!("/api/services/{}/pricing", id), None).await;
    let tiers = res.data()["pricing"].as_array().cloned().unwrap_or_default();
    assert_eq!(tiers.len(), 2);
    assert_eq!(tiers[0]["id"], app.catalog.visit_tier_id);

    let res = app
        .get(&format!("/api/services/{}/pricing?type=contract&mode=resident", id), None)
        .await;
    let tiers = res.data()["pricing"].as_array().cloned().unwrap_or_default();
    assert_eq!(tiers.len(), 1);
    assert_eq!(tiers[0]["id"], app.catalog.contract_tier_id);

    let res = app.get("/api/services/9999", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "Service not found");

    let res = app.get("/api/services/9999/pricing", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn grouped_by_category_drops_empty_categories() {
    let app = TestApp::new().await;
    app.store.seed_category("Empty", 0).await;

    let res = app.get("/api/services/grouped/by-category?audience=individual", None).await;
    assert_eq!(res.status, StatusCode::OK);
    let groups = res.data()["categories"].as_array().cloned().unwrap_or_default();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["name"], "Cleaning");
    assert_eq!(names(&groups[0]["services"]), vec!["House Cleaning"]);
}

#[tokio::test]
async fn unknown_routes_are_404() {
    let app = TestApp::new().await;

    let res = app.get("/api/services/abc", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "Route not found");

    let res = app.get("/api/nothing-here", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["success"], false);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new().await;
    let res = app.get("/api/health", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["status"], "ok");
}
