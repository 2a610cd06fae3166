//! Wishlist API tests: membership, duplicate adds, safe removals.

use axum::http::StatusCode;
use serde_json::json;

use stg_catalog_integration_tests::{TestApp, sample_product, test_user};

#[tokio::test]
async fn test_wishlist_requires_identity() {
    let app = TestApp::spawn().await;
    let (status, _) = app.get("/api/wishlist", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_and_list_wishlist() {
    let app = TestApp::spawn().await;
    let user = test_user();
    let caneca = sample_product("Caneca", "25.50", "cozinha", 0);
    app.store.seed_product(&caneca);

    let (status, body) = app
        .post(
            "/api/wishlist/add",
            Some(&user),
            json!({ "product_id": caneca.id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("items").len(), 1);

    let (_, body) = app.get("/api/wishlist", Some(&user)).await;
    assert_eq!(body[0]["name"], "Caneca");
}

#[tokio::test]
async fn test_duplicate_add_is_noop() {
    let app = TestApp::spawn().await;
    let user = test_user();
    let caneca = sample_product("Caneca", "25.50", "cozinha", 0);
    app.store.seed_product(&caneca);

    app.post(
        "/api/wishlist/add",
        Some(&user),
        json!({ "product_id": caneca.id }),
    )
    .await;
    let (_, body) = app
        .post(
            "/api/wishlist/add",
            Some(&user),
            json!({ "product_id": caneca.id }),
        )
        .await;

    assert_eq!(body.as_array().expect("items").len(), 1);
}

#[tokio::test]
async fn test_remove_absent_product_is_safe_noop() {
    let app = TestApp::spawn().await;
    let user = test_user();
    let caneca = sample_product("Caneca", "25.50", "cozinha", 0);
    app.store.seed_product(&caneca);

    app.post(
        "/api/wishlist/add",
        Some(&user),
        json!({ "product_id": caneca.id }),
    )
    .await;

    let (status, body) = app
        .post(
            "/api/wishlist/remove",
            Some(&user),
            json!({ "product_id": uuid::Uuid::new_v4() }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("items").len(), 1);
}

#[tokio::test]
async fn test_remove_saved_product() {
    let app = TestApp::spawn().await;
    let user = test_user();
    let caneca = sample_product("Caneca", "25.50", "cozinha", 0);
    app.store.seed_product(&caneca);

    app.post(
        "/api/wishlist/add",
        Some(&user),
        json!({ "product_id": caneca.id }),
    )
    .await;
    let (_, body) = app
        .post(
            "/api/wishlist/remove",
            Some(&user),
            json!({ "product_id": caneca.id }),
        )
        .await;

    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_product_detail_reports_wishlist_membership() {
    let app = TestApp::spawn().await;
    let user = test_user();
    let caneca = sample_product("Caneca", "25.50", "cozinha", 0);
    app.store.seed_product(&caneca);

    app.post(
        "/api/wishlist/add",
        Some(&user),
        json!({ "product_id": caneca.id }),
    )
    .await;

    let (_, body) = app
        .get(&format!("/api/products/{}", caneca.id), Some(&user))
        .await;
    assert_eq!(body["in_wishlist"], true);

    // Anonymous requests see no membership
    let (_, body) = app.get(&format!("/api/products/{}", caneca.id), None).await;
    assert_eq!(body["in_wishlist"], false);
}
