mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_recipe, register_and_login, request, send, setup_app};

#[tokio::test]
async fn test_auth_required() {
    let (app, _db) = setup_app().await;

    let (status, _) = send(&app, request("GET", "/api/tags", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_tag() {
    let (app, _db) = setup_app().await;
    let token = register_and_login(&app, "user@example.com", "testpass123").await;

    let (status, body) = send(
        &app,
        request("POST", "/api/tags", Some(&token), Some(json!({ "name": "Vegan" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Vegan");
    assert!(body["id"].as_i64().is_some());
}

#[tokio::test]
async fn test_create_duplicate_tag_conflict() {
    let (app, _db) = setup_app().await;
    let token = register_and_login(&app, "user@example.com", "testpass123").await;

    let payload = json!({ "name": "Vegan" });
    let (status, _) = send(
        &app,
        request("POST", "/api/tags", Some(&token), Some(payload.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, request("POST", "/api/tags", Some(&token), Some(payload))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_same_tag_name_allowed_for_other_user() {
    let (app, _db) = setup_app().await;
    let token = register_and_login(&app, "user@example.com", "testpass123").await;
    let other_token = register_and_login(&app, "user2@example.com", "testpass123").await;

    let payload = json!({ "name": "Comfort Food" });
    let (status, _) = send(
        &app,
        request("POST", "/api/tags", Some(&token), Some(payload.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        request("POST", "/api/tags", Some(&other_token), Some(payload)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_tags_limited_to_user_and_ordered() {
    let (app, _db) = setup_app().await;
    let token = register_and_login(&app, "user@example.com", "testpass123").await;
    let other_token = register_and_login(&app, "user2@example.com", "testpass123").await;

    for name in ["Dessert", "Vegan"] {
        let (status, _) = send(
            &app,
            request("POST", "/api/tags", Some(&token), Some(json!({ "name": name }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = send(
        &app,
        request("POST", "/api/tags", Some(&other_token), Some(json!({ "name": "Fruity" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, request("GET", "/api/tags", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let tags = body.as_array().unwrap();
    assert_eq!(tags.len(), 2);
    // Ordered by name descending
    assert_eq!(tags[0]["name"], "Vegan");
    assert_eq!(tags[1]["name"], "Dessert");
}

#[tokio::test]
async fn test_update_tag() {
    let (app, _db) = setup_app().await;
    let token = register_and_login(&app, "user@example.com", "testpass123").await;

    let (_, created) = send(
        &app,
        request("POST", "/api/tags", Some(&token), Some(json!({ "name": "After Dinner" }))),
    )
    .await;
    let tag_id = created["id"].as_i64().unwrap();

    let uri = format!("/api/tags/{tag_id}");
    let (status, body) = send(
        &app,
        request("PATCH", &uri, Some(&token), Some(json!({ "name": "Dessert" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Dessert");
}

#[tokio::test]
async fn test_update_other_users_tag_not_found() {
    let (app, _db) = setup_app().await;
    let token = register_and_login(&app, "user@example.com", "testpass123").await;
    let other_token = register_and_login(&app, "user2@example.com", "testpass123").await;

    let (_, created) = send(
        &app,
        request("POST", "/api/tags", Some(&other_token), Some(json!({ "name": "Spicy" }))),
    )
    .await;
    let tag_id = created["id"].as_i64().unwrap();

    let uri = format!("/api/tags/{tag_id}");
    let (status, _) = send(
        &app,
        request("PUT", &uri, Some(&token), Some(json!({ "name": "Mild" }))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_tag() {
    let (app, _db) = setup_app().await;
    let token = register_and_login(&app, "user@example.com", "testpass123").await;

    let (_, created) = send(
        &app,
        request("POST", "/api/tags", Some(&token), Some(json!({ "name": "Breakfast" }))),
    )
    .await;
    let tag_id = created["id"].as_i64().unwrap();

    let uri = format!("/api/tags/{tag_id}");
    let (status, _) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, request("GET", "/api/tags", Some(&token), None)).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_other_users_tag_not_found() {
    let (app, _db) = setup_app().await;
    let token = register_and_login(&app, "user@example.com", "testpass123").await;
    let other_token = register_and_login(&app, "user2@example.com", "testpass123").await;

    let (_, created) = send(
        &app,
        request("POST", "/api/tags", Some(&other_token), Some(json!({ "name": "Spicy" }))),
    )
    .await;
    let tag_id = created["id"].as_i64().unwrap();

    let uri = format!("/api/tags/{tag_id}");
    let (status, _) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, request("GET", "/api/tags", Some(&other_token), None)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_tag_unlinks_recipes() {
    let (app, _db) = setup_app().await;
    let token = register_and_login(&app, "user@example.com", "testpass123").await;

    let created = create_recipe(&app, &token, json!({ "tags": [{ "name": "Dinner" }] })).await;
    let recipe_id = created["id"].as_i64().unwrap();
    let tag_id = created["tags"][0]["id"].as_i64().unwrap();

    let uri = format!("/api/tags/{tag_id}");
    let (status, _) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let uri = format!("/api/recipes/{recipe_id}");
    let (status, body) = send(&app, request("GET", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["tags"].as_array().unwrap().is_empty());
}
