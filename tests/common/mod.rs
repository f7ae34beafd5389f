#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use recipenest::db;
use recipenest::server::config::ServerConfig;
use recipenest::web;

/// Builds the full application router backed by a fresh in-memory SQLite
/// database with the schema applied.
pub async fn setup_app() -> (Router, DatabaseConnection) {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    // A single connection keeps every query on the same in-memory database.
    options.max_connections(1).sqlx_logging(false);
    let db_pool = Database::connect(options).await.expect("connect to sqlite");
    db::init_schema(&db_pool).await.expect("create schema");

    let config = Arc::new(ServerConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
    });

    (web::create_axum_router(db_pool.clone(), config), db_pool)
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    }
}

/// Sends a request through the router and returns the status plus the JSON
/// body (`Value::Null` for empty or non-JSON bodies).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

/// Registers a user and returns a bearer token for them.
pub async fn register_and_login(app: &Router, email: &str, password: &str) -> String {
    let (status, _) = send(
        app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": email, "name": "Test User", "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token in response").to_string()
}

/// Creates a recipe from the default sample payload merged with `overrides`,
/// returning the detail body.
pub async fn create_recipe(app: &Router, token: &str, overrides: Value) -> Value {
    let mut payload = json!({
        "title": "Sample Recipe",
        "time_minutes": 10,
        "price": 5.25,
        "description": "Sample description",
        "link": "https://sample.com/recipe.pdf"
    });
    if let (Some(base), Some(extra)) = (payload.as_object_mut(), overrides.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }

    let (status, body) = send(app, request("POST", "/api/recipes", Some(token), Some(payload))).await;
    assert_eq!(status, StatusCode::CREATED);
    body
}
