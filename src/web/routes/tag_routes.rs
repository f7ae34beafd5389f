use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::models::Tag as DtoTag;
use crate::db::services;
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState, error};

// --- Request Structs ---

#[derive(Deserialize)]
pub struct CreateTagRequest {
    name: String,
}

#[derive(Deserialize)]
pub struct UpdateTagRequest {
    name: String,
}

// --- Route Handlers ---

async fn list_tags_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<DtoTag>>, AppError> {
    let tags = services::get_tags_by_user_id(&app_state.db_pool, authenticated_user.id)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
    Ok(Json(tags.into_iter().map(DtoTag::from).collect()))
}

async fn create_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<DtoTag>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name must not be empty.".to_string()));
    }

    let tag = services::create_tag(&app_state.db_pool, authenticated_user.id, &payload.name)
        .await
        .map_err(|e| {
            error::conflict_on_unique_violation(e, "A tag with this name already exists.")
        })?;
    Ok((StatusCode::CREATED, Json(tag.into())))
}

async fn update_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
    Json(payload): Json<UpdateTagRequest>,
) -> Result<Json<DtoTag>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name must not be empty.".to_string()));
    }

    let updated = services::update_tag(
        &app_state.db_pool,
        tag_id,
        authenticated_user.id,
        &payload.name,
    )
    .await
    .map_err(|e| error::conflict_on_unique_violation(e, "A tag with this name already exists."))?
    .ok_or_else(|| AppError::NotFound("Tag not found".to_string()))?;
    Ok(Json(updated.into()))
}

async fn delete_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let delete_result = services::delete_tag(&app_state.db_pool, tag_id, authenticated_user.id)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    if delete_result.rows_affected > 0 {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Tag not found".to_string()))
    }
}

// --- Router ---

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tags_handler).post(create_tag_handler))
        .route(
            "/{tag_id}",
            put(update_tag_handler)
                .patch(update_tag_handler)
                .delete(delete_tag_handler),
        )
}
