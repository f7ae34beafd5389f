use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::models::Ingredient as DtoIngredient;
use crate::db::services;
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState, error};

// --- Request Structs ---

#[derive(Deserialize)]
pub struct CreateIngredientRequest {
    name: String,
}

#[derive(Deserialize)]
pub struct UpdateIngredientRequest {
    name: String,
}

// --- Route Handlers ---

async fn list_ingredients_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<DtoIngredient>>, AppError> {
    let ingredients =
        services::get_ingredients_by_user_id(&app_state.db_pool, authenticated_user.id)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
    Ok(Json(ingredients.into_iter().map(DtoIngredient::from).collect()))
}

async fn create_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<DtoIngredient>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name must not be empty.".to_string()));
    }

    let ingredient =
        services::create_ingredient(&app_state.db_pool, authenticated_user.id, &payload.name)
            .await
            .map_err(|e| {
                error::conflict_on_unique_violation(
                    e,
                    "An ingredient with this name already exists.",
                )
            })?;
    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

async fn update_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(ingredient_id): Path<i32>,
    Json(payload): Json<UpdateIngredientRequest>,
) -> Result<Json<DtoIngredient>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name must not be empty.".to_string()));
    }

    let updated = services::update_ingredient(
        &app_state.db_pool,
        ingredient_id,
        authenticated_user.id,
        &payload.name,
    )
    .await
    .map_err(|e| {
        error::conflict_on_unique_violation(e, "An ingredient with this name already exists.")
    })?
    .ok_or_else(|| AppError::NotFound("Ingredient not found".to_string()))?;
    Ok(Json(updated.into()))
}

async fn delete_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(ingredient_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let delete_result =
        services::delete_ingredient(&app_state.db_pool, ingredient_id, authenticated_user.id)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    if delete_result.rows_affected > 0 {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Ingredient not found".to_string()))
    }
}

// --- Router ---

pub fn create_ingredients_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(list_ingredients_handler).post(create_ingredient_handler),
        )
        .route(
            "/{ingredient_id}",
            put(update_ingredient_handler)
                .patch(update_ingredient_handler)
                .delete(delete_ingredient_handler),
        )
}
