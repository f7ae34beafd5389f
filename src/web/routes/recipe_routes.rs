use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::models::{Ingredient as DtoIngredient, Tag as DtoTag};
use crate::db::services::{self, NewRecipe, RecipeChanges, RecipeWithAttrs};
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

// --- Request/Response Structs ---

#[derive(Deserialize)]
pub struct AttrInput {
    name: String,
}

#[derive(Deserialize)]
pub struct CreateRecipeRequest {
    title: String,
    time_minutes: i32,
    price: f64,
    description: Option<String>,
    link: Option<String>,
    tags: Option<Vec<AttrInput>>,
    ingredients: Option<Vec<AttrInput>>,
}

#[derive(Deserialize)]
pub struct PatchRecipeRequest {
    title: Option<String>,
    time_minutes: Option<i32>,
    price: Option<f64>,
    description: Option<String>,
    link: Option<String>,
    tags: Option<Vec<AttrInput>>,
    ingredients: Option<Vec<AttrInput>>,
}

/// List item: everything except the description.
#[derive(Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub link: Option<String>,
    pub tags: Vec<DtoTag>,
    pub ingredients: Vec<DtoIngredient>,
}

/// Detail view: the list fields plus the description.
#[derive(Serialize)]
pub struct RecipeDetailResponse {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Vec<DtoTag>,
    pub ingredients: Vec<DtoIngredient>,
}

impl From<RecipeWithAttrs> for RecipeResponse {
    fn from(value: RecipeWithAttrs) -> Self {
        Self {
            id: value.recipe.id,
            title: value.recipe.title,
            time_minutes: value.recipe.time_minutes,
            price: value.recipe.price,
            link: value.recipe.link,
            tags: value.tags.into_iter().map(DtoTag::from).collect(),
            ingredients: value.ingredients.into_iter().map(DtoIngredient::from).collect(),
        }
    }
}

impl From<RecipeWithAttrs> for RecipeDetailResponse {
    fn from(value: RecipeWithAttrs) -> Self {
        Self {
            id: value.recipe.id,
            title: value.recipe.title,
            time_minutes: value.recipe.time_minutes,
            price: value.recipe.price,
            description: value.recipe.description,
            link: value.recipe.link,
            tags: value.tags.into_iter().map(DtoTag::from).collect(),
            ingredients: value.ingredients.into_iter().map(DtoIngredient::from).collect(),
        }
    }
}

fn attr_names(attrs: Option<Vec<AttrInput>>) -> Result<Option<Vec<String>>, AppError> {
    let Some(attrs) = attrs else {
        return Ok(None);
    };
    let names: Vec<String> = attrs.into_iter().map(|a| a.name).collect();
    if names.iter().any(|n| n.trim().is_empty()) {
        return Err(AppError::InvalidInput(
            "Tag and ingredient names must not be empty.".to_string(),
        ));
    }
    Ok(Some(names))
}

fn validate_core_fields(
    title: Option<&str>,
    time_minutes: Option<i32>,
    price: Option<f64>,
) -> Result<(), AppError> {
    if let Some(title) = title {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput("Title must not be empty.".to_string()));
        }
    }
    if let Some(time_minutes) = time_minutes {
        if time_minutes < 0 {
            return Err(AppError::InvalidInput(
                "Preparation time must not be negative.".to_string(),
            ));
        }
    }
    if let Some(price) = price {
        if price < 0.0 {
            return Err(AppError::InvalidInput("Price must not be negative.".to_string()));
        }
    }
    Ok(())
}

// --- Route Handlers ---

async fn list_recipes_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let recipes = services::get_recipes_by_user_id(&app_state.db_pool, authenticated_user.id)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

async fn create_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeDetailResponse>), AppError> {
    validate_core_fields(
        Some(&payload.title),
        Some(payload.time_minutes),
        Some(payload.price),
    )?;

    let data = NewRecipe {
        title: payload.title,
        time_minutes: payload.time_minutes,
        price: payload.price,
        description: payload.description,
        link: payload.link,
        tags: attr_names(payload.tags)?,
        ingredients: attr_names(payload.ingredients)?,
    };

    let created = services::create_recipe(&app_state.db_pool, authenticated_user.id, data)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn get_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let recipe =
        services::get_recipe_by_id(&app_state.db_pool, recipe_id, authenticated_user.id)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))?;
    Ok(Json(recipe.into()))
}

async fn update_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    validate_core_fields(
        Some(&payload.title),
        Some(payload.time_minutes),
        Some(payload.price),
    )?;

    let changes = RecipeChanges {
        title: Some(payload.title),
        time_minutes: Some(payload.time_minutes),
        price: Some(payload.price),
        description: payload.description,
        link: payload.link,
        tags: attr_names(payload.tags)?,
        ingredients: attr_names(payload.ingredients)?,
    };

    apply_recipe_changes(&app_state, recipe_id, authenticated_user.id, changes).await
}

async fn patch_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
    Json(payload): Json<PatchRecipeRequest>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    validate_core_fields(
        payload.title.as_deref(),
        payload.time_minutes,
        payload.price,
    )?;

    let changes = RecipeChanges {
        title: payload.title,
        time_minutes: payload.time_minutes,
        price: payload.price,
        description: payload.description,
        link: payload.link,
        tags: attr_names(payload.tags)?,
        ingredients: attr_names(payload.ingredients)?,
    };

    apply_recipe_changes(&app_state, recipe_id, authenticated_user.id, changes).await
}

async fn apply_recipe_changes(
    app_state: &AppState,
    recipe_id: i32,
    user_id: i32,
    changes: RecipeChanges,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let updated = services::update_recipe(&app_state.db_pool, recipe_id, user_id, changes)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))?;
    Ok(Json(updated.into()))
}

async fn delete_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let delete_result =
        services::delete_recipe(&app_state.db_pool, recipe_id, authenticated_user.id)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    if delete_result.rows_affected > 0 {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Recipe not found".to_string()))
    }
}

// --- Router ---

pub fn create_recipes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_recipes_handler).post(create_recipe_handler))
        .route(
            "/{recipe_id}",
            get(get_recipe_handler)
                .put(update_recipe_handler)
                .patch(patch_recipe_handler)
                .delete(delete_recipe_handler),
        )
}
