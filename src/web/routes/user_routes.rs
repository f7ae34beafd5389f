use axum::{
    Json, Router,
    extract::{Extension, State},
    response::IntoResponse,
    routing::put,
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    db::entities::user,
    web::{AppError, AppState, models::AuthenticatedUser},
};

pub fn create_user_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", put(update_profile))
        .route("/password", put(update_password))
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
}

async fn update_profile(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name must not be empty.".to_string()));
    }

    let mut user: user::ActiveModel = user::Entity::find_by_id(auth_user.id)
        .one(&app_state.db_pool)
        .await?
        .ok_or(AppError::UserNotFound)?
        .into();

    user.name = Set(payload.name);
    user.updated_at = Set(chrono::Utc::now());
    let updated_user = user.update(&app_state.db_pool).await?;

    Ok(Json(serde_json::json!({
        "id": updated_user.id,
        "email": updated_user.email,
        "name": updated_user.name
    })))
}

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

async fn update_password(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_model = user::Entity::find_by_id(auth_user.id)
        .one(&app_state.db_pool)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let valid_password = bcrypt::verify(&payload.current_password, &user_model.password_hash)
        .map_err(|_| AppError::InternalServerError("Password verification failed".to_string()))?;

    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    if payload.new_password.len() < 8 {
        return Err(AppError::InvalidInput(
            "Password must be at least 8 characters long.".to_string(),
        ));
    }

    let new_password_hash = bcrypt::hash(&payload.new_password, bcrypt::DEFAULT_COST)
        .map_err(|_| AppError::InternalServerError("Failed to hash new password".to_string()))?;

    let mut user_active_model: user::ActiveModel = user_model.into();
    user_active_model.password_hash = Set(new_password_hash);
    user_active_model.updated_at = Set(chrono::Utc::now());
    user_active_model.update(&app_state.db_pool).await?;

    Ok(Json(serde_json::json!({ "message": "Password updated successfully" })))
}
