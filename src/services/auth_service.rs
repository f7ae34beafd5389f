use axum::{Extension, Json, extract::State};
use bcrypt::{DEFAULT_COST, hash, verify};
use std::sync::Arc;
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};

use crate::db::entities::user;
use crate::web::AppState;
use crate::web::error::AppError;
use crate::web::models::{
    AuthenticatedUser, Claims, LoginRequest, LoginResponse, RegisterRequest, UserResponse,
};

pub async fn register_user(
    pool: &DatabaseConnection,
    req: RegisterRequest,
) -> Result<UserResponse, AppError> {
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::InvalidInput(
            "A valid email address is required.".to_string(),
        ));
    }
    if req.password.len() < 8 {
        return Err(AppError::InvalidInput(
            "Password must be at least 8 characters long.".to_string(),
        ));
    }

    let existing_user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(pool)
        .await
        .map_err(|e: DbErr| AppError::DatabaseError(format!("Failed to check for existing user: {e}")))?;

    if existing_user.is_some() {
        return Err(AppError::UserAlreadyExists(
            "A user with this email already exists.".to_string(),
        ));
    }

    let password_hash = hash(&req.password, DEFAULT_COST)
        .map_err(|e| AppError::PasswordHashingError(format!("Failed to hash password: {e}")))?;

    let now = Utc::now();
    let new_user = user::ActiveModel {
        email: Set(req.email.clone()),
        name: Set(req.name.clone()),
        password_hash: Set(password_hash),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_user.insert(pool).await {
        Ok(user_model) => Ok(UserResponse {
            id: user_model.id,
            email: user_model.email,
            name: user_model.name,
        }),
        Err(e) => Err(AppError::DatabaseError(format!("Failed to create user: {e}"))),
    }
}

pub async fn login_user(
    pool: &DatabaseConnection,
    req: LoginRequest,
    jwt_secret: &str,
) -> Result<LoginResponse, AppError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Email and password must not be empty.".to_string(),
        ));
    }

    let user_model_option = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(pool)
        .await
        .map_err(|e: DbErr| AppError::DatabaseError(format!("Failed to look up user: {e}")))?;

    let user = match user_model_option {
        Some(u) => u,
        None => return Err(AppError::UserNotFound),
    };

    let valid_password = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    create_jwt_for_user(&user, jwt_secret)
}

pub fn create_jwt_for_user(
    user: &user::Model,
    jwt_secret: &str,
) -> Result<LoginResponse, AppError> {
    let now = Utc::now();
    // Token valid for 24 hours
    let expiration = (now + Duration::hours(24)).timestamp() as usize;

    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id,
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::TokenCreationError(format!("Failed to create token: {e}")))?;

    Ok(LoginResponse {
        token,
        user_id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
    })
}

pub async fn me(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<UserResponse>, AppError> {
    let user_model = user::Entity::find_by_id(user.id)
        .one(&app_state.db_pool)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(UserResponse {
        id: user_model.id,
        email: user_model.email,
        name: user_model.name,
    }))
}
