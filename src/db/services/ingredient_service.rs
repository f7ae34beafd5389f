use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, DeleteResult, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::db::entities::{ingredient, recipe};

// --- Ingredient Service Functions ---

/// Creates a new ingredient for a user. Per-user name uniqueness is enforced
/// by a database index.
pub async fn create_ingredient<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    name: &str,
) -> Result<ingredient::Model, DbErr> {
    let now = Utc::now();
    ingredient::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Retrieves all ingredients for a user, ordered by name descending.
pub async fn get_ingredients_by_user_id<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<ingredient::Model>, DbErr> {
    ingredient::Entity::find()
        .filter(ingredient::Column::UserId.eq(user_id))
        .order_by_desc(ingredient::Column::Name)
        .all(db)
        .await
}

/// Retrieves a single ingredient owned by the user.
pub async fn get_ingredient_by_id<C: ConnectionTrait>(
    db: &C,
    ingredient_id: i32,
    user_id: i32,
) -> Result<Option<ingredient::Model>, DbErr> {
    ingredient::Entity::find_by_id(ingredient_id)
        .filter(ingredient::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// Returns the user's ingredient with the given name, creating it if necessary.
pub async fn get_or_create_ingredient<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    name: &str,
) -> Result<ingredient::Model, DbErr> {
    if let Some(existing) = ingredient::Entity::find()
        .filter(ingredient::Column::UserId.eq(user_id))
        .filter(ingredient::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(existing);
    }
    create_ingredient(db, user_id, name).await
}

/// Renames an ingredient. Returns `None` when it does not exist or is not
/// owned by the user.
pub async fn update_ingredient<C: ConnectionTrait>(
    db: &C,
    ingredient_id: i32,
    user_id: i32,
    name: &str,
) -> Result<Option<ingredient::Model>, DbErr> {
    let Some(existing) = get_ingredient_by_id(db, ingredient_id, user_id).await? else {
        return Ok(None);
    };
    let mut active: ingredient::ActiveModel = existing.into();
    active.name = Set(name.to_string());
    active.updated_at = Set(Utc::now());
    Ok(Some(active.update(db).await?))
}

/// Deletes an ingredient. The ON DELETE CASCADE in the DB removes
/// recipe_ingredients entries.
pub async fn delete_ingredient<C: ConnectionTrait>(
    db: &C,
    ingredient_id: i32,
    user_id: i32,
) -> Result<DeleteResult, DbErr> {
    ingredient::Entity::delete_many()
        .filter(ingredient::Column::Id.eq(ingredient_id))
        .filter(ingredient::Column::UserId.eq(user_id))
        .exec(db)
        .await
}

/// Retrieves the ingredients linked to a recipe, ordered by name.
pub async fn get_ingredients_for_recipe<C: ConnectionTrait>(
    db: &C,
    recipe: &recipe::Model,
) -> Result<Vec<ingredient::Model>, DbErr> {
    recipe
        .find_related(ingredient::Entity)
        .order_by_asc(ingredient::Column::Name)
        .all(db)
        .await
}
