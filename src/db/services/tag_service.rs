use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, DeleteResult, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::db::entities::{recipe, tag};

// --- Tag Service Functions ---

/// Creates a new tag for a user.
///
/// Per-user name uniqueness is enforced by a database index; a violation
/// surfaces as `DbErr` for the caller to map to a conflict response.
pub async fn create_tag<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    name: &str,
) -> Result<tag::Model, DbErr> {
    let now = Utc::now();
    tag::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Retrieves all tags for a user, ordered by name descending.
pub async fn get_tags_by_user_id<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<tag::Model>, DbErr> {
    tag::Entity::find()
        .filter(tag::Column::UserId.eq(user_id))
        .order_by_desc(tag::Column::Name)
        .all(db)
        .await
}

/// Retrieves a single tag owned by the user.
pub async fn get_tag_by_id<C: ConnectionTrait>(
    db: &C,
    tag_id: i32,
    user_id: i32,
) -> Result<Option<tag::Model>, DbErr> {
    tag::Entity::find_by_id(tag_id)
        .filter(tag::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// Returns the user's tag with the given name, creating it if necessary.
pub async fn get_or_create_tag<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    name: &str,
) -> Result<tag::Model, DbErr> {
    if let Some(existing) = tag::Entity::find()
        .filter(tag::Column::UserId.eq(user_id))
        .filter(tag::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(existing);
    }
    create_tag(db, user_id, name).await
}

/// Renames a tag. Returns `None` when the tag does not exist or is not owned
/// by the user.
pub async fn update_tag<C: ConnectionTrait>(
    db: &C,
    tag_id: i32,
    user_id: i32,
    name: &str,
) -> Result<Option<tag::Model>, DbErr> {
    let Some(existing) = get_tag_by_id(db, tag_id, user_id).await? else {
        return Ok(None);
    };
    let mut active: tag::ActiveModel = existing.into();
    active.name = Set(name.to_string());
    active.updated_at = Set(Utc::now());
    Ok(Some(active.update(db).await?))
}

/// Deletes a tag. The ON DELETE CASCADE in the DB removes recipe_tags entries.
pub async fn delete_tag<C: ConnectionTrait>(
    db: &C,
    tag_id: i32,
    user_id: i32,
) -> Result<DeleteResult, DbErr> {
    tag::Entity::delete_many()
        .filter(tag::Column::Id.eq(tag_id))
        .filter(tag::Column::UserId.eq(user_id))
        .exec(db)
        .await
}

/// Retrieves the tags linked to a recipe, ordered by name.
pub async fn get_tags_for_recipe<C: ConnectionTrait>(
    db: &C,
    recipe: &recipe::Model,
) -> Result<Vec<tag::Model>, DbErr> {
    recipe
        .find_related(tag::Entity)
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await
}
