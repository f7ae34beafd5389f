use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, DeleteResult,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::db::entities::{ingredient, recipe, recipe_ingredient, recipe_tag, tag};
use crate::db::services::{ingredient_service, tag_service};

// --- Recipe Service Functions ---

/// A recipe together with its linked tags and ingredients.
#[derive(Debug, Clone)]
pub struct RecipeWithAttrs {
    pub recipe: recipe::Model,
    pub tags: Vec<tag::Model>,
    pub ingredients: Vec<ingredient::Model>,
}

/// Input for creating a recipe. `tags` and `ingredients` carry attribute names
/// that are get-or-created for the owner and linked to the recipe.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

/// Field-wise changes for an update. A `None` field is left untouched;
/// `Some` tag/ingredient lists replace the current association set.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

/// Creates a new recipe owned by the user, linking any nested attributes,
/// in a single transaction.
pub async fn create_recipe(
    db: &DatabaseConnection,
    user_id: i32,
    data: NewRecipe,
) -> Result<RecipeWithAttrs, DbErr> {
    let txn = db.begin().await?;
    let now = Utc::now();

    let recipe_model = recipe::ActiveModel {
        user_id: Set(user_id),
        title: Set(data.title),
        time_minutes: Set(data.time_minutes),
        price: Set(data.price),
        description: Set(data.description),
        link: Set(data.link),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if let Some(names) = data.tags {
        set_recipe_tags(&txn, &recipe_model, user_id, &names).await?;
    }
    if let Some(names) = data.ingredients {
        set_recipe_ingredients(&txn, &recipe_model, user_id, &names).await?;
    }

    let tags = tag_service::get_tags_for_recipe(&txn, &recipe_model).await?;
    let ingredients = ingredient_service::get_ingredients_for_recipe(&txn, &recipe_model).await?;
    txn.commit().await?;

    Ok(RecipeWithAttrs {
        recipe: recipe_model,
        tags,
        ingredients,
    })
}

/// Retrieves all recipes for a user, newest first, with their tags and
/// ingredients resolved in bulk rather than per row.
pub async fn get_recipes_by_user_id(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<RecipeWithAttrs>, DbErr> {
    let recipes = recipe::Entity::find()
        .filter(recipe::Column::UserId.eq(user_id))
        .order_by_desc(recipe::Column::Id)
        .all(db)
        .await?;
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
    let mut tags_by_recipe = group_tags_by_recipe(db, &recipe_ids).await?;
    let mut ingredients_by_recipe = group_ingredients_by_recipe(db, &recipe_ids).await?;

    Ok(recipes
        .into_iter()
        .map(|r| {
            let tags = tags_by_recipe.remove(&r.id).unwrap_or_default();
            let ingredients = ingredients_by_recipe.remove(&r.id).unwrap_or_default();
            RecipeWithAttrs {
                recipe: r,
                tags,
                ingredients,
            }
        })
        .collect())
}

/// Retrieves one recipe owned by the user, with tags and ingredients.
pub async fn get_recipe_by_id(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
) -> Result<Option<RecipeWithAttrs>, DbErr> {
    let Some(recipe_model) = recipe::Entity::find_by_id(recipe_id)
        .filter(recipe::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let tags = tag_service::get_tags_for_recipe(db, &recipe_model).await?;
    let ingredients = ingredient_service::get_ingredients_for_recipe(db, &recipe_model).await?;
    Ok(Some(RecipeWithAttrs {
        recipe: recipe_model,
        tags,
        ingredients,
    }))
}

/// Applies changes to a recipe owned by the user. Returns `None` when the
/// recipe does not exist or belongs to someone else.
pub async fn update_recipe(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
    changes: RecipeChanges,
) -> Result<Option<RecipeWithAttrs>, DbErr> {
    let Some(existing) = recipe::Entity::find_by_id(recipe_id)
        .filter(recipe::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let txn = db.begin().await?;

    let mut active: recipe::ActiveModel = existing.into();
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(time_minutes) = changes.time_minutes {
        active.time_minutes = Set(time_minutes);
    }
    if let Some(price) = changes.price {
        active.price = Set(price);
    }
    if let Some(description) = changes.description {
        active.description = Set(Some(description));
    }
    if let Some(link) = changes.link {
        active.link = Set(Some(link));
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    if let Some(names) = changes.tags {
        set_recipe_tags(&txn, &updated, user_id, &names).await?;
    }
    if let Some(names) = changes.ingredients {
        set_recipe_ingredients(&txn, &updated, user_id, &names).await?;
    }

    let tags = tag_service::get_tags_for_recipe(&txn, &updated).await?;
    let ingredients = ingredient_service::get_ingredients_for_recipe(&txn, &updated).await?;
    txn.commit().await?;

    Ok(Some(RecipeWithAttrs {
        recipe: updated,
        tags,
        ingredients,
    }))
}

/// Deletes a recipe owned by the user. Association rows go away via cascade.
pub async fn delete_recipe(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
) -> Result<DeleteResult, DbErr> {
    recipe::Entity::delete_many()
        .filter(recipe::Column::Id.eq(recipe_id))
        .filter(recipe::Column::UserId.eq(user_id))
        .exec(db)
        .await
}

/// Replaces the tag set of a recipe with the given names, get-or-creating
/// each tag for the owner.
async fn set_recipe_tags<C: ConnectionTrait>(
    db: &C,
    recipe: &recipe::Model,
    user_id: i32,
    names: &[String],
) -> Result<(), DbErr> {
    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe.id))
        .exec(db)
        .await?;

    for name in names {
        let tag = tag_service::get_or_create_tag(db, user_id, name).await?;
        recipe_tag::Entity::insert(recipe_tag::ActiveModel {
            recipe_id: Set(recipe.id),
            tag_id: Set(tag.id),
        })
        .on_conflict(
            OnConflict::columns([recipe_tag::Column::RecipeId, recipe_tag::Column::TagId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    }
    Ok(())
}

/// Replaces the ingredient set of a recipe with the given names.
async fn set_recipe_ingredients<C: ConnectionTrait>(
    db: &C,
    recipe: &recipe::Model,
    user_id: i32,
    names: &[String],
) -> Result<(), DbErr> {
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe.id))
        .exec(db)
        .await?;

    for name in names {
        let ingredient = ingredient_service::get_or_create_ingredient(db, user_id, name).await?;
        recipe_ingredient::Entity::insert(recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe.id),
            ingredient_id: Set(ingredient.id),
        })
        .on_conflict(
            OnConflict::columns([
                recipe_ingredient::Column::RecipeId,
                recipe_ingredient::Column::IngredientId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    }
    Ok(())
}

/// Loads all tags linked to the given recipes and groups them per recipe,
/// sorted by name.
async fn group_tags_by_recipe<C: ConnectionTrait>(
    db: &C,
    recipe_ids: &[i32],
) -> Result<HashMap<i32, Vec<tag::Model>>, DbErr> {
    let mut grouped: HashMap<i32, Vec<tag::Model>> = HashMap::new();

    let links = recipe_tag::Entity::find()
        .filter(recipe_tag::Column::RecipeId.is_in(recipe_ids.to_vec()))
        .all(db)
        .await?;
    if links.is_empty() {
        return Ok(grouped);
    }

    let tag_ids: Vec<i32> = links.iter().map(|l| l.tag_id).collect();
    let tags = tag::Entity::find()
        .filter(tag::Column::Id.is_in(tag_ids))
        .all(db)
        .await?;
    let by_id: HashMap<i32, tag::Model> = tags.into_iter().map(|t| (t.id, t)).collect();

    for link in &links {
        if let Some(tag) = by_id.get(&link.tag_id) {
            grouped.entry(link.recipe_id).or_default().push(tag.clone());
        }
    }
    for tags in grouped.values_mut() {
        tags.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(grouped)
}

/// Loads all ingredients linked to the given recipes and groups them per
/// recipe, sorted by name.
async fn group_ingredients_by_recipe<C: ConnectionTrait>(
    db: &C,
    recipe_ids: &[i32],
) -> Result<HashMap<i32, Vec<ingredient::Model>>, DbErr> {
    let mut grouped: HashMap<i32, Vec<ingredient::Model>> = HashMap::new();

    let links = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.to_vec()))
        .all(db)
        .await?;
    if links.is_empty() {
        return Ok(grouped);
    }

    let ingredient_ids: Vec<i32> = links.iter().map(|l| l.ingredient_id).collect();
    let ingredients = ingredient::Entity::find()
        .filter(ingredient::Column::Id.is_in(ingredient_ids))
        .all(db)
        .await?;
    let by_id: HashMap<i32, ingredient::Model> =
        ingredients.into_iter().map(|i| (i.id, i)).collect();

    for link in &links {
        if let Some(ingredient) = by_id.get(&link.ingredient_id) {
            grouped
                .entry(link.recipe_id)
                .or_default()
                .push(ingredient.clone());
        }
    }
    for ingredients in grouped.values_mut() {
        ingredients.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(grouped)
}
