pub mod entities;
pub mod models;
pub mod services;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};

use entities::prelude::*;

/// Creates the schema for all entities if it does not exist yet.
///
/// DDL is derived from the entity definitions, so it stays valid for every
/// backend sea-orm supports (Postgres in production, SQLite in tests).
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut tables = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Recipe),
        schema.create_table_from_entity(Tag),
        schema.create_table_from_entity(Ingredient),
        schema.create_table_from_entity(RecipeTag),
        schema.create_table_from_entity(RecipeIngredient),
    ];
    for stmt in tables.iter_mut() {
        db.execute(backend.build(stmt.if_not_exists())).await?;
    }

    // Tag and ingredient names are unique per owner, not globally, so the
    // entity-level `unique` attribute cannot express it.
    let indexes = [
        Index::create()
            .if_not_exists()
            .name("idx_tags_user_id_name")
            .table(Tag)
            .col(TagColumn::UserId)
            .col(TagColumn::Name)
            .unique()
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_ingredients_user_id_name")
            .table(Ingredient)
            .col(IngredientColumn::UserId)
            .col(IngredientColumn::Name)
            .unique()
            .to_owned(),
    ];
    for stmt in indexes.iter() {
        db.execute(backend.build(stmt)).await?;
    }

    Ok(())
}
