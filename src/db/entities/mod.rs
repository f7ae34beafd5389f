//! SeaORM entities mapping to database tables.
//!
//! Each entity lives in its own module (`user.rs`, `recipe.rs`, ...). The join
//! tables between recipes and their attributes are plain composite-key entities.

pub mod ingredient;
pub mod recipe;
pub mod recipe_ingredient;
pub mod recipe_tag;
pub mod tag;
pub mod user;

// Prelude module for easy importing of all entities and their related types
pub mod prelude {
    pub use super::user::Entity as User;
    pub use super::user::Model as UserModel;
    pub use super::user::ActiveModel as UserActiveModel;
    pub use super::user::Column as UserColumn;

    pub use super::recipe::Entity as Recipe;
    pub use super::recipe::Model as RecipeModel;
    pub use super::recipe::ActiveModel as RecipeActiveModel;
    pub use super::recipe::Column as RecipeColumn;

    pub use super::tag::Entity as Tag;
    pub use super::tag::Model as TagModel;
    pub use super::tag::ActiveModel as TagActiveModel;
    pub use super::tag::Column as TagColumn;

    pub use super::ingredient::Entity as Ingredient;
    pub use super::ingredient::Model as IngredientModel;
    pub use super::ingredient::ActiveModel as IngredientActiveModel;
    pub use super::ingredient::Column as IngredientColumn;

    pub use super::recipe_tag::Entity as RecipeTag;
    pub use super::recipe_tag::Model as RecipeTagModel;
    pub use super::recipe_tag::ActiveModel as RecipeTagActiveModel;
    pub use super::recipe_tag::Column as RecipeTagColumn;

    pub use super::recipe_ingredient::Entity as RecipeIngredient;
    pub use super::recipe_ingredient::Model as RecipeIngredientModel;
    pub use super::recipe_ingredient::ActiveModel as RecipeIngredientActiveModel;
    pub use super::recipe_ingredient::Column as RecipeIngredientColumn;
}
