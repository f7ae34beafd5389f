use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::entities::{ingredient, tag};

/// Represents a tag owned by a user.
/// Corresponds to the `tags` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<tag::Model> for Tag {
    fn from(model: tag::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Represents an ingredient owned by a user.
/// Corresponds to the `ingredients` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ingredient::Model> for Ingredient {
    fn from(model: ingredient::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
