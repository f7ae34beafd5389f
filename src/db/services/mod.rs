//! The `services` module provides a high-level API for interacting with the
//! database. It encapsulates the query logic and data access patterns so the
//! HTTP handlers can work with domain models without knowing about the
//! underlying schema.
//!
//! Each sub-module is responsible for one domain entity. All public functions
//! are re-exported here for convenient access under `crate::db::services::`.

pub mod ingredient_service;
pub mod recipe_service;
pub mod tag_service;

pub use ingredient_service::*;
pub use recipe_service::*;
pub use tag_service::*;
