//! Domain models for recipe management.
//!
//! This module contains the storage-agnostic types: recipes and their
//! normalized input, the tag index, queries, featured selection, and
//! configuration.

mod config;
pub use config::Config;

mod difficulty;
pub use difficulty::{Difficulty, UnknownDifficulty};

/// Featured recipe selection.
pub mod featured;
pub use featured::FeaturedStrategy;

pub mod input;
pub use input::{Field, RecipeInput, ValidationError};

/// Query engine: filtering and sorting views of a collection.
pub mod query;
pub use query::{Query, SortKey};

/// Recipe domain model.
pub mod recipe;
pub use recipe::{Recipe, RecipeData, RecipeId};

mod tags;
pub use tags::TagIndex;
