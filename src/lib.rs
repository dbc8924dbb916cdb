//! Plain-text Recipe Management
//!
//! Recipes are kept in a single JSON document, mirrored in memory by a
//! [`RecipeStore`] and queried through pure [`Query`] views.

pub mod domain;
pub use domain::{
    Config, Difficulty, FeaturedStrategy, Query, Recipe, RecipeId, RecipeInput, SortKey, TagIndex,
};

/// Durable storage and the in-memory recipe store.
pub mod storage;
pub use storage::{FileSlot, MemorySlot, RecipeStore, Slot, StoreError};

/// Best-effort network mirror.
pub mod transport;
pub use transport::{HttpTransport, Transport};
