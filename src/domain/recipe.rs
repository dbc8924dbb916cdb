use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Difficulty;

/// Opaque, perpetually stable identifier of a recipe.
///
/// Assigned once at creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(Uuid);

impl RecipeId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecipeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RecipeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RecipeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// The content of a recipe: everything a user edits.
///
/// Identity and the write timestamp are held by [`Recipe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeData {
    /// The recipe title.
    pub title: NonEmptyString,
    /// Free-text description.
    pub description: String,
    /// Ingredients, in the order given.
    pub ingredients: Vec<String>,
    /// Method steps, in the order given.
    pub steps: Vec<String>,
    /// Normalized tags: lowercase, trimmed, unique, in insertion order.
    pub tags: Vec<String>,
    /// How demanding the recipe is.
    pub difficulty: Difficulty,
}

/// A recipe in the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    id: RecipeId,
    data: RecipeData,
    last_updated: DateTime<Utc>,
}

impl Recipe {
    /// Constructs a recipe with a freshly generated id.
    #[must_use]
    pub(crate) fn new(data: RecipeData, last_updated: DateTime<Utc>) -> Self {
        Self::with_id(RecipeId::new(), data, last_updated)
    }

    pub(crate) const fn with_id(
        id: RecipeId,
        data: RecipeData,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            data,
            last_updated,
        }
    }

    /// Replaces the content and the write timestamp, keeping the id.
    pub(crate) fn revise(&mut self, data: RecipeData, last_updated: DateTime<Utc>) {
        self.data = data;
        self.last_updated = last_updated;
    }

    /// The unique, stable identifier of this recipe.
    #[must_use]
    pub const fn id(&self) -> RecipeId {
        self.id
    }

    /// The recipe title. Never empty.
    #[must_use]
    pub fn title(&self) -> &str {
        self.data.title.as_str()
    }

    /// Free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.data.description
    }

    /// Ingredients, in order.
    #[must_use]
    pub fn ingredients(&self) -> &[String] {
        &self.data.ingredients
    }

    /// Method steps, in order.
    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.data.steps
    }

    /// Normalized tags, in insertion order.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.data.tags
    }

    /// How demanding the recipe is.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.data.difficulty
    }

    /// When the recipe was last successfully written.
    #[must_use]
    pub const fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// The editable content of the recipe.
    #[must_use]
    pub const fn data(&self) -> &RecipeData {
        &self.data
    }
}
