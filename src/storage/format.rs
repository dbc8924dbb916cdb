//! JSON serialization of the whole collection.
//!
//! The slot holds one document:
//!
//! ```json
//! { "_version": "1", "recipes": [ { "id": "...", "title": "...", ... } ] }
//! ```

use std::{collections::HashSet, io};

use chrono::{DateTime, Utc};
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

use crate::domain::{input::normalize_tags, Difficulty, Recipe, RecipeData, RecipeId};

/// Errors that can occur when decoding persisted recipes.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The document is not valid JSON of the expected shape.
    #[error("malformed recipe data: {0}")]
    Json(#[from] serde_json::Error),
    /// A record has a blank title.
    #[error("recipe {0} has an empty title")]
    EmptyTitle(RecipeId),
    /// Two records share an id.
    #[error("duplicate recipe id {0}")]
    DuplicateId(RecipeId),
}

/// Decodes the slot contents.
///
/// Blank contents decode to an empty collection. Tags are re-normalized so
/// records written by other front ends still satisfy the tag invariant.
///
/// # Errors
///
/// Returns a [`ParseError`] if the document is malformed or violates a
/// collection invariant.
pub fn decode(bytes: &[u8]) -> Result<Vec<Recipe>, ParseError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let Document::V1 { recipes } = serde_json::from_slice(bytes)?;
    decode_records(recipes)
}

pub(crate) fn decode_records(records: Vec<StoredRecipe>) -> Result<Vec<Recipe>, ParseError> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .map(|record| {
            let recipe = Recipe::try_from(record)?;
            if seen.insert(recipe.id()) {
                Ok(recipe)
            } else {
                Err(ParseError::DuplicateId(recipe.id()))
            }
        })
        .collect()
}

/// Encodes the collection as a versioned JSON document.
///
/// # Errors
///
/// Serialization of these types cannot fail in practice; the error is
/// reported as I/O so it surfaces like any other write failure.
pub fn encode(recipes: &[Recipe]) -> io::Result<Vec<u8>> {
    let document = Document::V1 {
        recipes: recipes.iter().map(StoredRecipe::from).collect(),
    };
    Ok(serde_json::to_vec_pretty(&document)?)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Document {
    #[serde(rename = "1")]
    V1 { recipes: Vec<StoredRecipe> },
}

/// A recipe in its serialized shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredRecipe {
    id: RecipeId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    steps: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    difficulty: Difficulty,
    last_updated: DateTime<Utc>,
}

impl From<&Recipe> for StoredRecipe {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id(),
            title: recipe.title().to_string(),
            description: recipe.description().to_string(),
            ingredients: recipe.ingredients().to_vec(),
            steps: recipe.steps().to_vec(),
            tags: recipe.tags().to_vec(),
            difficulty: recipe.difficulty(),
            last_updated: recipe.last_updated(),
        }
    }
}

impl TryFrom<StoredRecipe> for Recipe {
    type Error = ParseError;

    fn try_from(stored: StoredRecipe) -> Result<Self, Self::Error> {
        let StoredRecipe {
            id,
            title,
            description,
            ingredients,
            steps,
            tags,
            difficulty,
            last_updated,
        } = stored;

        let title = NonEmptyString::new(title.trim().to_string())
            .map_err(|_| ParseError::EmptyTitle(id))?;

        let data = RecipeData {
            title,
            description,
            ingredients,
            steps,
            tags: normalize_tags(tags),
            difficulty,
        };

        Ok(Self::with_id(id, data, last_updated))
    }
}
