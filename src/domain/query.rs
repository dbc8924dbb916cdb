//! Filtered, sorted views over a recipe collection.
//!
//! A [`Query`] is a transient value built per render. Applying it borrows the
//! collection read-only and returns references in view order; the collection
//! itself is never reordered.

use std::{cmp::Reverse, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::{input::normalize_tag, Difficulty, Recipe};

/// The order of a query's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Most recently updated first.
    #[default]
    LastUpdated,
    /// Alphabetical by title, ignoring case.
    Title,
    /// By severity, easiest first.
    Difficulty,
}

impl SortKey {
    const fn as_str(self) -> &'static str {
        match self {
            Self::LastUpdated => "last-updated",
            Self::Title => "title",
            Self::Difficulty => "difficulty",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string did not name a sort key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key '{0}' (expected last-updated, title or difficulty)")]
pub struct UnknownSortKey(String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "lastupdated" | "updated" => Ok(Self::LastUpdated),
            "title" => Ok(Self::Title),
            "difficulty" => Ok(Self::Difficulty),
            _ => Err(UnknownSortKey(s.to_string())),
        }
    }
}

/// Search, filter and sort options for a view of the collection.
///
/// All filters are combined with AND. Unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Case-insensitive substring of the title, the description, or the
    /// ingredients joined by `", "`. Empty matches everything.
    pub search: String,
    /// Only recipes carrying this tag. Normalized before matching.
    pub tag: Option<String>,
    /// Only recipes of exactly this difficulty.
    pub difficulty: Option<Difficulty>,
    /// Result order.
    pub sort: SortKey,
}

impl Query {
    /// A query that matches everything, most recently updated first.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search term.
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    /// Restricts results to recipes carrying `tag`.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Restricts results to a single difficulty.
    #[must_use]
    pub const fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Sets the result order.
    #[must_use]
    pub const fn sorted_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Whether a single recipe passes every filter.
    #[must_use]
    pub fn matches(&self, recipe: &Recipe) -> bool {
        Filters::new(self).matches(recipe)
    }

    /// Filters and sorts the collection.
    ///
    /// The sort is stable: recipes with equal keys keep their collection
    /// order.
    #[must_use]
    pub fn apply<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        let filters = Filters::new(self);

        let mut view: Vec<&Recipe> = recipes
            .iter()
            .filter(|recipe| filters.matches(recipe))
            .collect();

        match self.sort {
            SortKey::LastUpdated => view.sort_by_key(|recipe| Reverse(recipe.last_updated())),
            SortKey::Title => view.sort_by_cached_key(|recipe| recipe.title().to_lowercase()),
            SortKey::Difficulty => view.sort_by_key(|recipe| recipe.difficulty().rank()),
        }

        view
    }
}

/// Applies `query` to `recipes`. See [`Query::apply`].
#[must_use]
pub fn apply<'a>(recipes: &'a [Recipe], query: &Query) -> Vec<&'a Recipe> {
    query.apply(recipes)
}

/// A query with its search term and tag pre-normalized for matching.
#[derive(Debug)]
struct Filters {
    search: Option<String>,
    tag: Option<String>,
    difficulty: Option<Difficulty>,
}

impl Filters {
    fn new(query: &Query) -> Self {
        Self {
            search: (!query.search.is_empty()).then(|| query.search.to_lowercase()),
            tag: query.tag.as_deref().and_then(normalize_tag),
            difficulty: query.difficulty,
        }
    }

    fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(tag) = &self.tag {
            if !recipe.tags().iter().any(|recipe_tag| recipe_tag == tag) {
                return false;
            }
        }

        if let Some(difficulty) = self.difficulty {
            if recipe.difficulty() != difficulty {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let found = recipe.title().to_lowercase().contains(search)
                || recipe.description().to_lowercase().contains(search)
                || recipe
                    .ingredients()
                    .join(", ")
                    .to_lowercase()
                    .contains(search);
            if !found {
                return false;
            }
        }

        true
    }
}
