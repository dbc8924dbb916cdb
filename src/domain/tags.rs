//! The set of distinct tags in use across a collection.

use std::collections::HashSet;

use crate::domain::Recipe;

/// Distinct normalized tags, ordered by first appearance.
///
/// The index carries no state of its own: it is fully determined by the
/// collection it was built from. [`TagIndex::merge`] is an incremental fast
/// path for appends, and must agree with [`TagIndex::rebuild`] over the same
/// final collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    tags: Vec<String>,
    seen: HashSet<String>,
}

impl TagIndex {
    /// Builds the index from every recipe's tags, in collection order.
    #[must_use]
    pub fn rebuild<'a, I>(recipes: I) -> Self
    where
        I: IntoIterator<Item = &'a Recipe>,
    {
        let mut index = Self::default();
        for recipe in recipes {
            index.merge(recipe.tags());
        }
        index
    }

    /// Adds any tags not already present, preserving first-appearance order.
    ///
    /// Tags are expected to be normalized already.
    pub fn merge<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            let tag = tag.as_ref();
            if !self.seen.contains(tag) {
                self.seen.insert(tag.to_string());
                self.tags.push(tag.to_string());
            }
        }
    }

    /// Whether the tag is used by any recipe.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.seen.contains(tag)
    }

    /// The tags, in first-appearance order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    /// Iterates over the tags in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// The number of distinct tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether no recipe has any tag.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::TagIndex;
    use crate::domain::{recipe::fixtures::recipe, Difficulty, Recipe};

    #[test]
    fn rebuild_orders_by_first_appearance() {
        let recipes = [
            recipe("Soup", Difficulty::Easy, &["quick", "soup"], 0),
            recipe("Cake", Difficulty::Hard, &["dessert", "quick"], 1),
            recipe("Salad", Difficulty::Easy, &["vegan", "soup"], 2),
        ];

        let index = TagIndex::rebuild(&recipes);

        assert_eq!(index.as_slice(), ["quick", "soup", "dessert", "vegan"]);
    }

    #[test]
    fn rebuild_of_empty_collection_is_empty() {
        let recipes: Vec<Recipe> = Vec::new();
        let index = TagIndex::rebuild(&recipes);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn merge_ignores_known_tags() {
        let mut index = TagIndex::default();
        index.merge(["quick", "soup"]);
        index.merge(["soup", "dessert"]);

        assert_eq!(index.iter().collect::<Vec<_>>(), ["quick", "soup", "dessert"]);
        assert!(index.contains("dessert"));
        assert!(!index.contains("vegan"));
    }

    #[test]
    fn incremental_merge_matches_full_rebuild() {
        let recipes = [
            recipe("A", Difficulty::Easy, &["b", "a"], 0),
            recipe("B", Difficulty::Easy, &["c", "a"], 1),
            recipe("C", Difficulty::Easy, &[], 2),
            recipe("D", Difficulty::Easy, &["d", "b"], 3),
        ];

        let mut incremental = TagIndex::default();
        for (i, recipe) in recipes.iter().enumerate() {
            incremental.merge(recipe.tags());
            assert_eq!(incremental, TagIndex::rebuild(&recipes[..=i]));
        }
    }
}
