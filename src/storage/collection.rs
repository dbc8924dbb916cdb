//! An in-memory, ordered collection of recipes
//!
//! The [`Collection`] knows nothing about the durable medium. It keeps the
//! records in insertion order alongside an index from id to position.

use std::collections::HashMap;

use crate::domain::{Recipe, RecipeId};

/// The ordered set of recipes, indexed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// The recipes, stored contiguously in collection order.
    recipes: Vec<Recipe>,

    /// An index from id to position in `recipes`.
    index: HashMap<RecipeId, usize>,
}

impl Collection {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            recipes: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Appends a recipe.
    ///
    /// # Panics
    ///
    /// Panics if a recipe with the same id already exists.
    pub fn insert(&mut self, recipe: Recipe) {
        let id = recipe.id();
        assert!(
            !self.index.contains_key(&id),
            "Duplicate recipe id: {id}"
        );
        self.index.insert(id, self.recipes.len());
        self.recipes.push(recipe);
    }

    /// Retrieves a recipe by id.
    #[must_use]
    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.index.get(&id).and_then(|&idx| self.recipes.get(idx))
    }

    /// Retrieves a recipe by id for in-place modification.
    ///
    /// The id itself cannot be changed through the returned reference.
    pub fn get_mut(&mut self, id: RecipeId) -> Option<&mut Recipe> {
        self.index
            .get(&id)
            .and_then(|&idx| self.recipes.get_mut(idx))
    }

    /// Removes a recipe, shifting later recipes down by one.
    pub fn remove(&mut self, id: RecipeId) -> Option<Recipe> {
        let idx = self.index.remove(&id)?;
        let removed = self.recipes.remove(idx);
        for position in self.index.values_mut() {
            if *position > idx {
                *position -= 1;
            }
        }
        Some(removed)
    }

    #[must_use]
    pub fn contains(&self, id: RecipeId) -> bool {
        self.index.contains_key(&id)
    }

    /// The recipes, in collection order.
    #[must_use]
    pub fn as_slice(&self) -> &[Recipe] {
        &self.recipes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }
}

impl FromIterator<Recipe> for Collection {
    fn from_iter<I: IntoIterator<Item = Recipe>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut collection = Self::with_capacity(iter.size_hint().0);
        for recipe in iter {
            collection.insert(recipe);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::Collection;
    use crate::domain::{recipe::fixtures::recipe, Difficulty};

    fn three() -> Collection {
        ["A", "B", "C"]
            .into_iter()
            .enumerate()
            .map(|(i, title)| recipe(title, Difficulty::Easy, &[], i64::try_from(i).unwrap()))
            .collect()
    }

    fn titles(collection: &Collection) -> Vec<&str> {
        collection.as_slice().iter().map(|r| r.title()).collect()
    }

    #[test]
    fn insert_preserves_order_and_indexes_by_id() {
        let collection = three();
        assert_eq!(titles(&collection), ["A", "B", "C"]);

        for recipe in collection.as_slice() {
            assert_eq!(collection.get(recipe.id()), Some(recipe));
        }
    }

    #[test]
    fn remove_reindexes_later_recipes() {
        let mut collection = three();
        let b = collection.as_slice()[1].id();
        let c = collection.as_slice()[2].id();

        let removed = collection.remove(b).unwrap();

        assert_eq!(removed.title(), "B");
        assert_eq!(titles(&collection), ["A", "C"]);
        assert!(!collection.contains(b));
        assert_eq!(collection.get(c).unwrap().title(), "C");
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn remove_unknown_id_is_none() {
        let mut collection = three();
        let stranger = recipe("X", Difficulty::Easy, &[], 0);
        assert!(collection.remove(stranger.id()).is_none());
        assert_eq!(collection.len(), 3);
    }

    #[test]
    #[should_panic(expected = "Duplicate recipe id")]
    fn duplicate_insert_panics() {
        let mut collection = Collection::default();
        let soup = recipe("Soup", Difficulty::Easy, &[], 0);
        collection.insert(soup.clone());
        collection.insert(soup);
    }
}
