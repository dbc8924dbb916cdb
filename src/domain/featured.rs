//! Choosing a single recipe to highlight.

use std::{fmt, str::FromStr};

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::domain::Recipe;

/// How the featured recipe is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeaturedStrategy {
    /// The most recently updated recipe.
    #[default]
    MostRecent,
    /// Any recipe, uniformly at random.
    Random,
}

impl FeaturedStrategy {
    /// Selects a recipe using the thread-local random number generator where
    /// needed.
    #[must_use]
    pub fn select(self, recipes: &[Recipe]) -> Option<&Recipe> {
        self.select_with(recipes, &mut rand::thread_rng())
    }

    /// Selects a recipe, drawing from `rng` for [`FeaturedStrategy::Random`].
    pub fn select_with<'a, R>(self, recipes: &'a [Recipe], rng: &mut R) -> Option<&'a Recipe>
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::MostRecent => select_most_recent(recipes),
            Self::Random => select_random(recipes, rng),
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::MostRecent => "most-recent",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for FeaturedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string did not name a featured strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy '{0}' (expected most-recent or random)")]
pub struct UnknownStrategy(String);

impl FromStr for FeaturedStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "most-recent" | "mostrecent" | "recent" => Ok(Self::MostRecent),
            "random" => Ok(Self::Random),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// The recipe with the latest `last_updated`.
///
/// Ties go to the recipe that comes first in the collection.
#[must_use]
pub fn select_most_recent(recipes: &[Recipe]) -> Option<&Recipe> {
    recipes.iter().fold(None, |best: Option<&Recipe>, recipe| match best {
        Some(current) if current.last_updated() >= recipe.last_updated() => Some(current),
        _ => Some(recipe),
    })
}

/// A uniformly chosen recipe.
pub fn select_random<'a, R>(recipes: &'a [Recipe], rng: &mut R) -> Option<&'a Recipe>
where
    R: Rng + ?Sized,
{
    recipes.choose(rng)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::domain::{recipe::fixtures::recipe, Difficulty};

    #[test]
    fn most_recent_picks_latest_update() {
        let recipes = [
            recipe("Old", Difficulty::Easy, &[], 0),
            recipe("Newest", Difficulty::Easy, &[], 20),
            recipe("Middle", Difficulty::Easy, &[], 10),
        ];
        assert_eq!(select_most_recent(&recipes).unwrap().title(), "Newest");
    }

    #[test]
    fn most_recent_tie_goes_to_first_in_collection() {
        let recipes = [
            recipe("Old", Difficulty::Easy, &[], 0),
            recipe("First", Difficulty::Easy, &[], 20),
            recipe("Second", Difficulty::Easy, &[], 20),
        ];
        assert_eq!(select_most_recent(&recipes).unwrap().title(), "First");
    }

    #[test]
    fn empty_collection_has_no_featured_recipe() {
        let mut rng = StdRng::seed_from_u64(7);
        for strategy in [FeaturedStrategy::MostRecent, FeaturedStrategy::Random] {
            assert!(strategy.select_with(&[], &mut rng).is_none());
        }
    }

    #[test]
    fn random_selection_reaches_every_recipe() {
        let recipes = [
            recipe("A", Difficulty::Easy, &[], 0),
            recipe("B", Difficulty::Easy, &[], 1),
            recipe("C", Difficulty::Easy, &[], 2),
        ];
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..200 {
            let pick = FeaturedStrategy::Random
                .select_with(&recipes, &mut rng)
                .unwrap();
            seen.insert(pick.id());
        }

        assert_eq!(seen.len(), recipes.len());
    }

    #[test]
    fn strategy_parses_config_spellings() {
        assert_eq!(
            "most-recent".parse::<FeaturedStrategy>().unwrap(),
            FeaturedStrategy::MostRecent
        );
        assert_eq!(
            "Random".parse::<FeaturedStrategy>().unwrap(),
            FeaturedStrategy::Random
        );
        assert!("popular".parse::<FeaturedStrategy>().is_err());
    }
}
