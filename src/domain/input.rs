//! Raw form input and its normalization into recipe content.
//!
//! Front ends collect list-valued fields as single lines of delimited text.
//! [`RecipeInput::normalize`] is the one place that text is split, trimmed,
//! case-folded and de-duplicated:
//!
//! - ingredients are split on [`INGREDIENT_DELIMITER`],
//! - steps are split on [`STEP_DELIMITER`],
//! - tags are split on [`TAG_DELIMITER`], lowercased and de-duplicated keeping
//!   the first occurrence.
//!
//! Every element is trimmed and empty elements are dropped.

use std::{collections::HashSet, fmt};

use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;

use crate::domain::{Difficulty, Recipe, RecipeData};

/// Separates ingredients in raw input.
pub const INGREDIENT_DELIMITER: char = ',';

/// Separates steps in raw input.
pub const STEP_DELIMITER: char = '.';

/// Separates tags in raw input.
pub const TAG_DELIMITER: char = ',';

/// Unvalidated recipe fields, as typed into an edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeInput {
    /// The recipe title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Comma-separated ingredients.
    pub ingredients: String,
    /// Period-separated steps.
    pub steps: String,
    /// Comma-separated tags.
    pub tags: String,
    /// The selected difficulty, if any.
    pub difficulty: Option<Difficulty>,
}

/// A required input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// [`RecipeInput::title`]
    Title,
    /// [`RecipeInput::description`]
    Description,
    /// [`RecipeInput::ingredients`]
    Ingredients,
    /// [`RecipeInput::steps`]
    Steps,
    /// [`RecipeInput::tags`]
    Tags,
    /// [`RecipeInput::difficulty`]
    Difficulty,
}

impl Field {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Ingredients => "ingredients",
            Self::Steps => "steps",
            Self::Tags => "tags",
            Self::Difficulty => "difficulty",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The input was rejected before any write was attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// These required fields were empty after normalization, in form order.
    MissingFields(NonEmpty<Field>),
}

impl ValidationError {
    /// The fields that failed validation.
    #[must_use]
    pub const fn fields(&self) -> &NonEmpty<Field> {
        match self {
            Self::MissingFields(fields) => fields,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields(fields) => {
                write!(f, "missing required field(s): ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                Ok(())
            }
        }
    }
}

impl RecipeInput {
    /// Validates the input and normalizes it into recipe content.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] listing every required field
    /// that is empty once normalized. Nothing is partially accepted.
    pub fn normalize(&self) -> Result<RecipeData, ValidationError> {
        let title = NonEmptyString::new(self.title.trim().to_string()).ok();
        let description = self.description.trim().to_string();
        let ingredients = split_list(&self.ingredients, INGREDIENT_DELIMITER);
        let steps = split_list(&self.steps, STEP_DELIMITER);
        let tags = normalize_tags(self.tags.split(TAG_DELIMITER));

        let missing: Vec<Field> = [
            (Field::Title, title.is_none()),
            (Field::Description, description.is_empty()),
            (Field::Ingredients, ingredients.is_empty()),
            (Field::Steps, steps.is_empty()),
            (Field::Tags, tags.is_empty()),
            (Field::Difficulty, self.difficulty.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, is_missing)| is_missing.then_some(field))
        .collect();

        match (title, self.difficulty, NonEmpty::from_vec(missing)) {
            (_, _, Some(fields)) => Err(ValidationError::MissingFields(fields)),
            (Some(title), Some(difficulty), None) => Ok(RecipeData {
                title,
                description,
                ingredients,
                steps,
                tags,
                difficulty,
            }),
            (None, _, None) | (_, None, None) => {
                unreachable!("absent title or difficulty is always recorded as missing")
            }
        }
    }
}

impl From<&Recipe> for RecipeInput {
    /// Renders a stored recipe back into form text, ready to be edited.
    fn from(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title().to_string(),
            description: recipe.description().to_string(),
            ingredients: recipe.ingredients().join(", "),
            steps: recipe.steps().join(". "),
            tags: recipe.tags().join(", "),
            difficulty: Some(recipe.difficulty()),
        }
    }
}

/// Splits delimited text into trimmed, non-empty elements, keeping order.
#[must_use]
pub fn split_list(raw: &str, delimiter: char) -> Vec<String> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|element| !element.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalizes a single tag: trimmed and lowercased.
///
/// Returns `None` if nothing is left.
#[must_use]
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().to_lowercase();
    (!tag.is_empty()).then_some(tag)
}

/// Normalizes a sequence of tags, dropping empties and later duplicates.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|tag| normalize_tag(tag.as_ref()))
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn soup() -> RecipeInput {
        RecipeInput {
            title: "  Tomato Soup ".to_string(),
            description: "Warming.".to_string(),
            ingredients: "tomatoes, , onion ,stock".to_string(),
            steps: "Chop. Simmer for 20 minutes.  Blend.".to_string(),
            tags: "Quick, soup, QUICK, ".to_string(),
            difficulty: Some(Difficulty::Easy),
        }
    }

    #[test_case("a, b ,c", ',', &["a", "b", "c"]; "trims elements")]
    #[test_case(",,a,,", ',', &["a"]; "drops empty elements")]
    #[test_case("   ", ',', &[]; "blank input")]
    #[test_case("Mix. Bake.", '.', &["Mix", "Bake"]; "period delimited")]
    fn split_list_cases(raw: &str, delimiter: char, expected: &[&str]) {
        assert_eq!(split_list(raw, delimiter), expected);
    }

    #[test]
    fn normalize_tags_lowercases_and_dedupes_in_first_seen_order() {
        let tags = normalize_tags(["Dessert", " quick ", "dessert", "", "Vegan"]);
        assert_eq!(tags, ["dessert", "quick", "vegan"]);
    }

    #[test]
    fn normalize_splits_every_list_field() {
        let data = soup().normalize().unwrap();

        assert_eq!(data.title.as_str(), "Tomato Soup");
        assert_eq!(data.ingredients, ["tomatoes", "onion", "stock"]);
        assert_eq!(data.steps, ["Chop", "Simmer for 20 minutes", "Blend"]);
        assert_eq!(data.tags, ["quick", "soup"]);
        assert_eq!(data.difficulty, Difficulty::Easy);
    }

    #[test]
    fn normalize_reports_every_missing_field_in_form_order() {
        let input = RecipeInput {
            title: "   ".to_string(),
            tags: " , ".to_string(),
            difficulty: None,
            ..soup()
        };

        let error = input.normalize().unwrap_err();
        let fields: Vec<_> = error.fields().iter().copied().collect();

        assert_eq!(fields, [Field::Title, Field::Tags, Field::Difficulty]);
        assert_eq!(
            error.to_string(),
            "missing required field(s): title, tags, difficulty"
        );
    }

    #[test]
    fn default_input_is_entirely_missing() {
        let error = RecipeInput::default().normalize().unwrap_err();
        assert_eq!(error.fields().len(), 6);
    }
}
