use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How demanding a recipe is to cook.
///
/// Variants are declared in severity order, so the derived [`Ord`] sorts
/// `Easy < Medium < Hard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Anyone can do it.
    Easy,
    /// Needs some practice.
    Medium,
    /// Needs a confident cook.
    Hard,
}

impl Difficulty {
    /// All difficulties, in severity order.
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// The severity rank, starting at 1 for [`Difficulty::Easy`].
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }

    /// The canonical label, as stored and displayed.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string was not one of `easy`, `medium` or `hard`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty '{0}' (expected easy, medium or hard)")]
pub struct UnknownDifficulty(String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::Difficulty;

    #[test_case("Easy", Difficulty::Easy; "canonical")]
    #[test_case("medium", Difficulty::Medium; "lowercase")]
    #[test_case(" HARD ", Difficulty::Hard; "padded uppercase")]
    fn parses_case_insensitively(input: &str, expected: Difficulty) {
        assert_eq!(input.parse::<Difficulty>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_labels() {
        let error = "extreme".parse::<Difficulty>().unwrap_err();
        assert_eq!(
            error.to_string(),
            "unknown difficulty 'extreme' (expected easy, medium or hard)"
        );
    }

    #[test]
    fn ordering_follows_severity() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Medium < Difficulty::Hard);
        assert_eq!(
            Difficulty::ALL.map(Difficulty::rank),
            [1, 2, 3],
            "ranks are contiguous from 1"
        );
    }

    #[test]
    fn serializes_as_canonical_label() {
        let json = serde_json::to_string(&Difficulty::Medium).unwrap();
        assert_eq!(json, "\"Medium\"");
    }
}
