//! URL slugs for learning modules.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and single hyphens, at most [`SLUG_MAX`] characters long.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum slug length.
pub const SLUG_MAX: usize = 255;

/// Validation errors for [`Slug`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("slug must not be empty")]
    Empty,
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug may only contain lowercase letters, digits and hyphens")]
    InvalidCharacters,
}

/// Return `true` when `value` is a valid slug.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    is_trimmed_non_empty(value) && has_allowed_slug_chars(value)
}

fn is_trimmed_non_empty(value: &str) -> bool {
    !value.is_empty() && value.trim() == value
}

fn has_allowed_slug_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Validated module slug.
///
/// # Examples
/// ```
/// use learning_backend::domain::Slug;
///
/// let slug = Slug::from_title("Voting Rights & You (2024)").expect("title has letters");
/// assert_eq!(slug.as_ref(), "voting-rights-you-2024");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate an explicit slug.
    pub fn new(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into();
        if value.is_empty() {
            return Err(SlugError::Empty);
        }
        if value.len() > SLUG_MAX {
            return Err(SlugError::TooLong { max: SLUG_MAX });
        }
        if !is_valid_slug(&value) {
            return Err(SlugError::InvalidCharacters);
        }
        Ok(Self(value))
    }

    /// Derive a slug from a title.
    ///
    /// Non-alphanumeric runs collapse to a single hyphen; leading and trailing
    /// hyphens are dropped. Non-ASCII letters are removed.
    pub fn from_title(title: &str) -> Result<Self, SlugError> {
        let mut slug = String::with_capacity(title.len());
        let mut pending_hyphen = false;
        for ch in title.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(ch.to_ascii_lowercase());
            } else if ch.is_whitespace() || ch == '-' || ch == '_' || ch.is_ascii_punctuation() {
                pending_hyphen = true;
            }
        }
        let truncated: String = slug.chars().take(SLUG_MAX).collect();
        Self::new(truncated.trim_end_matches('-').to_owned())
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("civic-basics", true)]
    #[case("module-101", true)]
    #[case("", false)]
    #[case(" civic", false)]
    #[case("Civic", false)]
    #[case("civic_basics", false)]
    fn validates_characters(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(is_valid_slug(raw), valid);
    }

    #[rstest]
    #[case("Introduction to Local Government", "introduction-to-local-government")]
    #[case("  Budgets -- and -- Taxes!  ", "budgets-and-taxes")]
    #[case("Café Society", "caf-society")]
    #[case("Step_by_step", "step-by-step")]
    fn derives_from_titles(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(Slug::from_title(title).expect("slug").as_ref(), expected);
    }

    #[rstest]
    fn title_without_ascii_letters_is_rejected() {
        assert_eq!(Slug::from_title("!!!"), Err(SlugError::Empty));
    }
}
