//! Caption noun supplied by the uploader.

use std::fmt;

use crate::domain::errors::MemeError;

/// Maximum noun length in characters.
pub const MAX_NOUN_LEN: usize = 64;

/// A validated caption noun.
///
/// The noun ends up verbatim in the artifact file name and in the redirect
/// URL, so only `[A-Za-z0-9_-]` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Noun(String);

impl Noun {
    /// Validates untrusted input.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    /// Returns [`MemeError::InvalidNoun`] if the noun is empty, too long, or
    /// contains characters outside the allowlist.
    pub fn parse(raw: &str) -> Result<Self, MemeError> {
        let noun = raw.trim();

        if noun.is_empty() {
            return Err(MemeError::invalid_noun("noun must not be empty"));
        }
        if noun.len() > MAX_NOUN_LEN {
            return Err(MemeError::invalid_noun(format!(
                "noun must be at most {MAX_NOUN_LEN} characters"
            )));
        }
        if let Some(bad) = noun.chars().find(|c| !is_allowed(*c)) {
            return Err(MemeError::invalid_noun(format!(
                "character {bad:?} is not allowed"
            )));
        }

        Ok(Self(noun.to_string()))
    }

    /// Returns the noun text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Caption rendered onto the animation.
    #[must_use]
    pub fn caption(&self) -> String {
        format!("[{} intensifies]", self.0)
    }
}

const fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl fmt::Display for Noun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
