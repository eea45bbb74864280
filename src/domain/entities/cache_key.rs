//! Cache key and the artifact file name derived from it.

use std::fmt;

use super::{ContentHash, Noun};

const ARTIFACT_EXTENSION: &str = ".gif";
const MASK_SUFFIX: &str = ".mask.png";

/// Identity of a generated artifact: upload content plus caption noun.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    hash: ContentHash,
    noun: Noun,
}

impl CacheKey {
    /// Creates a key from its parts.
    #[must_use]
    pub const fn new(hash: ContentHash, noun: Noun) -> Self {
        Self { hash, noun }
    }

    /// Content hash of the upload.
    #[must_use]
    pub const fn hash(&self) -> ContentHash {
        self.hash
    }

    /// Caption noun.
    #[must_use]
    pub const fn noun(&self) -> &Noun {
        &self.noun
    }

    /// File name of the artifact, `<hash>-<noun>.gif`.
    #[must_use]
    pub fn artifact_name(&self) -> ArtifactName {
        ArtifactName(format!("{}-{}{ARTIFACT_EXTENSION}", self.hash, self.noun))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.hash, self.noun)
    }
}

/// A file name inside the cache directory.
///
/// Only constructed from a [`CacheKey`] or by [`ArtifactName::parse`], so
/// it never contains path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactName(String);

impl ArtifactName {
    /// Parses a requested file name, accepting only `<digits>-<noun>.gif`.
    #[must_use]
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(ARTIFACT_EXTENSION)?;
        let (hash, noun) = stem.split_once('-')?;
        let hash: u64 = hash.parse().ok()?;
        let noun = Noun::parse(noun).ok()?;
        let name = CacheKey::new(ContentHash::new(hash), noun).artifact_name();
        // Reject non-canonical spellings such as leading zeros.
        (name.as_str() == file_name).then_some(name)
    }

    /// Wraps a directory entry name as found on disk.
    ///
    /// Used when listing the store, where names are not required to be
    /// artifacts (stray temp files and mask dumps are reaped as well).
    #[must_use]
    pub(crate) fn from_listing(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the debug mask dump stored next to this artifact.
    #[must_use]
    pub fn mask_companion(&self) -> Self {
        Self(format!("{}{MASK_SUFFIX}", self.0))
    }

    /// Returns the file name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn key(hash: u64, noun: &str) -> CacheKey {
        CacheKey::new(ContentHash::new(hash), Noun::parse(noun).unwrap())
    }

    #[test]
    fn test_artifact_name_format() {
        assert_eq!(key(42, "cat").artifact_name().as_str(), "42-cat.gif");
    }

    #[test]
    fn test_same_bytes_different_noun_are_distinct() {
        assert_ne!(key(7, "cat").artifact_name(), key(7, "dog").artifact_name());
    }

    #[test]
    fn test_parse_round_trips_generated_names() {
        let name = key(18_446_744_073_709_551_615, "big-dog").artifact_name();
        assert_eq!(ArtifactName::parse(name.as_str()), Some(name));
    }

    #[test_case("42-cat.png" ; "wrong_extension")]
    #[test_case("cat.gif" ; "missing_hash")]
    #[test_case("x1-cat.gif" ; "non_numeric_hash")]
    #[test_case("042-cat.gif" ; "leading_zero")]
    #[test_case("42-.gif" ; "empty_noun")]
    #[test_case("42-..%2f.gif" ; "encoded_traversal")]
    #[test_case("42-cat.gif.mask.png" ; "mask_dump")]
    fn test_parse_rejects(file_name: &str) {
        assert_eq!(ArtifactName::parse(file_name), None);
    }

    #[test]
    fn test_mask_companion() {
        let name = key(1, "cat").artifact_name();
        assert_eq!(name.mask_companion().as_str(), "1-cat.gif.mask.png");
    }
}
