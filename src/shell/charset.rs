//! Explicit character-class sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of characters built from an alphabet string.
///
/// `"|. "` is the set `{'|', '.', ' '}`. Order and duplicates in the source
/// string are irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CharSet(BTreeSet<char>);

impl CharSet {
    pub fn contains(&self, c: char) -> bool {
        self.0.contains(&c)
    }

    /// The smallest character present in both sets, if any.
    pub fn first_shared(&self, other: &CharSet) -> Option<char> {
        self.0.intersection(&other.0).next().copied()
    }
}

impl From<&str> for CharSet {
    fn from(chars: &str) -> Self {
        Self(chars.chars().collect())
    }
}

impl From<String> for CharSet {
    fn from(chars: String) -> Self {
        Self::from(chars.as_str())
    }
}

impl From<CharSet> for String {
    fn from(set: CharSet) -> Self {
        set.0.into_iter().collect()
    }
}

impl FromIterator<char> for CharSet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
