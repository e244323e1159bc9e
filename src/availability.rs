use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ingredient_parser::normalize;

/// The names a request can cook with: scanned items plus pantry stock.
///
/// Entries are trimmed, lowercased and deduplicated on insertion; blank names are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSet {
    names: BTreeSet<String>,
}

impl AvailableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str) -> bool {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return false;
        }
        self.names.insert(key)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for AvailableSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = AvailableSet::new();
        set.extend(iter);
        set
    }
}

impl<S: AsRef<str>> Extend<S> for AvailableSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name.as_ref());
        }
    }
}

/// Bidirectional substring containment between two canonical names.
pub fn fuzzy_match(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Raw matching heuristic over a name that is already canonical: exact hit first, then
/// containment in either direction against every pool entry.
///
/// An empty `canonical` is contained in every entry and therefore matches any non-empty pool.
pub fn matches_canonical(canonical: &str, pool: &AvailableSet) -> bool {
    pool.contains(canonical) || pool.iter().any(|entry| fuzzy_match(canonical, entry))
}

/// Whether a raw ingredient line is satisfied by something in `pool`.
///
/// Lines that normalize to nothing are unresolvable and never count as available.
pub fn is_available(ingredient: &str, pool: &AvailableSet) -> bool {
    let canonical = normalize(ingredient);
    if canonical.is_empty() {
        return false;
    }
    matches_canonical(&canonical, pool)
}
