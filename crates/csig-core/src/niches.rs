//! Deduplicated, order-insensitive niche tag sets.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A set of niche tags.
///
/// Tags are trimmed and deduplicated case-insensitively; the first spelling
/// seen wins. Equality ignores insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NicheSet {
    // lowercase key -> display spelling
    tags: BTreeMap<String, String>,
}

impl NicheSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tag. Returns `false` if an equivalent tag was already present
    /// or the tag is blank.
    pub fn insert(&mut self, tag: &str) -> bool {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return false;
        }
        let key = trimmed.to_lowercase();
        if self.tags.contains_key(&key) {
            return false;
        }
        self.tags.insert(key, trimmed.to_string());
        true
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(&tag.trim().to_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Display spellings in stable (case-insensitive alphabetical) order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.values().map(String::as_str)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.tags.values().cloned().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for NicheSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = NicheSet::new();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}

impl Serialize for NicheSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for NicheSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_case_insensitively() {
        let set: NicheSet = ["Tech", "tech", " TECH ", "Gaming"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("tech"));
        assert!(set.contains("GAMING"));
    }

    #[test]
    fn equality_ignores_order() {
        let a: NicheSet = ["Beauty", "Fitness"].into_iter().collect();
        let b: NicheSet = ["Fitness", "Beauty"].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn blank_tags_are_ignored() {
        let mut set = NicheSet::new();
        assert!(!set.insert("   "));
        assert!(set.is_empty());
    }

    #[test]
    fn first_spelling_wins() {
        let set: NicheSet = ["DIY", "diy"].into_iter().collect();
        assert_eq!(set.to_vec(), vec!["DIY".to_string()]);
    }

    #[test]
    fn deserializes_from_list_with_duplicates() {
        let set: NicheSet = serde_json::from_str(r#"["Food","food","Travel"]"#).unwrap();
        assert_eq!(set.len(), 2);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["Food","Travel"]"#);
    }
}
