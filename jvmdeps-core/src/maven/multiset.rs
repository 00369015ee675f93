use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

/// Inverted index from package name to the artifact strings providing it.
/// Written while the resolver is built, then only read.
#[derive(Debug, Default)]
pub struct ArtifactMultiset {
    data: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl ArtifactMultiset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, package: impl Into<String>, artifact: impl Into<String>) {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard
            .entry(package.into())
            .or_default()
            .insert(artifact.into());
    }

    pub fn get(&self, package: &str) -> Option<BTreeSet<String>> {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(package).cloned()
    }

    pub fn len(&self) -> usize {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A sorted package to artifacts mapping; the empty package is skipped.
    pub fn dump_manifest(&self) -> BTreeMap<String, Vec<String>> {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .iter()
            .filter(|(package, _)| !package.is_empty())
            .map(|(package, artifacts)| (package.clone(), artifacts.iter().cloned().collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_collects_distinct_values_per_key() {
        let set = ArtifactMultiset::new();
        set.add("com.example", "b:b");
        set.add("com.example", "a:a");
        set.add("com.example", "a:a");
        set.add("org.other", "c:c");

        let values: Vec<String> = set.get("com.example").unwrap().into_iter().collect();
        assert_eq!(values, vec!["a:a".to_string(), "b:b".to_string()]);
        assert_eq!(set.len(), 2);
        assert!(set.get("missing").is_none());
    }

    #[test]
    fn dump_skips_empty_package() {
        let set = ArtifactMultiset::new();
        set.add("", "root:root");
        set.add("com.example", "a:a");
        let dumped = set.dump_manifest();
        assert_eq!(dumped.len(), 1);
        assert_eq!(dumped["com.example"], vec!["a:a".to_string()]);
    }
}
