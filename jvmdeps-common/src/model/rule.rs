use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::label::Label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Java,
    Kotlin,
}

impl Language {
    /// The language tag rules are indexed under. Kotlin rules share the Java
    /// namespace since both compile to JVM packages.
    pub fn index_name(&self) -> &'static str {
        "java"
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Java => write!(f, "java"),
            Self::Kotlin => write!(f, "kotlin"),
        }
    }
}

/// The attributes of an export-aggregation rule that matter for propagation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRule {
    pub label: String,
    #[serde(default)]
    pub srcs: Vec<String>,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub exports: Vec<String>,
    #[serde(default)]
    pub runtime_deps: Vec<String>,
}

impl ExportRule {
    /// Parses `deps`, `exports` and `runtime_deps`, resolving relative entries
    /// against the export's own repository and package.
    pub fn dependency_labels(&self, owner: &Label) -> Result<Vec<Label>> {
        self.deps
            .iter()
            .chain(&self.exports)
            .chain(&self.runtime_deps)
            .map(|raw| Ok(Label::parse(raw)?.abs(&owner.repo, &owner.pkg)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_labels_are_made_absolute() {
        let rule = ExportRule {
            label: "//dist:api".to_string(),
            deps: vec![":impl".to_string(), "//lib/a".to_string()],
            exports: vec!["@maven//:junit_junit".to_string()],
            runtime_deps: vec!["//lib/b:b".to_string()],
            ..Default::default()
        };
        let owner = Label::parse(&rule.label).unwrap();
        let printed: Vec<String> = rule
            .dependency_labels(&owner)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            printed,
            vec!["//dist:impl", "//lib/a", "@maven//:junit_junit", "//lib/b"]
        );
    }

    #[test]
    fn malformed_dependency_is_an_error() {
        let rule = ExportRule {
            label: "//dist:api".to_string(),
            deps: vec!["//bad:a:b".to_string()],
            ..Default::default()
        };
        let owner = Label::parse(&rule.label).unwrap();
        assert!(rule.dependency_labels(&owner).is_err());
    }
}
