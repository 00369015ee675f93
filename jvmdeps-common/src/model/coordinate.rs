use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{JvmDepsError, Result};
use crate::label::{cleanup_label, Label};

/// A Maven coordinate, `group:artifact[:type[:classifier]]:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub packaging: Option<String>,
    pub classifier: Option<String>,
    pub version: String,
}

impl ArtifactCoordinate {
    pub fn parse(coord: &str) -> Result<Self> {
        let parts: Vec<&str> = coord.split(':').collect();
        if parts.len() < 3 {
            return Err(JvmDepsError::Coordinate(coord.to_string()));
        }
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Ok(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            packaging: if parts.len() > 3 { non_empty(parts[2]) } else { None },
            classifier: if parts.len() > 4 { non_empty(parts[3]) } else { None },
            version: parts[parts.len() - 1].to_string(),
        })
    }

    /// `group:artifact[:classifier]`, the version-independent form used for
    /// exclusions and label derivation.
    pub fn artifact_string(&self) -> String {
        let mut parts = vec![self.group_id.as_str(), self.artifact_id.as_str()];
        if let Some(classifier) = &self.classifier {
            parts.push(classifier);
        }
        parts.join(":")
    }

    /// `group:artifact`, used to look a coordinate up in conflict tables.
    pub fn unversioned(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if let Some(packaging) = &self.packaging {
            write!(f, ":{packaging}")?;
        }
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}

impl FromStr for ArtifactCoordinate {
    type Err = JvmDepsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// The label an artifact is exposed under in the external Maven repository.
pub fn label_from_artifact(repository_name: &str, artifact: &str) -> Label {
    Label::new(repository_name, "", cleanup_label(artifact))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_coordinate() {
        let c = ArtifactCoordinate::parse("com.google.guava:guava:31.1-jre").unwrap();
        assert_eq!(c.group_id, "com.google.guava");
        assert_eq!(c.artifact_id, "guava");
        assert_eq!(c.packaging, None);
        assert_eq!(c.classifier, None);
        assert_eq!(c.version, "31.1-jre");
        assert_eq!(c.artifact_string(), "com.google.guava:guava");
    }

    #[test]
    fn parses_type_and_classifier() {
        let c = ArtifactCoordinate::parse("com.google.guava:guava:jar:sources:31.1-jre").unwrap();
        assert_eq!(c.packaging.as_deref(), Some("jar"));
        assert_eq!(c.classifier.as_deref(), Some("sources"));
        assert_eq!(c.artifact_string(), "com.google.guava:guava:sources");
        assert_eq!(c.to_string(), "com.google.guava:guava:jar:sources:31.1-jre");
    }

    #[test]
    fn rejects_short_coordinates() {
        let err = ArtifactCoordinate::parse("com.google.guava:guava").unwrap_err();
        assert!(matches!(err, JvmDepsError::Coordinate(ref c) if c == "com.google.guava:guava"));
    }

    #[test]
    fn derives_maven_label() {
        let label = label_from_artifact("maven", "com.google.guava:guava");
        assert_eq!(label.to_string(), "@maven//:com_google_guava_guava");
    }
}
