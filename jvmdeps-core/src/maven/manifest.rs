// jvmdeps-core/src/maven/manifest.rs
//! The `maven_install.json` lock file written by rules_jvm_external.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use jvmdeps_common::error::{JvmDepsError, Result};
use jvmdeps_common::model::ArtifactCoordinate;
use serde::Deserialize;
use tracing::debug;

/// The only schema version whose `coord` strings already carry the resolved
/// version.
const EMBEDDED_VERSION_SCHEMA: &str = "0.1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestSchema {
    /// `coord` is authoritative.
    EmbeddedVersions,
    /// `dependency_tree.conflict_resolution` maps requested to resolved coordinates.
    TreeConflictTable,
    /// Same mapping, stored next to `dependency_tree` instead of inside it.
    TopLevelConflictTable,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MavenInstallFile {
    pub dependency_tree: DependencyTree,
    #[serde(default)]
    pub conflict_resolution: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyTree {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub conflict_resolution: Option<HashMap<String, String>>,
    #[serde(default)]
    pub dependencies: Vec<ManifestDependency>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestDependency {
    pub coord: String,
    #[serde(default)]
    pub packages: Vec<String>,
}

impl MavenInstallFile {
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Reading Maven install file {}", path.display());
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| {
            JvmDepsError::Manifest(format!("failed to parse maven install file: {e}"))
        })
    }

    pub fn schema(&self) -> ManifestSchema {
        if self.dependency_tree.version == EMBEDDED_VERSION_SCHEMA {
            ManifestSchema::EmbeddedVersions
        } else if self.conflict_resolution.is_some() {
            ManifestSchema::TopLevelConflictTable
        } else {
            ManifestSchema::TreeConflictTable
        }
    }

    fn conflict_table(&self) -> Option<&HashMap<String, String>> {
        match self.schema() {
            ManifestSchema::EmbeddedVersions => None,
            ManifestSchema::TreeConflictTable => self.dependency_tree.conflict_resolution.as_ref(),
            ManifestSchema::TopLevelConflictTable => self.conflict_resolution.as_ref(),
        }
    }

    /// The coordinate `dep` was actually resolved to, after conflict resolution.
    pub fn resolved_coordinate(&self, dep: &ManifestDependency) -> Result<ArtifactCoordinate> {
        let declared = ArtifactCoordinate::parse(&dep.coord)?;
        let Some(table) = self.conflict_table() else {
            return Ok(declared);
        };
        let resolved = table
            .get(&dep.coord)
            .or_else(|| table.get(&declared.unversioned()));
        match resolved {
            Some(resolved) => {
                debug!("Conflict resolution maps {} to {}", dep.coord, resolved);
                ArtifactCoordinate::parse(resolved)
            }
            None => Ok(declared),
        }
    }
}
