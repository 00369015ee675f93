// jvmdeps-core/src/maven/resolver.rs

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Instant;

use jvmdeps_common::error::{JvmDepsError, Result};
use jvmdeps_common::label::Label;
use jvmdeps_common::model::coordinate::label_from_artifact;
use jvmdeps_common::naming::PackageName;
use tracing::{debug, warn};

use super::manifest::MavenInstallFile;
use super::multiset::ArtifactMultiset;

/// Finds the external artifact providing a package, using the package lists
/// recorded in the Maven install file.
#[derive(Debug, Default)]
pub struct MavenResolver {
    data: ArtifactMultiset,
}

impl MavenResolver {
    /// A missing or unreadable install file is not fatal: the resolver comes up
    /// empty and every lookup reports that no artifact provides the package.
    pub fn new(install_file: &Path) -> Self {
        match MavenInstallFile::load(install_file) {
            Ok(file) => Self::from_manifest(&file),
            Err(e) => {
                warn!(
                    "Not loading maven dependencies from {}: {}",
                    install_file.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn from_manifest(file: &MavenInstallFile) -> Self {
        let load_start = Instant::now();
        let resolver = Self::default();
        let deps = &file.dependency_tree.dependencies;
        debug!(
            "Maven install file schema {:?} (version {:?}) with {} dependencies",
            file.schema(),
            file.dependency_tree.version,
            deps.len()
        );

        for dep in deps {
            let coordinate = match file.resolved_coordinate(dep) {
                Ok(c) => c,
                Err(e) => {
                    warn!("Skipping maven dependency {:?}: {}", dep.coord, e);
                    continue;
                }
            };
            let artifact = coordinate.artifact_string();
            for package in &dep.packages {
                resolver.data.add(package.as_str(), artifact.as_str());
            }
        }

        debug!(
            "Indexed {} packages in {:?}",
            resolver.data.len(),
            load_start.elapsed()
        );
        resolver
    }

    /// Resolves `pkg` to the single artifact providing it, ignoring artifacts
    /// whose label appears in `excluded`.
    pub fn resolve(
        &self,
        pkg: &PackageName,
        excluded: &HashSet<String>,
        repository_name: &str,
    ) -> Result<Label> {
        let candidates: Vec<Label> = self
            .data
            .get(pkg.as_str())
            .unwrap_or_default()
            .iter()
            .map(|artifact| label_from_artifact(repository_name, artifact))
            .filter(|label| !excluded.contains(&label.to_string()))
            .collect();

        match candidates.as_slice() {
            [] => Err(JvmDepsError::NoExternalImports {
                package: pkg.to_string(),
            }),
            [only] => Ok(only.clone()),
            many => Err(JvmDepsError::MultipleExternalImports {
                package: pkg.to_string(),
                candidates: many.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    pub fn dump_manifest(&self) -> BTreeMap<String, Vec<String>> {
        self.data.dump_manifest()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
