use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::naming::{ClassName, PackageName};

/// What the source parser reports for one compilation unit (a package's worth
/// of files).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUnit {
    pub package_name: PackageName,
    #[serde(default)]
    pub imported_classes: Vec<String>,
    #[serde(default)]
    pub imported_packages: Vec<String>,
    #[serde(default)]
    pub exported_classes: Vec<String>,
    #[serde(default)]
    pub mains: Vec<String>,
}

impl ParsedUnit {
    /// Every import of the unit as the raw string the resolver expects.
    pub fn raw_imports(&self) -> impl Iterator<Item = &str> {
        self.imported_classes
            .iter()
            .chain(self.imported_packages.iter())
            .map(String::as_str)
    }
}

/// The per-rule record the export index consumes: packages the rule declares,
/// packages it imports from elsewhere, and packages it re-exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveInput {
    pub package_names: BTreeSet<PackageName>,
    pub imported_package_names: BTreeSet<PackageName>,
    #[serde(default)]
    pub exported_package_names: BTreeSet<PackageName>,
}

impl ResolveInput {
    pub fn new(
        package_names: impl IntoIterator<Item = PackageName>,
        imported_package_names: impl IntoIterator<Item = PackageName>,
    ) -> Self {
        let package_names: BTreeSet<PackageName> = package_names.into_iter().collect();
        let imported_package_names = imported_package_names
            .into_iter()
            .filter(|pkg| !package_names.contains(pkg))
            .collect();
        Self {
            package_names,
            imported_package_names,
            exported_package_names: BTreeSet::new(),
        }
    }

    pub fn with_exports(mut self, exported: impl IntoIterator<Item = PackageName>) -> Self {
        self.exported_package_names = exported.into_iter().collect();
        self
    }

    /// Builds the record for a rule compiled from `units`. Imports of packages
    /// the rule declares itself are dropped.
    pub fn from_units(units: &[ParsedUnit]) -> Self {
        let declared: BTreeSet<PackageName> =
            units.iter().map(|u| u.package_name.clone()).collect();

        let mut imported = BTreeSet::new();
        let mut exported = BTreeSet::new();
        for unit in units {
            for class in &unit.imported_classes {
                match ClassName::parse(class) {
                    Ok(parsed) => {
                        imported.insert(parsed.package_name().clone());
                    }
                    Err(e) => debug!("Skipping unparseable imported class {:?}: {}", class, e),
                }
            }
            imported.extend(unit.imported_packages.iter().map(|p| PackageName::new(p.as_str())));
            for class in &unit.exported_classes {
                match ClassName::parse(class) {
                    Ok(parsed) => {
                        exported.insert(parsed.package_name().clone());
                    }
                    Err(e) => debug!("Skipping unparseable exported class {:?}: {}", class, e),
                }
            }
        }
        imported.retain(|pkg: &PackageName| !pkg.is_empty());

        Self::new(declared, imported).with_exports(exported)
    }
}
