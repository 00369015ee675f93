// jvmdeps-core/src/export_index.rs
//! Tracks export-aggregation rules and the fine-grained rules each one absorbs,
//! so dependents can depend on the aggregate instead.
//!
//! The index has two phases. `ExportIndexBuilder` accumulates rules while the
//! repository is walked; `finalize` consumes it and returns an `ExportIndex`,
//! which only answers queries. Accumulation takes `&mut self`, so a host that
//! walks directories concurrently has to serialize access to the builder itself.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use jvmdeps_common::error::Result;
use jvmdeps_common::label::Label;
use jvmdeps_common::model::{ExportRule, ResolveInput};
use jvmdeps_common::naming::PackageName;
use tracing::{debug, error, warn};

/// An export-aggregation rule and the visibility its absorbed rules receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaExportRecord {
    pub label: Label,
    /// Union of the rule's `deps`, `exports` and `runtime_deps`.
    pub direct_deps: BTreeSet<Label>,
    /// `//pkg:__pkg__` specs for the export's own package and every package
    /// holding a rule it absorbs.
    pub internal_visibility: BTreeSet<Label>,
}

/// Two exports reaching the same dependency; the first claim stands.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExportConflict {
    pub dependency: Label,
    pub wanted_to_export_from: Label,
    pub already_exported_from: Label,
}

#[derive(Debug, Clone, Default)]
pub struct ExportIndexBuilder {
    packages_to_labels_declaring_them: HashMap<PackageName, Label>,
    labels_to_resolve_inputs: HashMap<Label, ResolveInput>,
    java_exports: BTreeMap<Label, JavaExportRecord>,
}

impl ExportIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets the index know about a rule that declares some packages and imports
    /// others. A package declared twice maps to the last rule recorded.
    pub fn record_rule_with_resolve_input(&mut self, label: Label, resolve_input: ResolveInput) {
        for package in &resolve_input.package_names {
            self.packages_to_labels_declaring_them
                .insert(package.clone(), label.clone());
        }
        self.labels_to_resolve_inputs.insert(label, resolve_input);
    }

    /// Records an export rule. Fails only if one of its dependency labels is
    /// malformed.
    pub fn record_java_export(&mut self, label: Label, rule: &ExportRule) -> Result<()> {
        if !rule.srcs.is_empty() {
            warn!(
                label = %label,
                "Export rule has a non-empty `srcs` attribute, which is ignored during resolution. \
                 Use `exports` or `runtime_deps` and depend on the generated library instead."
            );
        }
        let direct_deps = rule.dependency_labels(&label)?.into_iter().collect();
        let internal_visibility = BTreeSet::from([label.package_visibility()]);
        self.java_exports.insert(
            label.clone(),
            JavaExportRecord {
                label,
                direct_deps,
                internal_visibility,
            },
        );
        Ok(())
    }

    pub fn is_java_export(&self, label: &Label) -> bool {
        self.java_exports.contains_key(label)
    }

    /// Computes the closure of every export and returns the query-only index.
    pub fn finalize(self) -> ExportIndex {
        let ExportIndexBuilder {
            packages_to_labels_declaring_them,
            labels_to_resolve_inputs,
            mut java_exports,
        } = self;

        let export_deps: HashMap<Label, Vec<Label>> = java_exports
            .iter()
            .map(|(label, record)| (label.clone(), record.direct_deps.iter().cloned().collect()))
            .collect();
        let mut graph = DependencyGraph {
            packages_to_labels: &packages_to_labels_declaring_them,
            resolve_inputs: &labels_to_resolve_inputs,
            export_deps: &export_deps,
            direct_deps: HashMap::new(),
            transitive_counts: HashMap::new(),
        };

        let all_labels: BTreeSet<&Label> = labels_to_resolve_inputs
            .keys()
            .chain(java_exports.keys())
            .collect();
        for label in all_labels {
            graph.transitive_dependency_count(label);
        }

        // An export that depends on another has at least as many transitive
        // dependencies, so fewest-first settles inner exports' claims first.
        let mut processing_order: Vec<(usize, Label)> = java_exports
            .keys()
            .map(|label| (graph.transitive_dependency_count(label), label.clone()))
            .collect();
        processing_order.sort();

        let mut label_to_java_export: HashMap<Label, Label> = HashMap::new();
        let mut conflicts: BTreeSet<ExportConflict> = BTreeSet::new();

        for (count, export_label) in &processing_order {
            debug!(
                "Computing closure of export {} ({} transitive dependencies)",
                export_label, count
            );
            let mut claimed = Vec::new();
            let mut queue: VecDeque<Label> = export_deps[export_label].iter().cloned().collect();
            let mut seen: HashSet<Label> = queue.iter().cloned().collect();

            while let Some(dep) = queue.pop_front() {
                if export_deps.contains_key(&dep) {
                    continue;
                }
                if let Some(prior) = label_to_java_export.get(&dep) {
                    conflicts.insert(ExportConflict {
                        dependency: dep.clone(),
                        wanted_to_export_from: export_label.clone(),
                        already_exported_from: prior.clone(),
                    });
                    continue;
                }

                label_to_java_export.insert(dep.clone(), export_label.clone());
                claimed.push(dep.package_visibility());

                for next in graph.direct_dependencies(&dep) {
                    if seen.insert(next.clone()) {
                        queue.push_back(next);
                    }
                }
            }

            if let Some(record) = java_exports.get_mut(export_label) {
                record.internal_visibility.extend(claimed);
            }
        }

        for conflict in &conflicts {
            let mut exports = [
                conflict.wanted_to_export_from.to_string(),
                conflict.already_exported_from.to_string(),
            ];
            exports.sort();
            error!(
                dependency = %conflict.dependency,
                exports = ?exports,
                "Two export targets want to export the same dependency. This can lead to incorrect \
                 results, please disambiguate, e.g. by having one export depend on the other explicitly."
            );
        }

        ExportIndex {
            java_exports,
            label_to_java_export,
            conflicts: conflicts.into_iter().collect(),
        }
    }
}

/// Memoized view of the dependency edges implied by recorded rules.
struct DependencyGraph<'a> {
    packages_to_labels: &'a HashMap<PackageName, Label>,
    resolve_inputs: &'a HashMap<Label, ResolveInput>,
    export_deps: &'a HashMap<Label, Vec<Label>>,
    direct_deps: HashMap<Label, Vec<Label>>,
    transitive_counts: HashMap<Label, usize>,
}

impl DependencyGraph<'_> {
    fn direct_dependencies(&mut self, label: &Label) -> Vec<Label> {
        if let Some(deps) = self.direct_deps.get(label) {
            return deps.clone();
        }

        let deps: Vec<Label> = if let Some(deps) = self.export_deps.get(label) {
            deps.clone()
        } else if let Some(input) = self.resolve_inputs.get(label) {
            let mut found = BTreeSet::new();
            for imported in &input.imported_package_names {
                match self.packages_to_labels.get(imported) {
                    Some(declaring) if declaring != label => {
                        found.insert(declaring.clone());
                    }
                    Some(_) => {}
                    None => debug!(
                        package = %imported,
                        "Found no label for imported package. It's probably a standard library package, or a package from maven"
                    ),
                }
            }
            found.into_iter().collect()
        } else {
            Vec::new()
        };

        self.direct_deps.insert(label.clone(), deps.clone());
        deps
    }

    /// Number of distinct labels reachable from `label`, excluding itself.
    fn transitive_dependency_count(&mut self, label: &Label) -> usize {
        if let Some(count) = self.transitive_counts.get(label) {
            return *count;
        }

        let mut visited: HashSet<Label> = HashSet::new();
        let mut stack = self.direct_dependencies(label);
        while let Some(next) = stack.pop() {
            if next == *label || !visited.insert(next.clone()) {
                continue;
            }
            stack.extend(self.direct_dependencies(&next));
        }

        let count = visited.len();
        self.transitive_counts.insert(label.clone(), count);
        count
    }
}

/// The finalized, query-only export index.
#[derive(Debug, Clone, Default)]
pub struct ExportIndex {
    java_exports: BTreeMap<Label, JavaExportRecord>,
    label_to_java_export: HashMap<Label, Label>,
    conflicts: Vec<ExportConflict>,
}

impl ExportIndex {
    pub fn is_java_export(&self, label: &Label) -> bool {
        self.java_exports.contains_key(label)
    }

    /// The export that absorbed `label`, if any.
    pub fn exported_by(&self, label: &Label) -> Option<&JavaExportRecord> {
        self.label_to_java_export
            .get(label)
            .and_then(|export| self.java_exports.get(export))
    }

    pub fn is_exported_by_java_export(&self, label: &Label) -> bool {
        self.label_to_java_export.contains_key(label)
    }

    /// The visibility `label` should get: subpackage-public for an export,
    /// the claiming export's internal visibility for an absorbed rule, and
    /// `None` when the index has no opinion.
    pub fn visibility_for_label(&self, label: &Label) -> Option<BTreeSet<Label>> {
        if self.is_java_export(label) {
            return Some(BTreeSet::from([Label::subpackages_visibility()]));
        }
        self.exported_by(label)
            .map(|export| export.internal_visibility.clone())
    }

    pub fn conflicts(&self) -> &[ExportConflict] {
        &self.conflicts
    }
}
