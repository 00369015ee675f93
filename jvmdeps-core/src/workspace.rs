// jvmdeps-core/src/workspace.rs
//! Drives both phases over a whole repository description: every rule and
//! export is recorded first, then each rule's imports are resolved against the
//! finalized export index.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Instant;

use jvmdeps_common::config::Config;
use jvmdeps_common::error::Result;
use jvmdeps_common::label::Label;
use jvmdeps_common::model::{ExportRule, Language, ParsedUnit, ResolveInput};
use jvmdeps_common::naming::PackageName;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::export_index::ExportIndexBuilder;
use crate::maven::MavenResolver;
use crate::resolve::{ImportResolver, InMemoryRuleIndex, ResolutionCache, ResolutionContext, RuleContext};

const TEST_KINDS: &[&str] = &["java_test", "java_junit5_test", "java_test_suite", "kt_jvm_test"];
const LIBRARY_KINDS: &[&str] = &["java_library", "kt_jvm_library"];

fn default_kind() -> String {
    "java_library".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceSpec {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    #[serde(default)]
    pub exports: Vec<ExportRule>,
}

impl WorkspaceSpec {
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Reading workspace description {}", path.display());
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// A generated rule: its sources' parse results plus any deps it already has.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub label: Label,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub testonly: bool,
    #[serde(default)]
    pub units: Vec<ParsedUnit>,
    #[serde(default)]
    pub deps: Vec<String>,
}

impl RuleSpec {
    pub fn is_test(&self) -> bool {
        self.testonly || TEST_KINDS.contains(&self.kind.as_str())
    }

    pub fn is_library(&self) -> bool {
        LIBRARY_KINDS.contains(&self.kind.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRule {
    pub label: Label,
    pub deps: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Vec<String>>,
}

pub fn run_workspace(
    config: &Config,
    spec: &WorkspaceSpec,
    maven: &MavenResolver,
) -> Result<Vec<ResolvedRule>> {
    let start = Instant::now();

    // Accumulate.
    let mut builder = ExportIndexBuilder::new();
    let mut rule_index = InMemoryRuleIndex::new();
    let mut inputs = Vec::with_capacity(spec.rules.len());
    for rule in &spec.rules {
        let input = ResolveInput::from_units(&rule.units);
        for package in &input.package_names {
            rule_index.add(rule.language, package.clone(), rule.label.clone());
        }
        builder.record_rule_with_resolve_input(rule.label.clone(), input.clone());
        inputs.push(input);
    }
    for export in &spec.exports {
        builder.record_java_export(Label::parse(&export.label)?, export)?;
    }

    let export_index = builder.finalize();
    info!(
        "Recorded {} rules and {} exports ({} conflicts)",
        spec.rules.len(),
        spec.exports.len(),
        export_index.conflicts().len()
    );

    // Query.
    let cache = ResolutionCache::default();
    let resolver = ImportResolver::new(ResolutionContext {
        config,
        rule_index: &rule_index,
        maven,
        cache: &cache,
        export_index: Some(&export_index),
    });

    let mut resolved = Vec::with_capacity(spec.rules.len());
    for (rule, input) in spec.rules.iter().zip(&inputs) {
        let context = RuleContext {
            from: &rule.label,
            language: rule.language,
            is_test: rule.is_test(),
            own_packages: &input.package_names,
        };

        let imports = rule.units.iter().flat_map(|unit| unit.raw_imports());
        let deps = resolver.resolve_imports(&context, imports, &rule.deps)?;

        let exported: BTreeMap<PackageName, Vec<String>> = input
            .exported_package_names
            .iter()
            .map(|package| (package.clone(), Vec::new()))
            .collect();
        let exports = resolver.resolve_packages(&context, &exported, &[])?;

        let visibility = if config.resolve_to_java_exports && rule.is_library() {
            export_index
                .visibility_for_label(&rule.label)
                .map(|specs| specs.iter().map(ToString::to_string).collect())
        } else {
            None
        };

        resolved.push(ResolvedRule {
            label: rule.label.clone(),
            deps,
            exports,
            visibility,
        });
    }
    resolved.sort_by(|a, b| a.label.cmp(&b.label));

    info!(
        "Resolved {} rules in {:?} ({} cached packages)",
        resolved.len(),
        start.elapsed(),
        cache.len()
    );
    Ok(resolved)
}
