// jvmdeps-core/src/resolve/engine.rs

use std::collections::{BTreeMap, BTreeSet};

use jvmdeps_common::config::Config;
use jvmdeps_common::error::{JvmDepsError, Result};
use jvmdeps_common::label::Label;
use jvmdeps_common::model::Language;
use jvmdeps_common::naming::{Import, PackageName};
use tracing::{debug, error, warn};

use super::cache::ResolutionCache;
use super::rule_index::RuleIndex;
use super::stdlib::is_stdlib;
use crate::export_index::ExportIndex;
use crate::maven::MavenResolver;

const RUNFILES_PACKAGE: &str = "com.google.devtools.build.runfiles";

/// Rule-index matches after the export policy has been applied.
enum IndexMatches {
    /// Matches independent of the origin rule.
    Direct(Vec<Label>),
    /// The one export covering the matches, as seen from the origin rule.
    Export(Label),
}

/// Everything a resolution run shares across rules. Constructed once and
/// passed by reference; the cache is the only part that changes.
pub struct ResolutionContext<'a> {
    pub config: &'a Config,
    pub rule_index: &'a dyn RuleIndex,
    pub maven: &'a MavenResolver,
    pub cache: &'a ResolutionCache,
    /// Only consulted when `config.resolve_to_java_exports` is set.
    pub export_index: Option<&'a ExportIndex>,
}

/// The rule whose imports are being resolved.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub from: &'a Label,
    pub language: Language,
    pub is_test: bool,
    pub own_packages: &'a BTreeSet<PackageName>,
}

pub struct ImportResolver<'a> {
    context: ResolutionContext<'a>,
}

impl<'a> ImportResolver<'a> {
    pub fn new(context: ResolutionContext<'a>) -> Self {
        Self { context }
    }

    /// Resolves raw import strings (`com.example.Foo`, `com.example.*`) into
    /// the sorted `deps` payload for `rule`. Imports of the rule's own packages
    /// are skipped.
    pub fn resolve_imports<'i>(
        &self,
        rule: &RuleContext<'_>,
        imports: impl IntoIterator<Item = &'i str>,
        existing: &[String],
    ) -> Result<Vec<String>> {
        let mut by_package: BTreeMap<PackageName, Vec<String>> = BTreeMap::new();
        for raw in imports {
            let import = Import::parse(raw);
            if import.package.is_empty() || rule.own_packages.contains(&import.package) {
                continue;
            }
            let classes = by_package.entry(import.package).or_default();
            if let Some(outer) = import.classes.first() {
                if !classes.contains(outer) {
                    classes.push(outer.clone());
                }
            }
        }
        self.resolve_packages(rule, &by_package, existing)
    }

    /// Resolves each package once and merges the results with `existing`
    /// labels. The classes per package are only used in diagnostics.
    pub fn resolve_packages(
        &self,
        rule: &RuleContext<'_>,
        packages: &BTreeMap<PackageName, Vec<String>>,
        existing: &[String],
    ) -> Result<Vec<String>> {
        let mut labels = Vec::new();
        for (package, classes) in packages {
            if let Some(label) = self.resolve_package(rule, package, classes) {
                labels.push(label.simplify(&self.context.config.repo_name, rule.from));
            }
        }

        for raw in existing {
            labels.push(Label::parse(raw)?);
        }

        labels.retain(|l| !(l.relative && l.name == rule.from.name));
        labels.sort();
        labels.dedup_by(|a, b| a.to_string() == b.to_string());
        Ok(labels.iter().map(ToString::to_string).collect())
    }

    /// Finds the label providing `package`, or `None` when no dependency should
    /// be emitted. Never fails: absence and ambiguity are logged and skipped.
    pub fn resolve_package(
        &self,
        rule: &RuleContext<'_>,
        package: &PackageName,
        classes: &[String],
    ) -> Option<Label> {
        // 1. override
        if let Some(label) = self.context.config.override_for(package) {
            debug!("Override for {} -> {}", package, label);
            return Some(label.clone());
        }

        // 2. rules in this repository declaring the package
        let matches = self
            .context
            .rule_index
            .find_rules_by_import(rule.language, package);
        let matches = match self.apply_export_policy(matches, rule.from) {
            // Depends on the origin, so never cached.
            IndexMatches::Export(export) => return Some(export),
            IndexMatches::Direct(matches) => matches,
        };
        match matches.as_slice() {
            [] => {}
            [only] => {
                self.context.cache.insert(package.clone(), only.clone());
                return Some(only.clone());
            }
            many => {
                let candidates: Vec<String> = many.iter().map(ToString::to_string).collect();
                error!(
                    package = %package,
                    from = %rule.from,
                    candidates = ?candidates,
                    "Multiple rules declare this package; not picking one. Add a resolve override to disambiguate"
                );
            }
        }

        // 3. earlier successful resolution
        if let Some(cached) = self.context.cache.get(package) {
            return Some(cached);
        }

        debug!("{} not found yet (from {})", package, rule.from);

        // 4. runtime library
        if is_stdlib(package, rule.language) {
            return None;
        }

        if package.as_str() == RUNFILES_PACKAGE {
            let runfiles = Label::new("bazel_tools", "tools/java/runfiles", "runfiles");
            self.context.cache.insert(package.clone(), runfiles.clone());
            return Some(runfiles);
        }

        // 5. maven
        let config = self.context.config;
        match self.context.maven.resolve(
            package,
            config.excluded_artifacts(),
            &config.maven_repository_name,
        ) {
            Ok(label) => {
                self.context.cache.insert(package.clone(), label.clone());
                return Some(label);
            }
            Err(JvmDepsError::NoExternalImports { .. }) => {}
            Err(JvmDepsError::MultipleExternalImports { candidates, .. }) => {
                error!(classes = ?classes, "Append one of the following to BUILD.bazel:");
                for candidate in &candidates {
                    error!("# jvmdeps:resolve java {} {}", package, candidate);
                }
            }
            Err(e) => warn!("Maven lookup for {} failed: {}", package, e),
        }

        if rule.is_test && rule.own_packages.contains(package) {
            // Test sources may declare packages nothing else provides.
            return None;
        }

        warn!(
            package = %package,
            from = %rule.from,
            classes = ?classes,
            "Unable to find package for import in any dependency"
        );
        None
    }

    /// With export resolution on, a match absorbed by an export resolves to
    /// that export unless `from` is absorbed by the same one. With it off,
    /// export rules never match.
    fn apply_export_policy(&self, matches: Vec<Label>, from: &Label) -> IndexMatches {
        let Some(index) = self.context.export_index else {
            return IndexMatches::Direct(matches);
        };

        if !self.context.config.resolve_to_java_exports {
            return IndexMatches::Direct(
                matches
                    .into_iter()
                    .filter(|m| !index.is_java_export(m))
                    .collect(),
            );
        }

        let same_export = |one: &Label, other: &Label| {
            match (index.exported_by(one), index.exported_by(other)) {
                (None, None) => true,
                (Some(a), Some(b)) => a.label == b.label,
                _ => false,
            }
        };

        let mut covering: BTreeSet<Label> = BTreeSet::new();
        for candidate in &matches {
            if index.is_java_export(candidate) {
                covering.insert(candidate.clone());
            } else if !same_export(from, candidate) {
                if let Some(export) = index.exported_by(candidate) {
                    covering.insert(export.label.clone());
                }
            }
        }

        if covering.len() <= 1 {
            return match covering.pop_first() {
                Some(export) => IndexMatches::Export(export),
                None => IndexMatches::Direct(matches),
            };
        }

        let exports: Vec<String> = covering.iter().map(ToString::to_string).collect();
        error!(
            from = %from,
            exports = ?exports,
            "Found multiple export targets exporting this dependency; not picking one"
        );
        IndexMatches::Direct(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export_index::ExportIndexBuilder;
    use crate::maven::MavenInstallFile;
    use crate::resolve::rule_index::InMemoryRuleIndex;
    use jvmdeps_common::model::{ExportRule, ResolveInput};

    const INSTALL: &str = r#"{"dependency_tree": {"version": "0.1.0", "dependencies": [
        {"coord": "com.google.guava:guava:31.1-jre", "packages": ["com.google.common.collect"]},
        {"coord": "com.a:one:1.0", "packages": ["com.shared"]},
        {"coord": "com.b:two:2.0", "packages": ["com.shared"]}
    ]}}"#;

    fn label(s: &str) -> Label {
        Label::parse(s).unwrap()
    }

    fn maven() -> MavenResolver {
        MavenResolver::from_manifest(&MavenInstallFile::parse(INSTALL).unwrap())
    }

    struct Fixture {
        config: Config,
        index: InMemoryRuleIndex,
        maven: MavenResolver,
        cache: ResolutionCache,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                config: Config::default(),
                index: InMemoryRuleIndex::new(),
                maven: maven(),
                cache: ResolutionCache::default(),
            }
        }

        fn resolver<'a>(&'a self, export_index: Option<&'a ExportIndex>) -> ImportResolver<'a> {
            ImportResolver::new(ResolutionContext {
                config: &self.config,
                rule_index: &self.index,
                maven: &self.maven,
                cache: &self.cache,
                export_index,
            })
        }
    }

    fn resolve(resolver: &ImportResolver<'_>, from: &Label, imports: &[&str]) -> Vec<String> {
        let own = BTreeSet::new();
        let rule = RuleContext {
            from,
            language: Language::Java,
            is_test: false,
            own_packages: &own,
        };
        resolver
            .resolve_imports(&rule, imports.iter().copied(), &[])
            .unwrap()
    }

    #[test]
    fn resolves_through_the_whole_chain() {
        let mut fixture = Fixture::new();
        fixture.index.add(
            Language::Java,
            PackageName::new("com.example.util"),
            label("//src/util"),
        );
        fixture.index.add(
            Language::Java,
            PackageName::new("com.example.app.helpers"),
            label("//src/app:helpers"),
        );
        let resolver = fixture.resolver(None);
        let from = label("//src/app");

        let deps = resolve(
            &resolver,
            &from,
            &[
                "com.google.common.collect.ImmutableList",
                "com.example.util.Strings",
                "com.example.app.helpers.Helper",
                "java.util.List",
                "com.google.devtools.build.runfiles.Runfiles",
                "com.unknown.Thing",
            ],
        );
        assert_eq!(
            deps,
            vec![
                ":helpers",
                "//src/util",
                "@bazel_tools//tools/java/runfiles",
                "@maven//:com_google_guava_guava",
            ]
        );
    }

    #[test]
    fn override_wins_over_everything() {
        let mut fixture = Fixture::new();
        fixture
            .config
            .add_override("com.google.common.collect", "//third_party:guava")
            .unwrap();
        fixture.index.add(
            Language::Java,
            PackageName::new("com.google.common.collect"),
            label("//vendored/guava"),
        );
        let resolver = fixture.resolver(None);
        let deps = resolve(&resolver, &label("//app"), &["com.google.common.collect.Lists"]);
        assert_eq!(deps, vec!["//third_party:guava"]);
    }

    #[test]
    fn ambiguous_rule_index_match_falls_through() {
        let mut fixture = Fixture::new();
        let pkg = PackageName::new("com.google.common.collect");
        fixture.index.add(Language::Java, pkg.clone(), label("//a"));
        fixture.index.add(Language::Java, pkg.clone(), label("//b"));
        let resolver = fixture.resolver(None);
        let deps = resolve(&resolver, &label("//app"), &["com.google.common.collect.Lists"]);
        assert_eq!(deps, vec!["@maven//:com_google_guava_guava"]);
    }

    #[test]
    fn ambiguous_maven_artifacts_produce_nothing() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(None);
        let deps = resolve(&resolver, &label("//app"), &["com.shared.Thing"]);
        assert!(deps.is_empty());
        assert!(fixture.cache.get(&PackageName::new("com.shared")).is_none());
    }

    #[test]
    fn existing_deps_are_merged_and_self_dependency_dropped() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(None);
        let from = label("//app:app");
        let own = BTreeSet::new();
        let rule = RuleContext {
            from: &from,
            language: Language::Java,
            is_test: false,
            own_packages: &own,
        };
        let deps = resolver
            .resolve_imports(
                &rule,
                ["com.google.common.collect.Lists"],
                &[
                    "@maven//:com_google_guava_guava".to_string(),
                    ":app".to_string(),
                    ":extra".to_string(),
                ],
            )
            .unwrap();
        assert_eq!(deps, vec![":extra", "@maven//:com_google_guava_guava"]);

        let err = resolver.resolve_imports(&rule, ["java.util.List"], &["//a:b:c".to_string()]);
        assert!(err.is_err());
    }

    #[test]
    fn kotlin_stdlib_only_for_kotlin_rules() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(None);
        let from = label("//app");
        let own = BTreeSet::new();
        let kotlin_rule = RuleContext {
            from: &from,
            language: Language::Kotlin,
            is_test: false,
            own_packages: &own,
        };
        assert!(resolver
            .resolve_package(&kotlin_rule, &PackageName::new("kotlin.collections"), &[])
            .is_none());
        assert!(fixture.cache.is_empty());
    }

    fn export_fixture() -> (Fixture, ExportIndex) {
        let mut fixture = Fixture::new();
        let mut builder = ExportIndexBuilder::new();
        for (lbl, pkg) in [("//lib/a", "com.example.a"), ("//lib/b", "com.example.b")] {
            builder.record_rule_with_resolve_input(
                label(lbl),
                ResolveInput::new([PackageName::new(pkg)], Vec::new()),
            );
            fixture
                .index
                .add(Language::Java, PackageName::new(pkg), label(lbl));
        }
        builder
            .record_java_export(
                label("//dist:api"),
                &ExportRule {
                    label: "//dist:api".to_string(),
                    exports: vec!["//lib/a".to_string(), "//lib/b".to_string()],
                    ..Default::default()
                },
            )
            .unwrap();
        (fixture, builder.finalize())
    }

    #[test]
    fn absorbed_rules_resolve_to_their_export() {
        let (fixture, exports) = export_fixture();
        let resolver = fixture.resolver(Some(&exports));

        let outside = resolve(&resolver, &label("//app"), &["com.example.a.Api"]);
        assert_eq!(outside, vec!["//dist:api"]);

        // Absorbed by the same export: depend on the library directly.
        let inside = resolve(&resolver, &label("//lib/b"), &["com.example.a.Api"]);
        assert_eq!(inside, vec!["//lib/a"]);
    }

    #[test]
    fn export_resolution_can_be_disabled() {
        let (mut fixture, exports) = export_fixture();
        fixture.config.resolve_to_java_exports = false;
        fixture.index.add(
            Language::Java,
            PackageName::new("com.example.a"),
            label("//dist:api"),
        );
        let resolver = fixture.resolver(Some(&exports));
        let deps = resolve(&resolver, &label("//app"), &["com.example.a.Api"]);
        assert_eq!(deps, vec!["//lib/a"]);
    }

    #[test]
    fn export_choice_does_not_leak_between_origins() {
        let mut fixture = Fixture::new();
        let shared = PackageName::new("p.shared");
        fixture.index.add(Language::Java, shared.clone(), label("//x"));
        fixture.index.add(Language::Java, shared.clone(), label("//y"));

        let mut builder = ExportIndexBuilder::new();
        for (lbl, pkg) in [("//x", "p.shared"), ("//y", "p.shared"), ("//f1", "p.f1")] {
            builder.record_rule_with_resolve_input(
                label(lbl),
                ResolveInput::new([PackageName::new(pkg)], Vec::new()),
            );
        }
        for (lbl, deps) in [("//e1:e1", vec!["//x", "//f1"]), ("//e2:e2", vec!["//y"])] {
            builder
                .record_java_export(
                    label(lbl),
                    &ExportRule {
                        label: lbl.to_string(),
                        exports: deps.into_iter().map(String::from).collect(),
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        let exports = builder.finalize();
        let resolver = fixture.resolver(Some(&exports));
        let own = BTreeSet::new();
        let f1 = label("//f1");
        let app = label("//app");
        let rule_for = |from| RuleContext {
            from,
            language: Language::Java,
            is_test: false,
            own_packages: &own,
        };

        // Inside //e1 only //e2 covers the other provider.
        assert_eq!(
            resolver.resolve_package(&rule_for(&f1), &shared, &[]),
            Some(label("//e2:e2"))
        );
        assert!(fixture.cache.get(&shared).is_none());

        // Outside both exports the choice is ambiguous, however warm the cache.
        assert_eq!(resolver.resolve_package(&rule_for(&app), &shared, &[]), None);
    }

    #[test]
    fn test_rules_tolerate_their_own_unresolved_packages() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver(None);
        let from = label("//src/test:tests");
        let own = BTreeSet::from([PackageName::new("com.example.fixtures")]);
        let rule = RuleContext {
            from: &from,
            language: Language::Java,
            is_test: true,
            own_packages: &own,
        };

        assert_eq!(
            resolver.resolve_package(&rule, &PackageName::new("com.example.fixtures"), &[]),
            None
        );
        // A package it imports from elsewhere still resolves normally.
        assert_eq!(
            resolver
                .resolve_package(&rule, &PackageName::new("com.google.common.collect"), &[])
                .map(|l| l.to_string())
                .as_deref(),
            Some("@maven//:com_google_guava_guava")
        );
        assert!(fixture
            .cache
            .get(&PackageName::new("com.example.fixtures"))
            .is_none());
    }
}
