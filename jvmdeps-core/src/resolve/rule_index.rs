use std::collections::HashMap;

use jvmdeps_common::label::Label;
use jvmdeps_common::model::Language;
use jvmdeps_common::naming::PackageName;

/// The host's index of generated rules, keyed by the packages they declare.
pub trait RuleIndex {
    fn find_rules_by_import(&self, language: Language, package: &PackageName) -> Vec<Label>;
}

/// A `RuleIndex` backed by a map, filled from each rule's declared packages.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRuleIndex {
    rules: HashMap<(&'static str, PackageName), Vec<Label>>,
}

impl InMemoryRuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, language: Language, package: PackageName, label: Label) {
        let declaring = self
            .rules
            .entry((language.index_name(), package))
            .or_default();
        if !declaring.contains(&label) {
            declaring.push(label);
        }
    }

    pub fn remove(&mut self, language: Language, package: &PackageName) {
        self.rules
            .remove(&(language.index_name(), package.clone()));
    }
}

impl RuleIndex for InMemoryRuleIndex {
    fn find_rules_by_import(&self, language: Language, package: &PackageName) -> Vec<Label> {
        self.rules
            .get(&(language.index_name(), package.clone()))
            .cloned()
            .unwrap_or_default()
    }
}
