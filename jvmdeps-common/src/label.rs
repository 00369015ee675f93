// jvmdeps-common/src/label.rs
//! Build labels of the form `@repo//pkg:name`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{JvmDepsError, Result};

static REPO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@?[A-Za-z0-9_.~+-]+$").expect("valid repo regex"));
static PKG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[^:@/\s]+(?:/[^:@/\s]+)*)?$").expect("valid package regex")
});
static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"^[A-Za-z0-9!%\-@^_"#$&'()*+,;<=>?\[\]{|}~/.]+$"##).expect("valid name regex")
});
static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z_]+").expect("valid non-word regex"));

/// Replaces every run of non-word characters with `_`, turning an artifact
/// string such as `com.google.guava:guava` into a valid target name.
pub fn cleanup_label(input: &str) -> String {
    NON_WORD_RE.replace_all(input, "_").into_owned()
}

/// A build label. Relative labels (`:name`) only carry a meaningful name; their
/// repository and package are whatever the referencing rule's are.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    pub repo: String,
    pub pkg: String,
    pub name: String,
    pub relative: bool,
}

impl Label {
    pub fn new(repo: impl Into<String>, pkg: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            pkg: pkg.into(),
            name: name.into(),
            relative: false,
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let mut rest = input;
        let mut relative = true;
        let mut repo = String::new();
        let owned_rest;

        if let Some(stripped) = rest.strip_prefix('@') {
            relative = false;
            match stripped.find("//") {
                Some(0) => return Err(JvmDepsError::label_parse(input, "empty repository name")),
                Some(end) => {
                    repo = stripped[..end].to_string();
                    rest = &stripped[end..];
                }
                None => {
                    repo = stripped.to_string();
                    owned_rest = format!("//:{}", repo.trim_start_matches('@'));
                    rest = &owned_rest;
                }
            }
            if !REPO_RE.is_match(&repo) {
                return Err(JvmDepsError::label_parse(input, "invalid repository name"));
            }
            // Canonical `@@repo` names compare like their apparent form.
            repo = repo.trim_start_matches('@').to_string();
        }

        let mut pkg = String::new();
        if let Some(stripped) = rest.strip_prefix("//") {
            relative = false;
            match stripped.find(':') {
                Some(end) => {
                    pkg = stripped[..end].to_string();
                    rest = &stripped[end..];
                }
                None => {
                    pkg = stripped.to_string();
                    rest = "";
                }
            }
            if !PKG_RE.is_match(&pkg) {
                return Err(JvmDepsError::label_parse(input, "invalid package path"));
            }
        }

        if rest == ":" {
            return Err(JvmDepsError::label_parse(input, "empty target name"));
        }
        let mut name = rest.strip_prefix(':').unwrap_or(rest).to_string();
        if name.is_empty() {
            name = pkg.rsplit('/').next().unwrap_or_default().to_string();
        }
        if name.is_empty() || !NAME_RE.is_match(&name) {
            return Err(JvmDepsError::label_parse(input, "invalid target name"));
        }

        Ok(Self {
            repo,
            pkg,
            name,
            relative,
        })
    }

    /// Resolves a relative label against the repository and package it was
    /// written in. Absolute labels are returned unchanged.
    pub fn abs(&self, repo: &str, pkg: &str) -> Self {
        if !self.relative {
            return self.clone();
        }
        Self::new(repo, pkg, self.name.clone())
    }

    /// Rewrites the label into the shortest form usable from `from`: relative
    /// when both live in the same package of the current repository, otherwise
    /// repository-relative when the repository is the current one.
    pub fn simplify(&self, current_repo: &str, from: &Label) -> Self {
        let mut out = self.clone();
        if out.repo == current_repo || out.repo.is_empty() {
            if out.pkg == from.pkg {
                out.relative = true;
            } else {
                out.repo.clear();
            }
        }
        out
    }

    /// The `//pkg:__pkg__` visibility spec for this label's package.
    pub fn package_visibility(&self) -> Self {
        Self::new("", self.pkg.clone(), "__pkg__")
    }

    /// The `//:__subpackages__` visibility spec.
    pub fn subpackages_visibility() -> Self {
        Self::new("", "", "__subpackages__")
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.relative {
            return write!(f, ":{}", self.name);
        }
        if !self.repo.is_empty() {
            if self.pkg.is_empty() && self.name == self.repo {
                return write!(f, "@{}", self.repo);
            }
            write!(f, "@{}", self.repo)?;
        }
        let last_segment = self.pkg.rsplit('/').next().unwrap_or_default();
        if !self.pkg.is_empty() && last_segment == self.name {
            write!(f, "//{}", self.pkg)
        } else {
            write!(f, "//{}:{}", self.pkg, self.name)
        }
    }
}

impl FromStr for Label {
    type Err = JvmDepsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// Relative labels sort before absolute ones; `/` sorts before `:` otherwise.
impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .relative
            .cmp(&self.relative)
            .then_with(|| self.to_string().cmp(&other.to_string()))
            .then_with(|| self.repo.cmp(&other.repo))
            .then_with(|| self.pkg.cmp(&other.pkg))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Label::parse(&raw).map_err(serde::de::Error::custom)
    }
}
