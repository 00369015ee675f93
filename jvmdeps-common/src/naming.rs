// jvmdeps-common/src/naming.rs
//! Dotted package names, fully-qualified class names and raw import strings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{JvmDepsError, Result};

/// A dot-separated package name such as `com.example.util`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageName {
    pub name: String,
}

impl PackageName {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// True when `prefix` names this package or one of its ancestors, matching
    /// whole segments only (`kotlin` covers `kotlin.collections`, not `kotlinx`).
    pub fn has_prefix(&self, prefix: &PackageName) -> bool {
        self.name == prefix.name
            || self
                .name
                .strip_prefix(prefix.name.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for PackageName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

fn starts_uppercase(segment: &str) -> bool {
    segment.chars().next().is_some_and(char::is_uppercase)
}

/// A fully-qualified class name split into its package, the outermost class and
/// any nested classes, e.g. `com.example.Outer.Inner`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassName {
    package_name: PackageName,
    bare_outer_class_name: String,
    inner_class_names: Vec<String>,
}

impl ClassName {
    pub fn new(package_name: PackageName, bare_outer_class_name: impl Into<String>) -> Self {
        Self {
            package_name,
            bare_outer_class_name: bare_outer_class_name.into(),
            inner_class_names: Vec::new(),
        }
    }

    /// Splits a fully-qualified name. Scanning from the right, the maximal run
    /// of capitalized segments is the class chain; the rest is the package.
    pub fn parse(fully_qualified: &str) -> Result<Self> {
        if fully_qualified.is_empty() {
            return Err(JvmDepsError::ParseError(
                "class name",
                "empty class name".to_string(),
            ));
        }
        let parts: Vec<&str> = fully_qualified.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(JvmDepsError::ParseError(
                "class name",
                format!("empty segment in {fully_qualified:?}"),
            ));
        }

        let mut outer = parts.len() - 1;
        for i in (0..parts.len()).rev() {
            if starts_uppercase(parts[i]) {
                outer = i;
            } else {
                break;
            }
        }

        Ok(Self {
            package_name: PackageName::new(parts[..outer].join(".")),
            bare_outer_class_name: parts[outer].to_string(),
            inner_class_names: parts[outer + 1..].iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn package_name(&self) -> &PackageName {
        &self.package_name
    }

    pub fn bare_outer_class_name(&self) -> &str {
        &self.bare_outer_class_name
    }

    pub fn inner_class_names(&self) -> &[String] {
        &self.inner_class_names
    }

    pub fn fully_qualified_class_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(2 + self.inner_class_names.len());
        if !self.package_name.is_empty() {
            parts.push(self.package_name.as_str());
        }
        parts.push(&self.bare_outer_class_name);
        parts.extend(self.inner_class_names.iter().map(String::as_str));
        parts.join(".")
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fully_qualified_class_name())
    }
}

impl PartialOrd for ClassName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.fully_qualified_class_name()
            .cmp(&other.fully_qualified_class_name())
    }
}

/// A raw import split at the class-name boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub package: PackageName,
    pub classes: Vec<String>,
}

const TESTONLY_MARKER: &str = "_TESTONLY";

impl Import {
    /// Package segments are lower-case by convention, so the package ends at the
    /// first capitalized segment. `$` is dropped and a trailing `.*` ignored.
    pub fn parse(raw: &str) -> Self {
        let cleaned = raw.replace('$', "");
        let cleaned = cleaned.strip_suffix(".*").unwrap_or(&cleaned);

        let parts: Vec<&str> = cleaned.split('.').collect();
        let boundary = parts
            .iter()
            .position(|part| {
                starts_uppercase(part)
                    || (part.starts_with('_') && !part.starts_with(TESTONLY_MARKER))
            })
            .unwrap_or(parts.len());

        Self {
            package: PackageName::new(parts[..boundary].join(".")),
            classes: parts[boundary..].iter().map(|s| s.to_string()).collect(),
        }
    }
}
