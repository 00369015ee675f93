// jvmdeps-common/src/config.rs
use std::collections::{BTreeMap, HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::error::{JvmDepsError, Result};
use crate::label::Label;
use crate::model::coordinate::label_from_artifact;
use crate::naming::PackageName;

const DEFAULT_CONFIG_FILENAME: &str = "jvmdeps.toml";
const DEFAULT_MAVEN_INSTALL_FILE: &str = "maven_install.json";
const DEFAULT_MAVEN_REPOSITORY_NAME: &str = "maven";

/// On-disk shape of `jvmdeps.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    repo_name: Option<String>,
    maven_install_file: Option<PathBuf>,
    maven_repository_name: Option<String>,
    resolve_to_java_exports: Option<bool>,
    #[serde(default)]
    exclude_artifacts: Vec<String>,
    #[serde(default)]
    resolve: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the repository being generated; labels in it are shortened.
    pub repo_name: String,
    pub maven_install_file: PathBuf,
    pub maven_repository_name: String,
    pub resolve_to_java_exports: bool,
    /// Excluded artifacts in label form, e.g. `@maven//:com_google_guava_guava`.
    excluded_artifacts: HashSet<String>,
    overrides: HashMap<PackageName, Label>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_name: String::new(),
            maven_install_file: PathBuf::from(DEFAULT_MAVEN_INSTALL_FILE),
            maven_repository_name: DEFAULT_MAVEN_REPOSITORY_NAME.to_string(),
            resolve_to_java_exports: true,
            excluded_artifacts: HashSet::new(),
            overrides: HashMap::new(),
        }
    }
}

impl Config {
    /// Loads the configuration from `path`, or from `jvmdeps.toml` in the
    /// working directory when it exists, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        debug!("Loading jvmdeps configuration");

        let mut config = Self::default();
        let mut exclusions = Vec::new();
        let config_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILENAME)).filter(|p| p.is_file()),
        };

        if let Some(config_path) = config_path {
            debug!("Reading configuration file {}", config_path.display());
            let raw = fs::read_to_string(&config_path).map_err(|e| {
                JvmDepsError::Config(format!(
                    "could not read {}: {e}",
                    config_path.display()
                ))
            })?;
            let mut file: ConfigFile = toml::from_str(&raw)?;
            exclusions = std::mem::take(&mut file.exclude_artifacts);
            let base_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
            config.apply_file(file, base_dir)?;
        } else {
            debug!(
                "No {} found, using default configuration",
                DEFAULT_CONFIG_FILENAME
            );
        }

        if let Ok(repo_name) = env::var("JVMDEPS_REPO_NAME") {
            config.repo_name = repo_name;
        }
        if let Some(install_file) = env::var("JVMDEPS_MAVEN_INSTALL_FILE")
            .ok()
            .filter(|s| !s.is_empty())
        {
            config.maven_install_file = PathBuf::from(install_file);
        }
        if let Some(repository) = env::var("JVMDEPS_MAVEN_REPOSITORY")
            .ok()
            .filter(|s| !s.is_empty())
        {
            config.maven_repository_name = repository;
        }
        // Artifact-form exclusions take the final repository name.
        for artifact in &exclusions {
            config.add_excluded_artifact(artifact)?;
        }

        debug!(
            "Configuration loaded: repo_name={:?}, maven_install_file={}, maven_repository_name={}",
            config.repo_name,
            config.maven_install_file.display(),
            config.maven_repository_name
        );
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile, base_dir: &Path) -> Result<()> {
        if let Some(repo_name) = file.repo_name {
            self.repo_name = repo_name;
        }
        if let Some(install_file) = file.maven_install_file {
            self.maven_install_file = base_dir.join(install_file);
        }
        if let Some(repository) = file.maven_repository_name {
            self.maven_repository_name = repository;
        }
        if let Some(resolve_to_java_exports) = file.resolve_to_java_exports {
            self.resolve_to_java_exports = resolve_to_java_exports;
        }
        for (package, label) in &file.resolve {
            self.add_override(package, label)?;
        }
        Ok(())
    }

    /// Accepts either a label (`@maven//:x_y`) or an artifact string
    /// (`group:artifact`).
    pub fn add_excluded_artifact(&mut self, artifact: &str) -> Result<()> {
        let label = if artifact.starts_with('@') || artifact.starts_with("//") {
            Label::parse(artifact)
                .map_err(|e| JvmDepsError::Config(format!("invalid excluded artifact: {e}")))?
        } else {
            label_from_artifact(&self.maven_repository_name, artifact)
        };
        self.excluded_artifacts.insert(label.to_string());
        Ok(())
    }

    pub fn add_override(&mut self, package: &str, label: &str) -> Result<()> {
        let parsed = Label::parse(label).map_err(|e| {
            JvmDepsError::Config(format!("invalid override for package {package}: {e}"))
        })?;
        self.overrides.insert(PackageName::new(package), parsed);
        Ok(())
    }

    pub fn excluded_artifacts(&self) -> &HashSet<String> {
        &self.excluded_artifacts
    }

    pub fn override_for(&self, package: &PackageName) -> Option<&Label> {
        self.overrides.get(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_toml_file_relative_to_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jvmdeps.toml");
        fs::write(
            &path,
            r#"
repo_name = "myrepo"
maven_install_file = "third_party/maven_install.json"
maven_repository_name = "deps"
resolve_to_java_exports = false
exclude_artifacts = ["com.google.j2objc:j2objc-annotations", "@deps//:junit_junit"]

[resolve]
"com.example.generated" = "//generated:lib"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        if env::var("JVMDEPS_REPO_NAME").is_err() {
            assert_eq!(config.repo_name, "myrepo");
        }
        if env::var("JVMDEPS_MAVEN_INSTALL_FILE").is_err() {
            assert_eq!(
                config.maven_install_file,
                dir.path().join("third_party/maven_install.json")
            );
        }
        assert!(!config.resolve_to_java_exports);
        assert!(config
            .excluded_artifacts()
            .contains("@deps//:com_google_j2objc_j2objc_annotations"));
        assert!(config.excluded_artifacts().contains("@deps//:junit_junit"));
        assert_eq!(
            config
                .override_for(&PackageName::new("com.example.generated"))
                .map(ToString::to_string)
                .as_deref(),
            Some("//generated:lib")
        );
    }

    #[test]
    fn artifact_exclusions_follow_the_repository_override() {
        env::set_var("JVMDEPS_MAVEN_REPOSITORY", "deps");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jvmdeps.toml");
        fs::write(&path, "exclude_artifacts = [\"org.split:left\"]\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.maven_repository_name, "deps");
        assert!(config.excluded_artifacts().contains("@deps//:org_split_left"));
        assert!(!config.excluded_artifacts().contains("@maven//:org_split_left"));
    }

    #[test]
    fn malformed_override_is_a_config_error() {
        let mut config = Config::default();
        let err = config.add_override("com.example", "//bad:a:b").unwrap_err();
        assert!(matches!(err, JvmDepsError::Config(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jvmdeps.toml");
        fs::write(&path, "not_a_key = 1\n").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(JvmDepsError::Toml(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(JvmDepsError::Config(_))
        ));
    }
}
