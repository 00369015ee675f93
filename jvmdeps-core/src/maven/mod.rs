// jvmdeps-core/src/maven/mod.rs
pub mod manifest;
pub mod multiset;
pub mod resolver;

pub use manifest::{MavenInstallFile, ManifestSchema};
pub use multiset::ArtifactMultiset;
pub use resolver::MavenResolver;
