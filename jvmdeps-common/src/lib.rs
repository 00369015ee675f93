// jvmdeps-common/src/lib.rs
pub mod config;
pub mod error;
pub mod label;
pub mod model;
pub mod naming;

// Re-export key types
pub use config::Config;
pub use error::{JvmDepsError, Result};
pub use label::Label;
pub use model::{ArtifactCoordinate, ExportRule, Language, ParsedUnit, ResolveInput};
pub use naming::{ClassName, Import, PackageName};
