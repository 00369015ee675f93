// jvmdeps-common/src/model/mod.rs
// Declares the modules within the model directory.
pub mod coordinate;
pub mod rule;
pub mod unit;

// Re-export
pub use coordinate::ArtifactCoordinate;
pub use rule::{ExportRule, Language};
pub use unit::{ParsedUnit, ResolveInput};
