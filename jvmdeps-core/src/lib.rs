// jvmdeps-core/src/lib.rs

// Declare the top-level modules within the library crate
pub mod export_index;
pub mod maven;
pub mod resolve;
pub mod workspace;

// Re-export key types for easier use by the CLI crate
pub use export_index::{ExportConflict, ExportIndex, ExportIndexBuilder, JavaExportRecord};
pub use maven::MavenResolver;
pub use resolve::{ImportResolver, InMemoryRuleIndex, ResolutionCache, ResolutionContext, RuleIndex};
pub use workspace::{run_workspace, ResolvedRule, RuleSpec, WorkspaceSpec};
