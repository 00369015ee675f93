// jvmdeps-core/src/resolve/mod.rs
pub mod cache;
pub mod engine;
pub mod rule_index;
pub mod stdlib;

pub use cache::{ResolutionCache, DEFAULT_CACHE_CAPACITY};
pub use engine::{ImportResolver, ResolutionContext, RuleContext};
pub use rule_index::{InMemoryRuleIndex, RuleIndex};
pub use stdlib::is_stdlib;
