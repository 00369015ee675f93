use std::path::PathBuf;

use clap::Args;
use jvmdeps_common::error::Result;
use jvmdeps_common::Config;
use jvmdeps_core::{run_workspace, MavenResolver, WorkspaceSpec};
use tracing::debug;

/// Resolve the imports of every rule in a workspace description.
#[derive(Args, Debug)]
pub struct Resolve {
    /// JSON file listing the generated rules and export rules
    pub workspace: PathBuf,
}

impl Resolve {
    pub fn run(&self, config: &Config) -> Result<()> {
        debug!("Resolving workspace {}", self.workspace.display());
        let spec = WorkspaceSpec::load(&self.workspace)?;
        let maven = MavenResolver::new(&config.maven_install_file);
        let resolved = run_workspace(config, &spec, &maven)?;
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        Ok(())
    }
}
