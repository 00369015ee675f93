use clap::Args;
use jvmdeps_common::error::Result;
use jvmdeps_common::Config;
use jvmdeps_core::MavenResolver;

/// Print the package to artifact index built from the Maven install file.
#[derive(Args, Debug)]
pub struct DumpManifest;

impl DumpManifest {
    pub fn run(&self, config: &Config) -> Result<()> {
        let maven = MavenResolver::new(&config.maven_install_file);
        println!("{}", serde_json::to_string_pretty(&maven.dump_manifest())?);
        Ok(())
    }
}
