use clap::Args;
use colored::Colorize;
use jvmdeps_common::error::Result;
use jvmdeps_common::{Config, PackageName};
use jvmdeps_core::MavenResolver;

/// Look up which Maven artifact provides a package.
#[derive(Args, Debug)]
pub struct Lookup {
    pub package: String,
}

impl Lookup {
    pub fn run(&self, config: &Config) -> Result<()> {
        let maven = MavenResolver::new(&config.maven_install_file);
        let label = maven.resolve(
            &PackageName::new(self.package.as_str()),
            config.excluded_artifacts(),
            &config.maven_repository_name,
        )?;
        println!("{} {}", self.package.bold(), label.to_string().green());
        Ok(())
    }
}
