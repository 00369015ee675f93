// jvmdeps/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use jvmdeps_common::error::Result;
use jvmdeps_common::Config;

pub mod dump_manifest;
pub mod lookup;
pub mod resolve;

use crate::cli::dump_manifest::DumpManifest;
use crate::cli::lookup::Lookup;
use crate::cli::resolve::Resolve;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "jvmdeps", bin_name = "jvmdeps")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./jvmdeps.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Resolve(Resolve),
    Lookup(Lookup),
    DumpManifest(DumpManifest),
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Resolve(command) => command.run(config),
            Self::Lookup(command) => command.run(config),
            Self::DumpManifest(command) => command.run(config),
        }
    }
}
