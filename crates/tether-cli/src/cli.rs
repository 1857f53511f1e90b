//! CLI argument definitions for Tether.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "tether",
    version,
    about = "Resolve module wirings",
    long_about = "Tether wires modules to the packages and modules they depend on, \
                  honouring version ranges, attributes, singletons and uses constraints."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.tether/config.toml)
    #[arg(long, global = true, env = "TETHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Universe file describing the modules
    #[arg(short, long, global = true, default_value = "universe.toml")]
    pub universe: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a module and print the wires it needs
    Resolve {
        /// Module id
        module: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Also list uses conflicts met during the search
        #[arg(long)]
        conflicts: bool,
    },

    /// Display the wire tree of a module
    Tree {
        /// Module id
        module: String,
        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<u32>,
        /// Show why a module is wired in
        #[arg(long)]
        why: Option<String>,
        /// Show the modules wired to this one
        #[arg(short, long)]
        inverted: bool,
    },

    /// Dynamically import a package into a module
    Import {
        /// Importing module id
        importer: String,
        /// Package to import
        package: String,
    },
}

/// Parse command-line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
