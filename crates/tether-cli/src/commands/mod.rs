//! Command dispatch and handler modules.

mod import;
mod resolve;
mod tree;

use std::path::Path;

use miette::Result;
use tether_ops::Session;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let mut session = load_session(cli.config.as_deref(), &cli.universe)?;
    match cli.command {
        Command::Resolve {
            module,
            json,
            conflicts,
        } => resolve::exec(&mut session, &module, json, conflicts),
        Command::Tree {
            module,
            depth,
            why,
            inverted,
        } => tree::exec(&mut session, &module, depth, why, inverted),
        Command::Import { importer, package } => import::exec(&mut session, &importer, &package),
    }
}

fn load_session(config: Option<&Path>, universe: &Path) -> Result<Session> {
    if !universe.is_file() {
        return Err(tether_util::errors::TetherError::Universe {
            message: format!("Could not find {}", universe.display()),
        }
        .into());
    }
    Session::load(config, universe)
}
