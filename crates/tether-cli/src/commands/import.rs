//! Handler for `tether import`.

use miette::Result;
use tether_ops::ops_import;
use tether_ops::Session;
use tether_util::status::{self, Status};

pub fn exec(session: &mut Session, importer: &str, package: &str) -> Result<()> {
    let wire = ops_import::import(session, importer, package)?;
    status::emit(Status::Action, "Wired", &wire.to_string());
    println!("{wire}");
    Ok(())
}
