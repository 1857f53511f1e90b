//! Operation: dynamically import a package into a resolved module.

use tether_core::Wire;
use tether_util::errors::{TetherError, TetherResult};

use crate::session::Session;

/// Wire `package` into `importer` through one of its dynamic imports.
///
/// An unresolved importer is resolved and committed first. On success the
/// provider's new wires are committed and the dynamic wire is attached to
/// the importer.
pub fn import(session: &mut Session, importer: &str, package: &str) -> TetherResult<Wire> {
    let id = session.module_id(importer)?;
    session.resolve_and_commit(&id)?;

    let Some(found) = session
        .resolver()
        .resolve_dynamic(session.registry(), &id, package)
    else {
        return Err(TetherError::Resolution {
            message: format!("No provider of {package} can be dynamically wired into {id}"),
        }
        .into());
    };

    let registry = session.registry_mut();
    let committed = registry.commit(found.wires);
    registry.attach_wire(found.wire.clone());
    tracing::info!("Dynamically wired {} ({committed} provider module(s) committed)", found.wire);
    Ok(found.wire)
}
