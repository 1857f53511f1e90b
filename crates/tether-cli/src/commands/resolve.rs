//! Handler for `tether resolve`.

use miette::Result;
use tether_ops::ops_resolve::{self, ResolveOptions};
use tether_ops::Session;
use tether_util::status::{self, Status};

pub fn exec(session: &mut Session, module: &str, json: bool, conflicts: bool) -> Result<()> {
    let opts = ResolveOptions { json, conflicts };
    if !json {
        status::emit(Status::Action, "Resolving", module);
    }

    let report = ops_resolve::resolve(session, module)?;
    print!("{}", ops_resolve::render(&report, &opts)?);
    if opts.json {
        println!();
        return Ok(());
    }

    if !report.conflicts.is_empty() && !conflicts {
        status::emit(
            Status::Warn,
            "Conflicts",
            &format!(
                "{} uses conflict(s) were worked around; rerun with --conflicts to list them",
                report.conflicts.len()
            ),
        );
    }
    status::emit(Status::Action, "Resolved", &format!("{module} ({})", report.stats));
    Ok(())
}
