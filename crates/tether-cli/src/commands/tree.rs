//! Handler for `tether tree`.

use miette::Result;
use tether_ops::ops_tree::{self, TreeOptions};
use tether_ops::Session;

pub fn exec(
    session: &mut Session,
    module: &str,
    depth: Option<u32>,
    why: Option<String>,
    inverted: bool,
) -> Result<()> {
    let opts = TreeOptions {
        depth: depth.map(|d| d as usize),
        why,
        inverted,
    };
    let output = ops_tree::tree(session, module, &opts)?;
    print!("{output}");
    Ok(())
}
