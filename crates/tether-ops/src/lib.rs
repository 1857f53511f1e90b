pub mod ops_import;
pub mod ops_resolve;
pub mod ops_tree;
pub mod session;

pub use session::Session;
