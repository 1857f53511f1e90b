//! Shared utilities for the tether workspace.
//!
//! Cross-cutting concerns used by the other tether crates: the unified
//! application error type and Cargo-style terminal status lines.

pub mod errors;
pub mod status;
