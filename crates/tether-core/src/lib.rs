//! Core data types for tether.
//!
//! This crate defines the abstract model the resolution engine works on:
//! modules with their requirements and capabilities, resolved packages,
//! wires, and the [`state::ResolverState`] query interface. It also ships a
//! reference in-memory [`registry::ModuleRegistry`], the global
//! configuration, and the TOML universe format used by the CLI.
//!
//! This crate is intentionally free of resolution logic and network I/O.

pub mod capability;
pub mod config;
pub mod module;
pub mod package;
pub mod registry;
pub mod requirement;
pub mod state;
pub mod universe;
pub mod wire;

pub use capability::{Capability, Namespace};
pub use module::{Module, ModuleBuilder, ModuleId, NativeLibrary};
pub use package::{ImportOrigin, PackageSpace, ResolvedPackage};
pub use registry::ModuleRegistry;
pub use requirement::{Requirement, Visibility};
pub use state::ResolverState;
pub use wire::{Wire, WireMap};
