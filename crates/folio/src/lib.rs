//! folio: a small static site builder.
//!
//! The binary is a thin wrapper around [`program`]; everything that a test
//! needs to drive the CLI lives here.

pub mod commands;
pub mod site;

use folio_dispatch::{CommandRegistry, Program};

pub use site::StaticSite;

/// Every folio command, in the order they appear in help output.
pub fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    commands::build::register(&mut registry);
    commands::clean::register(&mut registry);
    commands::doctor::register(&mut registry);
    registry
}

/// The folio program, logging to the terminal.
pub fn program() -> Program {
    Program::new("folio", env!("CARGO_PKG_VERSION"), registry())
        .about("folio is a blog-aware, static site generator")
}
