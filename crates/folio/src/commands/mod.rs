//! The folio subcommands.
//!
//! Each module owns one command and exposes a `register` function adding it
//! to a [`CommandRegistry`](folio_dispatch::CommandRegistry).

pub mod build;
pub mod clean;
pub mod doctor;
