//! Command registration, configuration building and supervised dispatch.
//!
//! `folio-dispatch` is the command core of the folio static site builder. It
//! knows nothing about pages or layouts; it provides the pieces every
//! subcommand shares:
//!
//! - **Registry**: [`CommandRegistry`] lists every [`CommandVariant`] in
//!   registration order
//! - **Build options**: [`OptionSchema::build_options`] declares the flags
//!   build-style commands accept and reads back what the user typed
//! - **Configuration**: [`ConfigBuilder`] turns [`Options`] into a
//!   [`Configuration`], returning an already resolved configuration as is
//! - **Site processing**: [`process_site`] runs a [`Site`] and reports fatal
//!   failures
//! - **Graceful dispatch**: [`GracefulDispatcher`] runs commands and, unless
//!   `--trace` was given, replaces a failure with a short hint
//!
//! # Termination
//!
//! Nothing in this crate exits the process. Fatal failures and aborts become
//! a [`Halt`] value that travels back to `main`, which returns its
//! [`ExitCode`](std::process::ExitCode). [`Program::run`] does this for you.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use std::process::ExitCode;
//! use folio_dispatch::{
//!     CommandContext, CommandRegistry, CommandVariant, Options, Program, RecordingLogger,
//! };
//!
//! let mut registry = CommandRegistry::new();
//! registry.register(
//!     CommandVariant::new("build")
//!         .alias("b")
//!         .with_build_options()
//!         .process_fn(|options: &Options, ctx: &CommandContext<'_>| {
//!             let config = ctx.configuration(options)?;
//!             ctx.logger.info("Destination:", &config.destination().display().to_string());
//!             Ok(())
//!         }),
//! );
//!
//! let logger = Rc::new(RecordingLogger::new());
//! let program = Program::new("folio", "0.4.0", registry).with_logger(logger.clone());
//!
//! # let dir = tempfile::tempdir().unwrap();
//! # let source = dir.path().to_str().unwrap();
//! let code = program.run_from(["folio", "build", "--source", source, "-d", "out"]);
//! assert_eq!(code, ExitCode::SUCCESS);
//! assert_eq!(logger.messages(), vec!["out"]);
//! ```

mod command;
mod config;
mod env;
mod error;
mod graceful;
mod logger;
mod options;
mod program;
mod registry;
mod resolve;
mod site;

pub use command::{CommandContext, FnProcess, Process};
pub use config::{ConfigBuilder, ConfigResolver, Configuration, Options, OptionsOverride};
pub use env::{env_var_name, parse_env_value, EnvReader, MockEnv, RealEnv, ENV_PREFIX};
pub use error::{ConfigError, DispatchError, Halt, HaltReason, ProcessError};
pub use graceful::{report_failure, GracefulDispatcher, Invocation};
pub use logger::{
    format_line, LogLevel, LogRecord, Logger, RecordingLogger, TerminalLogger, LABEL_WIDTH,
};
pub use options::{add_build_options, OptionSchema, OptionSpec, ValueKind};
pub use program::{Program, USAGE_ERROR};
pub use registry::{CommandRegistry, CommandVariant};
pub use resolve::{deep_merge, load_file, LayeredResolver, DEFAULT_CONFIG_FILES};
pub use site::{process_site, Site};

// Re-export clap for command-specific arguments.
pub use clap;
