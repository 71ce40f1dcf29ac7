//! The top-level clap program built from a registry.
//!
//! [`Program`] turns a [`CommandRegistry`] into a clap command tree, parses
//! arguments, and routes the chosen subcommand through the
//! [`GracefulDispatcher`]. Its [`run`](Program::run) result is meant to be
//! returned straight from `main`:
//!
//! ```rust,no_run
//! use std::process::ExitCode;
//! use folio_dispatch::{CommandRegistry, Program};
//!
//! fn main() -> ExitCode {
//!     let registry = CommandRegistry::new();
//!     Program::new("folio", env!("CARGO_PKG_VERSION"), registry).run()
//! }
//! ```

use std::collections::HashSet;
use std::ffi::OsString;
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;

use crate::config::{ConfigBuilder, Options, OptionsOverride};
use crate::error::DispatchError;
use crate::graceful::{GracefulDispatcher, Invocation};
use crate::logger::{LogLevel, Logger, TerminalLogger};
use crate::options::OptionSchema;
use crate::registry::CommandRegistry;

/// Exit status for command line usage errors.
pub const USAGE_ERROR: u8 = 2;

/// A CLI program: the registered commands plus the machinery to run them.
#[derive(Debug)]
pub struct Program {
    name: String,
    version: String,
    about: Option<String>,
    registry: CommandRegistry,
    schema: OptionSchema,
    dispatcher: GracefulDispatcher,
}

impl Program {
    /// Creates a program that logs to the terminal and resolves
    /// configuration with the default layered resolver.
    pub fn new(name: impl Into<String>, version: impl Into<String>, registry: CommandRegistry) -> Self {
        let name = name.into();
        let version = version.into();
        let dispatcher = GracefulDispatcher::new(
            name.clone(),
            version.clone(),
            Rc::new(TerminalLogger::new()),
            ConfigBuilder::default(),
        );
        Self {
            name,
            version,
            about: None,
            registry,
            schema: OptionSchema::build_options(),
            dispatcher,
        }
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn with_logger(mut self, logger: Rc<dyn Logger>) -> Self {
        self.dispatcher = self.dispatcher.with_logger(logger);
        self
    }

    pub fn with_config(mut self, config: ConfigBuilder) -> Self {
        self.dispatcher = self.dispatcher.with_config(config);
        self
    }

    /// Replaces the options given to build-style commands.
    pub fn with_schema(mut self, schema: OptionSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The clap command tree: one subcommand per variant, in registration
    /// order, plus the global `--trace` flag.
    ///
    /// A variant whose name was already taken by an earlier variant (as name
    /// or alias) is left out, and so are aliases already taken, so the CLI
    /// resolves names like [`CommandRegistry::get`].
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(self.name.clone())
            .version(self.version.clone())
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                Arg::new("trace")
                    .short('t')
                    .long("trace")
                    .global(true)
                    .action(ArgAction::SetTrue)
                    .help("Show the full backtrace when an error occurs."),
            );
        if let Some(about) = &self.about {
            cmd = cmd.about(about.clone());
        }

        let mut taken: HashSet<&str> = HashSet::new();
        for variant in &self.registry {
            if taken.contains(variant.name()) {
                tracing::debug!(command = variant.name(), "shadowed by an earlier command");
                continue;
            }
            taken.insert(variant.name());

            let aliases: Vec<&str> = variant
                .aliases()
                .iter()
                .map(String::as_str)
                .filter(|alias| taken.insert(*alias))
                .collect();

            cmd = cmd.subcommand(variant.clap_command_with_aliases(&self.schema, &aliases));
        }
        cmd
    }

    /// Runs with the process arguments.
    pub fn run(&self) -> ExitCode {
        self.run_from(std::env::args_os())
    }

    /// Runs with the given arguments (program name first).
    pub fn run_from<I, T>(&self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.command().try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(err) => {
                let _ = err.print();
                return match err.exit_code() {
                    0 => ExitCode::SUCCESS,
                    _ => ExitCode::from(USAGE_ERROR),
                };
            }
        };

        match self.dispatch_matches(&matches) {
            Ok(()) => ExitCode::SUCCESS,
            Err(DispatchError::Traced(err)) => {
                eprintln!("Error: {:?}", err);
                ExitCode::FAILURE
            }
            Err(err) => err.exit_code(),
        }
    }

    /// Routes parsed arguments to the matching variant.
    pub fn dispatch_matches(&self, matches: &ArgMatches) -> Result<(), DispatchError> {
        let Some((name, sub)) = matches.subcommand() else {
            return Ok(());
        };
        let Some(variant) = self.registry.get(name) else {
            tracing::warn!(command = name, "no registered variant for subcommand");
            return Ok(());
        };

        let overrides = if variant.uses_build_options() {
            self.schema.overrides_from(sub)
        } else {
            OptionsOverride::new()
        };
        self.adjust_level(&overrides);

        let invocation = Invocation::new(variant.name()).with_trace(sub.get_flag("trace"));
        tracing::debug!(command = %invocation.name, trace = invocation.trace, "dispatching");

        let options = Options::from(overrides);
        self.dispatcher.dispatch(&invocation, &options, &[variant])
    }

    fn adjust_level(&self, overrides: &OptionsOverride) {
        let enabled = |key| matches!(overrides.get(key), Some(Value::Bool(true)));
        if enabled("quiet") {
            self.dispatcher.logger().set_level(LogLevel::Error);
        } else if enabled("verbose") {
            self.dispatcher.logger().set_level(LogLevel::Debug);
        }
    }
}
