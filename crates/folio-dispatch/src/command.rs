//! Command bodies and the context they run in.
//!
//! A command variant's behaviour is a [`Process`]: it receives the
//! [`Options`] of the invocation plus a [`CommandContext`] and returns an
//! [`anyhow::Result`]. Failures propagate with `?`; the
//! [`GracefulDispatcher`](crate::GracefulDispatcher) decides how they reach
//! the user.
//!
//! Commands that build a site typically:
//!
//! 1. turn the options into a configuration with
//!    [`CommandContext::configuration`]
//! 2. report progress through [`CommandContext::logger`]
//! 3. hand their [`Site`](crate::Site) to [`process_site`](crate::process_site)
//!
//! ```rust
//! use folio_dispatch::{CommandContext, FnProcess, Options, Process};
//!
//! let hello = FnProcess::new(|options: &Options, ctx: &CommandContext<'_>| {
//!     let config = ctx.configuration(options)?;
//!     ctx.logger.info("Source:", &config.source().display().to_string());
//!     Ok(())
//! });
//! # let _ = hello;
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::config::{ConfigBuilder, Configuration, Options};
use crate::error::ConfigError;
use crate::graceful::Invocation;
use crate::logger::{LogLevel, Logger};

/// Environment handed to a [`Process`] for one invocation.
pub struct CommandContext<'a> {
    /// The command the user invoked.
    pub invocation: &'a Invocation,
    /// Where user-facing output goes.
    pub logger: &'a dyn Logger,
    /// Turns options into a configuration.
    pub config: &'a ConfigBuilder,
}

impl<'a> CommandContext<'a> {
    pub fn new(invocation: &'a Invocation, logger: &'a dyn Logger, config: &'a ConfigBuilder) -> Self {
        Self {
            invocation,
            logger,
            config,
        }
    }

    /// Builds the configuration for `options` with `ctx.config`.
    ///
    /// The logger follows the configuration's verbosity: `quiet` limits it
    /// to errors, otherwise `verbose` enables debug lines.
    pub fn configuration<'o>(
        &self,
        options: &'o Options,
    ) -> Result<Cow<'o, Configuration>, ConfigError> {
        let config = self.config.build(options)?;
        if config.is_quiet() {
            self.logger.set_level(LogLevel::Error);
        } else if config.is_verbose() {
            self.logger.set_level(LogLevel::Debug);
        }
        Ok(config)
    }
}

impl fmt::Debug for CommandContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("invocation", self.invocation)
            .finish_non_exhaustive()
    }
}

/// The behaviour of a command variant.
///
/// Takes `&self`: a variant keeps its identity for the life of the process
/// and every invocation brings fresh options.
///
/// # Example
///
/// ```rust
/// use folio_dispatch::{CommandContext, Options, Process};
///
/// struct Clean;
///
/// impl Process for Clean {
///     fn process(&self, options: &Options, ctx: &CommandContext<'_>) -> anyhow::Result<()> {
///         let config = ctx.configuration(options)?;
///         ctx.logger.info("Cleaner:", &format!("{}", config.destination().display()));
///         Ok(())
///     }
/// }
/// ```
pub trait Process {
    fn process(&self, options: &Options, ctx: &CommandContext<'_>) -> anyhow::Result<()>;
}

/// A [`Process`] backed by a closure.
pub struct FnProcess<F> {
    f: F,
}

impl<F> FnProcess<F>
where
    F: Fn(&Options, &CommandContext<'_>) -> anyhow::Result<()>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Process for FnProcess<F>
where
    F: Fn(&Options, &CommandContext<'_>) -> anyhow::Result<()>,
{
    fn process(&self, options: &Options, ctx: &CommandContext<'_>) -> anyhow::Result<()> {
        (self.f)(options, ctx)
    }
}
