//! Supervised execution of command variants.
//!
//! [`GracefulDispatcher::dispatch`] runs the `process` capability of each
//! given variant in order, stopping at the first failure. What happens next
//! depends on the invocation's trace setting:
//!
//! - trace on: the original failure comes back unchanged as
//!   [`DispatchError::Traced`]
//! - trace off: three error lines suggesting `--trace` are logged, the logger
//!   aborts, and the resulting [`Halt`] comes back as [`DispatchError::Halt`]
//!
//! A failure that already is a [`Halt`] (for example a fatal site failure
//! that was reported by [`process_site`](crate::process_site)) passes through
//! untouched in both modes.

use std::fmt;
use std::rc::Rc;

use crate::command::CommandContext;
use crate::config::{ConfigBuilder, Options};
use crate::error::{DispatchError, Halt};
use crate::logger::Logger;
use crate::registry::CommandVariant;

/// Which command the user ran, and how failures should be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Name of the command, as shown in the failure message.
    pub name: String,
    /// When set, failures are re-raised instead of summarized.
    pub trace: bool,
}

impl Invocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trace: false,
        }
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

/// Runs command variants and turns their failures into user-facing output.
pub struct GracefulDispatcher {
    program: String,
    version: String,
    logger: Rc<dyn Logger>,
    config: ConfigBuilder,
}

impl GracefulDispatcher {
    /// `program` and `version` appear in the failure message.
    pub fn new(
        program: impl Into<String>,
        version: impl Into<String>,
        logger: Rc<dyn Logger>,
        config: ConfigBuilder,
    ) -> Self {
        Self {
            program: program.into(),
            version: version.into(),
            logger,
            config,
        }
    }

    pub fn with_logger(mut self, logger: Rc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_config(mut self, config: ConfigBuilder) -> Self {
        self.config = config;
        self
    }

    pub fn logger(&self) -> &dyn Logger {
        &*self.logger
    }

    pub fn config(&self) -> &ConfigBuilder {
        &self.config
    }

    /// Runs each variant's `process` with `options`, in order.
    ///
    /// Variants without a process capability are skipped. Nothing runs after
    /// the first failure.
    pub fn dispatch(
        &self,
        invocation: &Invocation,
        options: &Options,
        variants: &[&CommandVariant],
    ) -> Result<(), DispatchError> {
        let ctx = CommandContext::new(invocation, &*self.logger, &self.config);

        for variant in variants {
            let Some(process) = variant.processor() else {
                tracing::trace!(command = variant.name(), "no process capability, skipping");
                continue;
            };

            tracing::debug!(command = variant.name(), "processing");
            if let Err(err) = process.process(options, &ctx) {
                return Err(self.handle_failure(invocation, err));
            }
        }

        Ok(())
    }

    fn handle_failure(&self, invocation: &Invocation, err: anyhow::Error) -> DispatchError {
        if let Some(halt) = err.downcast_ref::<Halt>() {
            return DispatchError::Halt(*halt);
        }

        if invocation.trace {
            return DispatchError::Traced(err);
        }

        tracing::debug!(command = %invocation.name, error = ?err, "command failed");
        DispatchError::Halt(report_failure(
            &*self.logger,
            &self.program,
            &self.version,
            &invocation.name,
        ))
    }
}

impl fmt::Debug for GracefulDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GracefulDispatcher")
            .field("program", &self.program)
            .field("version", &self.version)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Logs the `--trace` suggestion for `command` and aborts.
///
/// ```text
///                     ------------------------------------------------
///       folio 0.4.0  Please append `--trace` to the `build` command
///                     for any additional information or backtrace.
///                     ------------------------------------------------
/// ```
///
/// The first three lines are errors; the last is the abort line.
pub fn report_failure(logger: &dyn Logger, program: &str, version: &str, command: &str) -> Halt {
    let msg = format!(" Please append `--trace` to the `{}` command ", command);
    let dashes = "-".repeat(msg.chars().count());

    logger.error("", &dashes);
    logger.error(&format!("{} {} ", program, version), &msg);
    logger.error("", " for any additional information or backtrace. ");
    logger.abort_with("", &dashes)
}
