//! Error and termination types.
//!
//! Command bodies return [`anyhow::Result`], the same way the handlers of a
//! clap dispatcher do. The types here cover the three places where the core
//! owns the failure:
//!
//! - [`ConfigError`]: the layered configuration resolver failed
//! - [`ProcessError`]: a [`Site`](crate::Site) could not be processed
//! - [`Halt`] / [`DispatchError`]: the process has to stop
//!
//! # Termination
//!
//! Nothing in this crate calls `std::process::exit`. Where the build tool must
//! terminate, a [`Halt`] value is returned instead. It has already been
//! reported to the user by the time it exists; the binary's `main` turns it
//! into an [`ExitCode`] and returns.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Error raised while resolving a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("could not read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file named on the command line does not exist.
    #[error("configuration file {} does not exist", .0.display())]
    MissingFile(PathBuf),

    /// A YAML configuration file is malformed.
    #[error("invalid YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A TOML configuration file is malformed.
    #[error("invalid TOML in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The file extension is neither YAML nor TOML.
    #[error("unsupported configuration format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The file parsed, but its top level is not a mapping.
    #[error("configuration file {} must contain a mapping", .0.display())]
    NotAMapping(PathBuf),

    /// A merged value failed validation.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Failure raised by a [`Site`](crate::Site) while processing.
///
/// The distinction matters to [`process_site`](crate::process_site): a
/// `Fatal` failure is reported and turned into exit status 1, anything else is
/// handed back to the caller untouched.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The build cannot produce output.
    #[error("{message}")]
    Fatal { message: String },

    /// Any other failure.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl ProcessError {
    /// Creates a fatal processing failure.
    pub fn fatal(message: impl Into<String>) -> Self {
        ProcessError::Fatal {
            message: message.into(),
        }
    }

    /// Returns true if this is a fatal processing failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProcessError::Fatal { .. })
    }
}

/// Why the process is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// A fatal site failure was reported.
    Exit,
    /// A logger aborted after reporting a command failure.
    Abort,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::Exit => write!(f, "exit"),
            HaltReason::Abort => write!(f, "abort"),
        }
    }
}

/// A request to terminate the process with a status code.
///
/// `Halt` implements [`std::error::Error`] so it can travel through
/// `anyhow::Error` from deep inside a command body up to the dispatcher,
/// which recognizes it and lets it pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{reason} with status {status}")]
pub struct Halt {
    pub status: u8,
    pub reason: HaltReason,
}

impl Halt {
    /// Plain exit with the given status.
    pub fn exit(status: u8) -> Self {
        Self {
            status,
            reason: HaltReason::Exit,
        }
    }

    /// Abort: always status 1.
    pub fn abort() -> Self {
        Self {
            status: 1,
            reason: HaltReason::Abort,
        }
    }

    /// Converts the status into an [`ExitCode`] for `main`.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status)
    }
}

/// Outcome of a failed dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The failure was reported; stop with this status.
    #[error(transparent)]
    Halt(#[from] Halt),

    /// Trace mode was on: the original failure, unchanged.
    #[error(transparent)]
    Traced(anyhow::Error),
}

impl DispatchError {
    /// Status code the process should stop with.
    pub fn status(&self) -> u8 {
        match self {
            DispatchError::Halt(halt) => halt.status,
            DispatchError::Traced(_) => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }

    /// Returns the original failure when trace mode propagated it.
    pub fn traced(&self) -> Option<&anyhow::Error> {
        match self {
            DispatchError::Traced(err) => Some(err),
            DispatchError::Halt(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingFile(PathBuf::from("site/_config.yml"));
        assert_eq!(
            err.to_string(),
            "configuration file site/_config.yml does not exist"
        );

        let err = ConfigError::InvalidValue {
            key: "limit_posts".into(),
            reason: "must be a non-negative integer".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for 'limit_posts': must be a non-negative integer"
        );
    }

    #[test]
    fn test_process_error_fatal() {
        let err = ProcessError::fatal("bad layout");
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "bad layout");
    }

    #[test]
    fn test_process_error_from_anyhow() {
        let err: ProcessError = anyhow::anyhow!("disk full").into();
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_halt_constructors() {
        assert_eq!(Halt::exit(1).status, 1);
        assert_eq!(Halt::exit(1).reason, HaltReason::Exit);
        assert_eq!(Halt::abort().status, 1);
        assert_eq!(Halt::abort().reason, HaltReason::Abort);
        assert_eq!(Halt::abort().to_string(), "abort with status 1");
    }

    #[test]
    fn test_halt_survives_anyhow() {
        let err = anyhow::Error::new(Halt::exit(1));
        assert_eq!(err.downcast_ref::<Halt>(), Some(&Halt::exit(1)));
    }

    #[test]
    fn test_dispatch_error_status() {
        let err = DispatchError::from(Halt::exit(3));
        assert_eq!(err.status(), 3);
        assert!(err.traced().is_none());

        let err = DispatchError::Traced(anyhow::anyhow!("boom"));
        assert_eq!(err.status(), 1);
        assert_eq!(err.traced().map(|e| e.to_string()), Some("boom".into()));
    }
}
