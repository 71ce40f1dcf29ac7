//! Running a site build and reporting fatal failures.

use crate::error::{Halt, ProcessError};
use crate::logger::Logger;

/// Something that can be processed (read, rendered, written) as one build.
pub trait Site {
    fn process(&mut self) -> Result<(), ProcessError>;
}

/// Processes `site` once.
///
/// A fatal failure is reported as three error lines and comes back as a
/// [`Halt`] with status 1 wrapped in the returned error; the caller only has
/// to propagate it. Other failures are returned unchanged and nothing is
/// logged for them here.
///
/// ```rust
/// use folio_dispatch::{process_site, Halt, ProcessError, RecordingLogger, Site};
///
/// struct Broken;
///
/// impl Site for Broken {
///     fn process(&mut self) -> Result<(), ProcessError> {
///         Err(ProcessError::fatal("bad layout"))
///     }
/// }
///
/// let logger = RecordingLogger::new();
/// let err = process_site(&mut Broken, &logger).unwrap_err();
///
/// assert_eq!(err.downcast_ref::<Halt>(), Some(&Halt::exit(1)));
/// assert_eq!(logger.errors().len(), 3);
/// ```
pub fn process_site(site: &mut dyn Site, logger: &dyn Logger) -> anyhow::Result<()> {
    match site.process() {
        Ok(()) => Ok(()),
        Err(ProcessError::Fatal { message }) => {
            tracing::debug!(%message, "fatal site failure");
            logger.error("ERROR:", "YOUR SITE COULD NOT BE BUILT:");
            logger.error("", "------------------------------------");
            logger.error("", &message);
            Err(Halt::exit(1).into())
        }
        Err(ProcessError::Failed(err)) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{LogLevel, RecordingLogger};

    struct Scripted {
        calls: u32,
        outcome: Option<ProcessError>,
    }

    impl Scripted {
        fn new(outcome: Option<ProcessError>) -> Self {
            Self { calls: 0, outcome }
        }
    }

    impl Site for Scripted {
        fn process(&mut self) -> Result<(), ProcessError> {
            self.calls += 1;
            match self.outcome.take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn test_success_logs_nothing() {
        let logger = RecordingLogger::new();
        let mut site = Scripted::new(None);

        process_site(&mut site, &logger).unwrap();

        assert_eq!(site.calls, 1);
        assert!(logger.is_empty());
    }

    #[test]
    fn test_fatal_failure_reports_and_exits() {
        let logger = RecordingLogger::new();
        let mut site = Scripted::new(Some(ProcessError::fatal("bad layout")));

        let err = process_site(&mut site, &logger).unwrap_err();

        assert_eq!(site.calls, 1);
        assert_eq!(err.downcast_ref::<Halt>(), Some(&Halt::exit(1)));

        let lines: Vec<_> = logger
            .at_level(LogLevel::Error)
            .into_iter()
            .map(|r| (r.label, r.message))
            .collect();
        assert_eq!(
            lines,
            vec![
                ("ERROR:".to_string(), "YOUR SITE COULD NOT BE BUILT:".to_string()),
                ("".to_string(), "------------------------------------".to_string()),
                ("".to_string(), "bad layout".to_string()),
            ]
        );
        assert!(logger.aborts().is_empty());
    }

    #[test]
    fn test_other_failure_propagates_unchanged() {
        let logger = RecordingLogger::new();
        let mut site = Scripted::new(Some(ProcessError::Failed(anyhow::anyhow!("disk full"))));

        let err = process_site(&mut site, &logger).unwrap_err();

        assert_eq!(err.to_string(), "disk full");
        assert!(err.downcast_ref::<Halt>().is_none());
        assert!(logger.is_empty());
    }

    #[test]
    fn test_empty_fatal_message() {
        let logger = RecordingLogger::new();
        let mut site = Scripted::new(Some(ProcessError::fatal("")));

        let _ = process_site(&mut site, &logger);

        let errors = logger.errors();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[2].message, "");
    }
}
