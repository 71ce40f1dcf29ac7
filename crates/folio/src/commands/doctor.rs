//! `folio doctor`: look for configuration problems before building.

use folio_dispatch::{
    CommandContext, CommandRegistry, CommandVariant, Configuration, Halt, Logger, Options,
    Process,
};

pub fn register(registry: &mut CommandRegistry) {
    registry.register(
        CommandVariant::new("doctor")
            .alias("hyde")
            .about("Search site and print specific deprecation warnings")
            .with_build_options()
            .process(Doctor),
    );
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Doctor;

impl Process for Doctor {
    fn process(&self, options: &Options, ctx: &CommandContext<'_>) -> anyhow::Result<()> {
        let config = ctx.configuration(options)?;
        if healthy(&config, ctx.logger) {
            ctx.logger
                .info("Your test results", "are in. Everything looks fine.");
            Ok(())
        } else {
            Err(Halt::exit(1).into())
        }
    }
}

/// Runs every check, warning about each failure. True when all pass.
pub fn healthy(config: &Configuration, logger: &dyn Logger) -> bool {
    let checks = [
        source_exists(config, logger),
        destination_differs(config, logger),
        baseurl_is_absolute(config, logger),
    ];
    checks.iter().all(|ok| *ok)
}

fn source_exists(config: &Configuration, logger: &dyn Logger) -> bool {
    let source = config.source();
    if source.is_dir() {
        return true;
    }
    logger.warn(
        "Warning:",
        &format!("The source directory {} does not exist.", source.display()),
    );
    false
}

fn destination_differs(config: &Configuration, logger: &dyn Logger) -> bool {
    let source = config.source();
    let destination = config.destination();
    let same = match (source.canonicalize(), destination.canonicalize()) {
        (Ok(s), Ok(d)) => s == d,
        _ => source == destination,
    };
    if !same {
        return true;
    }
    logger.warn(
        "Warning:",
        "The destination is the source directory. Building would overwrite your site.",
    );
    false
}

fn baseurl_is_absolute(config: &Configuration, logger: &dyn Logger) -> bool {
    match config.baseurl() {
        Some(url) if !url.is_empty() && !url.starts_with('/') => {
            logger.warn(
                "Warning:",
                &format!("Your baseurl ({}) does not start with a '/'.", url),
            );
            false
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_dispatch::{LogLevel, RecordingLogger};
    use serde_json::json;
    use tempfile::TempDir;

    fn config(entries: &[(&str, serde_json::Value)]) -> Configuration {
        let mut map = Configuration::defaults().into_map();
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Configuration::from_map(map)
    }

    #[test]
    fn test_healthy_site() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().display().to_string();
        let destination = dir.path().join("_site").display().to_string();
        let logger = RecordingLogger::new();

        let cfg = config(&[
            ("source", json!(source)),
            ("destination", json!(destination)),
            ("baseurl", json!("/blog")),
        ]);

        assert!(healthy(&cfg, &logger));
        assert!(logger.is_empty());
    }

    #[test]
    fn test_each_problem_is_reported() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing").display().to_string();
        let logger = RecordingLogger::new();

        let cfg = config(&[
            ("source", json!(missing.clone())),
            ("destination", json!(missing)),
            ("baseurl", json!("blog")),
        ]);

        assert!(!healthy(&cfg, &logger));
        assert_eq!(logger.at_level(LogLevel::Warn).len(), 3);
    }

    #[test]
    fn test_empty_baseurl_is_fine() {
        let logger = RecordingLogger::new();
        let cfg = config(&[("baseurl", json!(""))]);
        assert!(baseurl_is_absolute(&cfg, &logger));
    }
}
