//! `folio clean`: remove everything a build leaves behind.

use std::fs;
use std::path::Path;

use anyhow::Context;
use folio_dispatch::{CommandContext, CommandRegistry, CommandVariant, Logger, Options, Process};

/// Incremental build metadata, kept in the source directory.
pub const METADATA_FILE: &str = ".folio-metadata";

pub fn register(registry: &mut CommandRegistry) {
    registry.register(
        CommandVariant::new("clean")
            .about("Clean the site (removes site output and metadata file) without building.")
            .with_build_options()
            .process(Clean),
    );
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Clean;

impl Process for Clean {
    fn process(&self, options: &Options, ctx: &CommandContext<'_>) -> anyhow::Result<()> {
        let config = ctx.configuration(options)?;

        remove(&config.destination(), ctx.logger)?;
        remove(&config.source().join(METADATA_FILE), ctx.logger)?;
        remove(&config.cache_dir(), ctx.logger)?;
        Ok(())
    }
}

fn remove(path: &Path, logger: &dyn Logger) -> anyhow::Result<()> {
    if !path.exists() {
        logger.info("Cleaner:", &format!("Nothing to do for {}.", path.display()));
        return Ok(());
    }

    logger.info("Cleaner:", &format!("Removing {}...", path.display()));
    let removed = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.with_context(|| format!("removing {}", path.display()))
}
