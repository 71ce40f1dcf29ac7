//! `folio build`: write the site into the destination directory.

use std::time::Instant;

use folio_dispatch::{
    process_site, CommandContext, CommandRegistry, CommandVariant, Configuration, Logger, Options,
    Process,
};

use crate::site::StaticSite;

pub fn register(registry: &mut CommandRegistry) {
    registry.register(
        CommandVariant::new("build")
            .alias("b")
            .about("Build your site")
            .with_build_options()
            .process(Build),
    );
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Build;

impl Process for Build {
    fn process(&self, options: &Options, ctx: &CommandContext<'_>) -> anyhow::Result<()> {
        let config = ctx.configuration(options)?;
        if config.watch() {
            ctx.logger.warn(
                "Auto-regeneration:",
                "not available in folio. Run the build again after changes.",
            );
        }
        build(&config, ctx.logger)
    }
}

/// Builds the site described by `config` once.
pub fn build(config: &Configuration, logger: &dyn Logger) -> anyhow::Result<()> {
    for path in config.config_files() {
        logger.info("Configuration file:", &path.display().to_string());
    }
    logger.info("Source:", &config.source().display().to_string());
    logger.info("Destination:", &config.destination().display().to_string());
    logger.info(
        "Incremental build:",
        if config.is_incremental() {
            "enabled"
        } else {
            "disabled. Enable with --incremental"
        },
    );
    logger.info("Generating...", "");

    let started = Instant::now();
    let mut site = StaticSite::new(config);
    process_site(&mut site, logger)?;

    logger.info(
        "",
        &format!("done in {:.3} seconds.", started.elapsed().as_secs_f64()),
    );
    Ok(())
}
