//! Command variants and the registry that lists them.
//!
//! Every command module exposes a `register` function that appends its
//! [`CommandVariant`] to a [`CommandRegistry`]. The program calls those
//! functions once at startup, in the order the commands should appear in help
//! output:
//!
//! ```rust
//! use folio_dispatch::{CommandRegistry, CommandVariant, CommandContext, Options};
//!
//! mod build {
//!     use super::*;
//!
//!     pub fn register(registry: &mut CommandRegistry) {
//!         registry.register(
//!             CommandVariant::new("build")
//!                 .about("Build your site")
//!                 .alias("b")
//!                 .with_build_options()
//!                 .process_fn(|_options: &Options, _ctx: &CommandContext<'_>| Ok(())),
//!         );
//!     }
//! }
//!
//! # fn main() {
//! let mut registry = CommandRegistry::new();
//! build::register(&mut registry);
//!
//! assert_eq!(registry.names(), vec!["build"]);
//! assert!(registry.get("b").is_some());
//! # }
//! ```
//!
//! Entries are never removed or reordered, and registering the same name
//! twice keeps both entries; lookups return the first.

use std::fmt;

use clap::Command;

use crate::command::{CommandContext, FnProcess, Process};
use crate::config::Options;
use crate::options::OptionSchema;

type ConfigureFn = Box<dyn Fn(Command) -> Command>;

/// One registered command.
///
/// The `process` capability is optional: a variant without one is listed
/// and reachable from the CLI, but dispatching it does nothing.
pub struct CommandVariant {
    name: String,
    about: Option<String>,
    aliases: Vec<String>,
    build_options: bool,
    configure: Option<ConfigureFn>,
    process: Option<Box<dyn Process>>,
}

impl CommandVariant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            aliases: Vec::new(),
            build_options: false,
            configure: None,
            process: None,
        }
    }

    /// One-line description shown in help.
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Adds another name the command answers to.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Marks the command as build-style: it accepts the shared build options.
    pub fn with_build_options(mut self) -> Self {
        self.build_options = true;
        self
    }

    /// Adds command-specific clap arguments.
    pub fn configure<F>(mut self, configure: F) -> Self
    where
        F: Fn(Command) -> Command + 'static,
    {
        self.configure = Some(Box::new(configure));
        self
    }

    /// Sets the command's behaviour.
    pub fn process<P: Process + 'static>(mut self, process: P) -> Self {
        self.process = Some(Box::new(process));
        self
    }

    /// Sets the command's behaviour from a closure.
    pub fn process_fn<F>(self, f: F) -> Self
    where
        F: Fn(&Options, &CommandContext<'_>) -> anyhow::Result<()> + 'static,
    {
        self.process(FnProcess::new(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about_text(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn uses_build_options(&self) -> bool {
        self.build_options
    }

    /// The process capability, if the variant has one.
    pub fn processor(&self) -> Option<&dyn Process> {
        self.process.as_deref()
    }

    pub fn responds_to_process(&self) -> bool {
        self.process.is_some()
    }

    /// True if `name` is the variant's name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }

    /// The clap subcommand for this variant.
    ///
    /// Build-style variants get every option of `schema`.
    pub fn clap_command(&self, schema: &OptionSchema) -> Command {
        self.clap_command_with_aliases(schema, &self.aliases)
    }

    /// Like [`clap_command`](Self::clap_command), exposing only `aliases`.
    pub(crate) fn clap_command_with_aliases<S: AsRef<str>>(
        &self,
        schema: &OptionSchema,
        aliases: &[S],
    ) -> Command {
        let mut cmd = Command::new(self.name.clone())
            .visible_aliases(aliases.iter().map(|a| a.as_ref().to_string()));
        if let Some(about) = &self.about {
            cmd = cmd.about(about.clone());
        }
        if self.build_options {
            cmd = schema.apply(cmd);
        }
        match &self.configure {
            Some(configure) => configure(cmd),
            None => cmd,
        }
    }
}

impl fmt::Debug for CommandVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandVariant")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("build_options", &self.build_options)
            .field("process", &self.process.is_some())
            .finish_non_exhaustive()
    }
}

/// Ordered list of every known command variant.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    variants: Vec<CommandVariant>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variant. Registration cannot fail.
    pub fn register(&mut self, variant: CommandVariant) -> &mut Self {
        tracing::debug!(
            command = variant.name(),
            position = self.variants.len(),
            "registered command"
        );
        self.variants.push(variant);
        self
    }

    /// Every variant in registration order.
    pub fn variants(&self) -> &[CommandVariant] {
        &self.variants
    }

    /// First variant answering to `name` (name or alias).
    pub fn get(&self, name: &str) -> Option<&CommandVariant> {
        self.variants.iter().find(|variant| variant.answers_to(name))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandVariant> {
        self.variants.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.variants.iter().map(CommandVariant::name).collect()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl<'a> IntoIterator for &'a CommandRegistry {
    type Item = &'a CommandVariant;
    type IntoIter = std::slice::Iter<'a, CommandVariant>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_options: &Options, _ctx: &CommandContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn test_registry_starts_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.variants().is_empty());
    }

    #[test]
    fn test_register_preserves_order() {
        let mut registry = CommandRegistry::new();
        registry
            .register(CommandVariant::new("build"))
            .register(CommandVariant::new("serve"))
            .register(CommandVariant::new("clean"));

        assert_eq!(registry.names(), vec!["build", "serve", "clean"]);
    }

    #[test]
    fn test_register_keeps_duplicates() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandVariant::new("build").about("first"));
        registry.register(CommandVariant::new("build").about("second"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("build").unwrap().about_text(), Some("first"));
    }

    #[test]
    fn test_get_by_alias() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandVariant::new("doctor").alias("hyde"));

        assert_eq!(registry.get("hyde").unwrap().name(), "doctor");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_process_capability() {
        let with = CommandVariant::new("build").process_fn(noop);
        let without = CommandVariant::new("help");

        assert!(with.responds_to_process());
        assert!(with.processor().is_some());
        assert!(!without.responds_to_process());
        assert!(without.processor().is_none());
    }

    #[test]
    fn test_clap_command_with_build_options() {
        let schema = OptionSchema::build_options();
        let variant = CommandVariant::new("build")
            .about("Build your site")
            .alias("b")
            .with_build_options();

        let cmd = variant.clap_command(&schema);
        assert_eq!(cmd.get_name(), "build");
        assert!(cmd.get_all_aliases().any(|a| a == "b"));
        assert!(cmd.get_arguments().any(|a| a.get_id() == "destination"));
    }

    #[test]
    fn test_clap_command_without_build_options() {
        let schema = OptionSchema::build_options();
        let cmd = CommandVariant::new("help").clap_command(&schema);
        assert!(!cmd.get_arguments().any(|a| a.get_id() == "destination"));
    }

    #[test]
    fn test_configure_adds_arguments() {
        let schema = OptionSchema::build_options();
        let variant = CommandVariant::new("new").configure(|cmd| {
            cmd.arg(clap::Arg::new("path").required(true))
        });

        let cmd = variant.clap_command(&schema);
        assert!(cmd.get_arguments().any(|a| a.get_id() == "path"));
    }

    #[test]
    fn test_iterate_registry() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandVariant::new("a"));
        registry.register(CommandVariant::new("b"));

        let names: Vec<_> = (&registry).into_iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.iter().count(), 2);
    }
}
