//! The build option schema shared by build-style commands.
//!
//! [`OptionSchema::build_options`] declares every option a build-style command
//! accepts. The schema is declarative: [`OptionSchema::apply`] binds each entry
//! to clap arguments, and [`OptionSchema::overrides_from`] reads back only the
//! values the user actually typed. Validation and merging happen later, in the
//! [`ConfigResolver`](crate::ConfigResolver).
//!
//! ```rust
//! use clap::Command;
//! use folio_dispatch::OptionSchema;
//!
//! let schema = OptionSchema::build_options();
//! let cmd = schema.apply(Command::new("build"));
//! let matches = cmd.try_get_matches_from(["build", "-s", "site", "--future"]).unwrap();
//!
//! let overrides = schema.overrides_from(&matches);
//! assert_eq!(overrides.len(), 2);
//! assert_eq!(overrides.get("future"), Some(&serde_json::json!(true)));
//! ```

use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;

use crate::config::OptionsOverride;

/// How an option takes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Boolean switch: present means `true`.
    Flag,
    /// `--[no-]name` pair. Carries the negated long form.
    Toggle(&'static str),
    /// Single string value, with its placeholder.
    Text(&'static str),
    /// Comma separated strings, with its placeholder.
    List(&'static str),
    /// Integer value, with its placeholder.
    Integer(&'static str),
}

/// One recognized option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// Canonical configuration key.
    pub key: &'static str,
    pub short: Option<char>,
    pub long: &'static str,
    pub value: ValueKind,
    pub help: &'static str,
}

impl OptionSpec {
    pub fn new(key: &'static str, long: &'static str, value: ValueKind, help: &'static str) -> Self {
        Self {
            key,
            short: None,
            long,
            value,
            help,
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// The command-line forms, as shown in help text.
    ///
    /// `destination` gives `["-d", "--destination DESTINATION"]`.
    pub fn cli_forms(&self) -> Vec<String> {
        let mut forms: Vec<String> = self.short.map(|c| format!("-{}", c)).into_iter().collect();
        forms.push(match self.value {
            ValueKind::Flag => format!("--{}", self.long),
            ValueKind::Toggle(_) => format!("--[no-]{}", self.long),
            ValueKind::Text(placeholder)
            | ValueKind::List(placeholder)
            | ValueKind::Integer(placeholder) => format!("--{} {}", self.long, placeholder),
        });
        forms
    }

    /// The clap arguments bound to this option.
    fn args(&self) -> Vec<Arg> {
        let mut arg = Arg::new(self.key).long(self.long).help(self.help);
        if let Some(short) = self.short {
            arg = arg.short(short);
        }

        match self.value {
            ValueKind::Flag => vec![arg.action(ArgAction::SetTrue)],
            ValueKind::Toggle(negated) => vec![
                arg.action(ArgAction::SetTrue).overrides_with(negated),
                Arg::new(negated)
                    .long(negated)
                    .action(ArgAction::SetTrue)
                    .overrides_with(self.key)
                    .hide(true),
            ],
            ValueKind::Text(placeholder) => {
                vec![arg.action(ArgAction::Set).value_name(placeholder)]
            }
            ValueKind::List(placeholder) => vec![arg
                .action(ArgAction::Append)
                .value_name(placeholder)
                .value_delimiter(',')],
            ValueKind::Integer(placeholder) => vec![arg
                .action(ArgAction::Set)
                .value_name(placeholder)
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i64))],
        }
    }

    /// Reads this option's value if it came from the command line.
    fn extract(&self, matches: &ArgMatches) -> Option<Value> {
        let typed = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);

        match self.value {
            ValueKind::Flag => typed(self.key).then_some(Value::Bool(true)),
            ValueKind::Toggle(negated) => {
                if typed(self.key) {
                    Some(Value::Bool(true))
                } else if typed(negated) {
                    Some(Value::Bool(false))
                } else {
                    None
                }
            }
            ValueKind::Text(_) if typed(self.key) => matches
                .get_one::<String>(self.key)
                .map(|s| Value::String(s.clone())),
            ValueKind::List(_) if typed(self.key) => matches.get_many::<String>(self.key).map(|values| {
                Value::Array(values.map(|s| Value::String(s.clone())).collect())
            }),
            ValueKind::Integer(_) if typed(self.key) => {
                matches.get_one::<i64>(self.key).map(|n| Value::from(*n))
            }
            _ => None,
        }
    }
}

/// An ordered set of [`OptionSpec`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSchema {
    entries: Vec<OptionSpec>,
}

impl OptionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an option.
    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.entries.push(spec);
        self
    }

    /// Every option recognized by build-style commands.
    pub fn build_options() -> Self {
        use ValueKind::*;

        Self::new()
            .option(OptionSpec::new(
                "config",
                "config",
                List("CONFIG_FILE[,CONFIG_FILE2,...]"),
                "Custom configuration file",
            ))
            .option(
                OptionSpec::new(
                    "destination",
                    "destination",
                    Text("DESTINATION"),
                    "The current folder will be generated into DESTINATION",
                )
                .short('d'),
            )
            .option(
                OptionSpec::new("source", "source", Text("SOURCE"), "Custom source directory")
                    .short('s'),
            )
            .option(OptionSpec::new(
                "future",
                "future",
                Flag,
                "Publishes posts with a future date",
            ))
            .option(OptionSpec::new(
                "limit_posts",
                "limit_posts",
                Integer("MAX_POSTS"),
                "Limits the number of posts to parse and publish",
            ))
            .option(
                OptionSpec::new(
                    "watch",
                    "watch",
                    Toggle("no-watch"),
                    "Watch for changes and rebuild",
                )
                .short('w'),
            )
            .option(
                OptionSpec::new(
                    "baseurl",
                    "baseurl",
                    Text("URL"),
                    "Serve the website from the given base URL",
                )
                .short('b'),
            )
            .option(OptionSpec::new(
                "force_polling",
                "force_polling",
                Flag,
                "Force watch to use polling",
            ))
            .option(OptionSpec::new(
                "lsi",
                "lsi",
                Flag,
                "Use LSI for improved related posts",
            ))
            .option(
                OptionSpec::new(
                    "show_drafts",
                    "drafts",
                    Flag,
                    "Render posts in the _drafts folder",
                )
                .short('D'),
            )
            .option(OptionSpec::new(
                "unpublished",
                "unpublished",
                Flag,
                "Render posts that were marked as unpublished",
            ))
            .option(OptionSpec::new(
                "disable_disk_cache",
                "disable-disk-cache",
                Flag,
                "Disable caching to disk in non-safe mode",
            ))
            .option(OptionSpec::new("quiet", "quiet", Flag, "Silence output.").short('q'))
            .option(OptionSpec::new("verbose", "verbose", Flag, "Print verbose output.").short('V'))
            .option(
                OptionSpec::new(
                    "incremental",
                    "incremental",
                    Flag,
                    "Enable incremental rebuild.",
                )
                .short('I'),
            )
            .option(OptionSpec::new(
                "strict_front_matter",
                "strict_front_matter",
                Flag,
                "Fail if errors are present in front matter",
            ))
    }

    pub fn entries(&self) -> &[OptionSpec] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&OptionSpec> {
        self.entries.iter().find(|spec| spec.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|spec| spec.key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binds every option to `cmd` as clap arguments.
    pub fn apply(&self, cmd: Command) -> Command {
        self.entries
            .iter()
            .flat_map(OptionSpec::args)
            .fold(cmd, |cmd, arg| cmd.arg(arg))
    }

    /// Collects the options present on the command line.
    ///
    /// Defaults are never reported: an option the user did not type is
    /// absent from the result, so it cannot mask a configuration file value.
    pub fn overrides_from(&self, matches: &ArgMatches) -> OptionsOverride {
        self.entries
            .iter()
            .filter_map(|spec| spec.extract(matches).map(|v| (spec.key.to_string(), v)))
            .collect()
    }
}

/// Adds the build options to a command.
pub fn add_build_options(cmd: Command) -> Command {
    OptionSchema::build_options().apply(cmd)
}
