//! Configuration values and the [`ConfigBuilder`].
//!
//! A command receives its options either as an already resolved
//! [`Configuration`] or as an [`OptionsOverride`] collected from the command
//! line. [`ConfigBuilder::build`] turns either into a configuration:
//!
//! | input | result |
//! |-------|--------|
//! | [`Options::Resolved`] | the same configuration, borrowed (no resolution) |
//! | [`Options::Overrides`] | whatever the [`ConfigResolver`] returns for them |
//!
//! The short-circuit matters because resolution has side effects (reading
//! configuration files); a configuration is resolved at most once.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::resolve::LayeredResolver;

/// Values supplied on the command line, before merging with defaults and files.
///
/// Keys are [`OptionSchema`](crate::OptionSchema) keys. Only options the user
/// actually passed are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionsOverride(Map<String, Value>);

impl OptionsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl FromIterator<(String, Value)> for OptionsOverride {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A fully resolved configuration.
///
/// Constructed once per invocation and read-only afterwards. Typed accessors
/// cover the keys the core and the bundled commands rely on; anything else is
/// reachable through [`get`](Configuration::get).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(Map<String, Value>);

impl Configuration {
    /// Wraps an already merged map.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// The built-in defaults every resolution starts from.
    pub fn defaults() -> Self {
        let mut map = Map::new();
        map.insert("source".into(), Value::from("."));
        map.insert("destination".into(), Value::from("./_site"));
        map.insert("safe".into(), Value::Bool(false));
        map.insert("disable_disk_cache".into(), Value::Bool(false));
        map.insert("future".into(), Value::Bool(false));
        map.insert("unpublished".into(), Value::Bool(false));
        map.insert("show_drafts".into(), Value::Null);
        map.insert("limit_posts".into(), Value::from(0));
        map.insert("watch".into(), Value::Bool(false));
        map.insert("force_polling".into(), Value::Bool(false));
        map.insert("lsi".into(), Value::Bool(false));
        map.insert("incremental".into(), Value::Bool(false));
        map.insert("quiet".into(), Value::Bool(false));
        map.insert("verbose".into(), Value::Bool(false));
        map.insert("strict_front_matter".into(), Value::Bool(false));
        map.insert("baseurl".into(), Value::Null);
        map.insert("layouts_dir".into(), Value::from("_layouts"));
        map.insert("includes_dir".into(), Value::from("_includes"));
        map.insert("data_dir".into(), Value::from("_data"));
        map.insert("cache_dir".into(), Value::from(".folio-cache"));
        map.insert("exclude".into(), Value::Array(Vec::new()));
        map.insert("include".into(), Value::Array(Vec::new()));
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// A missing or non-boolean value reads as `false`.
    pub fn get_bool(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    pub fn source(&self) -> PathBuf {
        PathBuf::from(self.get_str("source").unwrap_or("."))
    }

    pub fn destination(&self) -> PathBuf {
        self.get_str("destination")
            .map(PathBuf::from)
            .unwrap_or_else(|| self.source().join("_site"))
    }

    /// The cache directory, relative paths taken from the source.
    pub fn cache_dir(&self) -> PathBuf {
        let dir = Path::new(self.get_str("cache_dir").unwrap_or(".folio-cache"));
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.source().join(dir)
        }
    }

    pub fn baseurl(&self) -> Option<&str> {
        self.get_str("baseurl")
    }

    /// Zero means "no limit".
    pub fn limit_posts(&self) -> u64 {
        self.get_i64("limit_posts")
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0)
    }

    /// Configuration files that were loaded, in load order.
    pub fn config_files(&self) -> Vec<PathBuf> {
        match self.0.get("config") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(PathBuf::from)
                .collect(),
            Some(Value::String(path)) => vec![PathBuf::from(path)],
            _ => Vec::new(),
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.get_bool("quiet")
    }

    pub fn is_verbose(&self) -> bool {
        self.get_bool("verbose")
    }

    pub fn is_incremental(&self) -> bool {
        self.get_bool("incremental")
    }

    pub fn watch(&self) -> bool {
        self.get_bool("watch")
    }

    pub fn show_drafts(&self) -> bool {
        self.get_bool("show_drafts")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::defaults()
    }
}

/// What a command is invoked with.
#[derive(Debug, Clone, PartialEq)]
pub enum Options {
    /// Already resolved; passed through unchanged by [`ConfigBuilder`].
    Resolved(Configuration),
    /// Raw command-line values still to be layered over defaults and files.
    Overrides(OptionsOverride),
}

impl Options {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Options::Resolved(_))
    }

    /// Looks a key up in whichever form the options are in.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Options::Resolved(config) => config.get(key),
            Options::Overrides(overrides) => overrides.get(key),
        }
    }
}

impl From<Configuration> for Options {
    fn from(config: Configuration) -> Self {
        Options::Resolved(config)
    }
}

impl From<OptionsOverride> for Options {
    fn from(overrides: OptionsOverride) -> Self {
        Options::Overrides(overrides)
    }
}

/// Turns command-line overrides into a full configuration.
///
/// Layering (defaults, files, environment, overrides) is the resolver's
/// business. [`LayeredResolver`] is the bundled implementation.
pub trait ConfigResolver {
    fn resolve(&self, overrides: &OptionsOverride) -> Result<Configuration, ConfigError>;
}

impl<F> ConfigResolver for F
where
    F: Fn(&OptionsOverride) -> Result<Configuration, ConfigError>,
{
    fn resolve(&self, overrides: &OptionsOverride) -> Result<Configuration, ConfigError> {
        self(overrides)
    }
}

/// Builds configurations from command options.
pub struct ConfigBuilder {
    resolver: Box<dyn ConfigResolver>,
}

impl ConfigBuilder {
    /// Creates a builder delegating to `resolver`.
    pub fn new<R: ConfigResolver + 'static>(resolver: R) -> Self {
        Self {
            resolver: Box::new(resolver),
        }
    }

    /// Creates a builder from a resolver closure.
    pub fn from_fn<F>(resolve: F) -> Self
    where
        F: Fn(&OptionsOverride) -> Result<Configuration, ConfigError> + 'static,
    {
        Self::new(resolve)
    }

    /// Returns a configuration for `options`.
    ///
    /// A resolved configuration comes back as the very same object. Overrides
    /// go to the resolver exactly once, and its result (or error) is returned
    /// unchanged.
    pub fn build<'a>(&self, options: &'a Options) -> Result<Cow<'a, Configuration>, ConfigError> {
        match options {
            Options::Resolved(config) => {
                tracing::trace!("options already resolved, skipping configuration load");
                Ok(Cow::Borrowed(config))
            }
            Options::Overrides(overrides) => {
                tracing::debug!(keys = overrides.len(), "resolving configuration");
                self.resolver.resolve(overrides).map(Cow::Owned)
            }
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new(LayeredResolver::new())
    }
}

impl std::fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigBuilder").finish_non_exhaustive()
    }
}
