//! The bundled [`ConfigResolver`]: defaults, files, environment, overrides.
//!
//! # Loading Priority
//!
//! Later layers win:
//!
//! 1. [`Configuration::defaults`]
//! 2. Configuration files: the `config` override if present (every file, in
//!    order, all required), otherwise the first of `_config.yml`,
//!    `_config.yaml`, `_config.toml` found in the source directory
//! 3. `FOLIO_<KEY>` environment variables for the build option keys
//! 4. The command-line overrides
//!
//! Nested mappings merge key by key. When no layer sets `destination`, it
//! follows the final `source` (`<source>/_site`).

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::{ConfigResolver, Configuration, OptionsOverride};
use crate::env::{env_var_name, parse_env_value, EnvReader, RealEnv};
use crate::error::ConfigError;
use crate::options::OptionSchema;

/// Configuration files looked up in the source directory, in order.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["_config.yml", "_config.yaml", "_config.toml"];

/// Resolver layering defaults, files, environment and overrides.
#[derive(Debug, Clone)]
pub struct LayeredResolver<E = RealEnv> {
    env: E,
}

impl LayeredResolver<RealEnv> {
    /// Creates a resolver reading the process environment.
    pub fn new() -> Self {
        Self { env: RealEnv }
    }
}

impl Default for LayeredResolver<RealEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvReader> LayeredResolver<E> {
    /// Creates a resolver reading variables from `env`.
    pub fn with_env(env: E) -> Self {
        Self { env }
    }

    /// Determines which configuration files to load.
    fn config_files(
        &self,
        overrides: &OptionsOverride,
        source: &Path,
    ) -> Result<Vec<PathBuf>, ConfigError> {
        let requested: Vec<PathBuf> = match overrides.get("config") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(PathBuf::from)
                .collect(),
            Some(Value::String(path)) => vec![PathBuf::from(path)],
            _ => Vec::new(),
        };

        if requested.is_empty() {
            return Ok(DEFAULT_CONFIG_FILES
                .iter()
                .map(|name| source.join(name))
                .find(|path| path.is_file())
                .into_iter()
                .collect());
        }

        for path in &requested {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.clone()));
            }
        }
        Ok(requested)
    }

    /// Source directory used to look for default configuration files.
    fn initial_source(&self, overrides: &OptionsOverride) -> PathBuf {
        overrides
            .get("source")
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .or_else(|| self.env.var(&env_var_name("source")).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl<E: EnvReader> ConfigResolver for LayeredResolver<E> {
    fn resolve(&self, overrides: &OptionsOverride) -> Result<Configuration, ConfigError> {
        let mut map = Configuration::defaults().into_map();
        let mut destination_set = false;

        let files = self.config_files(overrides, &self.initial_source(overrides))?;
        for path in &files {
            let layer = load_file(path)?;
            tracing::debug!(path = %path.display(), keys = layer.len(), "loaded configuration file");
            destination_set |= layer.contains_key("destination");
            deep_merge(&mut map, layer);
        }

        for key in OptionSchema::build_options().keys() {
            if key == "config" {
                continue;
            }
            if let Some(raw) = self.env.var(&env_var_name(key)) {
                tracing::trace!(key = %key, "configuration value from environment");
                destination_set |= key == "destination";
                map.insert(key.to_string(), parse_env_value(&raw));
            }
        }

        for (key, value) in overrides.iter() {
            if key == "config" {
                continue;
            }
            destination_set |= key == "destination";
            map.insert(key.clone(), value.clone());
        }

        if !files.is_empty() {
            let loaded = files
                .iter()
                .map(|p| Value::String(p.display().to_string()))
                .collect();
            map.insert("config".into(), Value::Array(loaded));
        }

        if !destination_set {
            let source = map
                .get("source")
                .and_then(Value::as_str)
                .unwrap_or(".")
                .to_string();
            let destination = Path::new(&source).join("_site");
            map.insert(
                "destination".into(),
                Value::String(destination.display().to_string()),
            );
        }

        validate(&map)?;
        Ok(Configuration::from_map(map))
    }
}

/// Reads one configuration file into a mapping.
pub fn load_file(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("yml") | Some("yaml") => {
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        }
        Some("toml") => toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    match value {
        Value::Object(map) => Ok(map),
        // An empty YAML document.
        Value::Null => Ok(Map::new()),
        _ => Err(ConfigError::NotAMapping(path.to_path_buf())),
    }
}

/// Merges `layer` into `base`; nested mappings merge recursively.
pub fn deep_merge(base: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (key, value) in layer {
        match value {
            Value::Object(incoming) if base.get(&key).is_some_and(Value::is_object) => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    deep_merge(existing, incoming);
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn validate(map: &Map<String, Value>) -> Result<(), ConfigError> {
    match map.get("limit_posts") {
        None | Some(Value::Null) => Ok(()),
        Some(value) => match value.as_i64() {
            Some(n) if n >= 0 => Ok(()),
            _ => Err(ConfigError::InvalidValue {
                key: "limit_posts".into(),
                reason: format!("must be a non-negative integer, got {}", value),
            }),
        },
    }
}
