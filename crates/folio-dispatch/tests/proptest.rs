//! Property-based tests for the registry, the build options and the
//! failure report.

use std::collections::BTreeMap;

use clap::Command;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

use folio_dispatch::{deep_merge, report_failure, CommandRegistry, CommandVariant, OptionSchema, RecordingLogger};

// ============================================================================
// Strategies
// ============================================================================

fn command_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,11}"
}

fn flat_map() -> impl Strategy<Value = BTreeMap<String, i64>> {
    prop::collection::btree_map("[a-z]{1,4}", any::<i64>(), 0..8)
}

fn to_map(entries: &BTreeMap<String, i64>) -> Map<String, Value> {
    entries.iter().map(|(k, v)| (k.clone(), json!(v))).collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// The registry lists variants exactly in registration order, duplicates included.
    #[test]
    fn registry_preserves_registration_order(
        names in prop::collection::vec(command_name(), 0..20),
    ) {
        let mut registry = CommandRegistry::new();
        for name in &names {
            registry.register(CommandVariant::new(name.clone()));
        }

        prop_assert_eq!(registry.len(), names.len());
        prop_assert_eq!(registry.names(), names.iter().map(String::as_str).collect::<Vec<_>>());
    }

    /// Lookup returns the first registered variant with a name.
    #[test]
    fn registry_get_returns_first_match(
        names in prop::collection::vec(command_name(), 1..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut registry = CommandRegistry::new();
        for (position, name) in names.iter().enumerate() {
            registry.register(CommandVariant::new(name.clone()).about(position.to_string()));
        }

        let wanted = &names[pick.index(names.len())];
        let first = names.iter().position(|n| n == wanted).unwrap();
        let expected = first.to_string();
        let found = registry.get(wanted).unwrap();
        prop_assert_eq!(found.about_text(), Some(expected.as_str()));
    }

    /// The dash lines always match the width of the suggestion line.
    #[test]
    fn failure_report_dashes_match_message(command in command_name()) {
        let logger = RecordingLogger::new();
        let _ = report_failure(&logger, "folio", "0.4.0", &command);

        let errors = logger.errors();
        let aborts = logger.aborts();
        prop_assert_eq!(errors.len(), 3);
        prop_assert_eq!(aborts.len(), 1);
        prop_assert_eq!(errors[0].message.len(), errors[1].message.len());
        prop_assert_eq!(&aborts[0].message, &errors[0].message);
        let quoted = format!("`{}`", command);
        prop_assert!(errors[1].message.contains(&quoted));
    }

    /// Merging a layer keeps every key of both maps and the layer wins.
    #[test]
    fn deep_merge_layer_wins(base in flat_map(), layer in flat_map()) {
        let mut merged = to_map(&base);
        deep_merge(&mut merged, to_map(&layer));

        for (key, value) in &layer {
            let expected = json!(value);
            prop_assert_eq!(merged.get(key), Some(&expected));
        }
        for (key, value) in &base {
            if !layer.contains_key(key) {
                let expected = json!(value);
                prop_assert_eq!(merged.get(key), Some(&expected));
            }
        }
    }

    /// An integer given to --limit_posts reaches the overrides unchanged.
    #[test]
    fn limit_posts_round_trips_through_cli(n in 0i64..100_000) {
        let schema = OptionSchema::build_options();
        let cmd = schema.apply(Command::new("build"));
        let value = n.to_string();
        let matches = cmd
            .try_get_matches_from(["build", "--limit_posts", value.as_str()])
            .unwrap();

        let overrides = schema.overrides_from(&matches);
        let expected = json!(n);
        prop_assert_eq!(overrides.get("limit_posts"), Some(&expected));
    }
}
