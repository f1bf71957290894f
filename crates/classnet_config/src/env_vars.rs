//! Environment lookups for configuration overrides and secrets.
//!
//! Plain settings are overridden with `CLASSNET__SECTION__KEY` through the
//! `config` crate. Secrets are written as `"secret_from_env"` in the config
//! files and resolved here, first from `CLASSNET_SECRET_SECTION_KEY`, then
//! from the bare `SECTION_KEY`.

use serde_json::Value;
use std::env;
use tracing::{debug, warn};

pub const DEFAULT_PREFIX: &str = "CLASSNET";
pub const CONFIG_SEPARATOR: &str = "__";

/// Marker value replaced by an environment lookup.
pub const SECRET_MARKER: &str = "secret_from_env";

const SECRET_PREFIX: &str = "CLASSNET_SECRET";

/// Prefix for plain overrides. `PREFIX` in the environment replaces the default.
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Variable names consulted for a dotted secret path, most specific first.
///
/// `tokens.shared_secret` yields `CLASSNET_SECRET_TOKENS_SHARED_SECRET` and
/// `TOKENS_SHARED_SECRET`.
pub fn secret_env_names(path: &str) -> Vec<String> {
    let flat = path.replace('.', "_").to_uppercase();
    vec![format!("{}_{}", SECRET_PREFIX, flat), flat]
}

/// First non-empty value among [`secret_env_names`].
pub fn lookup_secret(path: &str) -> Option<String> {
    secret_env_names(path).into_iter().find_map(|name| {
        env::var(&name).ok().filter(|v| !v.is_empty()).map(|v| {
            debug!(path, variable = %name, "secret resolved from environment");
            v
        })
    })
}

/// Replace every secret marker in `value` with its environment value.
///
/// Markers without a value become `null` so optional secrets deserialize as
/// `None` and required ones fail validation by name. Returns the number of
/// markers resolved.
pub fn inject_env_vars(value: &mut Value) -> usize {
    let mut path = Vec::new();
    resolve(&mut path, value)
}

fn resolve(path: &mut Vec<String>, value: &mut Value) -> usize {
    match value {
        Value::Object(map) => map
            .iter_mut()
            .map(|(key, child)| {
                path.push(key.clone());
                let n = resolve(path, child);
                path.pop();
                n
            })
            .sum(),
        Value::Array(items) => items
            .iter_mut()
            .enumerate()
            .map(|(i, child)| {
                path.push(i.to_string());
                let n = resolve(path, child);
                path.pop();
                n
            })
            .sum(),
        Value::String(s) if s == SECRET_MARKER => {
            let dotted = path.join(".");
            match lookup_secret(&dotted) {
                Some(secret) => {
                    *value = Value::String(secret);
                    1
                }
                None => {
                    warn!(path = %dotted, "no environment value for secret");
                    *value = Value::Null;
                    0
                }
            }
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_names_prefixed_then_bare() {
        assert_eq!(
            secret_env_names("tokens.shared_secret"),
            vec![
                "CLASSNET_SECRET_TOKENS_SHARED_SECRET".to_string(),
                "TOKENS_SHARED_SECRET".to_string()
            ]
        );
    }

    #[test]
    fn missing_marker_becomes_null() {
        let mut value = serde_json::json!({
            "classnet_test_section": { "unset_marker": SECRET_MARKER, "kept": "plain" }
        });
        assert_eq!(inject_env_vars(&mut value), 0);
        assert!(value["classnet_test_section"]["unset_marker"].is_null());
        assert_eq!(value["classnet_test_section"]["kept"], "plain");
    }

    #[test]
    fn marker_inside_array_uses_index_path() {
        env::set_var("CLASSNET_SECRET_CLASSNET_ARRAY_TEST_0", "from-env");
        let mut value = serde_json::json!({ "classnet_array_test": [SECRET_MARKER] });
        assert_eq!(inject_env_vars(&mut value), 1);
        assert_eq!(value["classnet_array_test"][0], "from-env");
    }
}
