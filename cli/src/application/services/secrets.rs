//! Application service: secret collection.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};

use crate::application::ports::{ProgressReporter, SecretStore};
use crate::domain::env::EnvMap;
use crate::domain::error::SecretError;
use crate::domain::manifest::{ENV_KEY_RE, SecretsConfig};

/// Fetch every bundle, then every entry, one at a time, into a single map.
///
/// Entries override bundle members with the same key. Values are never
/// logged; overrides are logged by key only.
///
/// # Errors
///
/// Returns an error if any fetch fails or a bundle cannot be decoded.
pub async fn collect_secrets(
    store: &impl SecretStore,
    config: &SecretsConfig,
    reporter: &impl ProgressReporter,
) -> Result<EnvMap> {
    let total = config.bundles.len() + config.entries.len();
    reporter.step(&format!("fetching {total} secret(s) from {}...", config.provider));

    let mut secrets = EnvMap::new();

    for bundle in &config.bundles {
        tracing::debug!(secret = %bundle.name, "fetching secret bundle");
        let raw = store
            .fetch(&bundle.name)
            .await
            .with_context(|| format!("reading secret bundle '{}'", bundle.name))?;
        for (key, value) in expand_bundle(&bundle.name, &bundle.prefix, &raw)? {
            if secrets.insert(key.clone(), value, true) {
                tracing::debug!(%key, bundle = %bundle.name, "bundle overrides earlier value");
            }
        }
    }

    for entry in &config.entries {
        tracing::debug!(secret = %entry.name, key = %entry.key, "fetching secret");
        let value = store
            .fetch(&entry.name)
            .await
            .with_context(|| format!("reading secret '{}'", entry.name))?;
        if secrets.insert(entry.key.clone(), value, true) {
            tracing::debug!(key = %entry.key, "secret entry overrides bundle value");
        }
    }

    reporter.success(&format!("{} secret variable(s) loaded", secrets.len()));
    Ok(secrets)
}

/// Decode a bundle: a flat JSON object whose members become variables.
///
/// Strings are taken verbatim, numbers and booleans stringified, `null`
/// becomes the empty string.
///
/// # Errors
///
/// Returns a [`SecretError`] if the value is not a JSON object, contains a
/// nested array/object, or yields an invalid variable name.
pub fn expand_bundle(
    name: &str,
    prefix: &str,
    raw: &str,
) -> Result<Vec<(String, String)>, SecretError> {
    let Ok(serde_json::Value::Object(members)) = serde_json::from_str::<serde_json::Value>(raw)
    else {
        return Err(SecretError::NotObject(name.to_string()));
    };

    members
        .into_iter()
        .map(|(member, value)| {
            let key = format!("{prefix}{member}");
            if !ENV_KEY_RE.is_match(&key) {
                return Err(SecretError::InvalidKey {
                    name: name.to_string(),
                    key,
                });
            }
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                    return Err(SecretError::NotFlat {
                        name: name.to_string(),
                        key: member,
                    });
                }
            };
            Ok((key, value))
        })
        .collect()
}
