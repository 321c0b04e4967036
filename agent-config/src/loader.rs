//! Configuration loading from a JSON file and the environment.

use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::schema::RuntimeConfig;

/// Overrides [`RuntimeConfig::namespace`].
pub const ENV_NAMESPACE: &str = "WELLNESS_NAMESPACE";
/// Overrides [`RuntimeConfig::invocation_timeout_ms`]; `0` disables the limit.
pub const ENV_TIMEOUT_MS: &str = "WELLNESS_INVOCATION_TIMEOUT_MS";
/// Overrides [`RuntimeConfig::max_concurrency`].
pub const ENV_MAX_CONCURRENCY: &str = "WELLNESS_MAX_CONCURRENCY";
/// Overrides [`RuntimeConfig::log_filter`].
pub const ENV_LOG: &str = "WELLNESS_LOG";

/// Loads configuration from `path` (if any) and the process environment.
///
/// # Errors
///
/// Fails if the file cannot be read or parsed, an override is malformed, or
/// the result does not validate.
pub fn load(path: Option<&Path>) -> Result<RuntimeConfig> {
    load_from(path, |key| std::env::var(key).ok())
}

/// Same as [`load`], reading overrides through `lookup` instead of the
/// process environment.
///
/// # Errors
///
/// See [`load`].
pub fn load_from<F>(path: Option<&Path>, lookup: F) -> Result<RuntimeConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            let parsed: RuntimeConfig = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse config file {}", path.display()))?;
            debug!(path = %path.display(), "loaded config file");
            parsed
        }
        None => RuntimeConfig::default(),
    };

    if let Some(namespace) = lookup(ENV_NAMESPACE) {
        config.namespace = namespace;
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
        let millis: u64 = raw
            .trim()
            .parse()
            .with_context(|| format!("{ENV_TIMEOUT_MS} must be an integer, got `{raw}`"))?;
        config.invocation_timeout_ms = (millis > 0).then_some(millis);
    }
    if let Some(raw) = lookup(ENV_MAX_CONCURRENCY) {
        config.max_concurrency = raw
            .trim()
            .parse::<NonZeroUsize>()
            .with_context(|| format!("{ENV_MAX_CONCURRENCY} must be a positive integer, got `{raw}`"))?;
    }
    if let Some(filter) = lookup(ENV_LOG) {
        config.log_filter = filter;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::time::Duration;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let config = load_from(None, env(&[])).unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn file_then_env_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "namespace": "coach", "maxConcurrency": 4 }}"#).unwrap();

        let config = load_from(
            Some(file.path()),
            env(&[(ENV_MAX_CONCURRENCY, "8"), (ENV_TIMEOUT_MS, "0")]),
        )
        .unwrap();

        assert_eq!(config.namespace, "coach");
        assert_eq!(config.max_concurrency.get(), 8);
        assert_eq!(config.invocation_timeout(), None);
    }

    #[test]
    fn env_timeout_is_applied() {
        let config = load_from(None, env(&[(ENV_TIMEOUT_MS, "250")])).unwrap();
        assert_eq!(config.invocation_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn malformed_overrides_fail() {
        assert!(load_from(None, env(&[(ENV_MAX_CONCURRENCY, "0")])).is_err());
        assert!(load_from(None, env(&[(ENV_TIMEOUT_MS, "soon")])).is_err());
        assert!(load_from(None, env(&[(ENV_NAMESPACE, "Bad Namespace")])).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_from(Some(Path::new("/nonexistent/wellness.json")), env(&[])).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/wellness.json"));
    }
}
