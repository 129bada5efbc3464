mod config;

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use covers_core::{CoversError, CoversResult, validate_url};

pub use config::{
    CoversConfig, DEFAULT_BASE_DELAY_MS, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_TIMEOUT_MS, DEFAULT_SITE_ORIGIN, DEFAULT_SOLVER_URL, FetchConfig, LogConfig,
    OutputConfig, SiteConfig, SolverConfig,
};

pub const ENV_SOLVER_URL: &str = "FLARESOLVERR_URL";
pub const ENV_SITE_ORIGIN: &str = "COVERS_SITE_ORIGIN";
pub const ENV_MAX_ATTEMPTS: &str = "COVERS_MAX_ATTEMPTS";
pub const ENV_OUTPUT_JSON: &str = "COVERS_OUTPUT_JSON";
pub const ENV_LOG: &str = "COVERS_LOG";

/// Fully resolved runtime values: defaults, then the config file, then the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub solver_url: String,
    pub site_origin: String,
    pub max_timeout_ms: u64,
    pub call_timeout: Duration,
    pub max_attempts: u32,
    pub base_delay: Duration,
}

pub fn config_path() -> CoversResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CoversError::Config("home directory not found".to_string()))?;
    Ok(home.join(".covers").join("config.toml"))
}

pub fn load_config() -> CoversResult<CoversConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CoversConfig::default());
    }
    let content = fs::read_to_string(&path)
        .map_err(|err| CoversError::Config(format!("failed to read config: {err}")))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> CoversResult<CoversConfig> {
    toml::from_str(content)
        .map_err(|err| CoversError::Config(format!("failed to parse config: {err}")))
}

pub fn save_config(config: &CoversConfig) -> CoversResult<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| CoversError::Config(format!("failed to create config dir: {err}")))?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|err| CoversError::Config(format!("failed to serialize config: {err}")))?;
    fs::write(&path, content)
        .map_err(|err| CoversError::Config(format!("failed to write config: {err}")))?;
    Ok(())
}

pub fn resolve_settings(config: &CoversConfig) -> CoversResult<Settings> {
    resolve_settings_with(config, |key| env::var(key).ok())
}

pub fn resolve_settings_with<F>(config: &CoversConfig, lookup: F) -> CoversResult<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let solver_url = non_empty(ENV_SOLVER_URL)
        .or_else(|| config.solver.url.clone())
        .unwrap_or_else(|| DEFAULT_SOLVER_URL.to_string());
    validate_url(&solver_url)
        .map_err(|err| CoversError::Config(format!("solver.url: {err}")))?;

    let site_origin = non_empty(ENV_SITE_ORIGIN)
        .or_else(|| config.site.origin.clone())
        .unwrap_or_else(|| DEFAULT_SITE_ORIGIN.to_string());
    validate_url(&site_origin).map_err(|err| CoversError::Config(format!("site.origin: {err}")))?;
    let site_origin = site_origin.trim_end_matches('/').to_string();

    let max_attempts = match non_empty(ENV_MAX_ATTEMPTS) {
        Some(raw) => raw.trim().parse::<u32>().map_err(|err| {
            CoversError::Config(format!("{ENV_MAX_ATTEMPTS} must be a positive integer: {err}"))
        })?,
        None => config.fetch.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
    };

    let max_timeout_ms = config.solver.max_timeout_ms.unwrap_or(DEFAULT_MAX_TIMEOUT_MS);
    let call_timeout_secs = config
        .solver
        .call_timeout_secs
        .unwrap_or(DEFAULT_CALL_TIMEOUT_SECS);
    let base_delay_ms = config.fetch.base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS);

    for (name, value) in [
        ("fetch.max_attempts", u64::from(max_attempts)),
        ("solver.max_timeout_ms", max_timeout_ms),
        ("solver.call_timeout_secs", call_timeout_secs),
    ] {
        if value == 0 {
            return Err(CoversError::Config(format!("{name} must be positive")));
        }
    }

    Ok(Settings {
        solver_url,
        site_origin,
        max_timeout_ms,
        call_timeout: Duration::from_secs(call_timeout_secs),
        max_attempts,
        base_delay: Duration::from_millis(base_delay_ms),
    })
}

pub fn resolve_json_output(config: &CoversConfig) -> Option<bool> {
    if let Ok(value) = env::var(ENV_OUTPUT_JSON) {
        let normalized = value.to_lowercase();
        return Some(normalized == "1" || normalized == "true" || normalized == "yes");
    }
    config.output.json
}

pub fn resolve_log_level(config: &CoversConfig) -> Option<String> {
    if let Ok(value) = env::var(ENV_LOG) {
        if !value.trim().is_empty() {
            return Some(value);
        }
    }
    config.log.level.clone()
}

pub fn get_config_value(config: &CoversConfig, key_path: &str) -> Option<String> {
    let parts: Vec<&str> = key_path.split('.').collect();

    match parts.as_slice() {
        ["solver", "url"] => config.solver.url.clone(),
        ["solver", "max_timeout_ms"] => config.solver.max_timeout_ms.map(|v| v.to_string()),
        ["solver", "call_timeout_secs"] => config.solver.call_timeout_secs.map(|v| v.to_string()),
        ["site", "origin"] => config.site.origin.clone(),
        ["fetch", "max_attempts"] => config.fetch.max_attempts.map(|v| v.to_string()),
        ["fetch", "base_delay_ms"] => config.fetch.base_delay_ms.map(|v| v.to_string()),
        ["output", "json"] => config.output.json.map(|v| v.to_string()),
        ["log", "level"] => config.log.level.clone(),
        _ => None,
    }
}

pub fn set_config_value(key_path: &str, value: &str) -> CoversResult<()> {
    let path = config_path()?;
    let content = if path.exists() {
        fs::read_to_string(&path)
            .map_err(|err| CoversError::Config(format!("failed to read config: {err}")))?
    } else {
        String::new()
    };

    let updated = apply_config_value(&content, key_path, value)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| CoversError::Config(format!("failed to create config dir: {err}")))?;
    }
    fs::write(&path, updated)
        .map_err(|err| CoversError::Config(format!("failed to write config: {err}")))?;

    Ok(())
}

/// Writes one dotted key into a TOML document, leaving everything else untouched.
///
/// Numeric and boolean keys are stored typed so the result still parses as [`CoversConfig`].
pub fn apply_config_value(content: &str, key_path: &str, value: &str) -> CoversResult<String> {
    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .unwrap_or_default();

    let parts: Vec<&str> = key_path.split('.').collect();
    let (last_part, parents) = match parts.split_last() {
        Some((last, parents)) if !parents.is_empty() => (*last, parents),
        _ => {
            return Err(CoversError::Config(
                "key path must have at least 2 parts (e.g., 'solver.url')".to_string(),
            ));
        }
    };

    let mut current = doc.as_table_mut();
    for part in parents {
        current = current
            .entry(part)
            .or_insert(toml_edit::Item::Table(Default::default()))
            .as_table_mut()
            .ok_or_else(|| {
                CoversError::Config(format!("cannot set nested value in '{key_path}'"))
            })?;
    }

    current[last_part] = typed_value(key_path, value)?;

    Ok(doc.to_string())
}

fn typed_value(key_path: &str, value: &str) -> CoversResult<toml_edit::Item> {
    let invalid = |kind: &str| CoversError::Config(format!("{key_path} expects {kind}, got '{value}'"));
    match key_path {
        "solver.max_timeout_ms"
        | "solver.call_timeout_secs"
        | "fetch.max_attempts"
        | "fetch.base_delay_ms" => {
            let number = value.trim().parse::<i64>().map_err(|_| invalid("an integer"))?;
            if number < 0 {
                return Err(invalid("a non-negative integer"));
            }
            Ok(toml_edit::value(number))
        }
        "output.json" => {
            let flag = value.trim().parse::<bool>().map_err(|_| invalid("true or false"))?;
            Ok(toml_edit::value(flag))
        }
        _ => Ok(toml_edit::value(value)),
    }
}

pub fn open_in_editor() -> CoversResult<()> {
    let path = config_path()?;
    if !path.exists() {
        save_config(&CoversConfig::default())?;
    }

    let editor = env::var("EDITOR").unwrap_or_else(|_| {
        if cfg!(target_os = "windows") {
            "notepad".to_string()
        } else {
            "nano".to_string()
        }
    });

    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .map_err(|err| CoversError::Config(format!("failed to open editor '{editor}': {err}")))?;

    if !status.success() {
        return Err(CoversError::Config(format!(
            "editor exited with status: {status}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let settings = resolve_settings_with(&CoversConfig::default(), env_of(&[])).unwrap();
        assert_eq!(settings.solver_url, DEFAULT_SOLVER_URL);
        assert_eq!(settings.site_origin, DEFAULT_SITE_ORIGIN);
        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.max_timeout_ms, 60_000);
        assert_eq!(settings.call_timeout, Duration::from_secs(70));
        assert_eq!(settings.base_delay, Duration::from_millis(2_000));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = CoversConfig::default();
        config.solver.url = Some("http://file-solver:8191/v1".to_string());
        config.fetch.max_attempts = Some(5);

        let settings = resolve_settings_with(
            &config,
            env_of(&[
                (ENV_SOLVER_URL, "http://env-solver:8191/v1"),
                (ENV_MAX_ATTEMPTS, "2"),
                (ENV_SITE_ORIGIN, "  "),
            ]),
        )
        .unwrap();

        assert_eq!(settings.solver_url, "http://env-solver:8191/v1");
        assert_eq!(settings.max_attempts, 2);
        assert_eq!(settings.site_origin, DEFAULT_SITE_ORIGIN);
    }

    #[test]
    fn trailing_slash_is_dropped_from_origin() {
        let mut config = CoversConfig::default();
        config.site.origin = Some("https://mirror.example.com/".to_string());
        let settings = resolve_settings_with(&config, env_of(&[])).unwrap();
        assert_eq!(settings.site_origin, "https://mirror.example.com");
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let result = resolve_settings_with(
            &CoversConfig::default(),
            env_of(&[(ENV_SOLVER_URL, "not a url")]),
        );
        assert!(matches!(result, Err(CoversError::Config(msg)) if msg.contains("solver.url")));

        let result = resolve_settings_with(
            &CoversConfig::default(),
            env_of(&[(ENV_MAX_ATTEMPTS, "0")]),
        );
        assert!(matches!(result, Err(CoversError::Config(_))));

        let result = resolve_settings_with(
            &CoversConfig::default(),
            env_of(&[(ENV_MAX_ATTEMPTS, "many")]),
        );
        assert!(matches!(result, Err(CoversError::Config(_))));
    }

    #[test]
    fn parses_partial_config_file() {
        let config = parse_config(
            r#"
            [solver]
            url = "http://localhost:8191/v1"

            [fetch]
            max_attempts = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.solver.url.as_deref(), Some("http://localhost:8191/v1"));
        assert_eq!(config.fetch.max_attempts, Some(4));
        assert_eq!(config.site.origin, None);
        assert_eq!(get_config_value(&config, "fetch.max_attempts"), Some("4".to_string()));
        assert_eq!(get_config_value(&config, "nope.nothing"), None);
    }

    #[test]
    fn apply_config_value_preserves_other_keys_and_types() {
        let original = "# solver settings\n[solver]\nurl = \"http://localhost:8191/v1\"\n";
        let updated = apply_config_value(original, "fetch.max_attempts", "5").unwrap();
        let updated = apply_config_value(&updated, "output.json", "true").unwrap();

        assert!(updated.contains("# solver settings"));
        let config = parse_config(&updated).unwrap();
        assert_eq!(config.solver.url.as_deref(), Some("http://localhost:8191/v1"));
        assert_eq!(config.fetch.max_attempts, Some(5));
        assert_eq!(config.output.json, Some(true));
    }

    #[test]
    fn apply_config_value_rejects_bad_keys_and_values() {
        assert!(matches!(
            apply_config_value("", "solver", "x"),
            Err(CoversError::Config(_))
        ));
        assert!(matches!(
            apply_config_value("", "fetch.max_attempts", "three"),
            Err(CoversError::Config(_))
        ));
    }
}
