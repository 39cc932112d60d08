use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::{paging::is_allowed_page_size, DEFAULT_PAGE_SIZE};

const DEFAULT_CONFIG_FILE: &str = "teamsphere.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub default_page_size: u32,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".into(),
            api_token: None,
            request_timeout_secs: 30,
            default_page_size: DEFAULT_PAGE_SIZE,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Resets an unsupported page size to the default and hands back the
    /// rejected value so the caller can report it.
    pub fn normalize_page_size(&mut self) -> Option<u32> {
        if is_allowed_page_size(self.default_page_size) {
            return None;
        }
        let rejected = self.default_page_size;
        self.default_page_size = DEFAULT_PAGE_SIZE;
        Some(rejected)
    }
}

/// Defaults, then the TOML file, then the environment. An explicit
/// `config_path` must exist; the default file is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if required => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)?;
    let text = |key: &str| {
        file_cfg.get(key).map(|v| match v {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    };

    if let Some(v) = text("api_url") {
        settings.api_url = v;
    }
    if let Some(v) = text("api_token") {
        settings.api_token = Some(v).filter(|t| !t.trim().is_empty());
    }
    if let Some(v) = text("request_timeout_secs") {
        settings.request_timeout_secs = v
            .parse()
            .with_context(|| format!("request_timeout_secs must be a number, got '{v}'"))?;
    }
    if let Some(v) = text("default_page_size") {
        settings.default_page_size = v
            .parse()
            .with_context(|| format!("default_page_size must be a number, got '{v}'"))?;
    }
    if let Some(v) = text("log_filter") {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("TEAMSPHERE_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = var("APP__API_TOKEN") {
        settings.api_token = Some(v).filter(|t| !t.trim().is_empty());
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = var("APP__DEFAULT_PAGE_SIZE") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.default_page_size = parsed;
        }
    }

    if let Some(v) = var("RUST_LOG") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn file_values_override_defaults() {
        let mut settings = Settings::default();
        apply_file(
            &mut settings,
            r#"
api_url = "https://teamsphere.example"
request_timeout_secs = 5
default_page_size = 30
"#,
        )
        .expect("parse");

        assert_eq!(settings.api_url, "https://teamsphere.example");
        assert_eq!(settings.request_timeout_secs, 5);
        assert_eq!(settings.default_page_size, 30);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn malformed_numbers_in_file_are_errors() {
        let mut settings = Settings::default();
        let err = apply_file(&mut settings, "request_timeout_secs = \"soon\"")
            .expect_err("must fail");
        assert!(err.to_string().contains("request_timeout_secs"));
    }

    #[test]
    fn app_prefixed_env_wins_over_legacy_name() {
        let mut settings = Settings::default();
        apply_env(
            &mut settings,
            env_of(&[
                ("TEAMSPHERE_API_URL", "http://legacy:8080"),
                ("APP__API_URL", "http://primary:8080"),
                ("APP__API_TOKEN", "tok"),
                ("APP__DEFAULT_PAGE_SIZE", "not-a-number"),
            ]),
        );

        assert_eq!(settings.api_url, "http://primary:8080");
        assert_eq!(settings.api_token.as_deref(), Some("tok"));
        assert_eq!(settings.default_page_size, 10);
    }

    #[test]
    fn unsupported_page_size_falls_back_to_default() {
        let mut settings = Settings {
            default_page_size: 25,
            ..Settings::default()
        };
        assert_eq!(settings.normalize_page_size(), Some(25));
        assert_eq!(settings.default_page_size, 10);
        assert_eq!(settings.normalize_page_size(), None);
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let missing = std::env::temp_dir().join(format!("teamsphere_missing_{suffix}.toml"));

        let err = load_settings(Some(&missing)).expect_err("must fail");
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("teamsphere_admin_{suffix}.toml"));
        fs::write(&path, "log_filter = \"debug\"\n").expect("write config");

        let settings = load_settings(Some(&path)).expect("load");
        fs::remove_file(&path).expect("cleanup");

        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(settings.log_filter, "debug");
        }
    }
}
