use std::{collections::HashMap, fs, path::Path};

use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub currency_prefix: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/shopping.db".into(),
            currency_prefix: "$".into(),
            log_filter: "warn".into(),
        }
    }
}

pub fn load_settings(config_path: &Path) -> Settings {
    let raw = fs::read_to_string(config_path).ok();
    load_settings_from(raw.as_deref(), |name| std::env::var(name).ok())
}

/// File values override defaults; environment values override the file.
pub fn load_settings_from(
    raw_file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = raw_file {
        match toml::from_str::<HashMap<String, String>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("database_url") {
                    settings.database_url = v.clone();
                }
                if let Some(v) = file_cfg.get("currency_prefix") {
                    settings.currency_prefix = v.clone();
                }
                if let Some(v) = file_cfg.get("log_filter") {
                    settings.log_filter = v.clone();
                }
            }
            Err(error) => warn!(%error, "ignoring unreadable settings file"),
        }
    }

    if let Some(v) = env("SHOPPING_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__CURRENCY_PREFIX") {
        settings.currency_prefix = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings
}

/// Turns a bare file path into a sqlite URL. Parent directories are created by `Storage::new`.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    let path = raw_database_url
        .strip_prefix("sqlite:")
        .unwrap_or(raw_database_url)
        .replace('\\', "/");
    format!("sqlite://{path}")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
