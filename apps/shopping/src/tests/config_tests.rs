use super::*;

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_apply_without_file_or_env() {
    assert_eq!(load_settings_from(None, no_env), Settings::default());
}

#[test]
fn file_values_override_defaults() {
    let raw = r#"
        database_url = "sqlite://./lists/home.db"
        currency_prefix = "R"
    "#;
    let settings = load_settings_from(Some(raw), no_env);
    assert_eq!(settings.database_url, "sqlite://./lists/home.db");
    assert_eq!(settings.currency_prefix, "R");
    assert_eq!(settings.log_filter, "warn");
}

#[test]
fn environment_overrides_file() {
    let raw = r#"database_url = "sqlite://./from-file.db""#;
    let settings = load_settings_from(Some(raw), |name| match name {
        "APP__DATABASE_URL" => Some("sqlite://./from-env.db".to_string()),
        "APP__LOG_FILTER" => Some("debug".to_string()),
        _ => None,
    });
    assert_eq!(settings.database_url, "sqlite://./from-env.db");
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn app_prefixed_variable_wins_over_legacy_name() {
    let settings = load_settings_from(None, |name| match name {
        "SHOPPING_DATABASE_URL" => Some("sqlite://./legacy.db".to_string()),
        "APP__DATABASE_URL" => Some("sqlite://./app.db".to_string()),
        _ => None,
    });
    assert_eq!(settings.database_url, "sqlite://./app.db");
}

#[test]
fn unreadable_file_falls_back_to_defaults() {
    let settings = load_settings_from(Some("database_url = [1, 2"), no_env);
    assert_eq!(settings, Settings::default());
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn keeps_memory_and_full_urls_untouched() {
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(
        normalize_database_url("sqlite://./data/test.db?mode=rwc"),
        "sqlite://./data/test.db?mode=rwc"
    );
}

#[test]
fn blank_url_uses_default_database() {
    assert_eq!(normalize_database_url("  "), Settings::default().database_url);
}

#[test]
fn bare_sqlite_prefix_gains_slashes() {
    assert_eq!(
        normalize_database_url("sqlite:lists\\home.db"),
        "sqlite://lists/home.db"
    );
}

#[tokio::test]
async fn normalized_path_opens_inside_missing_directory() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("shopping.db");

    let database_url = normalize_database_url(db_path.to_string_lossy().as_ref());
    assert!(database_url.starts_with("sqlite://"));

    storage::Storage::new(&database_url).await.expect("open db");
    assert!(temp_root.path().join("nested").exists());
}
