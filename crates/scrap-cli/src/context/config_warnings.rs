use scrap_config::{ScrapConfig, StorageBackend};

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &ScrapConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &ScrapConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if config.storage.backend == StorageBackend::None && has_env_prefix(&env_keys, "SCRAP_STORAGE")
    {
        warnings.push(
            "Storage backend is 'none' while SCRAP_STORAGE* env vars exist. Use double underscores (example: SCRAP_STORAGE__BACKEND=s3)."
                .to_string(),
        );
    }

    if has_env_prefix(&env_keys, "SCRAP_DATABASE")
        && config.database.path == scrap_config::DatabaseConfig::default().path
    {
        warnings.push(
            "Database path appears default while SCRAP_DATABASE* env vars exist. Use double underscores (example: SCRAP_DATABASE__PATH)."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
