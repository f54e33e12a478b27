//! Environment variable overrides through the full loader.

use figment::Jail;
use scrap_config::{ScrapConfig, StorageBackend};

#[test]
fn env_selects_storage_backend() {
    Jail::expect_with(|jail| {
        jail.set_env("SCRAP_STORAGE__BACKEND", "memory");
        jail.set_env("SCRAP_STORAGE__TIMEOUT_SECS", "3");

        let config = ScrapConfig::load().expect("config loads");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.timeout_secs, 3);
        assert!(config.storage.validate().is_ok());
        Ok(())
    });
}

#[test]
fn env_sets_database_path() {
    Jail::expect_with(|jail| {
        jail.set_env("SCRAP_DATABASE__PATH", "/tmp/scrap-env.db");

        let config = ScrapConfig::load().expect("config loads");
        assert_eq!(config.database.path, "/tmp/scrap-env.db");
        Ok(())
    });
}

#[test]
fn missing_env_leaves_storage_degraded() {
    Jail::expect_with(|_jail| {
        let config = ScrapConfig::load().expect("config loads");
        assert_eq!(config.storage.backend, StorageBackend::None);
        assert!(!config.storage.is_configured());
        Ok(())
    });
}

#[test]
fn wrong_type_in_env_is_an_error() {
    Jail::expect_with(|jail| {
        jail.set_env("SCRAP_SERVER__PORT", "not-a-port");
        assert!(ScrapConfig::load().is_err());
        Ok(())
    });
}
