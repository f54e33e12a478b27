//! Object storage configuration (asset blobs).

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Which object store backs asset blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// No object store: the service runs degraded (no upload/serve).
    #[default]
    None,
    /// Process-local in-memory store.
    Memory,
    /// Directory on the local filesystem.
    Local,
    /// S3-compatible service (MinIO, R2, AWS).
    S3,
}

/// Default bucket name.
fn default_bucket_name() -> String {
    String::from("scrapbook-assets")
}

/// Default region for S3-compatible services that ignore it.
fn default_region() -> String {
    String::from("us-east-1")
}

/// Default local blob directory.
fn default_root() -> String {
    String::from("./data/assets")
}

/// Default per-call timeout in seconds.
const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the `local` backend.
    #[serde(default = "default_root")]
    pub root: String,

    /// Endpoint URL for the `s3` backend (e.g., `http://localhost:9000`).
    #[serde(default)]
    pub endpoint: String,

    /// S3 access key ID.
    #[serde(default)]
    pub access_key_id: String,

    /// S3 secret access key.
    #[serde(default)]
    pub secret_access_key: String,

    /// Bucket name.
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Allow plain-HTTP endpoints (local MinIO).
    #[serde(default)]
    pub allow_http: bool,

    /// Upper bound on every object store call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_root(),
            endpoint: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            bucket_name: default_bucket_name(),
            region: default_region(),
            allow_http: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StorageConfig {
    /// Check if the selected backend has the fields it needs.
    pub fn is_configured(&self) -> bool {
        match self.backend {
            StorageBackend::None => false,
            StorageBackend::Memory => true,
            StorageBackend::Local => !self.root.is_empty(),
            StorageBackend::S3 => {
                !self.endpoint.is_empty()
                    && !self.access_key_id.is_empty()
                    && !self.secret_access_key.is_empty()
                    && !self.bucket_name.is_empty()
            }
        }
    }

    /// Validate the section, naming the first missing field.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` if the backend is `none`, or
    /// `ConfigError::InvalidValue` if a required field is empty or the timeout
    /// is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing = |field: &str| ConfigError::InvalidValue {
            field: format!("storage.{field}"),
            reason: String::from("must not be empty"),
        };

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: String::from("storage.timeout_secs"),
                reason: String::from("must be greater than zero"),
            });
        }

        match self.backend {
            StorageBackend::None => Err(ConfigError::NotConfigured {
                section: String::from("storage"),
            }),
            StorageBackend::Memory => Ok(()),
            StorageBackend::Local if self.root.is_empty() => Err(missing("root")),
            StorageBackend::Local => Ok(()),
            StorageBackend::S3 => {
                if self.endpoint.is_empty() {
                    return Err(missing("endpoint"));
                }
                if self.access_key_id.is_empty() {
                    return Err(missing("access_key_id"));
                }
                if self.secret_access_key.is_empty() {
                    return Err(missing("secret_access_key"));
                }
                if self.bucket_name.is_empty() {
                    return Err(missing("bucket_name"));
                }
                Ok(())
            }
        }
    }
}
